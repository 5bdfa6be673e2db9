//! i386 compat syscall numbers. Only the calls the decoders know how to render
//! beyond raw words, plus the common process bookkeeping calls, are listed;
//! everything else resolves to the raw `syscall_0x..` fallback.

use crate::sysent::{
    shorthand::*,
    sysent,
    DecoderKind::*,
    MmapCallingSemantics::{RegisterArgumentsPageOffset, StructArguments},
    SyscallDescriptor,
    TimespecLayout::{Native, Time64},
};

pub fn syscall_entries() -> Vec<(u32, SyscallDescriptor)> {
    let mut entries = vec![
        (0, sysent(0, NONE, Generic, "restart_syscall")),
        (1, sysent(1, TP | SE, Exit, "exit")),
        (2, sysent(0, TP, Fork, "fork")),
        (3, sysent(3, TD, Read, "read")),
        (4, sysent(3, TD, Write, "write")),
        (5, sysent(3, TD | TF, Open, "open")),
        (6, sysent(1, TD, Close, "close")),
        (7, sysent(3, TP, Generic, "waitpid")),
        (8, sysent(2, TD | TF, Creat, "creat")),
        (9, sysent(2, TF, PathPath, "link")),
        (10, sysent(1, TF, PathArgs, "unlink")),
        (11, sysent(3, CC | TF | TP | TSD | SE | SI | EX, Execve, "execve")),
        (12, sysent(1, TF, PathArgs, "chdir")),
        (13, sysent(1, TCL, Time, "time")),
        (14, sysent(3, TF, PathMode, "mknod")),
        (15, sysent(2, TF, PathMode, "chmod")),
        (16, sysent(3, TF, PathArgs, "lchown")),
        (18, sysent(2, TF | TST | TSTA, Stat, "oldstat")),
        (19, sysent(3, TD, Lseek, "lseek")),
        (20, sysent(0, PU | NF, Generic, "getpid")),
        (21, sysent(5, TF, PathPath, "mount")),
        (22, sysent(1, TF, PathArgs, "umount")),
        (23, sysent(1, TC, Generic, "setuid")),
        (24, sysent(0, TC | PU | NF, Generic, "getuid")),
        (25, sysent(1, TCL, Generic, "stime")),
        (26, sysent(4, NONE, Generic, "ptrace")),
        (27, sysent(1, NONE, Generic, "alarm")),
        (28, sysent(2, TD | TFST | TSTA, Fstat, "oldfstat")),
        (29, sysent(0, TS, Generic, "pause")),
        (30, sysent(2, TF, PathArgs, "utime")),
        (33, sysent(2, TF, Access, "access")),
        (34, sysent(1, NONE, Generic, "nice")),
        (36, sysent(0, NONE, Generic, "sync")),
        (37, sysent(2, TS | TP, Kill, "kill")),
        (38, sysent(2, TF, PathPath, "rename")),
        (39, sysent(2, TF, PathMode, "mkdir")),
        (40, sysent(1, TF, PathArgs, "rmdir")),
        (41, sysent(1, TD, Dup, "dup")),
        (42, sysent(1, TD, Pipe, "pipe")),
        (43, sysent(1, NONE, Generic, "times")),
        (45, sysent(1, TM | SI, Brk, "brk")),
        (46, sysent(1, TC, Generic, "setgid")),
        (47, sysent(0, TC | PU | NF, Generic, "getgid")),
        (48, sysent(2, TS, Generic, "signal")),
        (49, sysent(0, TC | PU | NF, Generic, "geteuid")),
        (50, sysent(0, TC | PU | NF, Generic, "getegid")),
        (51, sysent(1, TF, PathArgs, "acct")),
        (52, sysent(2, TF, PathArgs, "umount2")),
        (54, sysent(3, TD, Fd, "ioctl")),
        (55, sysent(3, TD, Fcntl, "fcntl")),
        (57, sysent(2, NONE, Generic, "setpgid")),
        (60, sysent(1, NF, Umask, "umask")),
        (61, sysent(1, TF, PathArgs, "chroot")),
        (62, sysent(2, TSFA, Generic, "ustat")),
        (63, sysent(2, TD, Dup2, "dup2")),
        (64, sysent(0, PU | NF, Generic, "getppid")),
        (65, sysent(0, PU | NF, Generic, "getpgrp")),
        (66, sysent(0, NONE, Generic, "setsid")),
        (67, sysent(3, TS, Generic, "sigaction")),
        (78, sysent(2, TCL, Generic, "gettimeofday")),
        (79, sysent(2, TCL, Generic, "settimeofday")),
        (83, sysent(2, TF, PathPath, "symlink")),
        (85, sysent(3, TF, PathArgs, "readlink")),
        (90, sysent(1, TD | TM | SI, Mmap(StructArguments), "mmap")),
        (91, sysent(2, TM | SI, Munmap, "munmap")),
        (92, sysent(2, TF, Truncate, "truncate")),
        (93, sysent(2, TD, Ftruncate, "ftruncate")),
        (94, sysent(2, TD, Fd, "fchmod")),
        (95, sysent(3, TD, Fd, "fchown")),
        (99, sysent(2, TF | TSF | TSFA, PathArgs, "statfs")),
        (100, sysent(2, TD | TFSF | TSFA, Fd, "fstatfs")),
        (102, sysent(2, TD, Generic, "socketcall")),
        (106, sysent(2, TF | TST | TSTA, Stat, "stat")),
        (107, sysent(2, TF | TLST | TSTA, Stat, "lstat")),
        (108, sysent(2, TD | TFST | TSTA, Fstat, "fstat")),
        (114, sysent(4, TP, Generic, "wait4")),
        (118, sysent(1, TD, Fd, "fsync")),
        (119, sysent(0, TS, Generic, "sigreturn")),
        (120, sysent(5, TP, CloneTask, "clone")),
        (122, sysent(1, NONE, Generic, "uname")),
        (125, sysent(3, TM | SI, Mprotect, "mprotect")),
        (133, sysent(1, TD, Fd, "fchdir")),
        (140, sysent(5, TD, Fd, "_llseek")),
        (141, sysent(3, TD, Fd, "getdents")),
        (142, sysent(5, TD, Generic, "_newselect")),
        (143, sysent(2, TD, Flock, "flock")),
        (145, sysent(3, TD, Fd, "readv")),
        (146, sysent(3, TD, Fd, "writev")),
        (148, sysent(1, TD, Fd, "fdatasync")),
        (162, sysent(2, NONE, Generic, "nanosleep")),
        (173, sysent(0, TS, Generic, "rt_sigreturn")),
        (174, sysent(4, TS, Generic, "rt_sigaction")),
        (175, sysent(4, TS, Generic, "rt_sigprocmask")),
        (180, sysent(5, TD, Fd, "pread64")),
        (181, sysent(5, TD, Fd, "pwrite64")),
        (183, sysent(2, TF, Generic, "getcwd")),
        (190, sysent(0, TP, Fork, "vfork")),
        (191, sysent(2, NONE, Generic, "ugetrlimit")),
        (192, sysent(6, TD | TM | SI, Mmap(RegisterArgumentsPageOffset), "mmap2")),
        (193, sysent(3, TF, Truncate, "truncate64")),
        (194, sysent(3, TD, Ftruncate, "ftruncate64")),
        (195, sysent(2, TF | TST | TSTA, Stat, "stat64")),
        (196, sysent(2, TF | TLST | TSTA, Stat, "lstat64")),
        (197, sysent(2, TD | TFST | TSTA, Fstat, "fstat64")),
        (199, sysent(0, TC | PU | NF, Generic, "getuid32")),
        (200, sysent(0, TC | PU | NF, Generic, "getgid32")),
        (201, sysent(0, TC | PU | NF, Generic, "geteuid32")),
        (202, sysent(0, TC | PU | NF, Generic, "getegid32")),
        (213, sysent(1, TC, Generic, "setuid32")),
        (214, sysent(1, TC, Generic, "setgid32")),
        (220, sysent(3, TD, Fd, "getdents64")),
        (221, sysent(3, TD, Fcntl, "fcntl64")),
        (224, sysent(0, PU | NF, Generic, "gettid")),
        (238, sysent(2, TS | TP, Kill, "tkill")),
        (240, sysent(6, NONE, Generic, "futex")),
        (243, sysent(1, NONE, Generic, "set_thread_area")),
        (252, sysent(1, TP | SE, Exit, "exit_group")),
        (258, sysent(1, NONE, Generic, "set_tid_address")),
        (264, sysent(2, TCL, Generic, "clock_settime")),
        (265, sysent(2, TCL, ClockGettime(Native), "clock_gettime")),
        (266, sysent(2, TCL, Generic, "clock_getres")),
        (270, sysent(3, TS | TP, Tgkill, "tgkill")),
        (295, sysent(4, TD | TF, OpenAt, "openat")),
        (296, sysent(3, TD | TF, Generic, "mkdirat")),
        (300, sysent(4, TD | TF | TFST | TSTA, Generic, "fstatat64")),
        (301, sysent(3, TD | TF, Unlinkat, "unlinkat")),
        (313, sysent(6, TD, Splice, "splice")),
        (320, sysent(4, TD | TF, Generic, "utimensat")),
        (328, sysent(2, TD, Generic, "eventfd2")),
        (330, sysent(3, TD, Dup3, "dup3")),
        (331, sysent(2, TD, Pipe2, "pipe2")),
        (355, sysent(3, NONE, Generic, "getrandom")),
        (356, sysent(2, TD, MemfdCreate, "memfd_create")),
        (358, sysent(5, CC | TD | TF | TP | TSD | SE | SI | EX, Execveat, "execveat")),
        (359, sysent(3, TN, Socket, "socket")),
        (360, sysent(4, TN, Generic, "socketpair")),
        (361, sysent(3, TN, Generic, "bind")),
        (362, sysent(3, TN, Generic, "connect")),
        (363, sysent(2, TN, Generic, "listen")),
        (364, sysent(4, TN, Accept4, "accept4")),
        (383, sysent(5, TD | TF | TFST | TSTA, Generic, "statx")),
        (403, sysent(2, TCL, ClockGettime(Time64), "clock_gettime64")),
    ];
    entries.extend(super::common::syscall_entries());
    entries
}
