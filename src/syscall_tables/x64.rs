//! x86-64 native syscall numbers.

use crate::sysent::{
    shorthand::*,
    sysent,
    DecoderKind::*,
    MmapCallingSemantics::RegisterArguments,
    SyscallDescriptor,
    TimespecLayout::Native,
};

pub fn syscall_entries() -> Vec<(u32, SyscallDescriptor)> {
    let mut entries = vec![
        (0, sysent(3, TD, Read, "read")),
        (1, sysent(3, TD, Write, "write")),
        (2, sysent(3, TD | TF, Open, "open")),
        (3, sysent(1, TD, Close, "close")),
        (4, sysent(2, TF | TST | TSTA, Stat, "stat")),
        (5, sysent(2, TD | TFST | TSTA, Fstat, "fstat")),
        (6, sysent(2, TF | TLST | TSTA, Stat, "lstat")),
        (7, sysent(3, TD, Fd, "poll")),
        (8, sysent(3, TD, Lseek, "lseek")),
        (9, sysent(6, TD | TM | SI, Mmap(RegisterArguments), "mmap")),
        (10, sysent(3, TM | SI, Mprotect, "mprotect")),
        (11, sysent(2, TM | SI, Munmap, "munmap")),
        (12, sysent(1, TM | SI, Brk, "brk")),
        (13, sysent(4, TS, Generic, "rt_sigaction")),
        (14, sysent(4, TS, Generic, "rt_sigprocmask")),
        (15, sysent(0, TS, Generic, "rt_sigreturn")),
        (16, sysent(3, TD, Fd, "ioctl")),
        (17, sysent(4, TD, Fd, "pread64")),
        (18, sysent(4, TD, Fd, "pwrite64")),
        (19, sysent(3, TD, Fd, "readv")),
        (20, sysent(3, TD, Fd, "writev")),
        (21, sysent(2, TF, Access, "access")),
        (22, sysent(1, TD, Pipe, "pipe")),
        (23, sysent(5, TD, Generic, "select")),
        (24, sysent(0, NONE, Generic, "sched_yield")),
        (25, sysent(5, TM | SI, Generic, "mremap")),
        (26, sysent(3, TM, Generic, "msync")),
        (27, sysent(3, TM, Generic, "mincore")),
        (28, sysent(3, TM, Generic, "madvise")),
        (29, sysent(3, TI, Generic, "shmget")),
        (30, sysent(3, TI | TM | SI, Generic, "shmat")),
        (31, sysent(3, TI, Generic, "shmctl")),
        (32, sysent(1, TD, Dup, "dup")),
        (33, sysent(2, TD, Dup2, "dup2")),
        (34, sysent(0, TS, Generic, "pause")),
        (35, sysent(2, NONE, Generic, "nanosleep")),
        (36, sysent(2, NONE, Generic, "getitimer")),
        (37, sysent(1, NONE, Generic, "alarm")),
        (38, sysent(3, NONE, Generic, "setitimer")),
        (39, sysent(0, PU | NF, Generic, "getpid")),
        (40, sysent(4, TD | TN, Generic, "sendfile")),
        (41, sysent(3, TN, Socket, "socket")),
        (42, sysent(3, TN, Generic, "connect")),
        (43, sysent(3, TN, Accept, "accept")),
        (44, sysent(6, TN, Generic, "sendto")),
        (45, sysent(6, TN, Generic, "recvfrom")),
        (46, sysent(3, TN, Generic, "sendmsg")),
        (47, sysent(3, TN, Generic, "recvmsg")),
        (48, sysent(2, TN, Generic, "shutdown")),
        (49, sysent(3, TN, Generic, "bind")),
        (50, sysent(2, TN, Generic, "listen")),
        (51, sysent(3, TN, Generic, "getsockname")),
        (52, sysent(3, TN, Generic, "getpeername")),
        (53, sysent(4, TN, Generic, "socketpair")),
        (54, sysent(5, TN, Generic, "setsockopt")),
        (55, sysent(5, TN, Generic, "getsockopt")),
        (56, sysent(5, TP, CloneTask, "clone")),
        (57, sysent(0, TP, Fork, "fork")),
        (58, sysent(0, TP, Fork, "vfork")),
        (59, sysent(3, CC | TF | TP | TSD | SE | SI | EX, Execve, "execve")),
        (60, sysent(1, TP | SE, Exit, "exit")),
        (61, sysent(4, TP, Generic, "wait4")),
        (62, sysent(2, TS | TP, Kill, "kill")),
        (63, sysent(1, NONE, Generic, "uname")),
        (64, sysent(3, TI, Generic, "semget")),
        (65, sysent(3, TI, Generic, "semop")),
        (66, sysent(4, TI, Generic, "semctl")),
        (67, sysent(1, TI | TM | SI, Generic, "shmdt")),
        (68, sysent(2, TI, Generic, "msgget")),
        (69, sysent(4, TI, Generic, "msgsnd")),
        (70, sysent(5, TI, Generic, "msgrcv")),
        (71, sysent(3, TI, Generic, "msgctl")),
        (72, sysent(3, TD, Fcntl, "fcntl")),
        (73, sysent(2, TD, Flock, "flock")),
        (74, sysent(1, TD, Fd, "fsync")),
        (75, sysent(1, TD, Fd, "fdatasync")),
        (76, sysent(2, TF, Truncate, "truncate")),
        (77, sysent(2, TD, Ftruncate, "ftruncate")),
        (78, sysent(3, TD, Fd, "getdents")),
        (79, sysent(2, TF, Generic, "getcwd")),
        (80, sysent(1, TF, PathArgs, "chdir")),
        (81, sysent(1, TD, Fd, "fchdir")),
        (82, sysent(2, TF, PathPath, "rename")),
        (83, sysent(2, TF, PathMode, "mkdir")),
        (84, sysent(1, TF, PathArgs, "rmdir")),
        (85, sysent(2, TD | TF, Creat, "creat")),
        (86, sysent(2, TF, PathPath, "link")),
        (87, sysent(1, TF, PathArgs, "unlink")),
        (88, sysent(2, TF, PathPath, "symlink")),
        (89, sysent(3, TF, PathArgs, "readlink")),
        (90, sysent(2, TF, PathMode, "chmod")),
        (91, sysent(2, TD, Fd, "fchmod")),
        (92, sysent(3, TF, PathArgs, "chown")),
        (93, sysent(3, TD, Fd, "fchown")),
        (94, sysent(3, TF, PathArgs, "lchown")),
        (95, sysent(1, NF, Umask, "umask")),
        (96, sysent(2, TCL, Generic, "gettimeofday")),
        (97, sysent(2, NONE, Generic, "getrlimit")),
        (98, sysent(2, NONE, Generic, "getrusage")),
        (99, sysent(1, NONE, Generic, "sysinfo")),
        (100, sysent(1, NONE, Generic, "times")),
        (101, sysent(4, NONE, Generic, "ptrace")),
        (102, sysent(0, TC | PU | NF, Generic, "getuid")),
        (103, sysent(3, NONE, Generic, "syslog")),
        (104, sysent(0, TC | PU | NF, Generic, "getgid")),
        (105, sysent(1, TC, Generic, "setuid")),
        (106, sysent(1, TC, Generic, "setgid")),
        (107, sysent(0, TC | PU | NF, Generic, "geteuid")),
        (108, sysent(0, TC | PU | NF, Generic, "getegid")),
        (109, sysent(2, NONE, Generic, "setpgid")),
        (110, sysent(0, PU | NF, Generic, "getppid")),
        (111, sysent(0, PU | NF, Generic, "getpgrp")),
        (112, sysent(0, NONE, Generic, "setsid")),
        (113, sysent(2, TC, Generic, "setreuid")),
        (114, sysent(2, TC, Generic, "setregid")),
        (115, sysent(2, TC, Generic, "getgroups")),
        (116, sysent(2, TC, Generic, "setgroups")),
        (117, sysent(3, TC, Generic, "setresuid")),
        (118, sysent(3, TC, Generic, "getresuid")),
        (119, sysent(3, TC, Generic, "setresgid")),
        (120, sysent(3, TC, Generic, "getresgid")),
        (121, sysent(1, NONE, Generic, "getpgid")),
        (122, sysent(1, TC | NF, Generic, "setfsuid")),
        (123, sysent(1, TC | NF, Generic, "setfsgid")),
        (124, sysent(1, NONE, Generic, "getsid")),
        (125, sysent(2, TC, Generic, "capget")),
        (126, sysent(2, TC, Generic, "capset")),
        (127, sysent(2, TS, Generic, "rt_sigpending")),
        (128, sysent(4, TS, Generic, "rt_sigtimedwait")),
        (129, sysent(3, TS | TP, Generic, "rt_sigqueueinfo")),
        (130, sysent(2, TS, Generic, "rt_sigsuspend")),
        (131, sysent(2, TS, Generic, "sigaltstack")),
        (132, sysent(2, TF, PathArgs, "utime")),
        (133, sysent(3, TF, PathMode, "mknod")),
        (134, sysent(1, TF, PathArgs, "uselib")),
        (135, sysent(1, NF, Generic, "personality")),
        (136, sysent(2, TSFA, Generic, "ustat")),
        (137, sysent(2, TF | TSF | TSFA, PathArgs, "statfs")),
        (138, sysent(2, TD | TFSF | TSFA, Fd, "fstatfs")),
        (139, sysent(3, NONE, Generic, "sysfs")),
        (140, sysent(2, NONE, Generic, "getpriority")),
        (141, sysent(3, NONE, Generic, "setpriority")),
        (142, sysent(2, NONE, Generic, "sched_setparam")),
        (143, sysent(2, NONE, Generic, "sched_getparam")),
        (144, sysent(3, NONE, Generic, "sched_setscheduler")),
        (145, sysent(1, NONE, Generic, "sched_getscheduler")),
        (146, sysent(1, NONE, Generic, "sched_get_priority_max")),
        (147, sysent(1, NONE, Generic, "sched_get_priority_min")),
        (148, sysent(2, NONE, Generic, "sched_rr_get_interval")),
        (149, sysent(2, TM, Generic, "mlock")),
        (150, sysent(2, TM, Generic, "munlock")),
        (151, sysent(1, TM, Generic, "mlockall")),
        (152, sysent(0, TM, Generic, "munlockall")),
        (153, sysent(0, NONE, Generic, "vhangup")),
        (154, sysent(3, NONE, Generic, "modify_ldt")),
        (155, sysent(2, TF, PathPath, "pivot_root")),
        (156, sysent(1, NONE, Generic, "_sysctl")),
        (157, sysent(5, CC | TC, Generic, "prctl")),
        (158, sysent(2, NONE, Generic, "arch_prctl")),
        (159, sysent(1, TCL, Generic, "adjtimex")),
        (160, sysent(2, NONE, Generic, "setrlimit")),
        (161, sysent(1, TF, PathArgs, "chroot")),
        (162, sysent(0, NONE, Generic, "sync")),
        (163, sysent(1, TF, PathArgs, "acct")),
        (164, sysent(2, TCL, Generic, "settimeofday")),
        (165, sysent(5, TF, PathPath, "mount")),
        (166, sysent(2, TF, PathArgs, "umount2")),
        (167, sysent(2, TF, PathArgs, "swapon")),
        (168, sysent(1, TF, PathArgs, "swapoff")),
        (169, sysent(4, NONE, Generic, "reboot")),
        (170, sysent(2, NONE, Generic, "sethostname")),
        (171, sysent(2, NONE, Generic, "setdomainname")),
        (172, sysent(1, NONE, Generic, "iopl")),
        (173, sysent(3, NONE, Generic, "ioperm")),
        (174, sysent(2, NONE, Generic, "create_module")),
        (175, sysent(3, NONE, Generic, "init_module")),
        (176, sysent(2, NONE, Generic, "delete_module")),
        (177, sysent(1, NONE, Generic, "get_kernel_syms")),
        (178, sysent(5, NONE, Generic, "query_module")),
        (179, sysent(4, TF, Generic, "quotactl")),
        (180, sysent(3, NONE, Generic, "nfsservctl")),
        (181, sysent(5, TN, Generic, "getpmsg")),
        (182, sysent(5, TN, Generic, "putpmsg")),
        (183, sysent(5, NONE, Generic, "afs_syscall")),
        (184, sysent(3, NONE, Generic, "tuxcall")),
        (185, sysent(3, NONE, Generic, "security")),
        (186, sysent(0, PU | NF, Generic, "gettid")),
        (187, sysent(3, TD, Fd, "readahead")),
        (188, sysent(5, TF, PathArgs, "setxattr")),
        (189, sysent(5, TF, PathArgs, "lsetxattr")),
        (190, sysent(5, TD, Fd, "fsetxattr")),
        (191, sysent(4, TF, PathArgs, "getxattr")),
        (192, sysent(4, TF, PathArgs, "lgetxattr")),
        (193, sysent(4, TD, Fd, "fgetxattr")),
        (194, sysent(3, TF, PathArgs, "listxattr")),
        (195, sysent(3, TF, PathArgs, "llistxattr")),
        (196, sysent(3, TD, Fd, "flistxattr")),
        (197, sysent(2, TF, PathArgs, "removexattr")),
        (198, sysent(2, TF, PathArgs, "lremovexattr")),
        (199, sysent(2, TD, Fd, "fremovexattr")),
        (200, sysent(2, TS | TP, Kill, "tkill")),
        (201, sysent(1, TCL, Time, "time")),
        (202, sysent(6, NONE, Generic, "futex")),
        (203, sysent(3, NONE, Generic, "sched_setaffinity")),
        (204, sysent(3, NONE, Generic, "sched_getaffinity")),
        (205, sysent(1, NONE, Generic, "set_thread_area")),
        (206, sysent(2, TM, Generic, "io_setup")),
        (207, sysent(1, TM, Generic, "io_destroy")),
        (208, sysent(5, NONE, Generic, "io_getevents")),
        (209, sysent(3, NONE, Generic, "io_submit")),
        (210, sysent(3, NONE, Generic, "io_cancel")),
        (211, sysent(1, NONE, Generic, "get_thread_area")),
        (212, sysent(3, NONE, Generic, "lookup_dcookie")),
        (213, sysent(1, TD, Generic, "epoll_create")),
        (214, sysent(4, NONE, Generic, "epoll_ctl_old")),
        (215, sysent(4, NONE, Generic, "epoll_wait_old")),
        (216, sysent(5, TM | SI, Generic, "remap_file_pages")),
        (217, sysent(3, TD, Fd, "getdents64")),
        (218, sysent(1, NONE, Generic, "set_tid_address")),
        (219, sysent(0, NONE, Generic, "restart_syscall")),
        (220, sysent(4, TI, Generic, "semtimedop")),
        (221, sysent(4, TD, Fd, "fadvise64")),
        (222, sysent(3, NONE, Generic, "timer_create")),
        (223, sysent(4, NONE, Generic, "timer_settime")),
        (224, sysent(2, NONE, Generic, "timer_gettime")),
        (225, sysent(1, NONE, Generic, "timer_getoverrun")),
        (226, sysent(1, NONE, Generic, "timer_delete")),
        (227, sysent(2, TCL, Generic, "clock_settime")),
        (228, sysent(2, TCL, ClockGettime(Native), "clock_gettime")),
        (229, sysent(2, TCL, Generic, "clock_getres")),
        (230, sysent(4, NONE, Generic, "clock_nanosleep")),
        (231, sysent(1, TP | SE, Exit, "exit_group")),
        (232, sysent(4, TD, Fd, "epoll_wait")),
        (233, sysent(4, TD, Fd, "epoll_ctl")),
        (234, sysent(3, TS | TP, Tgkill, "tgkill")),
        (235, sysent(2, TF, PathArgs, "utimes")),
        (236, sysent(5, NONE, Generic, "vserver")),
        (237, sysent(6, TM, Generic, "mbind")),
        (238, sysent(3, TM, Generic, "set_mempolicy")),
        (239, sysent(5, TM, Generic, "get_mempolicy")),
        (240, sysent(4, TD, Generic, "mq_open")),
        (241, sysent(1, NONE, Generic, "mq_unlink")),
        (242, sysent(5, TD, Generic, "mq_timedsend")),
        (243, sysent(5, TD, Generic, "mq_timedreceive")),
        (244, sysent(2, NONE, Generic, "mq_notify")),
        (245, sysent(3, TD, Generic, "mq_getsetattr")),
        (246, sysent(4, NONE, Generic, "kexec_load")),
        (247, sysent(5, TP, Generic, "waitid")),
        (248, sysent(5, NONE, Generic, "add_key")),
        (249, sysent(4, NONE, Generic, "request_key")),
        (250, sysent(5, NONE, Generic, "keyctl")),
        (251, sysent(3, NONE, Generic, "ioprio_set")),
        (252, sysent(2, NONE, Generic, "ioprio_get")),
        (253, sysent(0, TD, Generic, "inotify_init")),
        (254, sysent(3, TD | TF, Generic, "inotify_add_watch")),
        (255, sysent(2, TD, Fd, "inotify_rm_watch")),
        (256, sysent(4, TM, Generic, "migrate_pages")),
        (257, sysent(4, TD | TF, OpenAt, "openat")),
        (258, sysent(3, TD | TF, Generic, "mkdirat")),
        (259, sysent(4, TD | TF, Generic, "mknodat")),
        (260, sysent(5, TD | TF, Generic, "fchownat")),
        (261, sysent(3, TD | TF, Generic, "futimesat")),
        (262, sysent(4, TD | TF | TFST | TSTA, Generic, "newfstatat")),
        (263, sysent(3, TD | TF, Unlinkat, "unlinkat")),
        (264, sysent(4, TD | TF, Generic, "renameat")),
        (265, sysent(5, TD | TF, Generic, "linkat")),
        (266, sysent(3, TD | TF, Generic, "symlinkat")),
        (267, sysent(4, TD | TF, Generic, "readlinkat")),
        (268, sysent(3, TD | TF, Generic, "fchmodat")),
        (269, sysent(3, TD | TF, Generic, "faccessat")),
        (270, sysent(6, TD, Generic, "pselect6")),
        (271, sysent(5, TD, Generic, "ppoll")),
        (272, sysent(1, NONE, Generic, "unshare")),
        (273, sysent(2, NONE, Generic, "set_robust_list")),
        (274, sysent(3, NONE, Generic, "get_robust_list")),
        (275, sysent(6, TD, Splice, "splice")),
        (276, sysent(4, TD, Generic, "tee")),
        (277, sysent(4, TD, Fd, "sync_file_range")),
        (278, sysent(4, TD, Generic, "vmsplice")),
        (279, sysent(6, TM, Generic, "move_pages")),
        (280, sysent(4, TD | TF, Generic, "utimensat")),
        (281, sysent(6, TD, Fd, "epoll_pwait")),
        (282, sysent(3, TD | TS, Generic, "signalfd")),
        (283, sysent(2, TD, Generic, "timerfd_create")),
        (284, sysent(1, TD, Generic, "eventfd")),
        (285, sysent(4, TD, Fd, "fallocate")),
        (286, sysent(4, TD, Fd, "timerfd_settime")),
        (287, sysent(2, TD, Fd, "timerfd_gettime")),
        (288, sysent(4, TN, Accept4, "accept4")),
        (289, sysent(4, TD | TS, Generic, "signalfd4")),
        (290, sysent(2, TD, Generic, "eventfd2")),
        (291, sysent(1, TD, Generic, "epoll_create1")),
        (292, sysent(3, TD, Dup3, "dup3")),
        (293, sysent(2, TD, Pipe2, "pipe2")),
        (294, sysent(1, TD, Generic, "inotify_init1")),
        (295, sysent(4, TD, Fd, "preadv")),
        (296, sysent(4, TD, Fd, "pwritev")),
        (297, sysent(4, TP | TS, Generic, "rt_tgsigqueueinfo")),
        (298, sysent(5, TD, Generic, "perf_event_open")),
        (299, sysent(5, TN, Generic, "recvmmsg")),
        (300, sysent(2, TD, Generic, "fanotify_init")),
        (301, sysent(5, TD | TF, Generic, "fanotify_mark")),
        (302, sysent(4, NONE, Generic, "prlimit64")),
        (303, sysent(5, TD | TF, Generic, "name_to_handle_at")),
        (304, sysent(3, TD, Generic, "open_by_handle_at")),
        (305, sysent(2, TCL, Generic, "clock_adjtime")),
        (306, sysent(1, TD, Fd, "syncfs")),
        (307, sysent(4, TN, Generic, "sendmmsg")),
        (308, sysent(2, TD, Fd, "setns")),
        (309, sysent(3, NONE, Generic, "getcpu")),
        (310, sysent(6, NONE, Generic, "process_vm_readv")),
        (311, sysent(6, NONE, Generic, "process_vm_writev")),
        (312, sysent(5, NONE, Generic, "kcmp")),
        (313, sysent(3, TD, Fd, "finit_module")),
        (314, sysent(3, NONE, Generic, "sched_setattr")),
        (315, sysent(4, NONE, Generic, "sched_getattr")),
        (316, sysent(5, TD | TF, Generic, "renameat2")),
        (317, sysent(3, NONE, Generic, "seccomp")),
        (318, sysent(3, NONE, Generic, "getrandom")),
        (319, sysent(2, TD, MemfdCreate, "memfd_create")),
        (320, sysent(5, TD, Generic, "kexec_file_load")),
        (321, sysent(3, TD, Generic, "bpf")),
        (322, sysent(5, CC | TD | TF | TP | TSD | SE | SI | EX, Execveat, "execveat")),
        (323, sysent(1, TD, Generic, "userfaultfd")),
        (324, sysent(3, NONE, Generic, "membarrier")),
        (325, sysent(3, TM, Generic, "mlock2")),
        (326, sysent(6, TD, Generic, "copy_file_range")),
        (327, sysent(6, TD, Fd, "preadv2")),
        (328, sysent(6, TD, Fd, "pwritev2")),
        (329, sysent(4, TM | SI, Generic, "pkey_mprotect")),
        (330, sysent(2, NONE, Generic, "pkey_alloc")),
        (331, sysent(1, NONE, Generic, "pkey_free")),
        (332, sysent(5, TD | TF | TFST | TSTA, Generic, "statx")),
        (333, sysent(6, NONE, Generic, "io_pgetevents")),
        (334, sysent(4, NONE, Generic, "rseq")),        // 335..=423 are reserved to keep in sync with other architectures.
        (453, sysent(3, TM, Generic, "map_shadow_stack")),
    ];
    entries.extend(super::common::syscall_entries());
    entries
}
