//! x32: the 64-bit register file with 32-bit pointers. Syscall numbers carry
//! `X32_SYSCALL_BIT`, which is stripped before lookup.
//!
//! Below 512 the numbering follows x86-64. Calls whose argument structures
//! differ between the two ABIs have an x32-specific entry at 512 and above;
//! their low-range slot is still callable but uses the 64-bit layouts, so it
//! is kept under a `#64` name with `WIDE_ABI_VARIANT` set and printed raw.

use crate::sysent::{shorthand::*, sysent, DecoderKind::*, SyscallDescriptor};

/// Low-range entries that keep the 64-bit calling convention on x32.
fn wide_variants() -> Vec<(u32, SyscallDescriptor)> {
    vec![
        (13, sysent(4, TS | W64, Generic, "rt_sigaction#64")),
        (15, sysent(0, TS | W64, Generic, "rt_sigreturn#64")),
        (16, sysent(3, TD | W64, Generic, "ioctl#64")),
        (19, sysent(3, TD | W64, Generic, "readv#64")),
        (20, sysent(3, TD | W64, Generic, "writev#64")),
        (45, sysent(6, TN | W64, Generic, "recvfrom#64")),
        (46, sysent(3, TN | W64, Generic, "sendmsg#64")),
        (47, sysent(3, TN | W64, Generic, "recvmsg#64")),
        (54, sysent(5, TN | W64, Generic, "setsockopt#64")),
        (55, sysent(5, TN | W64, Generic, "getsockopt#64")),
        (59, sysent(3, CC | TF | TP | TSD | SE | SI | EX | W64, Generic, "execve#64")),
        (101, sysent(4, W64, Generic, "ptrace#64")),
        (127, sysent(2, TS | W64, Generic, "rt_sigpending#64")),
        (128, sysent(4, TS | W64, Generic, "rt_sigtimedwait#64")),
        (129, sysent(3, TS | TP | W64, Generic, "rt_sigqueueinfo#64")),
        (131, sysent(2, TS | W64, Generic, "sigaltstack#64")),
        (134, sysent(1, TF | W64, Generic, "uselib#64")),
        (156, sysent(1, W64, Generic, "_sysctl#64")),
        (174, sysent(2, W64, Generic, "create_module#64")),
        (177, sysent(1, W64, Generic, "get_kernel_syms#64")),
        (178, sysent(5, W64, Generic, "query_module#64")),
        (180, sysent(3, W64, Generic, "nfsservctl#64")),
        (205, sysent(1, W64, Generic, "set_thread_area#64")),
        (206, sysent(2, TM | W64, Generic, "io_setup#64")),
        (209, sysent(3, W64, Generic, "io_submit#64")),
        (211, sysent(1, W64, Generic, "get_thread_area#64")),
        (214, sysent(4, W64, Generic, "epoll_ctl_old#64")),
        (215, sysent(4, W64, Generic, "epoll_wait_old#64")),
        (222, sysent(3, W64, Generic, "timer_create#64")),
        (236, sysent(5, W64, Generic, "vserver#64")),
        (244, sysent(2, W64, Generic, "mq_notify#64")),
        (246, sysent(4, W64, Generic, "kexec_load#64")),
        (247, sysent(5, TP | W64, Generic, "waitid#64")),
        (273, sysent(2, W64, Generic, "set_robust_list#64")),
        (274, sysent(3, W64, Generic, "get_robust_list#64")),
        (278, sysent(4, TD | W64, Generic, "vmsplice#64")),
        (279, sysent(6, TM | W64, Generic, "move_pages#64")),
        (295, sysent(4, TD | W64, Generic, "preadv#64")),
        (296, sysent(4, TD | W64, Generic, "pwritev#64")),
        (297, sysent(4, TP | TS | W64, Generic, "rt_tgsigqueueinfo#64")),
        (299, sysent(5, TN | W64, Generic, "recvmmsg#64")),
        (307, sysent(4, TN | W64, Generic, "sendmmsg#64")),
        (310, sysent(6, W64, Generic, "process_vm_readv#64")),
        (311, sysent(6, W64, Generic, "process_vm_writev#64")),
        (322, sysent(5, CC | TD | TF | TP | TSD | SE | SI | EX | W64, Generic, "execveat#64")),
        (327, sysent(6, TD | W64, Generic, "preadv2#64")),
        (328, sysent(6, TD | W64, Generic, "pwritev2#64")),
    ]
}

fn x32_specific() -> Vec<(u32, SyscallDescriptor)> {
    vec![
        (512, sysent(4, CST | TS, Generic, "rt_sigaction")),
        (513, sysent(0, CST | TS, Generic, "rt_sigreturn")),
        (514, sysent(3, CST | TD, Fd, "ioctl")),
        (515, sysent(3, CST | TD, Fd, "readv")),
        (516, sysent(3, CST | TD, Fd, "writev")),
        (517, sysent(6, CST | TN, Generic, "recvfrom")),
        (518, sysent(3, CST | TN, Generic, "sendmsg")),
        (519, sysent(3, CST | TN, Generic, "recvmsg")),
        (520, sysent(3, CST | CC | TF | TP | TSD | SE | SI | EX, Execve, "execve")),
        (521, sysent(4, CST, Generic, "ptrace")),
        (522, sysent(2, CST | TS, Generic, "rt_sigpending")),
        (523, sysent(4, CST | TS, Generic, "rt_sigtimedwait")),
        (524, sysent(3, CST | TS | TP, Generic, "rt_sigqueueinfo")),
        (525, sysent(2, CST | TS, Generic, "sigaltstack")),
        (526, sysent(3, CST, Generic, "timer_create")),
        (527, sysent(2, CST | TD, Fd, "mq_notify")),
        (528, sysent(4, CST, Generic, "kexec_load")),
        (529, sysent(5, CST | TP, Generic, "waitid")),
        (530, sysent(2, CST, Generic, "set_robust_list")),
        (531, sysent(3, CST, Generic, "get_robust_list")),
        (532, sysent(4, CST | TD, Fd, "vmsplice")),
        (533, sysent(6, CST | TM, Generic, "move_pages")),
        (534, sysent(4, TD, Fd, "preadv")),
        (535, sysent(4, TD, Fd, "pwritev")),
        (536, sysent(4, CST | TP | TS, Generic, "rt_tgsigqueueinfo")),
        (537, sysent(5, CST | TN, Generic, "recvmmsg")),
        (538, sysent(4, CST | TN, Generic, "sendmmsg")),
        (539, sysent(6, CST, Generic, "process_vm_readv")),
        (540, sysent(6, CST, Generic, "process_vm_writev")),
        (541, sysent(5, CST | TN, Generic, "setsockopt")),
        (542, sysent(5, CST | TN, Generic, "getsockopt")),
        (543, sysent(2, CST | TM, Generic, "io_setup")),
        (544, sysent(3, CST, Generic, "io_submit")),
        (545, sysent(5, CST | CC | TD | TF | TP | TSD | SE | SI | EX, Execveat, "execveat")),
        (546, sysent(5, TD, Fd, "preadv2")),
        (547, sysent(5, TD, Fd, "pwritev2")),
    ]
}

pub fn syscall_entries() -> Vec<(u32, SyscallDescriptor)> {
    let wide = wide_variants();
    let mut entries: Vec<(u32, SyscallDescriptor)> = super::x64::syscall_entries()
        .into_iter()
        .filter(|(no, _)| !wide.iter().any(|(w, _)| w == no))
        .collect();
    entries.extend(wide);
    entries.extend(x32_specific());
    entries
}
