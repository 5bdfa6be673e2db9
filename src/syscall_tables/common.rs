//! Syscalls numbered identically on every x86 personality (424 onwards).

use crate::sysent::{shorthand::*, sysent, DecoderKind::*, SyscallDescriptor};

pub fn syscall_entries() -> Vec<(u32, SyscallDescriptor)> {
    vec![
        (424, sysent(4, TD | TS | TP, Generic, "pidfd_send_signal")),
        (425, sysent(2, TD | TM, Generic, "io_uring_setup")),
        (426, sysent(6, TD | TS, Fd, "io_uring_enter")),
        (427, sysent(4, TD | TM, Fd, "io_uring_register")),
        (428, sysent(3, TD | TF, Generic, "open_tree")),
        (429, sysent(5, TD | TF, Generic, "move_mount")),
        (430, sysent(2, TD, Generic, "fsopen")),
        (431, sysent(5, TD | TF, Fd, "fsconfig")),
        (432, sysent(3, TD, Fd, "fsmount")),
        (433, sysent(3, TD | TF, Generic, "fspick")),
        (434, sysent(2, TD, Generic, "pidfd_open")),
        (435, sysent(2, TP, Generic, "clone3")),
        (436, sysent(3, TD, CloseRange, "close_range")),
        (437, sysent(4, TD | TF, Generic, "openat2")),
        (438, sysent(3, TD, Fd, "pidfd_getfd")),
        (439, sysent(4, TD | TF, Generic, "faccessat2")),
        (440, sysent(5, TD, Fd, "process_madvise")),
        (441, sysent(6, TD, Fd, "epoll_pwait2")),
        (442, sysent(5, TD | TF, Generic, "mount_setattr")),
        (443, sysent(4, TD, Fd, "quotactl_fd")),
        (444, sysent(3, TD, Generic, "landlock_create_ruleset")),
        (445, sysent(4, TD, Fd, "landlock_add_rule")),
        (446, sysent(2, TD, Fd, "landlock_restrict_self")),
        (447, sysent(1, TD, Generic, "memfd_secret")),
        (448, sysent(2, TD, Fd, "process_mrelease")),
        (449, sysent(5, NONE, Generic, "futex_waitv")),
        (450, sysent(4, TM, Generic, "set_mempolicy_home_node")),
        (451, sysent(4, TD, Fd, "cachestat")),
        (452, sysent(4, TD | TF, Generic, "fchmodat2")),
    ]
}
