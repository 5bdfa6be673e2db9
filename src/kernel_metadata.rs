use crate::kernel_supplement::{
    ENOIOCTLCMD, ERESTARTNOHAND, ERESTARTNOINTR, ERESTARTSYS, ERESTART_RESTARTBLOCK,
};
use nix::errno::Errno;

pub fn signal_name(sig: i32) -> String {
    /* strsignal() would be nice to use here, but it provides TMI. */
    if 32 <= sig && sig <= 64 {
        return format!("SIGRT_{}", sig - 32);
    }

    match sig {
        libc::SIGHUP => "SIGHUP".into(),
        libc::SIGINT => "SIGINT".into(),
        libc::SIGQUIT => "SIGQUIT".into(),
        libc::SIGILL => "SIGILL".into(),
        libc::SIGTRAP => "SIGTRAP".into(),
        libc::SIGABRT => "SIGABRT".into(),
        libc::SIGBUS => "SIGBUS".into(),
        libc::SIGFPE => "SIGFPE".into(),
        libc::SIGKILL => "SIGKILL".into(),
        libc::SIGUSR1 => "SIGUSR1".into(),
        libc::SIGSEGV => "SIGSEGV".into(),
        libc::SIGUSR2 => "SIGUSR2".into(),
        libc::SIGPIPE => "SIGPIPE".into(),
        libc::SIGALRM => "SIGALRM".into(),
        libc::SIGTERM => "SIGTERM".into(),
        libc::SIGSTKFLT => "SIGSTKFLT".into(),
        libc::SIGCHLD => "SIGCHLD".into(),
        libc::SIGCONT => "SIGCONT".into(),
        libc::SIGSTOP => "SIGSTOP".into(),
        libc::SIGTSTP => "SIGTSTP".into(),
        libc::SIGTTIN => "SIGTTIN".into(),
        libc::SIGTTOU => "SIGTTOU".into(),
        libc::SIGURG => "SIGURG".into(),
        libc::SIGXCPU => "SIGXCPU".into(),
        libc::SIGXFSZ => "SIGXFSZ".into(),
        libc::SIGVTALRM => "SIGVTALRM".into(),
        libc::SIGPROF => "SIGPROF".into(),
        libc::SIGWINCH => "SIGWINCH".into(),
        libc::SIGIO => "SIGIO".into(),
        libc::SIGPWR => "SIGPWR".into(),
        libc::SIGSYS => "SIGSYS".into(),
        0 => "0".into(),
        _ => format!("{}", sig),
    }
}

pub fn errno_name(err: i32) -> String {
    match err {
        0 => "SUCCESS".into(),
        ERESTARTSYS => "ERESTARTSYS".into(),
        ERESTARTNOINTR => "ERESTARTNOINTR".into(),
        ERESTARTNOHAND => "ERESTARTNOHAND".into(),
        ENOIOCTLCMD => "ENOIOCTLCMD".into(),
        ERESTART_RESTARTBLOCK => "ERESTART_RESTARTBLOCK".into(),
        libc::EPERM => "EPERM".into(),
        libc::ENOENT => "ENOENT".into(),
        libc::ESRCH => "ESRCH".into(),
        libc::EINTR => "EINTR".into(),
        libc::EIO => "EIO".into(),
        libc::ENXIO => "ENXIO".into(),
        libc::E2BIG => "E2BIG".into(),
        libc::ENOEXEC => "ENOEXEC".into(),
        libc::EBADF => "EBADF".into(),
        libc::ECHILD => "ECHILD".into(),
        libc::EAGAIN => "EAGAIN".into(),
        libc::ENOMEM => "ENOMEM".into(),
        libc::EACCES => "EACCES".into(),
        libc::EFAULT => "EFAULT".into(),
        libc::ENOTBLK => "ENOTBLK".into(),
        libc::EBUSY => "EBUSY".into(),
        libc::EEXIST => "EEXIST".into(),
        libc::EXDEV => "EXDEV".into(),
        libc::ENODEV => "ENODEV".into(),
        libc::ENOTDIR => "ENOTDIR".into(),
        libc::EISDIR => "EISDIR".into(),
        libc::EINVAL => "EINVAL".into(),
        libc::ENFILE => "ENFILE".into(),
        libc::EMFILE => "EMFILE".into(),
        libc::ENOTTY => "ENOTTY".into(),
        libc::ETXTBSY => "ETXTBSY".into(),
        libc::EFBIG => "EFBIG".into(),
        libc::ENOSPC => "ENOSPC".into(),
        libc::ESPIPE => "ESPIPE".into(),
        libc::EROFS => "EROFS".into(),
        libc::EMLINK => "EMLINK".into(),
        libc::EPIPE => "EPIPE".into(),
        libc::EDOM => "EDOM".into(),
        libc::ERANGE => "ERANGE".into(),
        libc::EDEADLK => "EDEADLK".into(),
        libc::ENAMETOOLONG => "ENAMETOOLONG".into(),
        libc::ENOLCK => "ENOLCK".into(),
        libc::ENOSYS => "ENOSYS".into(),
        libc::ENOTEMPTY => "ENOTEMPTY".into(),
        libc::ELOOP => "ELOOP".into(),
        libc::ENOMSG => "ENOMSG".into(),
        libc::EIDRM => "EIDRM".into(),
        libc::ENOSTR => "ENOSTR".into(),
        libc::ENODATA => "ENODATA".into(),
        libc::ETIME => "ETIME".into(),
        libc::EPROTO => "EPROTO".into(),
        libc::EBADMSG => "EBADMSG".into(),
        libc::EOVERFLOW => "EOVERFLOW".into(),
        libc::EBADFD => "EBADFD".into(),
        libc::EILSEQ => "EILSEQ".into(),
        libc::ENOTSOCK => "ENOTSOCK".into(),
        libc::EDESTADDRREQ => "EDESTADDRREQ".into(),
        libc::EMSGSIZE => "EMSGSIZE".into(),
        libc::EPROTOTYPE => "EPROTOTYPE".into(),
        libc::ENOPROTOOPT => "ENOPROTOOPT".into(),
        libc::EPROTONOSUPPORT => "EPROTONOSUPPORT".into(),
        libc::EOPNOTSUPP => "EOPNOTSUPP".into(),
        libc::EAFNOSUPPORT => "EAFNOSUPPORT".into(),
        libc::EADDRINUSE => "EADDRINUSE".into(),
        libc::EADDRNOTAVAIL => "EADDRNOTAVAIL".into(),
        libc::ENETDOWN => "ENETDOWN".into(),
        libc::ENETUNREACH => "ENETUNREACH".into(),
        libc::ECONNABORTED => "ECONNABORTED".into(),
        libc::ECONNRESET => "ECONNRESET".into(),
        libc::ENOBUFS => "ENOBUFS".into(),
        libc::EISCONN => "EISCONN".into(),
        libc::ENOTCONN => "ENOTCONN".into(),
        libc::ETIMEDOUT => "ETIMEDOUT".into(),
        libc::ECONNREFUSED => "ECONNREFUSED".into(),
        libc::EHOSTUNREACH => "EHOSTUNREACH".into(),
        libc::EALREADY => "EALREADY".into(),
        libc::EINPROGRESS => "EINPROGRESS".into(),
        libc::ESTALE => "ESTALE".into(),
        libc::EDQUOT => "EDQUOT".into(),
        libc::ECANCELED => "ECANCELED".into(),
        libc::EOWNERDEAD => "EOWNERDEAD".into(),
        libc::ENOTRECOVERABLE => "ENOTRECOVERABLE".into(),
        _ => format!("errno{}", err),
    }
}

/// Human readable description of an errno, as shown in the trailing comment of
/// a failed call.
pub fn errno_description(err: i32) -> String {
    match err {
        ERESTARTSYS => "To be restarted if SA_RESTART is set".into(),
        ERESTARTNOINTR => "To be restarted".into(),
        ERESTARTNOHAND => "To be restarted if no handler".into(),
        ENOIOCTLCMD => "Unknown ioctl command".into(),
        ERESTART_RESTARTBLOCK => "Interrupted by signal".into(),
        _ => Errno::from_i32(err).desc().into(),
    }
}

/// True for the kernel-internal restart codes which are printed as `?`.
pub fn is_restart_errno(err: i32) -> bool {
    match err {
        ERESTARTSYS | ERESTARTNOINTR | ERESTARTNOHAND | ERESTART_RESTARTBLOCK => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errno_names() {
        assert_eq!("ENOENT", errno_name(libc::ENOENT));
        assert_eq!("ERESTARTSYS", errno_name(512));
        assert_eq!("errno4000", errno_name(4000));
        assert_eq!("No such file or directory", errno_description(libc::ENOENT));
        assert_eq!("Interrupted by signal", errno_description(516));
    }

    #[test]
    fn signal_names() {
        assert_eq!("SIGKILL", signal_name(9));
        assert_eq!("SIGRT_2", signal_name(34));
        assert_eq!("99", signal_name(99));
    }
}
