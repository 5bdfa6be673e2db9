//! Kernel constants that libc does not export.

/// Largest errno value the kernel encodes in a syscall return.
pub const MAX_ERRNO: u64 = 4095;

/// Kernel-internal restart codes. They are visible to a tracer at syscall
/// exit when a signal interrupts a call, never to the tracee.
pub const ERESTARTSYS: i32 = 512;
pub const ERESTARTNOINTR: i32 = 513;
pub const ERESTARTNOHAND: i32 = 514;
pub const ENOIOCTLCMD: i32 = 515;
pub const ERESTART_RESTARTBLOCK: i32 = 516;

pub const MFD_HUGE_SHIFT: u32 = 26;
pub const MFD_HUGE_MASK: u64 = 0x3f;
/// 255 minus the length of the "memfd:" prefix.
pub const MFD_NAME_MAX_LEN: usize = 249;

pub const AT_FDCWD: i32 = -100;

/// Low byte of the clone(2) flags holds the exit signal.
pub const CSIGNAL: u64 = 0xff;
