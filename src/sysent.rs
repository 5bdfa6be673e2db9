//! One row of a personality's syscall table and the classification flags
//! attached to it.

use std::fmt::{Display, Formatter, Result};

bitflags! {
    /// Cross-cutting properties of a syscall. Purely declarative: they are set
    /// when a table is built and consumed by filtering, descriptor tracking
    /// and memory-map bookkeeping.
    pub struct SyscallFlags: u32 {
        /// Takes or returns a file descriptor.
        const TRACE_DESC = 1 << 0;
        /// Takes a file path.
        const TRACE_FILE = 1 << 1;
        const TRACE_IPC = 1 << 2;
        const TRACE_NETWORK = 1 << 3;
        /// Affects process lifecycle.
        const TRACE_PROCESS = 1 << 4;
        const TRACE_SIGNAL = 1 << 5;
        const TRACE_MEMORY = 1 << 6;
        const TRACE_STAT = 1 << 7;
        const TRACE_LSTAT = 1 << 8;
        const TRACE_FSTAT = 1 << 9;
        /// Produces a stat structure.
        const TRACE_STAT_LIKE = 1 << 10;
        const TRACE_STATFS = 1 << 11;
        const TRACE_FSTATFS = 1 << 12;
        const TRACE_STATFS_LIKE = 1 << 13;
        /// No side effects.
        const TRACE_PURE = 1 << 14;
        const TRACE_CREDS = 1 << 15;
        const TRACE_CLOCK = 1 << 16;
        /// May change the process comm (execve, prctl).
        const COMM_CHANGE = 1 << 17;
        const TRACE_SECCOMP_DEFAULT = 1 << 18;
        /// Always succeeds.
        const SYSCALL_NEVER_FAILS = 1 << 19;
        /// Changes the memory map: a cached view of the tracee's mappings is
        /// stale after a successful exit.
        const MEMORY_MAPPING_CHANGE = 1 << 20;
        /// May not return to the caller, so state must be captured on entry.
        const CAPTURE_ON_ENTER = 1 << 21;
        /// Uses the compat (32-bit) structure layouts.
        const COMPAT_SYSCALL_TYPES = 1 << 22;
        /// Entry of a narrow personality that uses the wide/native calling
        /// convention (the `#64` entries of x32).
        const WIDE_ABI_VARIANT = 1 << 23;
        /// Replaces the process image. The exit stop only exists if it fails.
        const EXEC_LIKE = 1 << 24;
    }
}

/// Table shorthands, named as in the kernel tracing tools.
pub mod shorthand {
    use super::SyscallFlags;

    pub const NONE: SyscallFlags = SyscallFlags { bits: 0 };
    pub const TD: SyscallFlags = SyscallFlags::TRACE_DESC;
    pub const TF: SyscallFlags = SyscallFlags::TRACE_FILE;
    pub const TI: SyscallFlags = SyscallFlags::TRACE_IPC;
    pub const TN: SyscallFlags = SyscallFlags::TRACE_NETWORK;
    pub const TP: SyscallFlags = SyscallFlags::TRACE_PROCESS;
    pub const TS: SyscallFlags = SyscallFlags::TRACE_SIGNAL;
    pub const TM: SyscallFlags = SyscallFlags::TRACE_MEMORY;
    pub const TST: SyscallFlags = SyscallFlags::TRACE_STAT;
    pub const TLST: SyscallFlags = SyscallFlags::TRACE_LSTAT;
    pub const TFST: SyscallFlags = SyscallFlags::TRACE_FSTAT;
    pub const TSTA: SyscallFlags = SyscallFlags::TRACE_STAT_LIKE;
    pub const TSF: SyscallFlags = SyscallFlags::TRACE_STATFS;
    pub const TFSF: SyscallFlags = SyscallFlags::TRACE_FSTATFS;
    pub const TSFA: SyscallFlags = SyscallFlags::TRACE_STATFS_LIKE;
    pub const PU: SyscallFlags = SyscallFlags::TRACE_PURE;
    pub const TC: SyscallFlags = SyscallFlags::TRACE_CREDS;
    pub const TCL: SyscallFlags = SyscallFlags::TRACE_CLOCK;
    pub const CC: SyscallFlags = SyscallFlags::COMM_CHANGE;
    pub const TSD: SyscallFlags = SyscallFlags::TRACE_SECCOMP_DEFAULT;
    pub const NF: SyscallFlags = SyscallFlags::SYSCALL_NEVER_FAILS;
    pub const SI: SyscallFlags = SyscallFlags::MEMORY_MAPPING_CHANGE;
    pub const SE: SyscallFlags = SyscallFlags::CAPTURE_ON_ENTER;
    pub const CST: SyscallFlags = SyscallFlags::COMPAT_SYSCALL_TYPES;
    pub const W64: SyscallFlags = SyscallFlags::WIDE_ABI_VARIANT;
    pub const EX: SyscallFlags = SyscallFlags::EXEC_LIKE;
}

const FLAG_NAMES: [(SyscallFlags, &str); 25] = [
    (SyscallFlags::TRACE_DESC, "TD"),
    (SyscallFlags::TRACE_FILE, "TF"),
    (SyscallFlags::TRACE_IPC, "TI"),
    (SyscallFlags::TRACE_NETWORK, "TN"),
    (SyscallFlags::TRACE_PROCESS, "TP"),
    (SyscallFlags::TRACE_SIGNAL, "TS"),
    (SyscallFlags::TRACE_MEMORY, "TM"),
    (SyscallFlags::TRACE_STAT, "TST"),
    (SyscallFlags::TRACE_LSTAT, "TLST"),
    (SyscallFlags::TRACE_FSTAT, "TFST"),
    (SyscallFlags::TRACE_STAT_LIKE, "TSTA"),
    (SyscallFlags::TRACE_STATFS, "TSF"),
    (SyscallFlags::TRACE_FSTATFS, "TFSF"),
    (SyscallFlags::TRACE_STATFS_LIKE, "TSFA"),
    (SyscallFlags::TRACE_PURE, "PU"),
    (SyscallFlags::TRACE_CREDS, "TC"),
    (SyscallFlags::TRACE_CLOCK, "TCL"),
    (SyscallFlags::COMM_CHANGE, "CC"),
    (SyscallFlags::TRACE_SECCOMP_DEFAULT, "TSD"),
    (SyscallFlags::SYSCALL_NEVER_FAILS, "NF"),
    (SyscallFlags::MEMORY_MAPPING_CHANGE, "SI"),
    (SyscallFlags::CAPTURE_ON_ENTER, "SE"),
    (SyscallFlags::COMPAT_SYSCALL_TYPES, "CST"),
    (SyscallFlags::WIDE_ABI_VARIANT, "W64"),
    (SyscallFlags::EXEC_LIKE, "EX"),
];

impl Display for SyscallFlags {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if self.is_empty() {
            return write!(f, "0");
        }
        let mut first = true;
        for (flag, name) in FLAG_NAMES.iter() {
            if self.contains(*flag) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        Ok(())
    }
}

// All architectures have an mmap syscall, but it has architecture-specific
// calling semantics.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MmapCallingSemantics {
    /// i386 old_mmap: a single pointer to a block of six words.
    StructArguments,
    /// Arguments passed in registers, the offset is in bytes.
    RegisterArguments,
    /// mmap2: arguments in registers, the offset is in pages.
    RegisterArgumentsPageOffset,
}

/// Layout of the `struct timespec` a clock syscall writes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TimespecLayout {
    /// `time_t` of the personality's native width.
    Native,
    /// 64-bit `time_t` regardless of personality (the `*_time64` calls).
    Time64,
}

/// Which decoder renders a syscall. A closed set: the table references a
/// decoder by tag and `decoders::decode_entry`/`decode_exit` dispatch on it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DecoderKind {
    /// Raw argument words only.
    Generic,
    /// First argument is a descriptor, the rest are raw words.
    Fd,
    /// First argument is a path, the rest are raw words.
    PathArgs,
    /// Path followed by an octal mode.
    PathMode,
    /// Two paths, then raw words.
    PathPath,
    Read,
    Write,
    Open,
    Creat,
    OpenAt,
    Close,
    CloseRange,
    Dup,
    Dup2,
    Dup3,
    Fcntl,
    Lseek,
    Flock,
    Truncate,
    Ftruncate,
    Splice,
    MemfdCreate,
    Unlinkat,
    Access,
    Stat,
    Fstat,
    Pipe,
    Pipe2,
    Socket,
    Accept,
    Accept4,
    Mmap(MmapCallingSemantics),
    Munmap,
    Mprotect,
    Brk,
    Execve,
    Execveat,
    Exit,
    Kill,
    Tgkill,
    CloneTask,
    Fork,
    Time,
    ClockGettime(TimespecLayout),
    Umask,
}

/// Static metadata for one syscall of one personality. Immutable once the
/// table is built and shared by every tracee using that personality.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SyscallDescriptor {
    pub nargs: u8,
    pub flags: SyscallFlags,
    pub decoder: DecoderKind,
    pub name: &'static str,
}

pub const MAX_ARGS: usize = 6;

impl SyscallDescriptor {
    pub fn has_flag(&self, flag: SyscallFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn nargs(&self) -> usize {
        (self.nargs as usize).min(MAX_ARGS)
    }

    pub fn is_exec_like(&self) -> bool {
        self.has_flag(SyscallFlags::EXEC_LIKE)
    }

    /// Name without the `#64` wide-variant marker.
    pub fn base_name(&self) -> &'static str {
        match self.name.find('#') {
            Some(pos) => &self.name[..pos],
            None => self.name,
        }
    }
}

/// Table row constructor.
pub fn sysent(
    nargs: u8,
    flags: SyscallFlags,
    decoder: DecoderKind,
    name: &'static str,
) -> SyscallDescriptor {
    debug_assert!(nargs as usize <= MAX_ARGS);
    SyscallDescriptor {
        nargs,
        flags,
        decoder,
        name,
    }
}

/// Free-standing form of the flag query used by the consumers.
pub fn has_flag(descriptor: &SyscallDescriptor, flag: SyscallFlags) -> bool {
    descriptor.has_flag(flag)
}

#[cfg(test)]
mod tests {
    use super::shorthand::*;
    use super::*;

    #[test]
    fn flag_queries() {
        let d = sysent(4, TD | TF, DecoderKind::OpenAt, "openat");
        assert!(has_flag(&d, SyscallFlags::TRACE_DESC));
        assert!(d.has_flag(SyscallFlags::TRACE_FILE));
        assert!(!d.has_flag(SyscallFlags::TRACE_MEMORY));
        assert!(!d.is_exec_like());
        assert!(NONE.is_empty());
    }

    #[test]
    fn flags_display() {
        assert_eq!("TD|TF", format!("{}", TD | TF));
        assert_eq!("0", format!("{}", NONE));
        assert_eq!("TP|SE", format!("{}", SE | TP));
    }

    #[test]
    fn wide_variant_base_name() {
        let d = sysent(3, TD | W64, DecoderKind::Generic, "ioctl#64");
        assert_eq!("ioctl", d.base_name());
        assert_eq!("ioctl#64", d.name);
    }
}
