use crate::dispatch::DecodeError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result};

/// The ABI personality a tracee is executing under. A single tracee can only
/// change personality across a successful exec.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Personality {
    /// Native x86-64.
    X64,
    /// i386 compat mode.
    X86,
    /// x32: 32-bit pointers with the 64-bit register file.
    X32,
}

impl Default for Personality {
    fn default() -> Self {
        NATIVE_PERSONALITY
    }
}

#[cfg(not(target_arch = "x86"))]
pub const NATIVE_PERSONALITY: Personality = Personality::X64;

#[cfg(target_arch = "x86")]
pub const NATIVE_PERSONALITY: Personality = Personality::X86;

/// All personalities the registry carries a table for, in personality number order.
pub const SUPPORTED_PERSONALITIES: [Personality; 3] =
    [Personality::X64, Personality::X86, Personality::X32];

/// x32 syscalls are issued through the 64-bit entry point with this bit set in
/// the syscall number.
pub const X32_SYSCALL_BIT: u64 = 0x4000_0000;

/// The clone(2) syscall puts the tls and child_tid arguments in a different
/// order depending on the ABI.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CloneParameterOrdering {
    FlagsStackParentTLSChild,
    FlagsStackParentChildTLS,
}

impl Personality {
    /// Personality numbers as reported by a controller: 0 is the native
    /// personality, then compat, then x32. Anything else is not built in.
    pub fn from_raw(raw: u32) -> std::result::Result<Personality, DecodeError> {
        match raw {
            0 => Ok(Personality::X64),
            1 => Ok(Personality::X86),
            2 => Ok(Personality::X32),
            _ => Err(DecodeError::UnknownPersonality(raw)),
        }
    }

    pub fn as_raw(self) -> u32 {
        match self {
            Personality::X64 => 0,
            Personality::X86 => 1,
            Personality::X32 => 2,
        }
    }

    /// Width of a kernel_ulong_t / syscall argument register.
    pub fn word_size(self) -> usize {
        match self {
            Personality::X64 | Personality::X32 => 8,
            Personality::X86 => 4,
        }
    }

    /// Width of a userspace pointer (and `long`).
    pub fn pointer_size(self) -> usize {
        match self {
            Personality::X64 => 8,
            Personality::X86 | Personality::X32 => 4,
        }
    }

    /// Size of the `time_t` members of `struct timespec`.
    pub fn time_t_size(self) -> usize {
        match self {
            Personality::X86 => 4,
            Personality::X64 | Personality::X32 => 8,
        }
    }

    pub fn clone_parameter_ordering(self) -> CloneParameterOrdering {
        match self {
            Personality::X86 => CloneParameterOrdering::FlagsStackParentTLSChild,
            Personality::X64 | Personality::X32 => CloneParameterOrdering::FlagsStackParentChildTLS,
        }
    }

    /// Truncate a raw register value to this personality's word width.
    pub fn truncate_word(self, val: u64) -> u64 {
        match self.word_size() {
            4 => val & 0xffff_ffff,
            _ => val,
        }
    }

    /// Sign-extend a word of this personality's width to 64 bits.
    pub fn signed_word(self, val: u64) -> i64 {
        match self.word_size() {
            4 => val as u32 as i32 as i64,
            _ => val as i64,
        }
    }

    /// Truncate a raw value to this personality's pointer width.
    pub fn truncate_pointer(self, val: u64) -> u64 {
        match self.pointer_size() {
            4 => val & 0xffff_ffff,
            _ => val,
        }
    }
}

impl Display for Personality {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Personality::X64 => write!(f, "x64"),
            Personality::X86 => write!(f, "x86"),
            Personality::X32 => write!(f, "x32"),
        }
    }
}

impl std::str::FromStr for Personality {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Personality, String> {
        match s {
            "x64" | "x86_64" | "64" => Ok(Personality::X64),
            "x86" | "i386" | "32" => Ok(Personality::X86),
            "x32" => Ok(Personality::X32),
            _ => Err(format!("Unknown personality `{}'", s)),
        }
    }
}

/// Strip ABI marker bits from a raw syscall number so it can be used to index
/// the personality's table.
pub fn canonical_syscallno(personality: Personality, raw: u64) -> u64 {
    match personality {
        Personality::X32 => raw & !X32_SYSCALL_BIT,
        _ => personality.truncate_word(raw),
    }
}

/// Decide a tracee's personality at a syscall stop. `compat_regs` is true when
/// the controller fetched a 32-bit register set (the tracee entered through
/// int 0x80 / sysenter); otherwise the x32 marker bit in the raw syscall
/// number distinguishes x32 from native calls.
pub fn detect_personality(compat_regs: bool, raw_syscallno: u64) -> Personality {
    if compat_regs {
        Personality::X86
    } else if raw_syscallno != u64::MAX && raw_syscallno & X32_SYSCALL_BIT != 0 {
        Personality::X32
    } else {
        Personality::X64
    }
}
