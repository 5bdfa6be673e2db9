use crate::{
    event::{SyscallPhase, TraceEvent},
    kernel_abi::{detect_personality, Personality},
    kernel_supplement::{
        ERESTARTNOHAND, ERESTARTNOINTR, ERESTARTSYS, ERESTART_RESTARTBLOCK, MAX_ERRNO,
    },
    remote_ptr::{RemotePtr, Void},
};
use libc::pid_t;
use std::mem::size_of;

/// The i386 `struct user_regs_struct`, as returned by PTRACE_GETREGSET for a
/// tracee in compat mode.
#[repr(C)]
#[derive(Copy, Clone, Default, Debug)]
pub struct X86UserRegs {
    pub ebx: i32,
    pub ecx: i32,
    pub edx: i32,
    pub esi: i32,
    pub edi: i32,
    pub ebp: i32,
    pub eax: i32,
    pub xds: i32,
    pub xes: i32,
    pub xfs: i32,
    pub xgs: i32,
    pub orig_eax: i32,
    pub eip: i32,
    pub xcs: i32,
    pub eflags: i32,
    pub esp: i32,
    pub xss: i32,
}

assert_eq_size!(X86UserRegs, [u8; 68]);

#[repr(C)]
#[derive(Copy, Clone)]
union RegistersUnion {
    x86: X86UserRegs,
    x64: libc::user_regs_struct,
}

macro_rules! get_reg {
    ($slf:expr, $x86case:ident, $x64case:ident) => {
        unsafe {
            match $slf.personality {
                Personality::X86 => $slf.u.x86.$x86case as u32 as u64,
                Personality::X64 | Personality::X32 => $slf.u.x64.$x64case,
            }
        }
    };
}

/// Frozen register state of a tracee at a syscall stop.
#[derive(Copy, Clone)]
pub struct Registers {
    personality: Personality,
    u: RegistersUnion,
}

impl Registers {
    /// From a native (64-bit layout) register set. The personality is x32 if
    /// the syscall number carries the x32 marker bit.
    pub fn from_ptrace(regs: &libc::user_regs_struct) -> Registers {
        Registers {
            personality: detect_personality(false, regs.orig_rax),
            u: RegistersUnion { x64: *regs },
        }
    }

    pub fn from_ptrace_x86(regs: &X86UserRegs) -> Registers {
        Registers {
            personality: Personality::X86,
            u: RegistersUnion { x86: *regs },
        }
    }

    /// From a raw NT_PRSTATUS regset. The kernel returns the compat layout for
    /// i386 tracees, so the size tells the two apart.
    pub fn from_regset_bytes(data: &[u8]) -> Option<Registers> {
        if data.len() == size_of::<X86UserRegs>() {
            let mut regs = X86UserRegs::default();
            // Safe: X86UserRegs is plain old data of exactly this size.
            unsafe {
                std::ptr::copy_nonoverlapping(
                    data.as_ptr(),
                    &mut regs as *mut X86UserRegs as *mut u8,
                    data.len(),
                );
            }
            Some(Registers::from_ptrace_x86(&regs))
        } else if data.len() == size_of::<libc::user_regs_struct>() {
            // Safe: any bit pattern is a valid user_regs_struct.
            let regs = unsafe {
                std::ptr::read_unaligned(data.as_ptr() as *const libc::user_regs_struct)
            };
            Some(Registers::from_ptrace(&regs))
        } else {
            None
        }
    }

    pub fn personality(&self) -> Personality {
        self.personality
    }

    /// The syscall number the tracee asked for, including any ABI bits.
    pub fn original_syscallno(&self) -> u64 {
        match self.personality {
            Personality::X86 => unsafe { self.u.x86.orig_eax as i64 as u64 },
            _ => get_reg!(self, orig_eax, orig_rax),
        }
    }

    pub fn syscall_result(&self) -> u64 {
        get_reg!(self, eax, rax)
    }

    pub fn syscall_result_signed(&self) -> i64 {
        self.personality.signed_word(self.syscall_result())
    }

    pub fn syscall_failed(&self) -> bool {
        let result = self.syscall_result_signed();
        -(MAX_ERRNO as i64) <= result && result < 0
    }

    pub fn syscall_may_restart(&self) -> bool {
        match -self.syscall_result_signed() {
            r if r == ERESTART_RESTARTBLOCK as i64 => true,
            r if r == ERESTARTNOINTR as i64 => true,
            r if r == ERESTARTNOHAND as i64 => true,
            r if r == ERESTARTSYS as i64 => true,
            _ => false,
        }
    }

    /// Syscall arguments in calling-convention order.
    pub fn args(&self) -> [u64; 6] {
        [
            get_reg!(self, ebx, rdi),
            get_reg!(self, ecx, rsi),
            get_reg!(self, edx, rdx),
            get_reg!(self, esi, r10),
            get_reg!(self, edi, r8),
            get_reg!(self, ebp, r9),
        ]
    }

    pub fn arg(&self, index: usize) -> u64 {
        self.args()[index]
    }

    pub fn ip(&self) -> RemotePtr<Void> {
        RemotePtr::new_from_val(get_reg!(self, eip, rip) as usize)
    }

    pub fn sp(&self) -> RemotePtr<Void> {
        RemotePtr::new_from_val(get_reg!(self, esp, rsp) as usize)
    }

    /// Package this stop for the decoder.
    pub fn to_trace_event(&self, pid: pid_t, phase: SyscallPhase) -> TraceEvent {
        let return_value = match phase {
            SyscallPhase::Entry => None,
            SyscallPhase::Exit => Some(self.syscall_result()),
        };
        TraceEvent {
            pid,
            personality: self.personality,
            number: self.original_syscallno(),
            args: self.args(),
            phase,
            return_value,
            faulted: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel_abi::X32_SYSCALL_BIT;

    fn zeroed_x64() -> libc::user_regs_struct {
        unsafe { std::mem::zeroed() }
    }

    #[test]
    fn x64_argument_order() {
        let mut r = zeroed_x64();
        r.orig_rax = 2;
        r.rdi = 1;
        r.rsi = 2;
        r.rdx = 3;
        r.r10 = 4;
        r.r8 = 5;
        r.r9 = 6;
        r.rcx = 99;
        r.rax = (-2i64) as u64;
        let regs = Registers::from_ptrace(&r);
        assert_eq!(Personality::X64, regs.personality());
        assert_eq!([1, 2, 3, 4, 5, 6], regs.args());
        assert!(regs.syscall_failed());
        let e = regs.to_trace_event(10, SyscallPhase::Exit);
        assert_eq!(2, e.number);
        assert_eq!(Some((-2i64) as u64), e.return_value);
    }

    #[test]
    fn x32_is_detected_from_number() {
        let mut r = zeroed_x64();
        r.orig_rax = X32_SYSCALL_BIT | 520;
        let regs = Registers::from_ptrace(&r);
        assert_eq!(Personality::X32, regs.personality());
        assert_eq!(X32_SYSCALL_BIT | 520, regs.original_syscallno());
    }

    #[test]
    fn x86_argument_order_and_width() {
        let r = X86UserRegs {
            ebx: 1,
            ecx: 2,
            edx: 3,
            esi: 4,
            edi: 5,
            ebp: -1,
            eax: -ERESTARTSYS,
            orig_eax: 11,
            ..Default::default()
        };
        let regs = Registers::from_ptrace_x86(&r);
        assert_eq!([1, 2, 3, 4, 5, 0xffff_ffff], regs.args());
        assert_eq!(11, regs.original_syscallno());
        assert!(regs.syscall_may_restart());
        assert_eq!(-(ERESTARTSYS as i64), regs.syscall_result_signed());
        let e = regs.to_trace_event(3, SyscallPhase::Entry);
        assert_eq!(Personality::X86, e.personality);
        assert_eq!(None, e.return_value);
    }

    #[test]
    fn regset_size_selects_layout() {
        let x86 = [0u8; 68];
        assert_eq!(
            Personality::X86,
            Registers::from_regset_bytes(&x86).unwrap().personality()
        );
        let x64 = vec![0u8; size_of::<libc::user_regs_struct>()];
        assert_eq!(
            Personality::X64,
            Registers::from_regset_bytes(&x64).unwrap().personality()
        );
        assert!(Registers::from_regset_bytes(&[0u8; 3]).is_none());
    }
}
