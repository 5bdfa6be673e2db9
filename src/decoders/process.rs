use super::{DecodeContext, EntryOutput, EntryState, ExitOutput, Outcome, ResultFormat};
use crate::{
    fd_tracker::FdEffect,
    kernel_abi::CloneParameterOrdering,
    kernel_metadata::signal_name,
    kernel_supplement::CSIGNAL,
    remote_ptr::{RemotePtr, Void},
    xlat::{self, tables::*},
};

/// Give up counting environment entries after this many.
const MAX_ENV_PROBE: usize = 4096;

/// `["a", "b", ...]`: at most `max_array_elements` strings of a NULL
/// terminated pointer array.
fn print_string_array(ctx: &mut DecodeContext, index: usize) -> String {
    let base = ctx.arg_ptr(index);
    if base.is_null() {
        return "NULL".into();
    }
    let ptr_size = ctx.personality.pointer_size();
    let mut items = Vec::new();
    let mut slot = base;
    loop {
        let elem = match ctx.memory().read_pointer(ctx.pid, ctx.personality, slot) {
            Ok(p) => p,
            Err(_) if items.is_empty() => return ctx.fault(index, base),
            Err(_) => {
                items.push(ctx.fault(index, slot));
                break;
            }
        };
        if elem.is_null() {
            break;
        }
        if items.len() == ctx.flags.max_array_elements {
            items.push("...".to_owned());
            break;
        }
        items.push(ctx.string_at(index, elem));
        slot = match slot.checked_byte_add(ptr_size) {
            Some(next) => next,
            None => break,
        };
    }
    format!("[{}]", items.join(", "))
}

/// `0x7ffc... /* 23 vars */`
fn print_env_summary(ctx: &mut DecodeContext, index: usize) -> String {
    let base = ctx.arg_ptr(index);
    if base.is_null() {
        return "NULL".into();
    }
    let ptr_size = ctx.personality.pointer_size();
    let mut count = 0;
    let mut slot: RemotePtr<Void> = base;
    while count < MAX_ENV_PROBE {
        match ctx.memory().read_pointer(ctx.pid, ctx.personality, slot) {
            Ok(p) if p.is_null() => break,
            Ok(_) => count += 1,
            Err(_) => return ctx.fault(index, slot),
        }
        slot = match slot.checked_byte_add(ptr_size) {
            Some(next) => next,
            None => break,
        };
    }
    format!("{} /* {} var{} */", base, count, if count == 1 { "" } else { "s" })
}

pub fn execve_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let path = ctx.path_arg(0);
    let argv = print_string_array(ctx, 1);
    let envp = print_env_summary(ctx, 2);
    EntryOutput::new(vec![path, argv, envp])
}

pub fn execveat_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let dirfd = ctx.dirfd_arg(0);
    let path = ctx.path_arg(1);
    let argv = print_string_array(ctx, 2);
    let envp = print_env_summary(ctx, 3);
    let flags = ctx.print_flags(ctx.arg_uint(4) as u64, AT_FLAGS);
    EntryOutput::new(vec![dirfd, path, argv, envp, flags])
}

pub fn exit_entry(ctx: &mut DecodeContext) -> EntryOutput {
    EntryOutput::new(vec![ctx.arg_int(0).to_string()]).no_return()
}

pub fn kill_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let sig = xlat::print_signal(ctx.arg_int(1), ctx.flags.xlat_style);
    EntryOutput::new(vec![ctx.arg_int(0).to_string(), sig])
}

pub fn tgkill_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let sig = xlat::print_signal(ctx.arg_int(2), ctx.flags.xlat_style);
    EntryOutput::new(vec![ctx.arg_int(0).to_string(), ctx.arg_int(1).to_string(), sig])
}

/// CLONE_* names followed by the exit signal kept in the low byte.
fn print_clone_flags(ctx: &DecodeContext, value: u64) -> String {
    let sig = (value & CSIGNAL) as i32;
    let (names, residual) = xlat::flag_terms(value & !CSIGNAL, CLONE_FLAGS);
    let mut terms: Vec<String> = names.iter().map(|n| (*n).to_owned()).collect();
    if residual != 0 {
        terms.push(xlat::hex(residual));
    }
    if sig != 0 {
        terms.push(signal_name(sig));
    }
    if terms.is_empty() {
        return "0".into();
    }
    xlat::render_terms(value, &terms, ctx.flags.xlat_style)
}

pub fn clone_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let flags = ctx.arg(0);
    let (parent_tid, tls, child_tid) = match ctx.personality.clone_parameter_ordering() {
        CloneParameterOrdering::FlagsStackParentTLSChild => (2, 3, 4),
        CloneParameterOrdering::FlagsStackParentChildTLS => (2, 4, 3),
    };
    let mut args = vec![
        format!("child_stack={}", ctx.ptr_arg(1)),
        format!("flags={}", print_clone_flags(ctx, flags)),
    ];
    if flags & CLONE_PARENT_SETTID != 0 {
        args.push(format!("parent_tid={}", ctx.ptr_arg(parent_tid)));
    }
    if flags & CLONE_SETTLS != 0 {
        args.push(format!("tls={}", ctx.ptr_arg(tls)));
    }
    if flags & (CLONE_CHILD_SETTID | CLONE_CHILD_CLEARTID) != 0 {
        args.push(format!("child_tidptr={}", ctx.ptr_arg(child_tid)));
    }
    EntryOutput::new(args).with_state(EntryState::Word(flags))
}

pub fn fork_entry(_ctx: &mut DecodeContext) -> EntryOutput {
    EntryOutput::new(Vec::new())
}

/// The return value is the child's pid. A child created with CLONE_FILES
/// shares the caller's table; any other child starts with a copy.
pub fn fork_exit(_ctx: &mut DecodeContext, state: &EntryState, outcome: Outcome) -> ExitOutput {
    let out = ExitOutput::new(ResultFormat::Decimal);
    if !outcome.success || outcome.fd() <= 0 {
        return out;
    }
    let child = outcome.fd();
    match state {
        EntryState::Word(flags) if flags & CLONE_FILES != 0 => {
            out.with_effect(FdEffect::ShareFds(child))
        }
        _ => out.with_effect(FdEffect::InheritFds(child)),
    }
}

#[cfg(test)]
mod tests {
    use super::super::{decode_entry, test_support::*};
    use super::*;
    use crate::{flags::XlatStyle, kernel_abi::Personality, sysent::DecoderKind};

    fn pointer_block(h: &Harness, addr: usize, ptrs: &[u64]) {
        let bytes: Vec<u8> = ptrs.iter().flat_map(|p| p.to_le_bytes().to_vec()).collect();
        h.memory.add_region(PID, addr, bytes);
    }

    #[test]
    fn execve_arguments() {
        let mut h = Harness::new();
        h.memory.add_c_str(PID, 0x1000, "/bin/ls");
        h.memory.add_c_str(PID, 0x1100, "ls");
        h.memory.add_c_str(PID, 0x1200, "-l");
        pointer_block(&h, 0x2000, &[0x1100, 0x1200, 0]);
        pointer_block(&h, 0x3000, &[0x1100, 0x1100, 0x1100, 0]);
        assert_eq!(
            "\"/bin/ls\", [\"ls\", \"-l\"], 0x3000 /* 3 vars */",
            h.entry(DecoderKind::Execve, [0x1000, 0x2000, 0x3000, 0, 0, 0], 3)
        );
        h.flags.max_array_elements = 1;
        assert_eq!(
            "\"/bin/ls\", [\"ls\", ...], NULL",
            h.entry(DecoderKind::Execve, [0x1000, 0x2000, 0, 0, 0, 0], 3)
        );
    }

    #[test]
    fn execve_bad_argv_keeps_path() {
        let h = Harness::new();
        h.memory.add_c_str(PID, 0x1000, "/bin/true");
        let mut ctx = h.ctx([0x1000, 0x6000, 0, 0, 0, 0], 3);
        let out = decode_entry(DecoderKind::Execve, &mut ctx);
        assert_eq!(vec!["\"/bin/true\"", "0x6000 /* fault */", "NULL"], out.args);
        assert_eq!(vec![1], ctx.into_faults());
    }

    #[test]
    fn exit_never_returns() {
        let h = Harness::new();
        let mut ctx = h.ctx([1, 0, 0, 0, 0, 0], 1);
        let out = decode_entry(DecoderKind::Exit, &mut ctx);
        assert!(out.no_return);
        assert_eq!(vec!["1"], out.args);
    }

    #[test]
    fn signals() {
        let mut h = Harness::new();
        assert_eq!("123, SIGTERM", h.entry(DecoderKind::Kill, [123, 15, 0, 0, 0, 0], 2));
        h.flags.xlat_style = XlatStyle::Verbose;
        assert_eq!(
            "1, 2, 9 /* SIGKILL */",
            h.entry(DecoderKind::Tgkill, [1, 2, 9, 0, 0, 0], 3)
        );
    }

    #[test]
    fn clone_ordering_follows_personality() {
        let flags = 0x0120_0000 | 17; // CHILD_SETTID|CHILD_CLEARTID|SIGCHLD
        let h = Harness::new();
        assert_eq!(
            "child_stack=NULL, flags=CLONE_CHILD_CLEARTID|CLONE_CHILD_SETTID|SIGCHLD, child_tidptr=0x4000",
            h.entry(DecoderKind::CloneTask, [flags, 0, 0, 0x4000, 0x5000, 0], 5)
        );
        let mut h = Harness::new();
        h.personality = Personality::X86;
        assert_eq!(
            "child_stack=NULL, flags=CLONE_CHILD_CLEARTID|CLONE_CHILD_SETTID|SIGCHLD, child_tidptr=0x5000",
            h.entry(DecoderKind::CloneTask, [flags, 0, 0, 0x4000, 0x5000, 0], 5)
        );
    }

    #[test]
    fn children_get_descriptor_tables() {
        let h = Harness::new();
        let mut ctx = h.ctx([0; 6], 0);
        let ok = Outcome {
            raw: 77,
            success: true,
        };
        assert_eq!(
            vec![FdEffect::InheritFds(77)],
            fork_exit(&mut ctx, &EntryState::Nothing, ok).effects
        );
        assert_eq!(
            vec![FdEffect::ShareFds(77)],
            fork_exit(&mut ctx, &EntryState::Word(CLONE_FILES), ok).effects
        );
        let child_side = Outcome {
            raw: 0,
            success: true,
        };
        assert!(fork_exit(&mut ctx, &EntryState::Nothing, child_side)
            .effects
            .is_empty());
    }
}
