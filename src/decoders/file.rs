use super::{
    desc::{print_open_flags, wide_length},
    DecodeContext, EntryOutput, EntryState, ExitOutput, Outcome, ResultFormat,
};
use crate::{
    fd_tracker::{FdEffect, FdHint},
    kernel_supplement::{MFD_HUGE_MASK, MFD_HUGE_SHIFT, MFD_NAME_MAX_LEN},
    xlat::{self, tables::*},
};

fn path_hint(path: Option<String>) -> EntryState {
    match path {
        Some(p) => EntryState::Hint(FdHint::Path(p)),
        None => EntryState::Nothing,
    }
}

pub fn path_args_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let mut args = vec![ctx.path_arg(0)];
    args.extend(ctx.raw_args_from(1));
    EntryOutput::new(args)
}

pub fn path_mode_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let mut args = vec![ctx.path_arg(0), ctx.octal(ctx.arg_uint(1) as u64)];
    args.extend(ctx.raw_args_from(2));
    EntryOutput::new(args)
}

pub fn path_path_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let mut args = vec![ctx.path_arg(0), ctx.path_arg(1)];
    args.extend(ctx.raw_args_from(2));
    EntryOutput::new(args)
}

/// The mode argument only means something when a file may be created.
fn open_tail(ctx: &mut DecodeContext, flags_index: usize, args: &mut Vec<String>) {
    let flags = ctx.arg_uint(flags_index) as u64;
    args.push(print_open_flags(ctx, flags));
    if flags & O_CREAT != 0 || flags & O_TMPFILE == O_TMPFILE {
        args.push(ctx.octal(ctx.arg_uint(flags_index + 1) as u64));
    }
}

pub fn open_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let (text, path) = ctx.path_with_value(0);
    let mut args = vec![text];
    open_tail(ctx, 1, &mut args);
    EntryOutput::new(args).with_state(path_hint(path))
}

pub fn creat_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let (text, path) = ctx.path_with_value(0);
    let args = vec![text, ctx.octal(ctx.arg_uint(1) as u64)];
    EntryOutput::new(args).with_state(path_hint(path))
}

pub fn openat_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let (text, path) = ctx.path_with_value(1);
    let mut args = vec![ctx.dirfd_arg(0), text];
    open_tail(ctx, 2, &mut args);
    EntryOutput::new(args).with_state(path_hint(path))
}

/// Shared by every call whose return value is a fresh descriptor named at
/// entry.
pub fn open_exit(state: &EntryState, outcome: Outcome) -> ExitOutput {
    let out = ExitOutput::new(ResultFormat::Fd);
    if !outcome.success {
        return out;
    }
    let hint = match state {
        EntryState::Hint(hint) => Some(hint.clone()),
        _ => None,
    };
    out.with_effect(FdEffect::Opened {
        fd: outcome.fd(),
        hint,
    })
}

pub fn truncate_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let path = ctx.path_arg(0);
    EntryOutput::new(vec![path, wide_length(ctx, 1).to_string()])
}

/// MFD_* bits plus the huge page size encoded at MFD_HUGE_SHIFT.
pub fn print_memfd_flags(ctx: &DecodeContext, value: u64) -> String {
    if value == 0 {
        return "0".into();
    }
    let huge_bits = MFD_HUGE_MASK << MFD_HUGE_SHIFT;
    let huge = (value & huge_bits) >> MFD_HUGE_SHIFT;
    let (names, residual) = xlat::flag_terms(value & !huge_bits, MEMFD_FLAGS);
    if names.is_empty() && huge == 0 {
        return xlat::hex(value);
    }
    let mut terms: Vec<String> = names.iter().map(|n| (*n).to_owned()).collect();
    if residual != 0 {
        terms.push(xlat::hex(residual));
    }
    if huge != 0 {
        terms.push(format!("{}<<MFD_HUGE_SHIFT", huge));
    }
    xlat::render_terms(value, &terms, ctx.flags.xlat_style)
}

pub fn memfd_create_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let addr = ctx.arg_ptr(0);
    let (text, name) = ctx.c_str_at(0, addr, MFD_NAME_MAX_LEN + 1);
    let flags = print_memfd_flags(ctx, ctx.arg_uint(1) as u64);
    let state = match name {
        Some(bytes) => EntryState::Hint(FdHint::Memfd(String::from_utf8_lossy(&bytes).into_owned())),
        None => EntryState::Nothing,
    };
    EntryOutput::new(vec![text, flags]).with_state(state)
}

pub fn unlinkat_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let path = ctx.path_arg(1);
    let flags = ctx.print_flags(ctx.arg_uint(2) as u64, AT_FLAGS);
    EntryOutput::new(vec![ctx.dirfd_arg(0), path, flags])
}

pub fn access_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let path = ctx.path_arg(0);
    let mode = ctx.print_flags(ctx.arg_uint(1) as u64, ACCESS_MODES);
    EntryOutput::new(vec![path, mode])
}

pub fn stat_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let path = ctx.path_arg(0);
    EntryOutput::new(vec![path, ctx.ptr_arg(1)])
}

pub fn umask_entry(ctx: &mut DecodeContext) -> EntryOutput {
    EntryOutput::new(vec![ctx.octal(ctx.arg_uint(0) as u64)])
}

#[cfg(test)]
mod tests {
    use super::super::{decode_entry, test_support::*};
    use super::*;
    use crate::{flags::XlatStyle, sysent::DecoderKind};

    #[test]
    fn unlinkat_flags_and_dirfd() {
        let h = Harness::new();
        h.memory.add_c_str(PID, 0x1000, "unlinkat_sample");
        assert_eq!(
            "-1, \"unlinkat_sample\", 0",
            h.entry(DecoderKind::Unlinkat, [0xdead_beef_ffff_ffff, 0x1000, 0, 0, 0, 0], 3)
        );
        assert_eq!(
            "AT_FDCWD, \"unlinkat_sample\", AT_SYMLINK_NOFOLLOW|AT_REMOVEDIR|AT_SYMLINK_FOLLOW\
             |AT_NO_AUTOMOUNT|AT_EMPTY_PATH|AT_RECURSIVE|0xffff60ff",
            h.entry(
                DecoderKind::Unlinkat,
                [(-100i64) as u64, 0x1000, u64::MAX, 0, 0, 0],
                3
            )
        );
    }

    const FLAGS1: &str = "MFD_CLOEXEC|MFD_ALLOW_SEALING|MFD_HUGETLB|MFD_NOEXEC_SEAL|MFD_EXEC";

    #[test]
    fn memfd_name_limit_and_flags() {
        let mut h = Harness::new();
        let long: Vec<u8> = (0..250).map(|i| b'0' + (i % 10) as u8).collect();
        let shown = String::from_utf8(long.clone()).unwrap();
        h.memory.add_region(PID, 0x1000, long);
        assert_eq!(
            format!("\"{}\"..., {}", shown, FLAGS1),
            h.entry(
                DecoderKind::MemfdCreate,
                [0x1000, 0xface_feed_0000_001f, 0, 0, 0, 0],
                2
            )
        );

        let mut terminated: Vec<u8> = shown.as_bytes()[..249].to_vec();
        terminated.push(0);
        h.memory.add_region(PID, 0x4000, terminated);
        assert_eq!(
            format!("\"{}\", 30<<MFD_HUGE_SHIFT", &shown[..249]),
            h.entry(DecoderKind::MemfdCreate, [0x4000, 30 << 26, 0, 0, 0, 0], 2)
        );

        assert_eq!(
            format!("NULL, {}|0x3ffffe0|63<<MFD_HUGE_SHIFT", FLAGS1),
            h.entry(DecoderKind::MemfdCreate, [0, u64::MAX, 0, 0, 0, 0], 2)
        );

        h.flags.xlat_style = XlatStyle::Raw;
        assert_eq!(
            "NULL, 0xffffffff",
            h.entry(DecoderKind::MemfdCreate, [0, u64::MAX, 0, 0, 0, 0], 2)
        );
        h.flags.xlat_style = XlatStyle::Verbose;
        assert_eq!(
            "NULL, 0x78000000 /* 30<<MFD_HUGE_SHIFT */",
            h.entry(DecoderKind::MemfdCreate, [0, 30 << 26, 0, 0, 0, 0], 2)
        );
    }

    #[test]
    fn open_mode_only_with_creat() {
        let h = Harness::new();
        h.memory.add_c_str(PID, 0x1000, "/tmp/x");
        assert_eq!(
            "\"/tmp/x\", O_RDONLY",
            h.entry(DecoderKind::Open, [0x1000, 0, 0o644, 0, 0, 0], 3)
        );
        assert_eq!(
            "\"/tmp/x\", O_WRONLY|O_CREAT|O_TRUNC, 0644",
            h.entry(DecoderKind::Open, [0x1000, 0x241, 0o644, 0, 0, 0], 3)
        );
        assert_eq!(
            "AT_FDCWD, \"/tmp/x\", O_RDONLY|O_CLOEXEC",
            h.entry(
                DecoderKind::OpenAt,
                [(-100i64) as u64, 0x1000, 0x8_0000, 0, 0, 0],
                4
            )
        );
    }

    #[test]
    fn open_carries_path_to_exit() {
        let h = Harness::new();
        h.memory.add_c_str(PID, 0x1000, "/tmp/x");
        let mut ctx = h.ctx([0x1000, 0, 0, 0, 0, 0], 3);
        let entry = decode_entry(DecoderKind::Open, &mut ctx);
        let out = open_exit(
            &entry.state,
            Outcome {
                raw: 5,
                success: true,
            },
        );
        assert_eq!(
            vec![FdEffect::Opened {
                fd: 5,
                hint: Some(FdHint::Path("/tmp/x".into()))
            }],
            out.effects
        );
        let failed = open_exit(
            &entry.state,
            Outcome {
                raw: (-2i64) as u64,
                success: false,
            },
        );
        assert!(failed.effects.is_empty());
    }

    #[test]
    fn unreadable_path_keeps_other_arguments() {
        let h = Harness::new();
        let mut ctx = h.ctx([0xdead_0000, 0x42, 0, 0, 0, 0], 3);
        let entry = decode_entry(DecoderKind::Open, &mut ctx);
        assert_eq!(
            vec!["0xdead0000 /* fault */", "O_RDWR|O_CREAT", "000"],
            entry.args
        );
        assert_eq!(EntryState::Nothing, entry.state);
        assert_eq!(vec![0], ctx.into_faults());
    }

    #[test]
    fn path_families() {
        let h = Harness::new();
        h.memory.add_c_str(PID, 0x1000, "/a");
        h.memory.add_c_str(PID, 0x2000, "/b");
        assert_eq!(
            "\"/a\", 0755",
            h.entry(DecoderKind::PathMode, [0x1000, 0o755, 0, 0, 0, 0], 2)
        );
        assert_eq!(
            "\"/a\", \"/b\"",
            h.entry(DecoderKind::PathPath, [0x1000, 0x2000, 0, 0, 0, 0], 2)
        );
        assert_eq!(
            "\"/a\", R_OK|W_OK",
            h.entry(DecoderKind::Access, [0x1000, 6, 0, 0, 0, 0], 2)
        );
        assert_eq!("022", h.entry(DecoderKind::Umask, [0o22, 0, 0, 0, 0, 0], 1));
    }
}
