use super::{DecodeContext, EntryOutput, ExitOutput, Outcome, ResultFormat};
use crate::{
    fd_tracker::{FdEffect, FdHint},
    kernel_abi::Personality,
    record::DecodedRecord,
    xlat::{self, tables::*},
};

pub fn fd_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let mut args = vec![ctx.fd_arg(0)];
    args.extend(ctx.raw_args_from(1));
    EntryOutput::new(args)
}

/// The buffer is only meaningful once the kernel has filled it.
pub fn read_entry(ctx: &mut DecodeContext) -> EntryOutput {
    EntryOutput::new(vec![ctx.fd_arg(0), ctx.ptr_arg(1), ctx.arg(2).to_string()])
}

pub fn read_exit(ctx: &mut DecodeContext, record: &mut DecodedRecord, outcome: Outcome) -> ExitOutput {
    if outcome.success {
        let text = ctx.buffer_arg(1, outcome.raw as usize);
        record.set_arg(1, text);
    }
    ExitOutput::new(ResultFormat::Decimal)
}

pub fn write_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let len = ctx.arg(2);
    EntryOutput::new(vec![ctx.fd_arg(0), ctx.buffer_arg(1, len as usize), len.to_string()])
}

pub fn close_entry(ctx: &mut DecodeContext) -> EntryOutput {
    EntryOutput::new(vec![ctx.fd_arg(0)])
}

pub fn close_exit(ctx: &mut DecodeContext, outcome: Outcome) -> ExitOutput {
    let out = ExitOutput::new(ResultFormat::Decimal);
    if outcome.success {
        out.with_effect(FdEffect::Closed(ctx.arg_int(0)))
    } else {
        out
    }
}

pub fn close_range_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let flags = ctx.print_flags(ctx.arg_uint(2) as u64, CLOSE_RANGE_FLAGS);
    EntryOutput::new(vec![
        ctx.arg_uint(0).to_string(),
        ctx.arg_uint(1).to_string(),
        flags,
    ])
}

pub fn close_range_exit(ctx: &mut DecodeContext, outcome: Outcome) -> ExitOutput {
    let out = ExitOutput::new(ResultFormat::Decimal);
    // With CLOEXEC the descriptors stay open until the next exec.
    if !outcome.success || ctx.arg_uint(2) as u64 & CLOSE_RANGE_CLOEXEC != 0 {
        return out;
    }
    out.with_effect(FdEffect::CloseRange {
        first: ctx.arg_uint(0),
        last: ctx.arg_uint(1),
    })
}

pub fn dup_entry(ctx: &mut DecodeContext) -> EntryOutput {
    EntryOutput::new(vec![ctx.fd_arg(0)])
}

pub fn dup2_entry(ctx: &mut DecodeContext) -> EntryOutput {
    EntryOutput::new(vec![ctx.fd_arg(0), ctx.fd_arg(1)])
}

pub fn dup3_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let flags = ctx.print_flags(ctx.arg_uint(2) as u64, CLOEXEC_FLAGS);
    EntryOutput::new(vec![ctx.fd_arg(0), ctx.fd_arg(1), flags])
}

/// dup, dup2, dup3: the new descriptor is the return value.
pub fn dup_exit(ctx: &mut DecodeContext, outcome: Outcome) -> ExitOutput {
    let out = ExitOutput::new(ResultFormat::Fd);
    if outcome.success {
        out.with_effect(FdEffect::Duplicated {
            old: ctx.arg_int(0),
            new: outcome.fd(),
        })
    } else {
        out
    }
}

pub fn fcntl_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let cmd = ctx.arg_uint(1) as u64;
    let mut args = vec![ctx.fd_arg(0), ctx.print_xval(cmd, FCNTL_CMDS, "F_???")];
    match cmd {
        F_DUPFD | F_DUPFD_CLOEXEC => args.push(ctx.arg_int(2).to_string()),
        F_SETFD => args.push(ctx.print_flags(ctx.arg_uint(2) as u64, FD_FLAGS)),
        F_SETFL => args.push(print_open_flags(ctx, ctx.arg_uint(2) as u64)),
        F_GETFD | F_GETFL => {}
        _ => args.push(ctx.hex_arg(2)),
    }
    EntryOutput::new(args)
}

pub fn fcntl_exit(ctx: &mut DecodeContext, outcome: Outcome) -> ExitOutput {
    match ctx.arg_uint(1) as u64 {
        F_DUPFD | F_DUPFD_CLOEXEC => dup_exit(ctx, outcome),
        F_GETFD => ExitOutput::new(ResultFormat::AuxString(format!(
            "flags {}",
            ctx.print_flags(outcome.raw, FD_FLAGS)
        ))),
        F_GETFL => ExitOutput::new(ResultFormat::AuxString(format!(
            "flags {}",
            print_open_flags(ctx, outcome.raw)
        ))),
        _ => ExitOutput::new(ResultFormat::Decimal),
    }
}

/// Access mode first, then the remaining O_* bits.
pub fn print_open_flags(ctx: &DecodeContext, value: u64) -> String {
    let mode = value & O_ACCMODE;
    let rest = value & !O_ACCMODE;
    let mut terms = vec![match xlat::lookup_name(mode, OPEN_ACCESS_MODES) {
        Some(name) => name.to_owned(),
        None => xlat::hex(mode),
    }];
    let (names, residual) = xlat::flag_terms(rest, OPEN_FLAGS);
    terms.extend(names.iter().map(|n| (*n).to_owned()));
    if residual != 0 {
        terms.push(xlat::hex(residual));
    }
    xlat::render_terms(value, &terms, ctx.flags.xlat_style)
}

pub fn lseek_entry(ctx: &mut DecodeContext) -> EntryOutput {
    EntryOutput::new(vec![
        ctx.fd_arg(0),
        ctx.arg_signed(1).to_string(),
        ctx.print_xval(ctx.arg_uint(2) as u64, SEEK_WHENCE, "SEEK_???"),
    ])
}

pub fn flock_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let ops = ctx.print_flags(ctx.arg_uint(1) as u64, FLOCK_OPS);
    EntryOutput::new(vec![ctx.fd_arg(0), ops])
}

/// 64-bit length, split across two registers by ftruncate64 on i386.
pub fn wide_length(ctx: &DecodeContext, index: usize) -> u64 {
    if ctx.personality == Personality::X86 && ctx.nargs() > index + 1 {
        ctx.arg(index) | ctx.arg(index + 1) << 32
    } else {
        ctx.arg(index)
    }
}

pub fn ftruncate_entry(ctx: &mut DecodeContext) -> EntryOutput {
    EntryOutput::new(vec![ctx.fd_arg(0), wide_length(ctx, 1).to_string()])
}

pub fn splice_entry(ctx: &mut DecodeContext) -> EntryOutput {
    // loff_t is 64 bits for every personality.
    let off_in = ctx.int_ptr_arg(1, 8, true);
    let off_out = ctx.int_ptr_arg(3, 8, true);
    let flags = ctx.print_flags(ctx.arg_uint(5) as u64, SPLICE_FLAGS);
    EntryOutput::new(vec![
        ctx.fd_arg(0),
        off_in,
        ctx.fd_arg(2),
        off_out,
        ctx.arg(4).to_string(),
        flags,
    ])
}

pub fn pipe_entry(ctx: &mut DecodeContext) -> EntryOutput {
    EntryOutput::new(vec![ctx.ptr_arg(0)])
}

pub fn pipe2_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let flags = ctx.print_flags(ctx.arg_uint(1) as u64, CLOEXEC_FLAGS);
    EntryOutput::new(vec![ctx.ptr_arg(0), flags])
}

/// Both ends are written to the `int[2]` the tracee passed.
pub fn pipe_exit(ctx: &mut DecodeContext, record: &mut DecodedRecord, outcome: Outcome) -> ExitOutput {
    let out = ExitOutput::new(ResultFormat::Decimal);
    if !outcome.success {
        return out;
    }
    let addr = ctx.arg_ptr(0);
    let ends = ctx.memory().read_vec(ctx.pid, addr, 8);
    match ends {
        Ok(bytes) => {
            let read_end = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            let write_end = i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
            record.set_arg(0, format!("[{}, {}]", read_end, write_end));
            out.with_effect(FdEffect::Opened {
                fd: read_end,
                hint: Some(FdHint::Pipe),
            })
            .with_effect(FdEffect::Opened {
                fd: write_end,
                hint: Some(FdHint::Pipe),
            })
        }
        Err(_) => {
            let marker = ctx.fault(0, addr);
            record.set_arg(0, marker);
            out
        }
    }
}

pub fn fstat_entry(ctx: &mut DecodeContext) -> EntryOutput {
    EntryOutput::new(vec![ctx.fd_arg(0), ctx.ptr_arg(1)])
}

#[cfg(test)]
mod tests {
    use super::super::{decode_entry, decode_exit, test_support::*, EntryState};
    use super::*;
    use crate::{flags::XlatStyle, sysent::DecoderKind};

    fn neg(v: i64) -> u64 {
        v as u64
    }

    #[test]
    fn flock_decodes_operation() {
        let h = Harness::new();
        assert_eq!("-1, LOCK_SH", h.entry(DecoderKind::Flock, [neg(-1), 1, 0, 0, 0, 0], 2));
        assert_eq!(
            "0, LOCK_EX|LOCK_NB",
            h.entry(DecoderKind::Flock, [0, 6, 0, 0, 0, 0], 2)
        );
    }

    #[test]
    fn ftruncate_length_is_unsigned() {
        let h = Harness::new();
        assert_eq!(
            "-1, 1004211376030073054",
            h.entry(
                DecoderKind::Ftruncate,
                [0xdead_beef_ffff_ffff, 0x0def_aced_0bad_c0de, 0, 0, 0, 0],
                2
            )
        );
    }

    #[test]
    fn ftruncate64_on_x86_joins_halves() {
        let mut h = Harness::new();
        h.personality = Personality::X86;
        assert_eq!(
            "-1, 1004211376030073054",
            h.entry(
                DecoderKind::Ftruncate,
                [0xffff_ffff, 0x0bad_c0de, 0x0def_aced, 0, 0, 0],
                3
            )
        );
    }

    #[test]
    fn splice_reads_offsets() {
        let h = Harness::new();
        h.memory
            .add_region(PID, 0x1000, 0x1234_5678_i64.to_le_bytes().to_vec());
        h.memory.add_region(PID, 0x2000, (-1i64).to_le_bytes().to_vec());
        assert_eq!(
            "-1, [305419896], -2, [-1], 4096, SPLICE_F_MOVE|SPLICE_F_NONBLOCK|SPLICE_F_MORE|SPLICE_F_GIFT",
            h.entry(
                DecoderKind::Splice,
                [neg(-1), 0x1000, 0xbad_ffff_fffe, 0x2000, 4096, 0xf],
                6
            )
        );
        assert_eq!(
            "3, NULL, 4, 0x3000 /* fault */, 1, 0",
            h.entry(DecoderKind::Splice, [3, 0, 4, 0x3000, 1, 0], 6)
        );
    }

    #[test]
    fn lseek_whence() {
        let mut h = Harness::new();
        assert_eq!("3, -5, SEEK_END", h.entry(DecoderKind::Lseek, [3, neg(-5), 2, 0, 0, 0], 3));
        assert_eq!(
            "3, 0, 0x2a /* SEEK_??? */",
            h.entry(DecoderKind::Lseek, [3, 0, 42, 0, 0, 0], 3)
        );
        h.flags.xlat_style = XlatStyle::Raw;
        assert_eq!("3, 0, 0x1", h.entry(DecoderKind::Lseek, [3, 0, 1, 0, 0, 0], 3));
    }

    #[test]
    fn fcntl_commands() {
        let h = Harness::new();
        assert_eq!("3, F_GETFD", h.entry(DecoderKind::Fcntl, [3, 1, 0, 0, 0, 0], 3));
        assert_eq!(
            "3, F_SETFD, FD_CLOEXEC",
            h.entry(DecoderKind::Fcntl, [3, 2, 1, 0, 0, 0], 3)
        );
        assert_eq!(
            "3, F_SETFL, O_RDWR|O_NONBLOCK",
            h.entry(DecoderKind::Fcntl, [3, 4, 0x802, 0, 0, 0], 3)
        );
        assert_eq!(
            "3, F_DUPFD_CLOEXEC, 10",
            h.entry(DecoderKind::Fcntl, [3, 1030, 10, 0, 0, 0], 3)
        );
    }

    #[test]
    fn fcntl_dupfd_is_a_dup() {
        let h = Harness::new();
        let mut ctx = h.ctx([3, 0, 10, 0, 0, 0], 3);
        let mut record = crate::record::DecodedRecord::new(
            PID,
            Personality::X64,
            72,
            "fcntl".into(),
            crate::sysent::shorthand::TD,
        );
        let out = decode_exit(
            DecoderKind::Fcntl,
            &mut ctx,
            &mut record,
            &EntryState::Nothing,
            Outcome {
                raw: 11,
                success: true,
            },
        );
        assert_eq!(ResultFormat::Fd, out.format);
        assert_eq!(vec![FdEffect::Duplicated { old: 3, new: 11 }], out.effects);
    }

    #[test]
    fn read_buffer_is_filled_at_exit() {
        let h = Harness::new();
        h.memory.add_region(PID, 0x5000, b"hello world".to_vec());
        let mut ctx = h.ctx([3, 0x5000, 64, 0, 0, 0], 3);
        let entry = decode_entry(DecoderKind::Read, &mut ctx);
        let mut record = crate::record::DecodedRecord::new(
            PID,
            Personality::X64,
            0,
            "read".into(),
            crate::sysent::shorthand::TD,
        );
        record.args = entry.args;
        assert_eq!("0x5000", record.args[1]);
        decode_exit(
            DecoderKind::Read,
            &mut ctx,
            &mut record,
            &EntryState::Nothing,
            Outcome {
                raw: 5,
                success: true,
            },
        );
        assert_eq!(vec!["3", "\"hello\"", "64"], record.args);
    }

    #[test]
    fn pipe_ends_become_tracked() {
        let h = Harness::new();
        let mut ends = 3i32.to_le_bytes().to_vec();
        ends.extend_from_slice(&4i32.to_le_bytes());
        h.memory.add_region(PID, 0x7000, ends);
        let mut ctx = h.ctx([0x7000, 0x8_0000, 0, 0, 0, 0], 2);
        let entry = decode_entry(DecoderKind::Pipe2, &mut ctx);
        let mut record = crate::record::DecodedRecord::new(
            PID,
            Personality::X64,
            293,
            "pipe2".into(),
            crate::sysent::shorthand::TD,
        );
        record.args = entry.args;
        let out = decode_exit(
            DecoderKind::Pipe2,
            &mut ctx,
            &mut record,
            &EntryState::Nothing,
            Outcome {
                raw: 0,
                success: true,
            },
        );
        assert_eq!(vec!["[3, 4]", "O_CLOEXEC"], record.args);
        assert_eq!(2, out.effects.len());
    }

    #[test]
    fn close_range_with_cloexec_keeps_descriptors() {
        let h = Harness::new();
        assert_eq!(
            "3, 4294967295, CLOSE_RANGE_CLOEXEC",
            h.entry(DecoderKind::CloseRange, [3, 0xffff_ffff, 4, 0, 0, 0], 3)
        );
        let mut ctx = h.ctx([3, 0xffff_ffff, 4, 0, 0, 0], 3);
        let ok = Outcome {
            raw: 0,
            success: true,
        };
        assert!(close_range_exit(&mut ctx, ok).effects.is_empty());
        let mut ctx = h.ctx([3, 9, 0, 0, 0, 0], 3);
        assert_eq!(
            vec![FdEffect::CloseRange { first: 3, last: 9 }],
            close_range_exit(&mut ctx, ok).effects
        );
    }
}
