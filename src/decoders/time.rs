use super::{sign_extend, DecodeContext, EntryOutput, ExitOutput, Outcome, ResultFormat};
use crate::{
    record::DecodedRecord,
    sysent::TimespecLayout,
    xlat::{self, tables::CLOCK_IDS},
};

fn time_t_size(ctx: &DecodeContext, layout: TimespecLayout) -> usize {
    match layout {
        TimespecLayout::Native => ctx.personality.time_t_size(),
        TimespecLayout::Time64 => 8,
    }
}

pub fn time_entry(ctx: &mut DecodeContext) -> EntryOutput {
    EntryOutput::new(vec![ctx.ptr_arg(0)])
}

/// The result is seconds since the epoch; it is shown with the date it
/// stands for. A failed call is shown as a plain error.
pub fn time_exit(ctx: &mut DecodeContext, record: &mut DecodedRecord, outcome: Outcome) -> ExitOutput {
    if !outcome.success {
        return ExitOutput::new(ResultFormat::Decimal);
    }
    let tloc = ctx.arg_ptr(0);
    if !tloc.is_null() {
        let size = time_t_size(ctx, TimespecLayout::Native);
        let text = match ctx.read_uint_at(0, tloc, size) {
            Ok(v) => {
                let secs = sign_extend(v, size);
                match xlat::sprinttime(secs) {
                    Some(date) => format!("[{} /* {} */]", secs, date),
                    None => format!("[{}]", secs),
                }
            }
            Err(marker) => marker,
        };
        record.set_arg(0, text);
    }
    let secs = ctx.personality.signed_word(outcome.raw);
    match xlat::sprinttime(secs) {
        Some(date) => ExitOutput::new(ResultFormat::AuxString(date)),
        None => ExitOutput::new(ResultFormat::Decimal),
    }
}

pub fn clock_gettime_entry(ctx: &mut DecodeContext, _layout: TimespecLayout) -> EntryOutput {
    let clock = ctx.print_xval(ctx.arg_uint(0) as u64, CLOCK_IDS, "CLOCK_???");
    EntryOutput::new(vec![clock, ctx.ptr_arg(1)])
}

/// `tv_sec` and `tv_nsec` have the same width in every layout we decode.
pub fn clock_gettime_exit(
    ctx: &mut DecodeContext,
    record: &mut DecodedRecord,
    layout: TimespecLayout,
    outcome: Outcome,
) -> ExitOutput {
    let out = ExitOutput::new(ResultFormat::Decimal);
    let tp = ctx.arg_ptr(1);
    if !outcome.success || tp.is_null() {
        return out;
    }
    let size = time_t_size(ctx, layout);
    let text = match ctx.memory().read_vec(ctx.pid, tp, 2 * size) {
        Ok(bytes) => {
            let word = |chunk: &[u8]| {
                let mut raw = [0u8; 8];
                raw[..size].copy_from_slice(chunk);
                sign_extend(u64::from_le_bytes(raw), size)
            };
            xlat::print_timespec(word(&bytes[..size]), word(&bytes[size..]))
        }
        Err(_) => ctx.fault(1, tp),
    };
    record.set_arg(1, text);
    out
}
