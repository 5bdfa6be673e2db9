use super::{DecodeContext, EntryOutput};
use crate::{
    remote_ptr::PAGE_SIZE,
    sysent::MmapCallingSemantics,
    xlat::{self, tables::*},
};

fn print_map_flags(ctx: &DecodeContext, value: u64) -> String {
    let kind = value & MAP_TYPE;
    let mut terms = vec![match xlat::lookup_name(kind, MMAP_TYPES) {
        Some(name) => name.to_owned(),
        None => xlat::hex(kind),
    }];
    let (names, residual) = xlat::flag_terms(value & !MAP_TYPE, MMAP_FLAGS);
    terms.extend(names.iter().map(|n| (*n).to_owned()));
    if residual != 0 {
        terms.push(xlat::hex(residual));
    }
    xlat::render_terms(value, &terms, ctx.flags.xlat_style)
}

fn print_addr(value: u64) -> String {
    if value == 0 {
        "NULL".into()
    } else {
        format!("{:#x}", value)
    }
}

/// `words` are addr, length, prot, flags, fd, offset-in-bytes.
fn print_mmap_args(ctx: &DecodeContext, words: [u64; 6]) -> Vec<String> {
    vec![
        print_addr(words[0]),
        words[1].to_string(),
        ctx.print_flags(words[2] as u32 as u64, MMAP_PROT),
        print_map_flags(ctx, words[3] as u32 as u64),
        (words[4] as u32 as i32).to_string(),
        xlat::hex(words[5]),
    ]
}

pub fn mmap_entry(ctx: &mut DecodeContext, semantics: MmapCallingSemantics) -> EntryOutput {
    let mut words = [0u64; 6];
    match semantics {
        MmapCallingSemantics::StructArguments => {
            let block = ctx.arg_ptr(0);
            let word_size = ctx.personality.word_size();
            match ctx.memory().read_vec(ctx.pid, block, 6 * word_size) {
                Ok(bytes) => {
                    for (slot, chunk) in words.iter_mut().zip(bytes.chunks(word_size)) {
                        let mut raw = [0u8; 8];
                        raw[..word_size].copy_from_slice(chunk);
                        *slot = u64::from_le_bytes(raw);
                    }
                }
                Err(_) => return EntryOutput::new(vec![ctx.fault(0, block)]),
            }
        }
        MmapCallingSemantics::RegisterArguments => {
            for (i, slot) in words.iter_mut().enumerate() {
                *slot = ctx.arg(i);
            }
        }
        MmapCallingSemantics::RegisterArgumentsPageOffset => {
            for (i, slot) in words.iter_mut().enumerate() {
                *slot = ctx.arg(i);
            }
            words[5] = words[5].wrapping_mul(PAGE_SIZE as u64);
        }
    }
    EntryOutput::new(print_mmap_args(ctx, words))
}

pub fn munmap_entry(ctx: &mut DecodeContext) -> EntryOutput {
    EntryOutput::new(vec![print_addr(ctx.arg(0)), ctx.arg(1).to_string()])
}

pub fn mprotect_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let prot = ctx.print_flags(ctx.arg_uint(2) as u64, MMAP_PROT);
    EntryOutput::new(vec![print_addr(ctx.arg(0)), ctx.arg(1).to_string(), prot])
}

pub fn brk_entry(ctx: &mut DecodeContext) -> EntryOutput {
    EntryOutput::new(vec![print_addr(ctx.arg(0))])
}
