use super::{DecodeContext, EntryOutput, EntryState, ExitOutput, Outcome, ResultFormat};
use crate::{
    fd_tracker::{FdEffect, FdHint},
    record::DecodedRecord,
    remote_ptr::{RemotePtr, Void},
    xlat::{self, tables::*},
};

const SOCKADDR_FAMILY_SIZE: usize = 2;
const SUN_PATH_MAX: usize = 108;

fn family_name(family: u64) -> String {
    match xlat::lookup_name(family, ADDRESS_FAMILIES) {
        Some(name) => name.to_owned(),
        None => family.to_string(),
    }
}

pub fn print_socket_type(ctx: &DecodeContext, value: u64) -> String {
    let kind = value & SOCK_TYPE_MASK;
    let mut terms = vec![match xlat::lookup_name(kind, SOCKET_TYPES) {
        Some(name) => name.to_owned(),
        None => xlat::hex(kind),
    }];
    let (names, residual) = xlat::flag_terms(value & !SOCK_TYPE_MASK, SOCKET_FLAGS);
    terms.extend(names.iter().map(|n| (*n).to_owned()));
    if residual != 0 {
        terms.push(xlat::hex(residual));
    }
    xlat::render_terms(value, &terms, ctx.flags.xlat_style)
}

pub fn socket_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let family = ctx.arg_uint(0) as u64;
    let args = vec![
        ctx.print_xval(family, ADDRESS_FAMILIES, "AF_???"),
        print_socket_type(ctx, ctx.arg_uint(1) as u64),
        ctx.arg_int(2).to_string(),
    ];
    EntryOutput::new(args).with_state(EntryState::Hint(FdHint::Socket(family_name(family))))
}

pub fn socket_exit(state: &EntryState, outcome: Outcome) -> ExitOutput {
    super::file::open_exit(state, outcome)
}

/// The peer address and its length are outputs; at entry only the length
/// the tracee offered is known.
fn accept_common(ctx: &mut DecodeContext) -> (Vec<String>, EntryState) {
    let len_ptr = ctx.arg_ptr(2);
    let (len_text, state) = if len_ptr.is_null() {
        ("NULL".to_owned(), EntryState::Nothing)
    } else {
        match ctx.read_uint_at(2, len_ptr, 4) {
            Ok(len) => (format!("[{}]", len), EntryState::Word(len)),
            Err(marker) => (marker, EntryState::Nothing),
        }
    };
    (vec![ctx.fd_arg(0), ctx.ptr_arg(1), len_text], state)
}

pub fn accept_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let (args, state) = accept_common(ctx);
    EntryOutput::new(args).with_state(state)
}

pub fn accept4_entry(ctx: &mut DecodeContext) -> EntryOutput {
    let (mut args, state) = accept_common(ctx);
    args.push(ctx.print_flags(ctx.arg_uint(3) as u64, SOCKET_FLAGS));
    EntryOutput::new(args).with_state(state)
}

/// `{sa_family=AF_UNIX, sun_path="..."}` for the families we know how to
/// take apart, `{sa_family=N}` otherwise.
fn print_sockaddr(ctx: &mut DecodeContext, addr: RemotePtr<Void>, len: usize) -> String {
    if len < SOCKADDR_FAMILY_SIZE {
        return format!("{}", addr);
    }
    let family = match ctx.read_uint_at(1, addr, SOCKADDR_FAMILY_SIZE) {
        Ok(f) => f,
        Err(marker) => return marker,
    };
    let family_text = ctx.print_xval(family, ADDRESS_FAMILIES, "AF_???");
    if family == 1 && len > SOCKADDR_FAMILY_SIZE {
        let path_len = (len - SOCKADDR_FAMILY_SIZE).min(SUN_PATH_MAX);
        let path_addr = match addr.checked_byte_add(SOCKADDR_FAMILY_SIZE) {
            Some(p) => p,
            None => return format!("{{sa_family={}}}", family_text),
        };
        let path = match ctx.memory().read_vec(ctx.pid, path_addr, path_len) {
            Ok(bytes) => {
                let end = memchr::memchr(0, &bytes).unwrap_or(bytes.len());
                xlat::quote_string(&bytes[..end], false)
            }
            Err(_) => ctx.fault(1, path_addr),
        };
        return format!("{{sa_family={}, sun_path={}}}", family_text, path);
    }
    format!("{{sa_family={}}}", family_text)
}

pub fn accept_exit(
    ctx: &mut DecodeContext,
    record: &mut DecodedRecord,
    state: &EntryState,
    outcome: Outcome,
) -> ExitOutput {
    let out = ExitOutput::new(ResultFormat::Fd);
    if !outcome.success {
        return out;
    }
    let addr = ctx.arg_ptr(1);
    let len_ptr = ctx.arg_ptr(2);
    if !addr.is_null() && !len_ptr.is_null() {
        match ctx.read_uint_at(2, len_ptr, 4) {
            Ok(out_len) => {
                let in_len = match state {
                    EntryState::Word(len) => *len,
                    _ => out_len,
                };
                let shown = in_len.min(out_len) as usize;
                let text = print_sockaddr(ctx, addr, shown);
                record.set_arg(1, text);
                if in_len == out_len {
                    record.set_arg(2, format!("[{}]", out_len));
                } else {
                    record.set_arg(2, format!("[{} => {}]", in_len, out_len));
                }
            }
            Err(marker) => record.set_arg(2, marker),
        }
    }
    let family = if addr.is_null() {
        None
    } else {
        ctx.memory().read_uint(ctx.pid, addr, SOCKADDR_FAMILY_SIZE).ok()
    };
    out.with_effect(FdEffect::Opened {
        fd: outcome.fd(),
        hint: Some(FdHint::Socket(family.map_or_else(|| "?".to_owned(), family_name))),
    })
}

#[cfg(test)]
mod tests {
    use super::super::{decode_entry, decode_exit, test_support::*};
    use super::*;
    use crate::{kernel_abi::Personality, sysent::DecoderKind};

    #[test]
    fn socket_arguments() {
        let h = Harness::new();
        assert_eq!(
            "AF_UNIX, SOCK_STREAM|SOCK_CLOEXEC, 0",
            h.entry(DecoderKind::Socket, [1, 0x8_0001, 0, 0, 0, 0], 3)
        );
        assert_eq!(
            "0x63 /* AF_??? */, SOCK_DGRAM, 17",
            h.entry(DecoderKind::Socket, [99, 2, 17, 0, 0, 0], 3)
        );
    }

    #[test]
    fn accept_fills_peer_address() {
        let h = Harness::new();
        let mut sun = 1u16.to_le_bytes().to_vec();
        sun.extend_from_slice(b"/tmp/sock\0");
        sun.resize(110, 0);
        h.memory.add_region(PID, 0x1000, sun);
        h.memory.add_region(PID, 0x2000, 12u32.to_le_bytes().to_vec());
        let mut ctx = h.ctx([3, 0x1000, 0x2000, 0, 0, 0], 3);
        let entry = decode_entry(DecoderKind::Accept, &mut ctx);
        assert_eq!(vec!["3", "0x1000", "[12]"], entry.args);
        let mut record =
            DecodedRecord::new(PID, Personality::X64, 43, "accept".into(), crate::sysent::shorthand::TN);
        record.args = entry.args;
        // The kernel writes back the length it used.
        h.memory.add_region(PID, 0x2000, 11u32.to_le_bytes().to_vec());
        let out = decode_exit(
            DecoderKind::Accept,
            &mut ctx,
            &mut record,
            &entry.state,
            Outcome {
                raw: 4,
                success: true,
            },
        );
        assert_eq!(
            vec!["3", "{sa_family=AF_UNIX, sun_path=\"/tmp/sock\"}", "[12 => 11]"],
            record.args
        );
        assert_eq!(
            vec![FdEffect::Opened {
                fd: 4,
                hint: Some(FdHint::Socket("AF_UNIX".into()))
            }],
            out.effects
        );
    }

    #[test]
    fn accept4_null_address() {
        let h = Harness::new();
        assert_eq!(
            "3, NULL, NULL, SOCK_NONBLOCK",
            h.entry(DecoderKind::Accept4, [3, 0, 0, 0x800, 0, 0], 4)
        );
    }
}
