//! Rendering helpers shared by the decoders. Every function here is total: it
//! always produces some text and never panics on odd input.

use crate::{flags::XlatStyle, kernel_metadata::signal_name};
use std::fmt::Write;

pub mod tables;

/// A table of (value, symbolic name). For bit sets, multi-bit names must
/// precede the single bits they cover.
pub type Xlat = [(u64, &'static str)];

/// `0` for zero, `0x..` otherwise.
pub fn hex(value: u64) -> String {
    if value == 0 {
        "0".into()
    } else {
        format!("{:#x}", value)
    }
}

pub fn lookup_name(value: u64, xlat: &Xlat) -> Option<&'static str> {
    xlat.iter().find(|(v, _)| *v == value).map(|(_, n)| *n)
}

/// Split `value` into the names of the known bits it contains and the bits
/// no table entry accounts for.
pub fn flag_terms(value: u64, xlat: &Xlat) -> (Vec<&'static str>, u64) {
    let mut names = Vec::new();
    let mut remaining = value;
    for (bits, name) in xlat.iter() {
        if *bits != 0 && remaining & bits == *bits {
            names.push(*name);
            remaining &= !bits;
        }
    }
    (names, remaining)
}

/// Render already computed symbolic terms for `raw` in the requested style.
/// With no terms the value is printed numerically in every style.
pub fn render_terms(raw: u64, terms: &[String], style: XlatStyle) -> String {
    if terms.is_empty() {
        return hex(raw);
    }
    match style {
        XlatStyle::Abbrev => terms.join("|"),
        XlatStyle::Raw => hex(raw),
        XlatStyle::Verbose => format!("{} /* {} */", hex(raw), terms.join("|")),
    }
}

/// Bit set to `NAME|NAME|0x..`. Unknown bits are kept as a residual hex term.
pub fn print_flags(value: u64, xlat: &Xlat, style: XlatStyle) -> String {
    if value == 0 {
        return match lookup_name(0, xlat) {
            Some(name) => render_terms(0, &[name.to_owned()], style),
            None => "0".into(),
        };
    }
    let (names, residual) = flag_terms(value, xlat);
    if names.is_empty() {
        return hex(value);
    }
    let mut terms: Vec<String> = names.iter().map(|n| (*n).to_owned()).collect();
    if residual != 0 {
        terms.push(hex(residual));
    }
    render_terms(value, &terms, style)
}

/// Inverse of `print_flags` in `Abbrev` style.
pub fn parse_flags(text: &str, xlat: &Xlat) -> Option<u64> {
    let mut value = 0u64;
    for term in text.split('|') {
        let term = term.trim();
        if let Some(hex) = term.strip_prefix("0x") {
            value |= u64::from_str_radix(hex, 16).ok()?;
        } else if term == "0" {
            continue;
        } else {
            value |= xlat.iter().find(|(_, n)| *n == term)?.0;
        }
    }
    Some(value)
}

/// Enumerated constant. Unknown values still print their number, followed by
/// a comment holding `unknown` (e.g. `SEEK_???`) when one is given.
pub fn print_xval(value: u64, xlat: &Xlat, style: XlatStyle, unknown: Option<&str>) -> String {
    match lookup_name(value, xlat) {
        Some(name) => render_terms(value, &[name.to_owned()], style),
        None => match (unknown, style) {
            (Some(placeholder), XlatStyle::Abbrev) | (Some(placeholder), XlatStyle::Verbose) => {
                format!("{} /* {} */", hex(value), placeholder)
            }
            _ => hex(value),
        },
    }
}

/// Signal number: `SIGKILL`, `9`, or `9 /* SIGKILL */`.
pub fn print_signal(sig: i32, style: XlatStyle) -> String {
    let name = signal_name(sig);
    if name.parse::<i32>().is_ok() {
        return name;
    }
    match style {
        XlatStyle::Abbrev => name,
        XlatStyle::Raw => sig.to_string(),
        XlatStyle::Verbose => format!("{} /* {} */", sig, name),
    }
}

/// Seconds since the epoch as `YYYY-MM-DDTHH:MM:SS+0000` (UTC). `None` when
/// the value is out of the range the C library can break down.
pub fn sprinttime(secs: i64) -> Option<String> {
    let t = secs as libc::time_t;
    if t as i64 != secs {
        return None;
    }
    let mut tm: libc::tm = unsafe { std::mem::zeroed() };
    // Safe: both pointers refer to live locals.
    let res = unsafe { libc::gmtime_r(&t, &mut tm) };
    if res.is_null() {
        return None;
    }
    Some(format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}+0000",
        tm.tm_year as i64 + 1900,
        tm.tm_mon + 1,
        tm.tm_mday,
        tm.tm_hour,
        tm.tm_min,
        tm.tm_sec
    ))
}

pub fn print_timespec(sec: i64, nsec: i64) -> String {
    format!("{{tv_sec={}, tv_nsec={}}}", sec, nsec)
}

/// C-style quoted string with escapes, followed by `...` when `truncated`.
/// Non-printable bytes use octal escapes, padded to three digits only when the
/// next byte is a digit.
pub fn quote_string(bytes: &[u8], truncated: bool) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('"');
    for (i, b) in bytes.iter().enumerate() {
        match *b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\t' => out.push_str("\\t"),
            b'\r' => out.push_str("\\r"),
            0x0b => out.push_str("\\v"),
            0x0c => out.push_str("\\f"),
            0x20..=0x7e => out.push(*b as char),
            _ => {
                let next_is_digit = bytes.get(i + 1).map_or(false, |n| n.is_ascii_digit());
                if next_is_digit {
                    write!(out, "\\{:03o}", b).unwrap_or(());
                } else {
                    write!(out, "\\{:o}", b).unwrap_or(());
                }
            }
        }
    }
    out.push('"');
    if truncated {
        out.push_str("...");
    }
    out
}

/// At most `limit` bytes of `bytes`, quoted.
pub fn print_bounded(bytes: &[u8], limit: usize) -> String {
    if bytes.len() > limit {
        quote_string(&bytes[..limit], true)
    } else {
        quote_string(bytes, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIVE_BITS: &Xlat = &[(0x1, "A"), (0x2, "B"), (0x4, "C"), (0x8, "D"), (0x10, "E")];

    #[test]
    fn all_known_bits_have_no_residual() {
        let s = print_flags(0x1f, FIVE_BITS, XlatStyle::Abbrev);
        assert_eq!("A|B|C|D|E", s);
        assert_eq!(Some(0x1f), parse_flags(&s, FIVE_BITS));
    }

    #[test]
    fn unknown_bits_become_residual() {
        let s = print_flags(0xffff_ffff, FIVE_BITS, XlatStyle::Abbrev);
        assert_eq!("A|B|C|D|E|0xffffffe0", s);
        assert_eq!(Some(0xffff_ffff), parse_flags(&s, FIVE_BITS));
    }

    #[test]
    fn styles() {
        assert_eq!("0x3", print_flags(3, FIVE_BITS, XlatStyle::Raw));
        assert_eq!("0x3 /* A|B */", print_flags(3, FIVE_BITS, XlatStyle::Verbose));
        assert_eq!("0x40", print_flags(0x40, FIVE_BITS, XlatStyle::Abbrev));
        assert_eq!("0", print_flags(0, FIVE_BITS, XlatStyle::Abbrev));
        assert_eq!(
            "F_OK",
            print_flags(0, tables::ACCESS_MODES, XlatStyle::Abbrev)
        );
    }

    #[test]
    fn multi_bit_names_win() {
        assert_eq!(
            "O_SYNC",
            print_flags(0x101000, tables::OPEN_FLAGS, XlatStyle::Abbrev)
        );
        assert_eq!(
            "O_DSYNC",
            print_flags(0x1000, tables::OPEN_FLAGS, XlatStyle::Abbrev)
        );
    }

    #[test]
    fn xval_fallback() {
        assert_eq!(
            "SEEK_END",
            print_xval(2, tables::SEEK_WHENCE, XlatStyle::Abbrev, Some("SEEK_???"))
        );
        assert_eq!(
            "0x2a /* SEEK_??? */",
            print_xval(42, tables::SEEK_WHENCE, XlatStyle::Abbrev, Some("SEEK_???"))
        );
        assert_eq!(
            "0x2a",
            print_xval(42, tables::SEEK_WHENCE, XlatStyle::Abbrev, None)
        );
        assert_eq!(
            "0x1 /* SEEK_CUR */",
            print_xval(1, tables::SEEK_WHENCE, XlatStyle::Verbose, None)
        );
    }

    #[test]
    fn signals() {
        assert_eq!("SIGTERM", print_signal(15, XlatStyle::Abbrev));
        assert_eq!("15", print_signal(15, XlatStyle::Raw));
        assert_eq!("15 /* SIGTERM */", print_signal(15, XlatStyle::Verbose));
        assert_eq!("200", print_signal(200, XlatStyle::Verbose));
    }

    #[test]
    fn calendar_time() {
        assert_eq!(
            Some("2023-11-14T22:13:20+0000".to_owned()),
            sprinttime(1_700_000_000)
        );
        assert_eq!(Some("1970-01-01T00:00:00+0000".to_owned()), sprinttime(0));
        assert_eq!(None, sprinttime(i64::MAX));
    }

    #[test]
    fn quoting() {
        assert_eq!(r#""a\"b\\c\n""#, quote_string(b"a\"b\\c\n", false));
        assert_eq!(r#""\0\0011""#, quote_string(b"\0\x011", false));
        assert_eq!("\"\\377\"...", quote_string(b"\xff", true));
        assert_eq!("\"abc\"...", print_bounded(b"abcdef", 3));
        assert_eq!("\"abc\"", print_bounded(b"abc", 3));
    }

    #[test]
    fn timespec() {
        assert_eq!("{tv_sec=1, tv_nsec=2}", print_timespec(1, 2));
        assert_eq!("{tv_sec=-1, tv_nsec=0}", print_timespec(-1, 0));
    }
}
