use crate::commands::sysdecode_options::SysdecodeOptions;
use std::str::FromStr;

/// How symbolic constants are rendered (strace's `-X`).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum XlatStyle {
    /// `O_RDONLY|O_CLOEXEC`
    Abbrev,
    /// `0x80000`
    Raw,
    /// `0x80000 /* O_RDONLY|O_CLOEXEC */`
    Verbose,
}

impl Default for XlatStyle {
    fn default() -> Self {
        XlatStyle::Abbrev
    }
}

impl FromStr for XlatStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<XlatStyle, String> {
        match s {
            "abbrev" => Ok(XlatStyle::Abbrev),
            "raw" => Ok(XlatStyle::Raw),
            "verbose" => Ok(XlatStyle::Verbose),
            _ => Err(format!(
                "Unknown xlat style `{}'. Expected one of `abbrev`, `raw` or `verbose`",
                s
            )),
        }
    }
}

/// Decoding knobs. Shared read-only by every decode.
#[derive(Clone, Debug)]
pub struct Flags {
    /// Maximum number of bytes of a data buffer or non-path string to print.
    pub string_limit: usize,
    /// Maximum number of bytes probed when reading a path. Paths longer than
    /// this are shown truncated with a trailing `...`.
    pub max_path_probe: usize,
    /// Maximum number of elements of an argv style array to print.
    pub max_array_elements: usize,
    pub xlat_style: XlatStyle,
    /// Annotate file descriptors with the path they were opened from.
    pub decode_fds: bool,
}

impl Default for Flags {
    fn default() -> Self {
        Flags {
            string_limit: 32,
            max_path_probe: libc::PATH_MAX as usize,
            max_array_elements: 32,
            xlat_style: XlatStyle::Abbrev,
            decode_fds: false,
        }
    }
}

impl Flags {
    pub fn from_options(options: &SysdecodeOptions) -> Flags {
        let defaults = Flags::default();
        Flags {
            string_limit: options.string_limit.unwrap_or(defaults.string_limit),
            max_path_probe: defaults.max_path_probe,
            max_array_elements: options
                .max_array_elements
                .unwrap_or(defaults.max_array_elements),
            xlat_style: options.xlat_style.unwrap_or(defaults.xlat_style),
            decode_fds: options.decode_fds,
        }
    }
}
