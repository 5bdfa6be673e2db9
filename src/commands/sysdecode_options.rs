use crate::{
    filter::SyscallFilter,
    flags::XlatStyle,
    kernel_abi::Personality,
    log::LogLevel::{self, LogDebug, LogInfo, LogWarn},
};
use std::{error::Error, path::PathBuf};
use structopt::{clap, clap::AppSettings, StructOpt};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "sysdecode",
    about = "Decode recorded syscall stops into strace-style records",
    after_help = "Use SYSDECODE_LOG to control logging; e.g. SYSDECODE_LOG=all:warn,dispatch:debug"
)]
#[structopt(global_settings = &[AppSettings::AllowNegativeNumbers, AppSettings::UnifiedHelpMessage])]
pub struct SysdecodeOptions {
    /// Maximum number of bytes of a string or buffer to print (default 32).
    #[structopt(short = "s", long, global = true, parse(try_from_str = parse_string_limit))]
    pub string_limit: Option<usize>,

    /// Maximum number of argv elements to print before `...` (default 32).
    #[structopt(long, global = true)]
    pub max_array_elements: Option<usize>,

    /// How constants are printed: `abbrev`, `raw` or `verbose`.
    #[structopt(short = "X", long, global = true)]
    pub xlat_style: Option<XlatStyle>,

    /// Print paths associated with file descriptor arguments.
    #[structopt(short = "y", long, global = true)]
    pub decode_fds: bool,

    /// Which syscalls to show, e.g. `trace=open,%network,!/^mmap`.
    #[structopt(short = "e", long = "expr", global = true)]
    pub filter: Option<SyscallFilter>,

    /// More logging: -v for warnings, -vv for info, -vvv for debug.
    /// Overrides SYSDECODE_LOG.
    #[structopt(short = "v", long = "verbose", parse(from_occurrences), global = true)]
    pub verbosity: u8,

    #[structopt(subcommand)]
    pub cmd: SysdecodeSubCommand,
}

#[derive(StructOpt, Debug, Clone)]
pub enum SysdecodeSubCommand {
    /// Replay a JSON file of syscall stops and tracee memory snapshots through
    /// the decoder.
    #[structopt(name = "decode")]
    Decode {
        /// Emit one JSON record per line instead of strace-style text
        #[structopt(short = "j", long)]
        json: bool,

        /// Print the pid in front of each record
        #[structopt(short = "f", long = "show-pid")]
        show_pid: bool,

        /// Abort with a backtrace instead of skipping a tracee that can't
        /// be decoded
        #[structopt(short = "E", long = "fatal-errors")]
        fatal_errors: bool,

        /// `-` reads standard input
        #[structopt(parse(from_os_str))]
        trace_file: PathBuf,
    },

    /// Print the syscall table of a personality.
    #[structopt(name = "list")]
    List {
        /// One of `x64`, `x86` or `x32`
        #[structopt(short = "p", long, default_value = "x64")]
        personality: Personality,
    },
}

impl SysdecodeOptions {
    /// The level `-v` asks for, if any.
    pub fn log_level(&self) -> Option<LogLevel> {
        match self.verbosity {
            0 => None,
            1 => Some(LogWarn),
            2 => Some(LogInfo),
            _ => Some(LogDebug),
        }
    }
}

fn parse_string_limit(limit: &str) -> Result<usize, Box<dyn Error>> {
    let n = limit.trim().parse::<usize>()?;
    if n == 0 {
        Err(Box::new(clap::Error::with_description(
            "string limit must be at least 1",
            clap::ErrorKind::InvalidValue,
        )))
    } else {
        Ok(n)
    }
}
