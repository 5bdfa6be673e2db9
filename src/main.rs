use structopt::StructOpt;
use sysdecode::{
    commands::{
        decode_command::DecodeCommand,
        exit_result::ExitResult,
        list_command::ListCommand,
        sysdecode_options::{SysdecodeOptions, SysdecodeSubCommand},
        SysdecodeCommand,
    },
    log::set_all_logging,
};

fn main() -> ExitResult<()> {
    let options = SysdecodeOptions::from_args();
    if let Some(level) = options.log_level() {
        set_all_logging(level);
    }
    match &options.cmd {
        SysdecodeSubCommand::Decode { .. } => DecodeCommand::new(&options).run(),
        SysdecodeSubCommand::List { .. } => ListCommand::new(&options).run(),
    }
}
