use exit_result::ExitResult;

pub mod decode_command;
pub mod exit_result;
pub mod list_command;
pub mod sysdecode_options;

pub trait SysdecodeCommand {
    fn run(&mut self) -> ExitResult<()>;
}
