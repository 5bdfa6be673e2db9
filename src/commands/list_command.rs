use crate::{
    commands::{
        exit_result::ExitResult,
        sysdecode_options::{SysdecodeOptions, SysdecodeSubCommand},
        SysdecodeCommand,
    },
    filter::SyscallFilter,
    kernel_abi::Personality,
    syscall_tables,
};
use std::io::{self, stdout, Write};

pub struct ListCommand {
    personality: Personality,
    filter: SyscallFilter,
}

impl ListCommand {
    pub fn new(options: &SysdecodeOptions) -> ListCommand {
        match options.cmd.clone() {
            SysdecodeSubCommand::List { personality } => ListCommand {
                personality,
                filter: options.filter.clone().unwrap_or_default(),
            },
            _ => panic!("Unexpected SysdecodeSubCommand variant. Not a `List` variant!"),
        }
    }

    fn list(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "NR\tNARGS\tNAME\tFLAGS")?;
        let table = syscall_tables::registry().table_for(self.personality);
        for (no, d) in table.iter() {
            if !self.filter.matches(self.personality, no as u64) {
                continue;
            }
            writeln!(out, "{}\t{}\t{}\t{}", no, d.nargs, d.name, d.flags)?;
        }
        Ok(())
    }
}

impl SysdecodeCommand for ListCommand {
    fn run(&mut self) -> ExitResult<()> {
        match self.list(&mut stdout().lock()) {
            Ok(()) => ExitResult::Ok(()),
            Err(e) => ExitResult::err_from(e, 1),
        }
    }
}
