use crate::{kernel_abi::Personality, sysent::SyscallFlags};
use libc::pid_t;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter, Result};

/// Where a record is in its life.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    /// Entry decoded, exit not seen yet.
    Unfinished,
    Success,
    Failed,
    /// The kernel will restart the call (`? ERESTARTSYS`).
    Restarted,
    /// The call does not come back to this image (exit, exit_group).
    NoReturn,
    /// The controller could not observe the outcome.
    Unknown,
}

/// One decoded syscall, ready to print.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DecodedRecord {
    pub pid: pid_t,
    pub number: u64,
    pub personality: Personality,
    pub name: String,
    pub args: Vec<String>,
    pub result: Option<String>,
    pub aux_comment: Option<String>,
    #[serde(serialize_with = "serialize_flags")]
    pub flags: SyscallFlags,
    /// Indexes of arguments whose memory could not be read.
    pub faults: Vec<usize>,
    pub status: CallStatus,
    /// Exit decoded without its entry half.
    pub resumed: bool,
}

fn serialize_flags<S: Serializer>(flags: &SyscallFlags, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&flags.to_string())
}

impl DecodedRecord {
    pub fn new(
        pid: pid_t,
        personality: Personality,
        number: u64,
        name: String,
        flags: SyscallFlags,
    ) -> DecodedRecord {
        DecodedRecord {
            pid,
            number,
            personality,
            name,
            args: Vec::new(),
            result: None,
            aux_comment: None,
            flags,
            faults: Vec::new(),
            status: CallStatus::Unfinished,
            resumed: false,
        }
    }

    /// Replace an argument rendered at entry. Out of range indexes are
    /// ignored: a resumed record has no entry arguments to replace.
    pub fn set_arg(&mut self, index: usize, text: String) {
        if let Some(slot) = self.args.get_mut(index) {
            *slot = text;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status != CallStatus::Unfinished
    }

    pub fn succeeded(&self) -> bool {
        self.status == CallStatus::Success
    }

    /// Whether an external cache of the tracee's mappings is stale now.
    pub fn invalidates_memory_map(&self) -> bool {
        self.succeeded() && self.flags.contains(SyscallFlags::MEMORY_MAPPING_CHANGE)
    }
}

impl Display for DecodedRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if self.resumed {
            write!(f, "<... {} resumed>", self.name)?;
        } else {
            write!(f, "{}(", self.name)?;
        }
        write!(f, "{}", self.args.join(", "))?;
        if self.status == CallStatus::Unfinished {
            return write!(f, " <unfinished ...>");
        }
        write!(f, ")")?;
        if let Some(result) = &self.result {
            write!(f, " = {}", result)?;
        }
        if let Some(comment) = &self.aux_comment {
            write!(f, " ({})", comment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sysent::shorthand::*;

    fn record() -> DecodedRecord {
        let mut r = DecodedRecord::new(1, Personality::X64, 2, "open".into(), TD | TF);
        r.args = vec!["\"/tmp/x\"".into(), "O_RDONLY".into()];
        r
    }

    #[test]
    fn strace_form() {
        let mut r = record();
        assert_eq!("open(\"/tmp/x\", O_RDONLY <unfinished ...>", r.to_string());
        r.status = CallStatus::Failed;
        r.result = Some("-1 ENOENT".into());
        r.aux_comment = Some("No such file or directory".into());
        assert_eq!(
            "open(\"/tmp/x\", O_RDONLY) = -1 ENOENT (No such file or directory)",
            r.to_string()
        );
    }

    #[test]
    fn resumed_form() {
        let mut r = record();
        r.args.clear();
        r.resumed = true;
        r.status = CallStatus::Success;
        r.result = Some("5".into());
        assert_eq!("<... open resumed>) = 5", r.to_string());
    }

    #[test]
    fn set_arg_ignores_missing_slots() {
        let mut r = record();
        r.set_arg(1, "O_WRONLY".into());
        r.set_arg(5, "x".into());
        assert_eq!(vec!["\"/tmp/x\"", "O_WRONLY"], r.args);
    }

    #[test]
    fn only_successful_mapping_calls_invalidate() {
        let mut mmap = DecodedRecord::new(1, Personality::X64, 9, "mmap".into(), TD | TM | SI);
        assert!(!mmap.invalidates_memory_map());
        mmap.status = CallStatus::Success;
        assert!(mmap.invalidates_memory_map());
        mmap.status = CallStatus::Failed;
        assert!(!mmap.invalidates_memory_map());

        let mut read = DecodedRecord::new(1, Personality::X64, 0, "read".into(), TD);
        read.status = CallStatus::Success;
        assert!(!read.invalidates_memory_map());
    }

    #[test]
    fn json_flags_are_shorthand() {
        let json = serde_json::to_value(&record()).unwrap();
        assert_eq!("TD|TF", json["flags"]);
        assert_eq!("unfinished", json["status"]);
        assert_eq!("x64", json["personality"]);
    }
}
