use crate::{
    commands::{
        exit_result::ExitResult,
        sysdecode_options::{SysdecodeOptions, SysdecodeSubCommand},
        SysdecodeCommand,
    },
    dispatch::SyscallDispatch,
    event::{deserialize_word, RawTraceEvent},
    fd_tracker::DescriptorTracker,
    filter::SyscallFilter,
    flags::Flags,
    log::LogLevel::{LogDebug, LogInfo, LogWarn},
    memory::SnapshotMemory,
    record::DecodedRecord,
    tracee::TraceeDecoder,
};
use libc::pid_t;
use serde::Deserialize;
use std::{
    collections::{BTreeMap, BTreeSet},
    error::Error,
    fs::File,
    io::{self, stdin, stdout, BufReader, Read, Write},
    path::PathBuf,
    sync::Arc,
};

/// Bytes of tracee memory as they were when a stop was observed.
#[derive(Deserialize)]
struct MemoryRegion {
    pid: pid_t,
    #[serde(deserialize_with = "deserialize_word")]
    addr: u64,
    bytes: RegionBytes,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RegionBytes {
    Raw(Vec<u8>),
    /// Stored with a terminating NUL.
    CString(String),
}

#[derive(Deserialize)]
struct ReplayStop {
    #[serde(flatten)]
    event: RawTraceEvent,
    /// Captured just before this stop; replaces regions at the same address.
    #[serde(default)]
    memory: Vec<MemoryRegion>,
}

#[derive(Deserialize)]
struct ReplayInput {
    #[serde(default)]
    memory: Vec<MemoryRegion>,
    events: Vec<ReplayStop>,
}

fn load_regions(memory: &SnapshotMemory, regions: Vec<MemoryRegion>) {
    for r in regions {
        match r.bytes {
            RegionBytes::Raw(bytes) => memory.add_region(r.pid, r.addr as usize, bytes),
            RegionBytes::CString(s) => memory.add_c_str(r.pid, r.addr as usize, &s),
        }
    }
}

pub struct DecodeCommand {
    trace_file: PathBuf,
    json: bool,
    show_pid: bool,
    fatal_errors: bool,
    flags: Flags,
    filter: SyscallFilter,
}

impl DecodeCommand {
    pub fn new(options: &SysdecodeOptions) -> DecodeCommand {
        match options.cmd.clone() {
            SysdecodeSubCommand::Decode {
                json,
                show_pid,
                fatal_errors,
                trace_file,
            } => DecodeCommand {
                trace_file,
                json,
                show_pid,
                fatal_errors,
                flags: Flags::from_options(options),
                filter: options.filter.clone().unwrap_or_default(),
            },
            _ => panic!("Unexpected SysdecodeSubCommand variant. Not a `Decode` variant!"),
        }
    }

    fn emit(&self, out: &mut dyn Write, record: &DecodedRecord) -> Result<(), Box<dyn Error>> {
        if !self.filter.matches(record.personality, record.number) {
            return Ok(());
        }
        if self.json {
            serde_json::to_writer(&mut *out, record)?;
            writeln!(out)?;
        } else if self.show_pid {
            writeln!(out, "[pid {:>5}] {}", record.pid, record)?;
        } else {
            writeln!(out, "{}", record)?;
        }
        Ok(())
    }

    pub fn decode(&self, input: &mut dyn Read, out: &mut dyn Write) -> Result<(), Box<dyn Error>> {
        let replay: ReplayInput = serde_json::from_reader(input)?;
        let memory = SnapshotMemory::new();
        load_regions(&memory, replay.memory);
        let dispatch = SyscallDispatch::new(self.flags.clone())
            .with_tracker(Arc::new(DescriptorTracker::new()));
        let mut tracees: BTreeMap<pid_t, TraceeDecoder> = BTreeMap::new();
        // Tracees we gave up on. Their remaining stops are skipped.
        let mut dead: BTreeSet<pid_t> = BTreeSet::new();
        let stops = replay.events.len();

        for stop in replay.events {
            load_regions(&memory, stop.memory);
            let pid = stop.event.pid;
            if dead.contains(&pid) {
                continue;
            }
            let step = stop.event.resolve().and_then(|event| {
                tracees
                    .entry(pid)
                    .or_insert_with(|| TraceeDecoder::new(pid, event.personality))
                    .on_event(&dispatch, &event, &memory)
            });
            let step = match step {
                Ok(step) => step,
                Err(e) => {
                    if self.fatal_errors {
                        fatal!("Tracee {}: {}", pid, e);
                    }
                    log!(LogWarn, "Tracee {}: {}; skipping the rest of its stops", pid, e);
                    dead.insert(pid);
                    if let Some(mut tracee) = tracees.remove(&pid) {
                        if let Some(unfinished) = tracee.on_tracee_exit(&dispatch) {
                            self.emit(out, &unfinished)?;
                        }
                    }
                    continue;
                }
            };
            if let Some(mismatch) = step.mismatch {
                log!(LogWarn, "{}", mismatch);
            }
            if step.memory_map_changed {
                log!(LogDebug, "Tracee {}: memory map changed", pid);
            }
            for record in &step.records {
                self.emit(out, record)?;
            }
        }

        if is_logging!(LogInfo) {
            let skipped: Vec<String> = dead.iter().map(|p| p.to_string()).collect();
            log!(
                LogInfo,
                "Decoded {} stops for {} tracees; skipped tracees: [{}]",
                stops,
                tracees.len() + dead.len(),
                skipped.join(", ")
            );
        }

        for (pid, mut tracee) in tracees {
            log!(LogDebug, "End of trace for {}", pid);
            if let Some(unfinished) = tracee.on_tracee_exit(&dispatch) {
                self.emit(out, &unfinished)?;
            }
        }
        out.flush()?;
        Ok(())
    }

    fn open_input(&self) -> io::Result<Box<dyn Read>> {
        if self.trace_file.as_os_str() == "-" {
            Ok(Box::new(stdin()))
        } else {
            Ok(Box::new(BufReader::new(File::open(&self.trace_file)?)))
        }
    }
}

impl SysdecodeCommand for DecodeCommand {
    fn run(&mut self) -> ExitResult<()> {
        let mut input = match self.open_input() {
            Ok(input) => input,
            Err(e) => clean_fatal!("Can't open trace file {:?}: {}", self.trace_file, e),
        };
        match self.decode(&mut input, &mut stdout().lock()) {
            Ok(()) => ExitResult::Ok(()),
            Err(e) => ExitResult::Err(e, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(json: bool, filter: Option<&str>) -> DecodeCommand {
        let mut flags = Flags::default();
        flags.decode_fds = true;
        DecodeCommand {
            trace_file: PathBuf::from("-"),
            json,
            show_pid: false,
            fatal_errors: false,
            flags,
            filter: filter.map_or_else(SyscallFilter::all, |f| SyscallFilter::parse(f).unwrap()),
        }
    }

    const TRACE: &str = r#"{
        "memory": [{"pid": 10, "addr": "0x1000", "bytes": "/tmp/x"}],
        "events": [
            {"pid": 10, "number": 2, "args": ["0x1000", 0], "phase": "entry"},
            {"pid": 10, "number": 2, "args": ["0x1000", 0], "phase": "exit", "return_value": 5},
            {"pid": 10, "number": 0, "args": [5, "0x2000", 16], "phase": "entry"},
            {"pid": 10, "number": 0, "args": [5, "0x2000", 16], "phase": "exit", "return_value": 2,
             "memory": [{"pid": 10, "addr": "0x2000", "bytes": [104, 105]}]},
            {"pid": 10, "number": 3, "args": [5], "phase": "entry"},
            {"pid": 10, "number": 3, "args": [5], "phase": "exit", "return_value": 0},
            {"pid": 10, "number": 39, "phase": "entry"}
        ]
    }"#;

    fn run(cmd: &DecodeCommand, trace: &str) -> String {
        let mut out = Vec::new();
        cmd.decode(&mut trace.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn text_output() {
        assert_eq!(
            "open(\"/tmp/x\", O_RDONLY) = 5</tmp/x>\n\
             read(5</tmp/x>, \"hi\", 16) = 2\n\
             close(5</tmp/x>) = 0\n\
             getpid( <unfinished ...>\n",
            run(&command(false, None), TRACE)
        );
    }

    #[test]
    fn filtered_output() {
        assert_eq!(
            "close(5</tmp/x>) = 0\n",
            run(&command(false, Some("trace=close")), TRACE)
        );
    }

    #[test]
    fn json_output() {
        let text = run(&command(true, Some("open")), TRACE);
        let v: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!("open", v["name"]);
        assert_eq!("5</tmp/x>", v["result"]);
        assert_eq!("success", v["status"]);
        assert_eq!("TD|TF", v["flags"]);
    }

    #[test]
    fn unsupported_personality_only_stops_its_tracee() {
        let trace = r#"{"events": [
            {"pid": 10, "number": 39, "phase": "entry"},
            {"pid": 11, "personality": "x86", "number": 20, "phase": "entry"},
            {"pid": 12, "personality": 2, "number": 1073741863, "phase": "entry"},
            {"pid": 11, "personality": "arm64", "number": 172, "phase": "exit", "return_value": 11},
            {"pid": 10, "number": 39, "phase": "exit", "return_value": 10},
            {"pid": 11, "personality": "x86", "number": 20, "phase": "entry"},
            {"pid": 12, "personality": 2, "number": 1073741863, "phase": "exit", "return_value": 12},
            {"pid": 13, "personality": 9, "number": 39, "phase": "entry"},
            {"pid": 13, "number": 39, "phase": "exit", "return_value": 13}
        ]}"#;
        assert_eq!(
            "getpid( <unfinished ...>\n\
             getpid() = 10\n\
             getpid() = 12\n",
            run(&command(false, None), trace)
        );
    }

    #[test]
    fn malformed_input_is_an_error() {
        let cmd = command(false, None);
        let mut out = Vec::new();
        assert!(cmd.decode(&mut "{\"events\": 3}".as_bytes(), &mut out).is_err());
    }
}
