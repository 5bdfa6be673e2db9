use crate::{dispatch::DecodeError, kernel_abi::Personality};
use libc::pid_t;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter, Result};

/// Which side of the kernel boundary a stop is on.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyscallPhase {
    Entry,
    Exit,
}

impl Display for SyscallPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            SyscallPhase::Entry => write!(f, "entry"),
            SyscallPhase::Exit => write!(f, "exit"),
        }
    }
}

/// One syscall stop as reported by the controller. Consumed by a single
/// decode and not retained.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TraceEvent {
    pub pid: pid_t,
    pub personality: Personality,
    /// Raw syscall number, possibly carrying ABI marker bits.
    pub number: u64,
    pub args: [u64; 6],
    pub phase: SyscallPhase,
    pub return_value: Option<u64>,
    /// The controller could not observe the outcome (e.g. the tracee vanished
    /// before the exit stop could be read).
    pub faulted: bool,
}

/// A personality as a controller spells it: the personality number, or a name
/// such as `x86_64`. Anything else is only rejected once the stop is resolved.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPersonality {
    Number(u32),
    Name(String),
}

impl RawPersonality {
    pub fn resolve(&self) -> std::result::Result<Personality, DecodeError> {
        match self {
            RawPersonality::Number(raw) => Personality::from_raw(*raw),
            RawPersonality::Name(name) => name
                .parse()
                .map_err(|_| DecodeError::UnknownPersonalityName(name.clone())),
        }
    }
}

/// A stop as read from a trace file, before its personality is known to be
/// supported.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct RawTraceEvent {
    pub pid: pid_t,
    /// Absent means the native personality.
    #[serde(default)]
    pub personality: Option<RawPersonality>,
    #[serde(deserialize_with = "deserialize_word")]
    pub number: u64,
    #[serde(default, deserialize_with = "deserialize_args")]
    pub args: [u64; 6],
    pub phase: SyscallPhase,
    #[serde(default, deserialize_with = "deserialize_opt_word")]
    pub return_value: Option<u64>,
    #[serde(default)]
    pub faulted: bool,
}

impl RawTraceEvent {
    pub fn resolve(&self) -> std::result::Result<TraceEvent, DecodeError> {
        let personality = match &self.personality {
            Some(raw) => raw.resolve()?,
            None => Personality::default(),
        };
        Ok(TraceEvent {
            pid: self.pid,
            personality,
            number: self.number,
            args: self.args,
            phase: self.phase,
            return_value: self.return_value,
            faulted: self.faulted,
        })
    }
}

impl TraceEvent {
    pub fn entry(pid: pid_t, personality: Personality, number: u64, args: [u64; 6]) -> TraceEvent {
        TraceEvent {
            pid,
            personality,
            number,
            args,
            phase: SyscallPhase::Entry,
            return_value: None,
            faulted: false,
        }
    }

    pub fn exit(
        pid: pid_t,
        personality: Personality,
        number: u64,
        args: [u64; 6],
        return_value: u64,
    ) -> TraceEvent {
        TraceEvent {
            pid,
            personality,
            number,
            args,
            phase: SyscallPhase::Exit,
            return_value: Some(return_value),
            faulted: false,
        }
    }

    pub fn is_entry(&self) -> bool {
        self.phase == SyscallPhase::Entry
    }
}

/// Trace files may spell words as unsigned, negative, or `0x` hex strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawWord {
    Unsigned(u64),
    Signed(i64),
    Text(String),
}

impl RawWord {
    fn into_word<E: de::Error>(self) -> std::result::Result<u64, E> {
        match self {
            RawWord::Unsigned(v) => Ok(v),
            RawWord::Signed(v) => Ok(v as u64),
            RawWord::Text(s) => parse_word(&s).map_err(E::custom),
        }
    }
}

pub fn parse_word(s: &str) -> std::result::Result<u64, String> {
    let s = s.trim();
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(neg) = s.strip_prefix('-') {
        neg.parse::<i64>().ok().map(|v| v.wrapping_neg() as u64)
    } else {
        s.parse::<u64>().ok()
    };
    parsed.ok_or_else(|| format!("Could not parse `{}' as a machine word", s))
}

pub(crate) fn deserialize_word<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<u64, D::Error> {
    RawWord::deserialize(d)?.into_word()
}

fn deserialize_opt_word<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<u64>, D::Error> {
    match Option::<RawWord>::deserialize(d)? {
        Some(w) => w.into_word().map(Some),
        None => Ok(None),
    }
}

/// Fewer than six words are padded with zeroes.
fn deserialize_args<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<[u64; 6], D::Error> {
    let words = Vec::<RawWord>::deserialize(d)?;
    if words.len() > 6 {
        return Err(de::Error::invalid_length(words.len(), &"at most 6 argument words"));
    }
    let mut args = [0u64; 6];
    for (slot, w) in args.iter_mut().zip(words) {
        *slot = w.into_word()?;
    }
    Ok(args)
}
