//! `-e trace=` style syscall selection.

use crate::{
    kernel_abi::{canonical_syscallno, Personality, SUPPORTED_PERSONALITIES},
    sysent::SyscallFlags,
    syscall_tables,
};
use regex::Regex;
use std::{
    collections::BTreeSet,
    error::Error,
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// Class names accepted with a `%` prefix. The bare forms are also accepted
/// for the first seven, as older strace versions did.
const CLASSES: &[(&str, SyscallFlags)] = &[
    ("desc", SyscallFlags::TRACE_DESC),
    ("file", SyscallFlags::TRACE_FILE),
    ("ipc", SyscallFlags::TRACE_IPC),
    ("network", SyscallFlags::TRACE_NETWORK),
    ("process", SyscallFlags::TRACE_PROCESS),
    ("signal", SyscallFlags::TRACE_SIGNAL),
    ("memory", SyscallFlags::TRACE_MEMORY),
    ("net", SyscallFlags::TRACE_NETWORK),
    ("stat", SyscallFlags::TRACE_STAT),
    ("lstat", SyscallFlags::TRACE_LSTAT),
    ("fstat", SyscallFlags::TRACE_FSTAT),
    ("%stat", SyscallFlags::TRACE_STAT_LIKE),
    ("statfs", SyscallFlags::TRACE_STATFS),
    ("fstatfs", SyscallFlags::TRACE_FSTATFS),
    ("%statfs", SyscallFlags::TRACE_STATFS_LIKE),
    ("pure", SyscallFlags::TRACE_PURE),
    ("creds", SyscallFlags::TRACE_CREDS),
    ("clock", SyscallFlags::TRACE_CLOCK),
];

const BARE_CLASSES: usize = 7;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FilterError {
    UnknownSyscall(String),
    UnknownClass(String),
    BadRegex(String, String),
    Empty,
}

impl Display for FilterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::UnknownSyscall(s) => write!(f, "invalid system call `{}'", s),
            FilterError::UnknownClass(s) => write!(f, "invalid system call class `{}'", s),
            FilterError::BadRegex(s, e) => write!(f, "invalid regular expression `{}': {}", s, e),
            FilterError::Empty => write!(f, "empty syscall filter"),
        }
    }
}

impl Error for FilterError {}

/// A set of syscall numbers per personality, possibly negated.
#[derive(Clone, Debug)]
pub struct SyscallFilter {
    selected: Vec<BTreeSet<u32>>,
    everything: bool,
    negated: bool,
}

impl Default for SyscallFilter {
    /// Trace everything.
    fn default() -> Self {
        SyscallFilter::all()
    }
}

impl SyscallFilter {
    pub fn all() -> SyscallFilter {
        SyscallFilter {
            selected: vec![BTreeSet::new(); SUPPORTED_PERSONALITIES.len()],
            everything: true,
            negated: false,
        }
    }

    fn empty() -> SyscallFilter {
        SyscallFilter {
            everything: false,
            ..SyscallFilter::all()
        }
    }

    /// `expr` is `[trace=][!]term[,term...]`.
    pub fn parse(expr: &str) -> Result<SyscallFilter, FilterError> {
        let mut body = expr.trim();
        if let Some(rest) = body.strip_prefix("trace=") {
            body = rest;
        }
        let mut filter = SyscallFilter::empty();
        if let Some(rest) = body.strip_prefix('!') {
            filter.negated = true;
            body = rest;
        }
        if body.is_empty() {
            return Err(FilterError::Empty);
        }
        for term in body.split(',').map(str::trim) {
            if term.is_empty() {
                return Err(FilterError::Empty);
            }
            filter.add_term(term)?;
        }
        Ok(filter)
    }

    fn add_term(&mut self, term: &str) -> Result<(), FilterError> {
        match term {
            "all" => {
                self.everything = true;
                return Ok(());
            }
            "none" => return Ok(()),
            _ => (),
        }
        if let Some(pattern) = term.strip_prefix('/') {
            let re = Regex::new(pattern)
                .map_err(|e| FilterError::BadRegex(pattern.to_owned(), e.to_string()))?;
            self.select(|name, _| re.is_match(name));
            return Ok(());
        }
        if let Some(class) = term.strip_prefix('%') {
            let flag = CLASSES
                .iter()
                .find(|(name, _)| *name == class)
                .map(|(_, flag)| *flag)
                .ok_or_else(|| FilterError::UnknownClass(term.to_owned()))?;
            self.select(|_, flags| flags.contains(flag));
            return Ok(());
        }
        if let Some((_, flag)) = CLASSES[..BARE_CLASSES].iter().find(|(name, _)| *name == term) {
            let flag = *flag;
            self.select(|_, flags| flags.contains(flag));
            return Ok(());
        }
        if self.select(|name, _| name == term) == 0 {
            return Err(FilterError::UnknownSyscall(term.to_owned()));
        }
        Ok(())
    }

    /// Adds every entry of every table accepted by `pred` and returns how
    /// many were added.
    fn select<F>(&mut self, pred: F) -> usize
    where
        F: Fn(&str, SyscallFlags) -> bool,
    {
        let mut count = 0;
        for p in SUPPORTED_PERSONALITIES.iter() {
            let table = syscall_tables::registry().table_for(*p);
            let set = &mut self.selected[p.as_raw() as usize];
            for (no, d) in table.iter() {
                if pred(d.base_name(), d.flags) {
                    set.insert(no);
                    count += 1;
                }
            }
        }
        count
    }

    /// `number` may still carry ABI marker bits. Numbers with no table entry
    /// are traced only by `all` or a negated filter.
    pub fn matches(&self, personality: Personality, number: u64) -> bool {
        let canonical = canonical_syscallno(personality, number);
        let hit = self.everything
            || (canonical <= u32::MAX as u64
                && self.selected[personality.as_raw() as usize].contains(&(canonical as u32)));
        hit != self.negated
    }
}

impl FromStr for SyscallFilter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SyscallFilter::parse(s)
    }
}
