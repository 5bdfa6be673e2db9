use crate::{
    dispatch::DecodeError,
    kernel_abi::{Personality, SUPPORTED_PERSONALITIES},
    sysent::SyscallDescriptor,
};
use std::collections::BTreeMap;

pub mod common;
pub mod x32;
pub mod x64;
pub mod x86;

/// Numbers below this live in the dense part of a table. Anything at or above
/// (the x32 alternate block) goes into the sparse map.
pub const DENSE_LIMIT: u32 = 512;

/// Sparse number -> descriptor mapping for one personality. Gaps are legal
/// and mean the number is unknown or reserved for this personality.
pub struct SyscallTable {
    personality: Personality,
    dense: Vec<Option<SyscallDescriptor>>,
    sparse: BTreeMap<u32, SyscallDescriptor>,
}

impl SyscallTable {
    pub fn from_entries(
        personality: Personality,
        entries: Vec<(u32, SyscallDescriptor)>,
    ) -> SyscallTable {
        let dense_len = entries
            .iter()
            .map(|(no, _)| *no)
            .filter(|no| *no < DENSE_LIMIT)
            .max()
            .map_or(0, |max| max as usize + 1);
        let mut table = SyscallTable {
            personality,
            dense: vec![None; dense_len],
            sparse: BTreeMap::new(),
        };
        for (no, descriptor) in entries {
            let previous = if no < DENSE_LIMIT {
                table.dense[no as usize].replace(descriptor)
            } else {
                table.sparse.insert(no, descriptor)
            };
            assert!(
                previous.is_none(),
                "Syscall number {} appears twice in the {} table",
                no,
                personality
            );
        }
        table
    }

    pub fn personality(&self) -> Personality {
        self.personality
    }

    /// `number` must already be canonical (see `canonical_syscallno`).
    pub fn lookup(&self, number: u64) -> Option<&SyscallDescriptor> {
        if number < DENSE_LIMIT as u64 {
            self.dense.get(number as usize).and_then(|d| d.as_ref())
        } else if number <= u32::MAX as u64 {
            self.sparse.get(&(number as u32))
        } else {
            None
        }
    }

    /// Entries in ascending number order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &SyscallDescriptor)> {
        self.dense
            .iter()
            .enumerate()
            .filter_map(|(no, d)| d.as_ref().map(|d| (no as u32, d)))
            .chain(self.sparse.iter().map(|(no, d)| (*no, d)))
    }

    pub fn len(&self) -> usize {
        self.dense.iter().filter(|d| d.is_some()).count() + self.sparse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exact display-name match first. A `#64` entry is only found by its full
    /// name, so `execve` on x32 resolves to the x32-specific number.
    pub fn find_by_name(&self, name: &str) -> Option<u32> {
        self.iter().find(|(_, d)| d.name == name).map(|(no, _)| no)
    }
}

/// One table per supported personality. Built once, then read-only.
pub struct PersonalityRegistry {
    tables: Vec<SyscallTable>,
}

impl PersonalityRegistry {
    pub fn new() -> PersonalityRegistry {
        let tables = SUPPORTED_PERSONALITIES
            .iter()
            .map(|p| {
                let entries = match p {
                    Personality::X64 => x64::syscall_entries(),
                    Personality::X86 => x86::syscall_entries(),
                    Personality::X32 => x32::syscall_entries(),
                };
                SyscallTable::from_entries(*p, entries)
            })
            .collect();
        PersonalityRegistry { tables }
    }

    pub fn table_for(&self, personality: Personality) -> &SyscallTable {
        &self.tables[personality.as_raw() as usize]
    }

    /// Resolve a personality number as reported by a controller.
    pub fn resolve_table(&self, raw_personality: u32) -> Result<&SyscallTable, DecodeError> {
        Personality::from_raw(raw_personality).map(|p| self.table_for(p))
    }
}

impl Default for PersonalityRegistry {
    fn default() -> Self {
        PersonalityRegistry::new()
    }
}

lazy_static! {
    static ref REGISTRY: PersonalityRegistry = PersonalityRegistry::new();
}

pub fn registry() -> &'static PersonalityRegistry {
    &REGISTRY
}

pub fn lookup(personality: Personality, number: u64) -> Option<&'static SyscallDescriptor> {
    registry().table_for(personality).lookup(number)
}

/// Display name, or `syscall_0x..` for numbers the personality does not define.
pub fn syscall_name(personality: Personality, number: u64) -> String {
    match lookup(personality, number) {
        Some(d) => d.name.to_owned(),
        None => unknown_syscall_name(number),
    }
}

pub fn unknown_syscall_name(number: u64) -> String {
    format!("syscall_{:#x}", number)
}

pub fn syscall_number(personality: Personality, name: &str) -> Option<u32> {
    registry().table_for(personality).find_by_name(name)
}
