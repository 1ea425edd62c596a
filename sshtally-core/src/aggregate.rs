use crate::error::SnapshotError;
use crate::matcher::{LogEvent, match_line};
use ahash::AHashMap;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

/// Key -> count mapping that remembers the order keys were first seen.
///
/// Counts only ever grow. First-seen order is the secondary sort key for
/// both the console ranking and the persisted snapshot.
#[derive(Debug, Clone)]
pub struct FrequencyTable<K> {
    slots: AHashMap<K, usize>,
    entries: Vec<(K, u64)>,
}

impl<K> Default for FrequencyTable<K> {
    fn default() -> Self {
        Self {
            slots: AHashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> FrequencyTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, key: K) {
        self.add(key, 1);
    }

    pub fn add(&mut self, key: K, count: u64) {
        match self.slots.get(&key) {
            Some(&slot) => self.entries[slot].1 += count,
            None => {
                self.slots.insert(key.clone(), self.entries.len());
                self.entries.push((key, count));
            }
        }
    }

    pub fn get(&self, key: &K) -> u64 {
        self.slots
            .get(key)
            .map(|&slot| self.entries[slot].1)
            .unwrap_or(0)
    }
}

impl<K> FrequencyTable<K> {
    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.entries.iter().map(|(k, c)| (k, *c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, c)| *c).sum()
    }
}

impl<K: Eq + Hash + Clone> FromIterator<(K, u64)> for FrequencyTable<K> {
    fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (key, count) in iter {
            table.add(key, count);
        }
        table
    }
}

/// Source address and attempted username of one attempt, counted together.
///
/// Encoded as `ip,username`. Decoding splits at the first comma, which an
/// IPv4 address never contains.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JointKey {
    pub source_ip: String,
    pub username: String,
}

impl JointKey {
    pub fn new(source_ip: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            source_ip: source_ip.into(),
            username: username.into(),
        }
    }
}

impl fmt::Display for JointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.source_ip, self.username)
    }
}

impl FromStr for JointKey {
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(',') {
            Some((ip, user)) if !ip.is_empty() && !user.is_empty() => Ok(Self::new(ip, user)),
            _ => Err(SnapshotError::InvalidKey { key: s.to_string() }),
        }
    }
}

/// Everything accumulated over one scan of the log capture.
#[derive(Debug, Clone, Default)]
pub struct AggregateState {
    pub by_ip: FrequencyTable<String>,
    pub by_user: FrequencyTable<String>,
    pub by_pair: FrequencyTable<JointKey>,
    pub attempts: u64,
}

impl AggregateState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: LogEvent) {
        self.attempts += 1;
        self.by_pair
            .increment(JointKey::new(event.source_ip.clone(), event.username.clone()));
        self.by_ip.increment(event.source_ip);
        self.by_user.increment(event.username);
    }

    /// Match one raw line and apply it. Returns whether the line was counted.
    pub fn ingest(&mut self, line: &str) -> bool {
        match match_line(line) {
            Some(event) => {
                self.apply(event);
                true
            }
            None => false,
        }
    }
}
