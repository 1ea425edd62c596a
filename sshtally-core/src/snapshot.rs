use crate::aggregate::{FrequencyTable, JointKey};
use crate::error::SnapshotError;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::Hash;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Textual form of a table key inside a snapshot.
pub trait SnapshotKey: Sized {
    fn encode(&self) -> String;
    fn decode(raw: &str) -> Result<Self, SnapshotError>;
}

impl SnapshotKey for String {
    fn encode(&self) -> String {
        self.clone()
    }

    fn decode(raw: &str) -> Result<Self, SnapshotError> {
        Ok(raw.to_string())
    }
}

impl SnapshotKey for JointKey {
    fn encode(&self) -> String {
        self.to_string()
    }

    fn decode(raw: &str) -> Result<Self, SnapshotError> {
        raw.parse()
    }
}

/// One table flattened to `(key, count)` pairs, least frequent first.
///
/// Serialized as a single JSON object whose members keep this order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    entries: Vec<(String, u64)>,
}

impl Snapshot {
    /// Ascending by count; ties keep first-seen order.
    pub fn from_table<K: SnapshotKey>(table: &FrequencyTable<K>) -> Self {
        let mut entries: Vec<_> = table.iter().map(|(k, c)| (k.encode(), c)).collect();
        entries.sort_by_key(|(_, count)| *count);
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, u64)] {
        &self.entries
    }

    pub fn into_table<K>(self) -> Result<FrequencyTable<K>, SnapshotError>
    where
        K: SnapshotKey + Eq + Hash + Clone,
    {
        self.entries
            .into_iter()
            .map(|(raw, count)| Ok((K::decode(&raw)?, count)))
            .collect()
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, count) in &self.entries {
            map.serialize_entry(key, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SnapshotVisitor;

        impl<'de> Visitor<'de> for SnapshotVisitor {
            type Value = Snapshot;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of keys to attempt counts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Snapshot, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, count)) = access.next_entry::<String, u64>()? {
                    entries.push((key, count));
                }
                Ok(Snapshot { entries })
            }
        }

        deserializer.deserialize_map(SnapshotVisitor)
    }
}

/// Write `snapshot` to `dir/artifact`, replacing any previous file atomically.
///
/// The JSON is written to a temp file in `dir` and renamed over the target,
/// so a failure leaves the old artifact in place. `dir` must exist.
pub fn write_snapshot(
    dir: &Path,
    artifact: &str,
    snapshot: &Snapshot,
) -> Result<PathBuf, SnapshotError> {
    let path = dir.join(artifact);

    let mut body =
        serde_json::to_vec_pretty(snapshot).map_err(|source| SnapshotError::Encode {
            artifact: artifact.to_string(),
            source,
        })?;
    body.push(b'\n');

    let mut tmp =
        NamedTempFile::new_in(dir).map_err(|e| SnapshotError::write(artifact, &path, e))?;
    tmp.write_all(&body)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| SnapshotError::write(artifact, &path, e))?;
    tmp.persist(&path)
        .map_err(|e| SnapshotError::write(artifact, &path, e.error))?;

    tracing::info!(
        artifact,
        path = %path.display(),
        entries = snapshot.entries.len(),
        "snapshot written"
    );

    Ok(path)
}

pub fn read_snapshot(path: &Path) -> Result<Snapshot, SnapshotError> {
    let raw = std::fs::read(path).map_err(|source| SnapshotError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_slice(&raw).map_err(|source| SnapshotError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a snapshot back into a table with typed keys.
pub fn read_table<K>(path: &Path) -> Result<FrequencyTable<K>, SnapshotError>
where
    K: SnapshotKey + Eq + Hash + Clone,
{
    read_snapshot(path)?.into_table()
}
