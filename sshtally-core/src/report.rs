use crate::aggregate::FrequencyTable;
use crate::constants::LABEL_WIDTH;
use std::fmt::{Display, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedEntry<'a, K> {
    pub key: &'a K,
    pub count: u64,
}

/// Top entries of a table plus the total over every entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking<'a, K> {
    pub entries: Vec<RankedEntry<'a, K>>,
    pub total: u64,
}

/// Most-frequent-first listing of at most `limit` entries.
///
/// Ties keep first-seen order (stable sort). A `limit` of zero or less
/// returns no entries; `total` always covers the whole table.
pub fn rank<K>(table: &FrequencyTable<K>, limit: i64) -> Ranking<'_, K> {
    let mut entries: Vec<_> = table
        .iter()
        .map(|(key, count)| RankedEntry { key, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count));

    let keep = if limit <= 0 {
        0
    } else {
        usize::try_from(limit).unwrap_or(usize::MAX)
    };
    entries.truncate(keep);

    Ranking {
        entries,
        total: table.total(),
    }
}

/// Render a ranked listing followed by its `TOTAL` line.
pub fn render_ranking<K: Display>(ranking: &Ranking<'_, K>) -> String {
    let mut out = String::new();

    for entry in &ranking.entries {
        let _ = writeln!(
            out,
            "{:<width$} : {}",
            entry.key.to_string(),
            format_count(entry.count),
            width = LABEL_WIDTH
        );
    }
    let _ = writeln!(
        out,
        "{:<width$} : {}",
        "TOTAL",
        format_count(ranking.total),
        width = LABEL_WIDTH
    );

    out
}

/// Format a count with `,` thousands separators.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}
