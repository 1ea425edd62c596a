use once_cell::sync::Lazy;
use regex::Regex;

static FAILED_PASSWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Failed password for (?:invalid user )?(\S+) from (\d+\.\d+\.\d+\.\d+)")
        .expect("failed-password pattern is a valid regex")
});

/// One failed password attempt extracted from a log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub source_ip: String,
    pub username: String,
}

/// Extract the attempted username and source IPv4 address from a sshd
/// `Failed password for ...` line.
///
/// Lines that do not match are the common case and yield `None`; octets are
/// not range-checked.
pub fn match_line(line: &str) -> Option<LogEvent> {
    let caps = FAILED_PASSWORD.captures(line)?;

    Some(LogEvent {
        username: caps[1].to_string(),
        source_ip: caps[2].to_string(),
    })
}
