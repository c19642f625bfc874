//! Append-only CSV audit trail of moderation actions.
//!
//! One file per UTC day, `<dir>/YYYY-MM-DD.csv`, starting with a header row.

use chrono::{DateTime, Utc};
use hush_types::Timestamp;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

const HEADER: &str = "Timestamp,ActionType,Initiator,Target,CurrentVotes,GuildID";

/// Initiator recorded for actions the bot takes on its own.
pub const SYSTEM_INITIATOR: &str = "System";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuditAction {
    Vote,
    Mute,
    Unmute,
    Clean,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Vote => "VOTE",
            AuditAction::Mute => "MUTE",
            AuditAction::Unmute => "UNMUTE",
            AuditAction::Clean => "CLEAN",
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuditEntry {
    pub at: Timestamp,
    pub action: AuditAction,
    pub initiator: String,
    pub target: String,
    pub votes: usize,
    pub guild: String,
}

#[derive(Debug)]
pub struct AuditLog {
    dir: PathBuf,
    /// Held across the header check and the append.
    write: Mutex<()>,
}

impl AuditLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Appends `entry` to the file for its day, writing the header first
    /// when the file is new.
    pub fn append(&self, entry: &AuditEntry) -> io::Result<()> {
        let at = utc(entry.at);
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{}.csv", at.format("%Y-%m-%d")));

        let _guard = self.write.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut buf = String::new();
        if file.metadata()?.len() == 0 {
            buf.push_str(HEADER);
            buf.push('\n');
        }
        let votes = entry.votes.to_string();
        let stamp = at.format("%Y-%m-%d %H:%M:%S").to_string();
        let row: [&str; 6] = [
            stamp.as_str(),
            entry.action.as_str(),
            &entry.initiator,
            &entry.target,
            &votes,
            &entry.guild,
        ];
        buf.push_str(
            &row.iter()
                .map(|field| escape_field(field))
                .collect::<Vec<_>>()
                .join(","),
        );
        buf.push('\n');
        file.write_all(buf.as_bytes())
    }

    /// Like [`append`](Self::append), but failures are only logged.
    pub fn record(&self, entry: &AuditEntry) {
        if let Err(e) = self.append(entry) {
            tracing::warn!(
                dir = %self.dir.display(),
                action = entry.action.as_str(),
                error = %e,
                "failed to write audit entry"
            );
        }
    }
}

fn utc(at: Timestamp) -> DateTime<Utc> {
    let secs = i64::try_from(at.as_secs()).unwrap_or(i64::MAX);
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

/// Quotes a field when it contains a separator, a quote or a line break.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(at: u64, action: AuditAction, target: &str) -> AuditEntry {
        AuditEntry {
            at: Timestamp::new(at),
            action,
            initiator: "alice".into(),
            target: target.into(),
            votes: 3,
            guild: "g1".into(),
        }
    }

    #[test]
    fn writes_header_once_per_day_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path());

        // 2023-11-14T22:13:20Z
        log.append(&entry(1_700_000_000, AuditAction::Vote, "bob")).unwrap();
        log.append(&entry(1_700_000_060, AuditAction::Mute, "bob")).unwrap();

        let text = fs::read_to_string(dir.path().join("2023-11-14.csv")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[1], "2023-11-14 22:13:20,VOTE,alice,bob,3,g1");
        assert_eq!(lines[2], "2023-11-14 22:14:20,MUTE,alice,bob,3,g1");
    }

    #[test]
    fn concurrent_first_writes_share_one_header() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path());

        std::thread::scope(|scope| {
            for i in 0..8 {
                let log = &log;
                scope.spawn(move || {
                    log.append(&entry(1_700_000_000 + i, AuditAction::Vote, "bob"))
                        .unwrap();
                });
            }
        });

        let text = fs::read_to_string(dir.path().join("2023-11-14.csv")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines.iter().filter(|l| **l == HEADER).count(), 1);
        assert_eq!(lines[0], HEADER);
    }

    #[test]
    fn new_day_starts_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = AuditLog::new(dir.path());
        log.append(&entry(1_700_000_000, AuditAction::Vote, "bob")).unwrap();
        log.append(&entry(1_700_000_000 + 86_400, AuditAction::Unmute, "bob")).unwrap();

        assert!(dir.path().join("2023-11-14.csv").exists());
        let next = fs::read_to_string(dir.path().join("2023-11-15.csv")).unwrap();
        assert!(next.starts_with(HEADER));
    }

    #[test]
    fn awkward_names_are_quoted() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn record_swallows_errors() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, b"x").unwrap();

        let log = AuditLog::new(&blocker);
        assert!(log.append(&entry(0, AuditAction::Clean, "bob")).is_err());
        log.record(&entry(0, AuditAction::Clean, "bob"));
    }
}
