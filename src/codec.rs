//! Event log line codec.
//!
//! One event per line:
//!
//! ```text
//! [2014-07-13T19:24:09] ADD: (414a4ec94c5b4c0f859b5f7cf721fceba05b4d84) 2014-05-05 05:07 Bam!
//! ```

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDateTime, Timelike};
use chrono_tz::Tz;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::activity::{self, Activity};
use crate::error::{Error, Result};

/// Rendering of the wall-clock append time, second precision.
pub const LOG_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const LINE_PATTERN: &str = r"^\[(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2})\] ([^:]+): \(([0-9a-f]+)\) (\d{4}-\d{2}-\d{2} \d{2}:\d{2} .*)$";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    Add,
    Delete,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Add => "ADD",
            EventKind::Delete => "DELETE",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "ADD" => Some(EventKind::Add),
            "DELETE" => Some(EventKind::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub log_time: DateTime<Tz>,
    pub kind: EventKind,
    /// Full digest of the referenced activity as written in the log.
    pub id: String,
    pub activity: Activity,
}

impl Event {
    /// Build an event for `activity`, deriving its id and truncating the log
    /// time to whole seconds.
    pub fn new(kind: EventKind, activity: Activity, log_time: DateTime<Tz>) -> Self {
        let log_time = log_time.with_nanosecond(0).unwrap_or(log_time);
        Self {
            log_time,
            kind,
            id: activity.digest(),
            activity,
        }
    }

    /// Encode as one newline-terminated log line.
    pub fn encode(&self) -> String {
        format!(
            "[{}] {}: ({}) {}\n",
            self.log_time.format(LOG_TIME_FORMAT),
            self.kind,
            self.id,
            self.activity.rendered()
        )
    }

    /// Decode one log line (with or without its trailing newline).
    pub fn decode(line: &str, tz: Tz) -> Result<Self> {
        let line = line.trim_end_matches(['\n', '\r']);
        let captures = line_pattern()
            .captures(line)
            .ok_or_else(|| Error::UnparseableLogLine(line.to_string()))?;

        let log_time = NaiveDateTime::parse_from_str(&captures[1], LOG_TIME_FORMAT)
            .ok()
            .and_then(|naive| activity::localize(tz, naive))
            .ok_or_else(|| {
                Error::UnparseableLogLine(format!("bad log time '{}'", &captures[1]))
            })?;
        let kind = EventKind::parse(&captures[2]).ok_or_else(|| {
            Error::UnparseableLogLine(format!("unknown event kind '{}'", &captures[2]))
        })?;
        let activity = Activity::parse(&captures[4], tz)
            .map_err(|err| Error::UnparseableLogLine(err.to_string()))?;

        Ok(Self {
            log_time,
            kind,
            id: captures[3].to_string(),
            activity,
        })
    }

    /// Whether the stored id is the digest of the stored activity.
    pub fn id_matches_digest(&self) -> bool {
        self.id == self.activity.digest()
    }
}

fn line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(LINE_PATTERN).expect("log line pattern compiles"))
}
