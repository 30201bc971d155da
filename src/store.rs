//! Append-only activity log.
//!
//! The log file is the only source of truth. Nothing is cached between
//! calls: every read re-scans the whole file and every write appends one
//! complete line. The file is created on first append and never rewritten.
//!
//! There is no cross-process locking. Two invocations racing between a
//! lookup and its append can both act on the same activity; at worst this
//! shows up as a redundant or missed delete, never as a torn file.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, warn};

use crate::activity::{Activity, LiveActivity};
use crate::codec::{Event, EventKind};
use crate::error::{Error, Result};

/// Log file used when nothing else is configured.
pub const DEFAULT_LOG_FILE: &str = "logfile.txt";

/// A decoded event and the 1-based line it came from.
#[derive(Debug, Clone)]
pub struct LoggedEvent {
    pub line: usize,
    pub event: Event,
}

/// A line that could not be decoded and was left out of replay.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SkippedLine {
    pub line: usize,
    pub content: String,
    pub reason: String,
}

/// Result of reading the whole log once.
#[derive(Debug, Clone, Default)]
pub struct LogScan {
    pub total_lines: usize,
    pub events: Vec<LoggedEvent>,
    pub skipped: Vec<SkippedLine>,
}

/// Live state reconstructed from the log.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    activities: HashMap<String, Activity>,
    skipped: Vec<SkippedLine>,
}

impl Snapshot {
    /// Live activities keyed by full id. Iteration order is unspecified.
    pub fn activities(&self) -> &HashMap<String, Activity> {
        &self.activities
    }

    pub fn skipped(&self) -> &[SkippedLine] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Activity> {
        self.activities.get(id)
    }

    /// Live activities sorted by `(timestamp, body)`.
    pub fn sorted(&self) -> Vec<LiveActivity> {
        let mut items: Vec<LiveActivity> = self
            .activities
            .iter()
            .map(|(id, activity)| LiveActivity::new(id.clone(), activity.clone()))
            .collect();
        crate::activity::sort_live(&mut items);
        items
    }
}

/// Live activities under an id prefix, in order of first addition, plus
/// any lines skipped while replaying.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub matches: Vec<LiveActivity>,
    pub skipped: Vec<SkippedLine>,
}

/// Summary of a full log check.
#[derive(Debug, Clone, Serialize)]
pub struct LogCheck {
    pub path: String,
    pub exists: bool,
    pub total_lines: usize,
    pub events: usize,
    pub adds: usize,
    pub deletes: usize,
    pub live: usize,
    pub skipped: Vec<SkippedLine>,
    pub digest_mismatches: Vec<DigestMismatch>,
}

/// An event whose stored id is not the digest of its activity.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DigestMismatch {
    pub line: usize,
    pub stored: String,
    pub computed: String,
}

/// Read/write boundary over one log file.
#[derive(Debug, Clone)]
pub struct LogStore {
    path: PathBuf,
    tz: Tz,
}

impl LogStore {
    pub fn new(path: impl Into<PathBuf>, tz: Tz) -> Self {
        Self {
            path: path.into(),
            tz,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Current wall-clock time in the reference zone.
    pub fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }

    /// Append an event for `activity` stamped with the current time.
    /// Returns the activity's full digest.
    pub fn append(&self, activity: &Activity, kind: EventKind) -> Result<String> {
        self.append_at(activity, kind, self.now())
    }

    /// Append an event with an explicit log time.
    pub fn append_at(
        &self,
        activity: &Activity,
        kind: EventKind,
        log_time: DateTime<Tz>,
    ) -> Result<String> {
        let event = Event::new(kind, activity.clone(), log_time);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(event.encode().as_bytes())?;
        file.sync_all()?;

        debug!(
            path = %self.path.display(),
            kind = %event.kind,
            id = %event.id,
            "appended event"
        );
        Ok(event.id)
    }

    /// Read every line in append order. Undecodable lines are collected in
    /// `skipped` and otherwise ignored; a missing file is an empty log.
    pub fn scan(&self) -> Result<LogScan> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(LogScan::default()),
            Err(err) => return Err(Error::Io(err)),
        };

        let mut scan = LogScan::default();
        for (index, raw) in BufReader::new(file).split(b'\n').enumerate() {
            let raw = raw?;
            let line = index + 1;
            scan.total_lines = line;

            let text = match String::from_utf8(raw) {
                Ok(text) => text,
                Err(err) => {
                    let content = String::from_utf8_lossy(err.as_bytes()).into_owned();
                    scan.skip(line, content, "line is not valid UTF-8".to_string());
                    continue;
                }
            };
            let text = text.trim_end_matches('\r');
            if text.trim().is_empty() {
                continue;
            }

            match Event::decode(text, self.tz) {
                Ok(event) => scan.events.push(LoggedEvent { line, event }),
                Err(err) => scan.skip(line, text.to_string(), err.to_string()),
            }
        }

        debug!(
            path = %self.path.display(),
            events = scan.events.len(),
            skipped = scan.skipped.len(),
            "scanned log"
        );
        Ok(scan)
    }

    /// Replay the whole log: the activities added and not since deleted.
    pub fn reconstruct(&self) -> Result<Snapshot> {
        let scan = self.scan()?;
        let mut replay = Replay::default();
        for logged in &scan.events {
            replay.apply(&logged.event);
        }
        Ok(Snapshot {
            activities: replay.live,
            skipped: scan.skipped,
        })
    }

    /// Live activities whose id starts with `partial_id`, in order of first
    /// addition. Replays only the events under the prefix, with the same fold
    /// as [`LogStore::reconstruct`], so the two always agree.
    pub fn resolve(&self, partial_id: &str) -> Result<Resolution> {
        let prefix = partial_id.trim().to_ascii_lowercase();
        let scan = self.scan()?;
        let mut replay = Replay::default();
        for logged in scan
            .events
            .iter()
            .filter(|logged| logged.event.id.starts_with(&prefix))
        {
            replay.apply(&logged.event);
        }
        Ok(Resolution {
            matches: replay.into_live(),
            skipped: scan.skipped,
        })
    }

    /// Read-only consistency report over the log.
    pub fn check(&self) -> Result<LogCheck> {
        let exists = self.path.exists();
        let scan = self.scan()?;
        let mut replay = Replay::default();
        let mut adds = 0;
        let mut deletes = 0;
        let mut digest_mismatches = Vec::new();

        for logged in &scan.events {
            match logged.event.kind {
                EventKind::Add => adds += 1,
                EventKind::Delete => deletes += 1,
            }
            if !logged.event.id_matches_digest() {
                warn!(
                    line = logged.line,
                    stored = %logged.event.id,
                    "stored id does not match activity digest"
                );
                digest_mismatches.push(DigestMismatch {
                    line: logged.line,
                    stored: logged.event.id.clone(),
                    computed: logged.event.activity.digest(),
                });
            }
            replay.apply(&logged.event);
        }

        Ok(LogCheck {
            path: self.path.display().to_string(),
            exists,
            total_lines: scan.total_lines,
            events: scan.events.len(),
            adds,
            deletes,
            live: replay.live.len(),
            skipped: scan.skipped,
            digest_mismatches,
        })
    }
}

impl LogScan {
    fn skip(&mut self, line: usize, content: String, reason: String) {
        warn!(line, %reason, "skipping unparseable log line");
        self.skipped.push(SkippedLine {
            line,
            content,
            reason,
        });
    }
}

/// Fold of events in append order.
#[derive(Debug, Default)]
struct Replay {
    order: Vec<String>,
    live: HashMap<String, Activity>,
}

impl Replay {
    fn apply(&mut self, event: &Event) {
        match event.kind {
            EventKind::Add => {
                if self
                    .live
                    .insert(event.id.clone(), event.activity.clone())
                    .is_none()
                {
                    self.order.push(event.id.clone());
                }
            }
            EventKind::Delete => {
                if self.live.remove(&event.id).is_some() {
                    self.order.retain(|id| id != &event.id);
                }
            }
        }
    }

    fn into_live(mut self) -> Vec<LiveActivity> {
        self.order
            .into_iter()
            .filter_map(|id| {
                self.live
                    .remove(&id)
                    .map(|activity| LiveActivity::new(id, activity))
            })
            .collect()
    }
}
