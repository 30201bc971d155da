//! Activity records.
//!
//! An activity is one line of free text of the form
//! `YYYY-MM-DD HH:MM [@rtask:<tag> ]<body>`, interpreted in a fixed reference
//! timezone. Activities are immutable values: rescheduling produces a new
//! record and the log expresses it as delete + add.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone};
use chrono_tz::Tz;
use sha1::{Digest, Sha1};

use crate::error::{Error, Result};

/// Rendering of an activity timestamp, minute precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Width of the rendered timestamp at the start of an entry.
pub const TIMESTAMP_LEN: usize = 16;

/// Marker introducing a recurrence tag after the timestamp.
pub const RECURRENCE_MARKER: &str = "@rtask:";

/// Number of hex characters shown to users when referring to an activity.
pub const SHORT_ID_LEN: usize = 3;

/// One task/reminder entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub timestamp: DateTime<Tz>,
    /// Reserved; never interpreted. Empty means no recurrence declared.
    pub recurrence_tag: String,
    pub body: String,
}

impl Activity {
    pub fn new(timestamp: DateTime<Tz>, body: impl Into<String>) -> Self {
        Self {
            timestamp,
            recurrence_tag: String::new(),
            body: body.into(),
        }
    }

    pub fn with_recurrence(mut self, tag: impl Into<String>) -> Self {
        self.recurrence_tag = tag.into();
        self
    }

    /// Parse `YYYY-MM-DD HH:MM [@rtask:<tag> ]<body>` in the given zone.
    ///
    /// The first sixteen characters must be the timestamp; the character
    /// after them is a separator and is dropped. A recurrence marker with no
    /// space after its tag is treated as part of the body.
    pub fn parse(input: &str, tz: Tz) -> Result<Self> {
        let stamp = input.get(..TIMESTAMP_LEN).ok_or_else(|| {
            Error::MalformedTimestamp(format!(
                "expected 'YYYY-MM-DD HH:MM' at the start of '{input}'"
            ))
        })?;
        let naive = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT)
            .map_err(|err| Error::MalformedTimestamp(format!("'{stamp}': {err}")))?;
        let timestamp = localize(tz, naive).ok_or_else(|| {
            Error::MalformedTimestamp(format!("'{stamp}' does not exist in {tz}"))
        })?;

        let mut rest = input[TIMESTAMP_LEN..].chars();
        rest.next();
        let (recurrence_tag, body) = split_recurrence(rest.as_str());

        Ok(Self {
            timestamp,
            recurrence_tag: recurrence_tag.to_string(),
            body: body.to_string(),
        })
    }

    pub fn time_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn has_recurrence(&self) -> bool {
        !self.recurrence_tag.is_empty()
    }

    /// Digest input: timestamp and body joined by one space. The recurrence
    /// tag is not part of an activity's identity.
    pub fn canonical(&self) -> String {
        format!("{} {}", self.time_string(), self.body)
    }

    /// Full 40-character lowercase SHA-1 hex digest of [`Activity::canonical`].
    pub fn digest(&self) -> String {
        let mut hasher = Sha1::new();
        hasher.update(self.canonical().as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Form written to the log: timestamp, recurrence tag when set, body.
    pub fn rendered(&self) -> String {
        if self.has_recurrence() {
            format!(
                "{} {}{} {}",
                self.time_string(),
                RECURRENCE_MARKER,
                self.recurrence_tag,
                self.body
            )
        } else {
            self.canonical()
        }
    }

    /// Same tag and body at a different time.
    pub fn rescheduled(&self, timestamp: DateTime<Tz>) -> Self {
        Self {
            timestamp,
            recurrence_tag: self.recurrence_tag.clone(),
            body: self.body.clone(),
        }
    }

    /// Listing order: timestamp first, body breaks ties.
    pub fn schedule_cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| self.body.cmp(&other.body))
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// An activity currently live in the log, with its full digest attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveActivity {
    pub id: String,
    pub activity: Activity,
}

impl LiveActivity {
    pub fn new(id: impl Into<String>, activity: Activity) -> Self {
        Self {
            id: id.into(),
            activity,
        }
    }

    pub fn short_id(&self) -> &str {
        self.id.get(..SHORT_ID_LEN).unwrap_or(&self.id)
    }

    /// False when the stored id was edited and no longer hashes from the
    /// activity text. Events appended for it go under the recomputed id.
    pub fn id_matches_digest(&self) -> bool {
        self.id == self.activity.digest()
    }
}

impl fmt::Display for LiveActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let star = if self.activity.has_recurrence() { "*" } else { "" };
        write!(
            f,
            "[{}]{} {} {}",
            self.short_id(),
            star,
            self.activity.time_string(),
            self.activity.body
        )
    }
}

/// Sort ascending by `(timestamp, body)`.
pub fn sort_live(items: &mut [LiveActivity]) {
    items.sort_by(|a, b| {
        a.activity
            .schedule_cmp(&b.activity)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Length of the due prefix of an ascending listing: every record strictly
/// before `now`. A record exactly at `now` is not due.
pub fn due_len<Z: TimeZone>(sorted: &[LiveActivity], now: &DateTime<Z>) -> usize {
    let now = now.with_timezone(&chrono::Utc);
    sorted.partition_point(|item| item.activity.timestamp.with_timezone(&chrono::Utc) < now)
}

/// Map a wall-clock time onto the zone. Ambiguous times take the earlier
/// instant; times inside a DST gap move forward one hour.
pub(crate) fn localize(tz: Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive).earliest().or_else(|| {
        naive
            .checked_add_signed(TimeDelta::hours(1))
            .and_then(|shifted| tz.from_local_datetime(&shifted).earliest())
    })
}

fn split_recurrence(rest: &str) -> (&str, &str) {
    if let Some(after) = rest.strip_prefix(RECURRENCE_MARKER) {
        if let Some(space) = after.find(' ') {
            return (&after[..space], &after[space + 1..]);
        }
    }
    ("", rest)
}
