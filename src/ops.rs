//! Activity operations: add, list due, done, delay and grep.
//!
//! Identifier-based operations resolve a partial id first. Zero or several
//! matches end the operation before anything is written; only a single match
//! leads to appends. Each append is a complete event, so a delay that fails
//! between its delete and its add leaves a consistent (if incomplete) log.

use chrono::{DateTime, TimeZone};
use regex::Regex;
use tracing::{info, warn};

use crate::activity::{self, Activity, LiveActivity};
use crate::calendar::{self, DelayUnit};
use crate::codec::EventKind;
use crate::error::{Error, Result};
use crate::store::{LogStore, Resolution, SkippedLine};

/// Due activities plus any lines skipped while replaying.
#[derive(Debug, Clone)]
pub struct DueList {
    pub items: Vec<LiveActivity>,
    pub skipped: Vec<SkippedLine>,
}

/// The single activity an id prefix resolved to, plus any lines skipped
/// while replaying.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub item: LiveActivity,
    pub skipped: Vec<SkippedLine>,
}

/// Outcome of a delay: the retired activity and its replacement.
#[derive(Debug, Clone)]
pub struct Delayed {
    pub previous: LiveActivity,
    pub current: LiveActivity,
    pub skipped: Vec<SkippedLine>,
}

/// Grep matches plus any lines skipped while replaying.
#[derive(Debug, Clone)]
pub struct GrepResult {
    pub pattern: String,
    pub matches: Vec<LiveActivity>,
    pub skipped: Vec<SkippedLine>,
}

/// Record a new activity. Returns its full id.
pub fn add(store: &LogStore, activity: &Activity) -> Result<String> {
    if activity.body.contains(['\n', '\r']) {
        return Err(Error::InvalidArgument(
            "activity body cannot contain line breaks".to_string(),
        ));
    }
    if activity.recurrence_tag.contains(char::is_whitespace) {
        return Err(Error::InvalidArgument(
            "recurrence tag cannot contain whitespace".to_string(),
        ));
    }
    let id = store.append(activity, EventKind::Add)?;
    info!(id = %id, "added activity");
    Ok(id)
}

/// Live activities with a timestamp strictly before `now`, ascending.
pub fn due<Z: TimeZone>(store: &LogStore, now: &DateTime<Z>) -> Result<DueList> {
    let snapshot = store.reconstruct()?;
    let mut items = snapshot.sorted();
    let due = activity::due_len(&items, now);
    items.truncate(due);
    Ok(DueList {
        items,
        skipped: snapshot.skipped().to_vec(),
    })
}

/// Resolve a partial id to exactly one live activity.
pub fn resolve_one(store: &LogStore, partial_id: &str) -> Result<Resolved> {
    let Resolution {
        mut matches,
        skipped,
    } = store.resolve(partial_id)?;
    match matches.len() {
        0 => Err(Error::NoSuchActivity(partial_id.to_string())),
        1 => Ok(Resolved {
            item: matches.remove(0),
            skipped,
        }),
        _ => {
            activity::sort_live(&mut matches);
            Err(Error::AmbiguousIdentifier {
                id: partial_id.to_string(),
                candidates: matches.iter().map(|item| item.to_string()).collect(),
            })
        }
    }
}

/// Mark an activity done by appending a delete for it.
pub fn mark_done(store: &LogStore, partial_id: &str) -> Result<Resolved> {
    let target = resolve_one(store, partial_id)?;
    if !target.item.id_matches_digest() {
        warn!(
            stored = %target.item.id,
            computed = %target.item.activity.digest(),
            "deleting an activity whose stored id does not match its text"
        );
    }
    store.append(&target.item.activity, EventKind::Delete)?;
    info!(id = %target.item.id, "marked activity done");
    Ok(target)
}

/// Reschedule an activity by `count` units: delete the old record, then add
/// the shifted one. The unit and the new time are validated before anything
/// is written.
pub fn delay(store: &LogStore, partial_id: &str, count: i64, unit: &str) -> Result<Delayed> {
    let Resolved {
        item: target,
        skipped,
    } = resolve_one(store, partial_id)?;
    let unit: DelayUnit = unit.parse()?;
    let timestamp = calendar::add(&target.activity.timestamp, count, unit)?;
    let shifted = target.activity.rescheduled(timestamp);

    store.append(&target.activity, EventKind::Delete)?;
    let id = store.append(&shifted, EventKind::Add)?;
    info!(from = %target.id, to = %id, count, unit = %unit, "delayed activity");

    Ok(Delayed {
        previous: target,
        current: LiveActivity::new(id, shifted),
        skipped,
    })
}

/// Search form of a live activity: `(<full id>) <rendered activity>`.
pub fn search_line(item: &LiveActivity) -> String {
    format!("({}) {}", item.id, item.activity.rendered())
}

/// Compose the grep pattern: the wrap text is literal, the user's input is a
/// regular expression appended to it.
pub fn compose_pattern(pattern_wrap: &str, input: &str) -> String {
    format!("{}{}", regex::escape(pattern_wrap), input)
}

/// Every live activity whose search line matches the composed pattern.
/// Any number of matches is a valid outcome.
pub fn grep(store: &LogStore, input: &str, pattern_wrap: &str) -> Result<GrepResult> {
    let pattern = compose_pattern(pattern_wrap, input);
    let regex = Regex::new(&pattern)?;
    let snapshot = store.reconstruct()?;
    let matches = snapshot
        .sorted()
        .into_iter()
        .filter(|item| regex.is_match(&search_line(item)))
        .collect();
    Ok(GrepResult {
        pattern,
        matches,
        skipped: snapshot.skipped().to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use chrono_tz::Tz;
    use tempfile::TempDir;

    const MELBOURNE: Tz = chrono_tz::Australia::Melbourne;

    fn store(temp: &TempDir) -> LogStore {
        LogStore::new(temp.path().join("logfile.txt"), MELBOURNE)
    }

    fn activity(text: &str) -> Activity {
        Activity::parse(text, MELBOURNE).unwrap()
    }

    fn line_count(store: &LogStore) -> usize {
        std::fs::read_to_string(store.path())
            .map(|contents| contents.lines().count())
            .unwrap_or(0)
    }

    fn append_raw(store: &LogStore, text: &str) {
        use std::io::Write;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(store.path())
            .unwrap();
        file.write_all(text.as_bytes()).unwrap();
    }

    /// Add activities until two share a short id; returns that prefix.
    fn add_colliding_pair(store: &LogStore) -> String {
        let mut seen = std::collections::HashMap::new();
        for n in 0.. {
            let id = add(store, &activity(&format!("2030-01-01 10:00 chore {n}"))).unwrap();
            let short = id[..3].to_string();
            if seen.insert(short.clone(), id).is_some() {
                return short;
            }
        }
        unreachable!()
    }

    #[test]
    fn end_to_end_add_resolve_done() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        let id = add(&store, &activity("2030-01-01 10:00 Buy milk")).unwrap();
        let short = &id[..3];

        let found = store.resolve(short).unwrap().matches;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].activity.body, "Buy milk");

        let done = mark_done(&store, short).unwrap();
        assert_eq!(done.item.id, id);
        assert!(done.skipped.is_empty());
        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert!(contents.contains(&format!("DELETE: ({id})")));

        assert!(store.reconstruct().unwrap().get(&id).is_none());
        assert!(store.resolve(short).unwrap().matches.is_empty());
    }

    #[test]
    fn done_unknown_id_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        add(&store, &activity("2030-01-01 10:00 Buy milk")).unwrap();

        let before = line_count(&store);
        match mark_done(&store, "zzz") {
            Err(Error::NoSuchActivity(id)) => assert_eq!(id, "zzz"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(line_count(&store), before);
    }

    #[test]
    fn ambiguous_prefix_lists_candidates_and_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let short = add_colliding_pair(&store);
        let before = line_count(&store);

        match mark_done(&store, &short) {
            Err(Error::AmbiguousIdentifier { id, candidates }) => {
                assert_eq!(id, short);
                assert_eq!(candidates.len(), 2);
                for candidate in &candidates {
                    assert!(candidate.starts_with(&format!("[{short}] 2030-01-01 10:00 chore")));
                }
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(
            delay(&store, &short, 1, "day"),
            Err(Error::AmbiguousIdentifier { .. })
        ));
        assert_eq!(line_count(&store), before);
    }

    #[test]
    fn delay_replaces_activity() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let original = activity("2030-01-01 10:00 @rtask:weekly Water plants");
        let id = add(&store, &original).unwrap();

        let delayed = delay(&store, &id[..3], 2, "hours").unwrap();
        assert_eq!(delayed.previous.id, id);
        assert_eq!(delayed.current.activity.time_string(), "2030-01-01 12:00");
        assert_eq!(delayed.current.activity.recurrence_tag, "weekly");
        assert_eq!(delayed.current.activity.body, "Water plants");

        let snapshot = store.reconstruct().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.get(&id).is_none());
        assert!(snapshot.get(&delayed.current.id).is_some());
        assert_eq!(line_count(&store), 3);
    }

    #[test]
    fn delay_with_unknown_unit_leaves_log_unchanged() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let id = add(&store, &activity("2030-01-01 10:00 Buy milk")).unwrap();
        let before = store.reconstruct().unwrap();

        match delay(&store, &id[..3], 1, "fortnight") {
            Err(Error::UnknownUnit(unit)) => assert_eq!(unit, "fortnight"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(store.reconstruct().unwrap().activities(), before.activities());
        assert_eq!(line_count(&store), 1);
    }

    #[test]
    fn done_and_delay_carry_skipped_lines() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let id = add(&store, &activity("2030-01-01 10:00 Buy milk")).unwrap();
        append_raw(&store, "corrupt line here\n");

        let delayed = delay(&store, &id[..6], 1, "day").unwrap();
        assert_eq!(delayed.skipped.len(), 1);
        assert_eq!(delayed.skipped[0].line, 2);

        let done = mark_done(&store, &delayed.current.id[..6]).unwrap();
        assert_eq!(done.skipped.len(), 1);
        assert_eq!(done.skipped[0].content, "corrupt line here");
    }

    #[test]
    fn done_flags_hand_edited_id() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let stored = format!("abc{}", "0".repeat(37));
        append_raw(
            &store,
            &format!("[2030-01-01T00:00:00] ADD: ({stored}) 2030-01-01 10:00 Edited\n"),
        );

        let done = mark_done(&store, "abc0").unwrap();
        assert_eq!(done.item.id, stored);
        assert!(!done.item.id_matches_digest());
        // The delete lands under the recomputed id and cancels nothing.
        assert!(store.reconstruct().unwrap().get(&stored).is_some());
    }

    #[test]
    fn delay_into_repeated_dst_hour_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let id = add(&store, &activity("2030-04-07 02:30 Night shift")).unwrap();

        assert!(matches!(
            delay(&store, &id[..6], 1, "hour"),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(line_count(&store), 1);

        let delayed = delay(&store, &id[..6], 2, "hours").unwrap();
        assert_eq!(delayed.current.activity.time_string(), "2030-04-07 03:30");
        assert_ne!(delayed.current.id, delayed.previous.id);
    }

    #[test]
    fn due_returns_past_prefix_in_order() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let now = MELBOURNE.with_ymd_and_hms(2030, 6, 15, 12, 0, 0).unwrap();

        for (offset, body) in [(1, "future"), (-1, "yesterday"), (-2, "two days ago")] {
            let stamp = now + Duration::days(offset);
            add(&store, &Activity::new(stamp, body)).unwrap();
        }
        add(&store, &Activity::new(now, "exactly now")).unwrap();

        let due = due(&store, &now).unwrap();
        let bodies: Vec<&str> = due.items.iter().map(|i| i.activity.body.as_str()).collect();
        assert_eq!(bodies, vec!["two days ago", "yesterday"]);
    }

    #[test]
    fn grep_matches_body_and_id_prefix() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let milk = add(&store, &activity("2030-01-01 10:00 Buy milk")).unwrap();
        add(&store, &activity("2030-01-02 10:00 Buy bread")).unwrap();
        add(&store, &activity("2030-01-03 10:00 Call mum")).unwrap();

        let by_body = grep(&store, ".*Buy", "(").unwrap();
        assert_eq!(by_body.matches.len(), 2);
        assert_eq!(by_body.pattern, r"\(.*Buy");

        let by_id = grep(&store, &milk[..5], "(").unwrap();
        assert_eq!(by_id.matches.len(), 1);
        assert_eq!(by_id.matches[0].id, milk);

        let none = grep(&store, "Buy", "(").unwrap();
        assert!(none.matches.is_empty());

        let unwrapped = grep(&store, "Buy", "").unwrap();
        assert_eq!(unwrapped.matches.len(), 2);
    }

    #[test]
    fn grep_rejects_invalid_pattern() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        assert!(matches!(
            grep(&store, "[unclosed", "("),
            Err(Error::InvalidPattern(_))
        ));
    }

    #[test]
    fn add_rejects_line_breaks() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let stamp = MELBOURNE.with_ymd_and_hms(2030, 1, 1, 10, 0, 0).unwrap();
        let result = add(&store, &Activity::new(stamp, "two\nlines"));
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert!(!store.path().exists());
    }
}
