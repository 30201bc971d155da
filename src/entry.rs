//! Composition of new-entry text from command-line words.
//!
//! Accepted forms:
//! - `now <body...>`: today at the current minute
//! - `HH:MM <body...>`: today at the given time
//! - `YYYY-MM-DD HH:MM <body...>`: taken verbatim

use chrono::{DateTime, NaiveTime};
use chrono_tz::Tz;

use crate::activity::{Activity, TIMESTAMP_FORMAT};
use crate::error::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Join the words into `YYYY-MM-DD HH:MM body` text.
pub fn compose(words: &[String], now: &DateTime<Tz>) -> Result<String> {
    let Some(first) = words.first() else {
        return Err(Error::InvalidArgument(
            "new requires a time and a body".to_string(),
        ));
    };

    if words.len() > 1 {
        if first == "now" {
            return Ok(format!(
                "{} {}",
                now.format(TIMESTAMP_FORMAT),
                words[1..].join(" ")
            ));
        }
        if let Ok(time) = NaiveTime::parse_from_str(first, TIME_FORMAT) {
            return Ok(format!(
                "{} {} {}",
                now.format(DATE_FORMAT),
                time.format(TIME_FORMAT),
                words[1..].join(" ")
            ));
        }
    }

    if words.len() < 3 {
        return Err(Error::InvalidArgument(format!(
            "expected 'now <body>', 'HH:MM <body>' or 'YYYY-MM-DD HH:MM <body>', got '{}'",
            words.join(" ")
        )));
    }
    Ok(words.join(" "))
}

/// Compose and parse the words into an activity in the clock's zone.
pub fn parse_words(words: &[String], now: &DateTime<Tz>) -> Result<Activity> {
    let text = compose(words, now)?;
    Activity::parse(&text, now.timezone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const MELBOURNE: Tz = chrono_tz::Australia::Melbourne;

    fn words(raw: &str) -> Vec<String> {
        raw.split_whitespace().map(str::to_string).collect()
    }

    fn now() -> DateTime<Tz> {
        MELBOURNE.with_ymd_and_hms(2030, 3, 4, 8, 5, 42).unwrap()
    }

    #[test]
    fn now_uses_current_minute() {
        let text = compose(&words("now Buy milk"), &now()).unwrap();
        assert_eq!(text, "2030-03-04 08:05 Buy milk");
    }

    #[test]
    fn bare_time_uses_today() {
        let text = compose(&words("9:30 Stand up"), &now()).unwrap();
        assert_eq!(text, "2030-03-04 09:30 Stand up");
    }

    #[test]
    fn full_form_is_verbatim() {
        let text = compose(&words("2031-01-01 00:00 Happy new year"), &now()).unwrap();
        assert_eq!(text, "2031-01-01 00:00 Happy new year");
    }

    #[test]
    fn missing_body_is_rejected() {
        for raw in ["", "now", "10:00", "2031-01-01 00:00"] {
            assert!(
                matches!(compose(&words(raw), &now()), Err(Error::InvalidArgument(_))),
                "accepted {raw:?}"
            );
        }
    }

    #[test]
    fn unparseable_date_is_malformed_timestamp() {
        let result = parse_words(&words("tomorrow morning feed the cat"), &now());
        assert!(matches!(result, Err(Error::MalformedTimestamp(_))));
    }

    #[test]
    fn parse_words_keeps_recurrence_tag() {
        let activity = parse_words(&words("now @rtask:daily Stretch"), &now()).unwrap();
        assert_eq!(activity.recurrence_tag, "daily");
        assert_eq!(activity.body, "Stretch");
    }
}
