use chrono::{DateTime, Utc};
use ics::parameters::Value;
use ics::properties::{Categories, Description, DtEnd, DtStart, Summary};
use ics::{escape_text, ICalendar};
use uuid::Uuid;

use crate::calendar::materialize::{description_text, end_date};
use crate::model::NormalizedEvent;

pub const PRODID: &str = "-//syllabus-calendar//Course Outline Import//EN";

/// Render events as an iCalendar document stamped with the current time.
pub fn calendar_document(events: &[NormalizedEvent]) -> String {
    calendar_document_at(events, Utc::now())
}

/// Render events as an iCalendar document. Only `UID` and `DTSTAMP` differ
/// between two renderings of the same events.
pub fn calendar_document_at(events: &[NormalizedEvent], stamp: DateTime<Utc>) -> String {
    let dtstamp = stamp.format("%Y%m%dT%H%M%SZ").to_string();

    let mut calendar = ICalendar::new("2.0", PRODID);
    for event in events {
        calendar.add_event(to_ics(event, &dtstamp));
    }
    calendar.to_string()
}

fn to_ics<'a>(event: &'a NormalizedEvent, dtstamp: &str) -> ics::Event<'a> {
    let uid = format!("{}@syllabus-calendar", Uuid::new_v4());
    let mut ics_event = ics::Event::new(uid, dtstamp.to_string());

    let mut start = DtStart::new(event.due_date.format("%Y%m%d").to_string());
    start.add(Value::DATE);
    let mut end = DtEnd::new(end_date(event).format("%Y%m%d").to_string());
    end.add(Value::DATE);

    ics_event.push(start);
    ics_event.push(end);
    ics_event.push(Summary::new(escape_text(event.summary())));
    ics_event.push(Description::new(escape_text(description_text(event))));
    ics_event.push(Categories::new(event.category.as_str()));

    ics_event
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use chrono::NaiveDate;

    fn events() -> Vec<NormalizedEvent> {
        vec![
            NormalizedEvent {
                category: Category::Exam,
                name: "Midterm".to_string(),
                due_date: NaiveDate::from_ymd_opt(2025, 10, 10).unwrap(),
                description: Some("Chapters 1-4, bring a calculator".to_string()),
            },
            NormalizedEvent {
                category: Category::Assignment,
                name: "Assignment 1".to_string(),
                due_date: NaiveDate::from_ymd_opt(2025, 10, 20).unwrap(),
                description: None,
            },
        ]
    }

    fn stable_lines(document: &str) -> Vec<String> {
        document
            .lines()
            .filter(|l| !l.starts_with("UID:") && !l.starts_with("DTSTAMP:"))
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn wraps_events_in_calendar() {
        let document = calendar_document(&events());

        assert!(document.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(document.trim_end().ends_with("END:VCALENDAR"));
        assert!(document.contains(&format!("PRODID:{}", PRODID)));
        assert_eq!(document.matches("BEGIN:VEVENT").count(), 2);
    }

    #[test]
    fn events_are_all_day() {
        let document = calendar_document(&events());

        assert!(document.contains("DTSTART;VALUE=DATE:20251010\r\n"));
        assert!(document.contains("DTEND;VALUE=DATE:20251011\r\n"));
        assert!(document.contains("DTSTART;VALUE=DATE:20251020\r\n"));
        assert!(document.contains("SUMMARY:Exam: Midterm\r\n"));
        assert!(document.contains("SUMMARY:Assignment: Assignment 1\r\n"));
    }

    #[test]
    fn description_is_escaped() {
        let document = calendar_document(&events());
        let unfolded = document.replace("\r\n ", "");
        assert!(unfolded.contains(
            r"DESCRIPTION:Auto-generated from course outline.\nChapters 1-4\, bring a calculator"
        ));
    }

    #[test]
    fn stamp_is_utc() {
        let stamp = DateTime::parse_from_rfc3339("2025-09-01T12:30:05Z")
            .unwrap()
            .with_timezone(&Utc);
        let document = calendar_document_at(&events(), stamp);
        assert!(document.contains("DTSTAMP:20250901T123005Z\r\n"));
    }

    #[test]
    fn only_uid_and_stamp_vary() {
        let first = calendar_document(&events());
        let second = calendar_document(&events());

        assert_ne!(first, second);
        assert_eq!(stable_lines(&first), stable_lines(&second));
    }

    #[test]
    fn empty_calendar_is_still_a_document() {
        let document = calendar_document(&[]);
        assert!(document.contains("BEGIN:VCALENDAR"));
        assert!(!document.contains("BEGIN:VEVENT"));
    }
}
