//! Date validation for extracted items.
//!
//! Items without a name, without a date, or with a date that is not a real
//! `YYYY-MM-DD` calendar day are dropped. Only the count of dropped items is
//! kept.

use chrono::NaiveDate;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{ExtractedItem, NormalizedEvent};

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    pub events: Vec<NormalizedEvent>,
    pub dropped: usize,
}

/// Parse a strict `YYYY-MM-DD` date. Surrounding whitespace is ignored.
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if !ISO_DATE.is_match(raw) {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

pub fn normalize_item(item: &ExtractedItem) -> Option<NormalizedEvent> {
    let name = item.name.as_deref()?.trim();
    if name.is_empty() {
        return None;
    }
    let due_date = parse_due_date(item.due_date.as_deref()?)?;

    Some(NormalizedEvent {
        category: item.category,
        name: name.to_string(),
        due_date,
        description: item.description.clone(),
    })
}

pub fn normalize<'a, I>(items: I) -> Normalized
where
    I: IntoIterator<Item = &'a ExtractedItem>,
{
    let mut normalized = Normalized::default();

    for item in items {
        match normalize_item(item) {
            Some(event) => normalized.events.push(event),
            None => {
                debug!(
                    "Dropping {} item {:?} with due date {:?}",
                    item.category, item.name, item.due_date
                );
                normalized.dropped += 1;
            }
        }
    }

    info!(
        "Normalized {} events, dropped {}",
        normalized.events.len(),
        normalized.dropped
    );
    normalized
}
