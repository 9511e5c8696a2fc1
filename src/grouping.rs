use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::state::Fixture;

const KICKOFF_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Fixtures sharing one calendar day, in the order they were received.
#[derive(Debug, Clone, PartialEq)]
pub struct DateGroup {
    /// `YYYY-MM-DD` when the kickoff parses, otherwise the raw value.
    pub day: String,
    pub fixtures: Vec<Fixture>,
}

impl DateGroup {
    pub fn label(&self) -> String {
        match NaiveDate::parse_from_str(&self.day, "%Y-%m-%d") {
            Ok(date) => date.format("%A, %-d %B %Y").to_string(),
            Err(_) => self.day.clone(),
        }
    }
}

/// Partition fixtures by kickoff day. Groups appear in first-seen order and
/// none is empty.
pub fn group_by_day(fixtures: Vec<Fixture>) -> Vec<DateGroup> {
    let mut groups: Vec<DateGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for fixture in fixtures {
        let day = kickoff_day(&fixture.date);
        match index.get(&day) {
            Some(&idx) => groups[idx].fixtures.push(fixture),
            None => {
                index.insert(day.clone(), groups.len());
                groups.push(DateGroup {
                    day,
                    fixtures: vec![fixture],
                });
            }
        }
    }

    groups
}

/// Calendar day of a kickoff, truncated in the offset it was written in.
pub fn kickoff_day(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "TBD".to_string();
    }
    if let Some(dt) = parse_kickoff(trimmed) {
        return dt.date().format("%Y-%m-%d").to_string();
    }
    if let Some(prefix) = trimmed.get(..10)
        && let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
    {
        return date.format("%Y-%m-%d").to_string();
    }
    trimmed.to_string()
}

/// `HH:MM` of a kickoff, or `TBD`.
pub fn kickoff_time(raw: &str) -> String {
    match parse_kickoff(raw.trim()) {
        Some(dt) => dt.format("%H:%M").to_string(),
        None => "TBD".to_string(),
    }
}

/// `YYYY-MM-DD HH:MM` of a kickoff, falling back to the raw string.
pub fn format_kickoff(raw: &str) -> String {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return "TBD".to_string();
    }
    if let Some(dt) = parse_kickoff(cleaned) {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    cleaned.replace('T', " ")
}

fn parse_kickoff(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    if let Some(stripped) = raw.strip_suffix('Z') {
        return parse_naive(stripped);
    }
    parse_naive(raw)
}

fn parse_naive(raw: &str) -> Option<NaiveDateTime> {
    KICKOFF_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}
