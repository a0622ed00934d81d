//! Message list state and search filtering.

use crate::MessageHeader;
use chrono::{DateTime, Utc};

/// Filters shorter than this many characters do not filter.
pub const MIN_FILTER_LEN: usize = 2;

/// Headers of the open mailbox plus the selection and active search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageList {
    pub headers: Vec<MessageHeader>,
    pub selected: Option<String>,
    /// Already normalized by [`normalize_search`].
    pub search_filter: String,
}

impl MessageList {
    /// A fresh list with nothing selected and no filter.
    pub fn new(headers: Vec<MessageHeader>) -> Self {
        Self {
            headers,
            selected: None,
            search_filter: String::new(),
        }
    }

    /// Rows to display: filtered, newest first.
    pub fn visible(&self) -> Vec<&MessageHeader> {
        let mut rows = filter_message_list(&self.search_filter, &self.headers);
        rows.reverse();
        rows
    }

    /// Whether a header with `id` is listed.
    pub fn contains(&self, id: &str) -> bool {
        self.headers.iter().any(|h| h.id == id)
    }

    /// Whether `id` is the current selection.
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    /// Set the seen flag on the header with `id`, if still listed.
    pub fn mark_seen(&mut self, id: &str) {
        if let Some(header) = self.headers.iter_mut().find(|h| h.id == id) {
            header.seen = true;
        }
    }

    /// Drop the header with `id`; clears the selection when it pointed there.
    pub fn remove(&mut self, id: &str) {
        self.headers.retain(|h| h.id != id);
        if self.is_selected(id) {
            self.selected = None;
        }
    }

    /// Apply raw search box input; see [`normalize_search`].
    pub fn set_search(&mut self, input: &str) {
        self.search_filter = normalize_search(input);
    }
}

/// Lowercase the input, or empty it when it is too short to filter by.
pub fn normalize_search(input: &str) -> String {
    if input.chars().count() < MIN_FILTER_LEN {
        String::new()
    } else {
        input.to_lowercase()
    }
}

/// Headers whose subject or sender contains `filter`, case-insensitively.
///
/// Order is preserved and `headers` is never modified. A filter shorter
/// than [`MIN_FILTER_LEN`] matches everything.
pub fn filter_message_list<'a>(filter: &str, headers: &'a [MessageHeader]) -> Vec<&'a MessageHeader> {
    let filter = normalize_search(filter);
    if filter.is_empty() {
        return headers.iter().collect();
    }
    headers
        .iter()
        .filter(|h| {
            h.subject.to_lowercase().contains(&filter) || h.from.to_lowercase().contains(&filter)
        })
        .collect()
}

/// Age of `date` relative to the controller clock, for list rows.
pub fn relative_date(now: DateTime<Utc>, date: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(date);
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {unit} ago")
        } else {
            format!("{n} {unit}s ago")
        }
    };

    if age.num_minutes() < 1 {
        "just now".to_string()
    } else if age.num_hours() < 1 {
        plural(age.num_minutes(), "minute")
    } else if age.num_days() < 1 {
        plural(age.num_hours(), "hour")
    } else if age.num_days() < 7 {
        plural(age.num_days(), "day")
    } else {
        date.format("%b %-d, %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn header(id: &str, subject: &str, from: &str) -> MessageHeader {
        MessageHeader {
            mailbox: "bob".into(),
            id: id.into(),
            from: from.into(),
            to: Vec::new(),
            subject: subject.into(),
            date: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            size: 0,
            seen: false,
        }
    }

    fn sample() -> Vec<MessageHeader> {
        vec![
            header("1", "Welcome aboard", "HR <hr@corp.test>"),
            header("2", "Invoice #42", "billing@shop.test"),
            header("3", "Re: lunch?", "Alice <alice@corp.test>"),
            header("4", "Password reset", "no-reply@shop.test"),
        ]
    }

    fn ids(rows: &[&MessageHeader]) -> Vec<String> {
        rows.iter().map(|h| h.id.clone()).collect()
    }

    #[test]
    fn empty_filter_returns_everything_in_order() {
        let headers = sample();
        assert_eq!(ids(&filter_message_list("", &headers)), ["1", "2", "3", "4"]);
    }

    #[test]
    fn single_character_does_not_filter() {
        let headers = sample();
        assert_eq!(filter_message_list("z", &headers).len(), 4);
    }

    #[test]
    fn matches_subject_or_sender_case_insensitively() {
        let headers = sample();
        assert_eq!(ids(&filter_message_list("SHOP", &headers)), ["2", "4"]);
        assert_eq!(ids(&filter_message_list("lunch", &headers)), ["3"]);
        assert_eq!(ids(&filter_message_list("corp", &headers)), ["1", "3"]);
    }

    #[test]
    fn every_match_is_kept_and_only_matches() {
        let headers = sample();
        let filter = "re";
        let rows = filter_message_list(filter, &headers);
        for h in &headers {
            let hit = h.subject.to_lowercase().contains(filter) || h.from.to_lowercase().contains(filter);
            assert_eq!(hit, rows.iter().any(|r| r.id == h.id), "header {}", h.id);
        }
    }

    #[test]
    fn visible_rows_are_reversed_and_filtered() {
        let mut list = MessageList::new(sample());
        assert_eq!(ids(&list.visible()), ["4", "3", "2", "1"]);

        list.set_search("Shop");
        assert_eq!(list.search_filter, "shop");
        assert_eq!(ids(&list.visible()), ["4", "2"]);
        assert_eq!(list.headers.len(), 4);
    }

    #[test]
    fn remove_clears_matching_selection_only() {
        let mut list = MessageList::new(sample());
        list.selected = Some("2".into());
        list.remove("3");
        assert_eq!(list.selected.as_deref(), Some("2"));
        list.remove("2");
        assert_eq!(list.selected, None);
        assert_eq!(list.headers.len(), 2);
    }

    #[test]
    fn relative_dates() {
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(relative_date(date + TimeDelta::seconds(20), date), "just now");
        assert_eq!(relative_date(date + TimeDelta::minutes(1), date), "1 minute ago");
        assert_eq!(relative_date(date + TimeDelta::minutes(45), date), "45 minutes ago");
        assert_eq!(relative_date(date + TimeDelta::hours(5), date), "5 hours ago");
        assert_eq!(relative_date(date + TimeDelta::days(2), date), "2 days ago");
        assert_eq!(relative_date(date + TimeDelta::days(30), date), "Mar 1, 2024");
    }
}
