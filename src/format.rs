use chrono::Datelike;
use serde::Serialize;

use crate::config::InvalidPeriodPolicy;
use crate::ir::{Instant, TimelineItem};

const FULL_FORMAT: &str = "%b %-d, %Y";
const MONTH_DAY_FORMAT: &str = "%b %-d";
const TIME_FORMAT: &str = "%-I:%M %p";
const YEAR_FORMAT: &str = "%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateSpanMode {
    /// Every item falls on one calendar day.
    Time,
    /// Every item falls in one calendar year.
    MonthDay,
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateSpan {
    pub mode: DateSpanMode,
    /// Shared date shown once for the whole timeline.
    pub context_label: Option<String>,
}

impl DateSpan {
    pub fn full() -> Self {
        Self {
            mode: DateSpanMode::Full,
            context_label: None,
        }
    }
}

/// Picks the most compact per-item date format that still identifies every
/// item. All-or-nothing: one item on another day forces the wider mode.
/// Inverted periods are judged by the endpoints `policy` resolves them to.
pub fn detect_span(
    items: &[TimelineItem],
    compact: bool,
    policy: InvalidPeriodPolicy,
) -> DateSpan {
    if !compact {
        return DateSpan::full();
    }
    let mut instants = items.iter().flat_map(|item| item.instants(policy));
    let Some(first) = instants.next() else {
        return DateSpan::full();
    };
    let first_day = first.date();
    let mut same_day = true;
    let mut same_year = true;
    for instant in instants {
        if instant.date() != first_day {
            same_day = false;
        }
        if instant.year() != first_day.year() {
            same_year = false;
            break;
        }
    }

    if same_day {
        DateSpan {
            mode: DateSpanMode::Time,
            context_label: Some(first.format(FULL_FORMAT).to_string()),
        }
    } else if same_year {
        DateSpan {
            mode: DateSpanMode::MonthDay,
            context_label: Some(first.format(YEAR_FORMAT).to_string()),
        }
    } else {
        DateSpan::full()
    }
}

pub fn format_instant(instant: Instant, mode: DateSpanMode) -> String {
    let fmt = match mode {
        DateSpanMode::Time => TIME_FORMAT,
        DateSpanMode::MonthDay => MONTH_DAY_FORMAT,
        DateSpanMode::Full => FULL_FORMAT,
    };
    instant.format(fmt).to_string()
}

/// Date line shown under an item's label.
pub fn format_item_date(item: &TimelineItem, mode: DateSpanMode, policy: InvalidPeriodPolicy) -> String {
    match item {
        TimelineItem::Period { .. } => {
            let (start, end) = item.span(policy);
            let start_text = format_instant(start, mode);
            let end_text = format_instant(end, mode);
            if start_text == end_text {
                start_text
            } else {
                format!("{start_text} - {end_text}")
            }
        }
        TimelineItem::Event { instant, .. } | TimelineItem::Note { instant, .. } => {
            format_instant(*instant, mode)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::parse_instant;

    #[test]
    fn same_day_uses_time_of_day() {
        let items = vec![
            TimelineItem::event("a", "Wake", parse_instant("Jun 7, 2025 6:00 AM")),
            TimelineItem::note("b", "Coffee", parse_instant("Jun 7, 2025 7:30 AM")),
            TimelineItem::period(
                "c",
                "Work",
                parse_instant("Jun 7, 2025 9:00 AM"),
                parse_instant("Jun 7, 2025 5:00 PM"),
            ),
        ];
        let span = detect_span(&items, true, InvalidPeriodPolicy::Clamp);
        assert_eq!(span.mode, DateSpanMode::Time);
        assert!(span.context_label.as_deref().unwrap().contains("Jun 7, 2025"));

        let wake = format_item_date(&items[0], span.mode, InvalidPeriodPolicy::Clamp);
        assert_eq!(wake, "6:00 AM");
        assert!(!wake.contains("2025"));
        let work = format_item_date(&items[2], span.mode, InvalidPeriodPolicy::Clamp);
        assert_eq!(work, "9:00 AM - 5:00 PM");
    }

    #[test]
    fn same_year_uses_month_day() {
        let items = vec![
            TimelineItem::event("a", "A", parse_instant("2025-01-04")),
            TimelineItem::event("b", "B", parse_instant("2025-11-20")),
        ];
        let span = detect_span(&items, true, InvalidPeriodPolicy::Clamp);
        assert_eq!(span.mode, DateSpanMode::MonthDay);
        assert_eq!(span.context_label.as_deref(), Some("2025"));
        assert_eq!(
            format_item_date(&items[1], span.mode, InvalidPeriodPolicy::Clamp),
            "Nov 20"
        );
    }

    #[test]
    fn mixed_years_use_full_dates() {
        let items = vec![
            TimelineItem::event("a", "A", parse_instant("2024-12-31")),
            TimelineItem::event("b", "B", parse_instant("2025-01-01")),
        ];
        let span = detect_span(&items, true, InvalidPeriodPolicy::Clamp);
        assert_eq!(span, DateSpan::full());
        assert_eq!(
            format_item_date(&items[0], span.mode, InvalidPeriodPolicy::Clamp),
            "Dec 31, 2024"
        );
    }

    #[test]
    fn compaction_can_be_disabled() {
        let items = vec![TimelineItem::event("a", "A", parse_instant("2025-06-07"))];
        assert_eq!(detect_span(&items, false, InvalidPeriodPolicy::Clamp), DateSpan::full());
        assert_eq!(detect_span(&[], true, InvalidPeriodPolicy::Clamp), DateSpan::full());
    }

    #[test]
    fn inverted_period_follows_the_policy() {
        let items = vec![
            TimelineItem::period(
                "p",
                "Stale",
                parse_instant("2025-03-10"),
                parse_instant("2024-03-01"),
            ),
            TimelineItem::event("e", "E", parse_instant("2025-05-01")),
        ];
        let clamped = detect_span(&items, true, InvalidPeriodPolicy::Clamp);
        assert_eq!(clamped.mode, DateSpanMode::MonthDay);
        assert_eq!(clamped.context_label.as_deref(), Some("2025"));
        assert_eq!(
            format_item_date(&items[0], clamped.mode, InvalidPeriodPolicy::Clamp),
            "Mar 10"
        );

        let swapped = detect_span(&items, true, InvalidPeriodPolicy::Swap);
        assert_eq!(swapped, DateSpan::full());
    }
}
