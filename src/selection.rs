//! The two-click selection state machine.
//!
//! Everything here is a pure function of a [`Selection`] value; the
//! controller in [`crate::selector`] applies the results to the page and the
//! calendar.
use crate::day::{add_days, format_day, format_day_opt};
use time::{format_description::OwnedFormatItem, Date};

/// The start/end pair picked so far.
///
/// Invariant: `end` is only set when `start` is, and when both are set,
/// `start <= end`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Selection {
    start: Option<Date>,
    end: Option<Date>,
}

impl Selection {
    pub fn new() -> Selection {
        Selection::default()
    }

    /// Build a selection from two optional endpoints, putting them in order.
    /// A lone endpoint of either kind becomes the start of an unfinished
    /// range.
    pub fn with_range(start: Option<Date>, end: Option<Date>) -> Selection {
        match (start, end) {
            (Some(a), Some(b)) => Selection {
                start: Some(a.min(b)),
                end: Some(a.max(b)),
            },
            (Some(d), None) | (None, Some(d)) => Selection {
                start: Some(d),
                end: None,
            },
            (None, None) => Selection::new(),
        }
    }

    pub fn start(&self) -> Option<Date> {
        self.start
    }

    pub fn end(&self) -> Option<Date> {
        self.end
    }

    pub fn phase(&self) -> Phase {
        match (self.start, self.end) {
            (None, _) => Phase::Empty,
            (Some(_), None) => Phase::StartOnly,
            (Some(_), Some(_)) => Phase::Complete,
        }
    }

    /// Apply a click on `day`.  Clicking with nothing or a complete range
    /// selected starts over; clicking with only a start selected completes
    /// the range, swapping the endpoints if `day` comes first.
    #[must_use]
    pub fn click(self, day: Date) -> Selection {
        match (self.start, self.end) {
            (Some(start), None) => Selection::with_range(Some(start), Some(day)),
            _ => Selection {
                start: Some(day),
                end: None,
            },
        }
    }

    #[must_use]
    pub fn cleared(self) -> Selection {
        Selection::new()
    }

    pub fn submit_enabled(&self) -> bool {
        self.phase() == Phase::Complete
    }

    /// Values for the start & end form inputs
    pub fn form_values(&self) -> (String, String) {
        (format_day_opt(self.start), format_day_opt(self.end))
    }

    pub fn status(&self) -> Status {
        match (self.start, self.end) {
            (None, _) => Status::Empty,
            (Some(start), None) => Status::AwaitingEnd { start },
            (Some(start), Some(end)) => Status::Confirmed { start, end },
        }
    }

    /// The region of the calendar to tint: just the start day while the
    /// range is unfinished, otherwise the whole range
    pub fn highlight(&self) -> Option<HighlightRegion> {
        let start = self.start?;
        Some(HighlightRegion {
            start,
            last: self.end.unwrap_or(start),
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Phase {
    Empty,
    StartOnly,
    Complete,
}

/// A run of consecutive days, viewed as the half-open interval
/// `[start, end_exclusive)`
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct HighlightRegion {
    start: Date,
    last: Date,
}

impl HighlightRegion {
    pub fn start(&self) -> Date {
        self.start
    }

    /// The day after the last day of the region, or `None` if the region runs
    /// through the last representable date
    pub fn end_exclusive(&self) -> Option<Date> {
        add_days(self.last, 1)
    }

    pub fn contains(&self, day: Date) -> bool {
        self.start <= day && day <= self.last
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Status {
    Empty,
    AwaitingEnd { start: Date },
    Confirmed { start: Date, end: Date },
}

impl Status {
    /// Render the status line, showing dates with `fmt`.  The empty status
    /// renders as the empty string.
    pub fn text(&self, fmt: &OwnedFormatItem) -> String {
        let show = |d: Date| d.format(fmt).unwrap_or_else(|_| format_day(d));
        match *self {
            Status::Empty => String::new(),
            Status::AwaitingEnd { start } => format!("Start: {}, select end date", show(start)),
            Status::Confirmed { start, end } => format!("✅ {} → {}", show(start), show(end)),
        }
    }
}
