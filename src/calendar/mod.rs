//! The calendar that a [`RangeSelector`](crate::RangeSelector) drives.
//!
//! The controller only relies on the [`CalendarSurface`] contract; the
//! scrolling terminal calendar implemented by [`WeekWindow`] and [`Calendar`]
//! is one such surface.
mod util;
mod weeks;
mod widget;
pub use self::weeks::{OutOfTimeError, WeekWindow};
pub use self::widget::Calendar;
use ratatui::style::{Color, Style};
use std::iter::successors;
use time::{Date, Weekday};

/// Notifications a calendar emits in response to user interaction
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CalendarEvent {
    /// A day cell was clicked
    DateClick(Date),
    /// The visible range of dates changed
    ViewChanged,
}

/// A background tint over a span of days
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Decoration {
    pub id: String,
    pub start: Date,
    /// Exclusive end of the span; `None` means the span continues through the
    /// last representable date
    pub end: Option<Date>,
    pub color: Color,
}

impl Decoration {
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && self.end.map_or(true, |end| date < end)
    }
}

/// The operations a calendar must offer to be driven by a
/// [`RangeSelector`](crate::RangeSelector)
pub trait CalendarSurface {
    /// Pop the oldest pending notification
    fn next_event(&mut self) -> Option<CalendarEvent>;

    fn decorations(&self) -> &[Decoration];

    fn add_decoration(&mut self, decoration: Decoration);

    /// Remove the first decoration with the given ID and return it
    fn remove_decoration(&mut self, id: &str) -> Option<Decoration>;

    /// Re-run the per-day hook for every visible day
    fn refresh(&mut self);
}

/// Per-day hook invoked for every day cell the calendar renders
pub trait DayDecorator {
    fn decorate_day(&self, date: Date, cell: &mut Style);
}

impl<T: DayDecorator + ?Sized> DayDecorator for &T {
    fn decorate_day(&self, date: Date, cell: &mut Style) {
        (**self).decorate_day(date, cell);
    }
}

/// The day of the week shown in the leftmost column
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum WeekStart {
    Sunday,
    #[default]
    Monday,
}

impl WeekStart {
    pub fn first_day(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sunday,
            WeekStart::Monday => Weekday::Monday,
        }
    }

    /// 0-based column in which days with weekday `wd` are drawn
    pub(crate) fn column(self, wd: Weekday) -> u16 {
        match self {
            WeekStart::Sunday => wd.number_days_from_sunday().into(),
            WeekStart::Monday => wd.number_days_from_monday().into(),
        }
    }

    /// The days of the week in column order
    pub(crate) fn weekdays(self) -> impl Iterator<Item = Weekday> {
        successors(Some(self.first_day()), |wd| Some(wd.next())).take(7)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_columns() {
        assert_eq!(WeekStart::Sunday.column(Weekday::Sunday), 0);
        assert_eq!(WeekStart::Sunday.column(Weekday::Saturday), 6);
        assert_eq!(WeekStart::Monday.column(Weekday::Monday), 0);
        assert_eq!(WeekStart::Monday.column(Weekday::Sunday), 6);
    }

    #[test]
    fn test_weekdays() {
        let days = WeekStart::Monday.weekdays().collect::<Vec<_>>();
        assert_eq!(days.first(), Some(&Weekday::Monday));
        assert_eq!(days.last(), Some(&Weekday::Sunday));
        assert_eq!(days.len(), 7);
    }

    #[test]
    fn test_decoration_contains() {
        let deco = Decoration {
            id: String::from("x"),
            start: date!(2024 - 03 - 05),
            end: Some(date!(2024 - 03 - 06)),
            color: Color::Blue,
        };
        assert!(!deco.contains(date!(2024 - 03 - 04)));
        assert!(deco.contains(date!(2024 - 03 - 05)));
        assert!(!deco.contains(date!(2024 - 03 - 06)));
        let open = Decoration { end: None, ..deco };
        assert!(open.contains(Date::MAX));
    }
}
