use super::{DayDecorator, WeekStart};
use ratatui::style::Style;
use std::collections::VecDeque;
use std::iter::successors;
use time::{Date, Month};

const DAYS_IN_WEEK: usize = 7;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) struct StyledDate {
    pub(super) date: Date,
    pub(super) style: Style,
}

impl StyledDate {
    pub(super) fn year(&self) -> i32 {
        self.date.year()
    }

    pub(super) fn month(&self) -> Month {
        self.date.month()
    }

    pub(super) fn is_last_day_of_month(&self) -> bool {
        match self.date.next_day() {
            Some(tomorrow) => self.date.month() != tomorrow.month(),
            None => true,
        }
    }

    pub(super) fn label(&self, bracketed: bool) -> String {
        if bracketed {
            format!("[{:2}]", self.date.day())
        } else {
            format!(" {:2} ", self.date.day())
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
// Invariant: At least one element of the array is Some.  Slots are None only
// at the beginning or end of time.
pub(super) struct Week([Option<StyledDate>; DAYS_IN_WEEK]);

impl Week {
    /// Iterate over the days present in the week together with their 0-based
    /// columns
    pub(super) fn enumerate(&self) -> impl Iterator<Item = (u16, StyledDate)> + '_ {
        (0u16..)
            .zip(self.0.iter())
            .filter_map(|(col, sd)| sd.map(|sd| (col, sd)))
    }

    pub(super) fn get(&self, col: u16) -> Option<StyledDate> {
        self.0.get(usize::from(col)).copied().flatten()
    }

    pub(super) fn first(&self) -> StyledDate {
        self.0
            .iter()
            .flatten()
            .next()
            .copied()
            .expect("Week should contain at least one Some")
    }

    pub(super) fn last(&self) -> StyledDate {
        self.0
            .iter()
            .flatten()
            .last()
            .copied()
            .expect("Week should contain at least one Some")
    }

    pub(super) fn has_month_start(&self) -> bool {
        self.0.iter().flatten().any(|sd| sd.date.day() == 1)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(super) struct WeekFactory<D> {
    decorator: D,
    week_start: WeekStart,
}

impl<D: DayDecorator> WeekFactory<D> {
    pub(super) fn new(decorator: D, week_start: WeekStart) -> Self {
        WeekFactory {
            decorator,
            week_start,
        }
    }

    pub(super) fn week_start(&self) -> WeekStart {
        self.week_start
    }

    /// Returns `week_qty` weeks (or as many as exist, at the edges of time)
    /// with the week containing `date` roughly in the middle.  `week_qty`
    /// must be nonzero.
    pub(super) fn around_date(&self, date: Date, week_qty: usize) -> VecDeque<Week> {
        let mut weeks = VecDeque::with_capacity(week_qty + 1);
        let start_week = self.make(date);
        weeks.push_front(start_week);
        for w in self
            .iter_weeks_before(start_week)
            .take(week_qty.saturating_sub(1) / 2)
        {
            weeks.push_front(w);
        }
        weeks.extend(
            self.iter_weeks_after(start_week)
                .take(week_qty.saturating_sub(weeks.len())),
        );
        if weeks.len() < week_qty {
            // We are near the end of time, and so the "after" weeks were
            // short.  Fill towards the past.
            let front = weeks[0];
            for w in self
                .iter_weeks_before(front)
                .take(week_qty - weeks.len())
            {
                weeks.push_front(w);
            }
        }
        weeks
    }

    /// Rebuild `week`, re-running the day hook on each of its days
    pub(super) fn restyle(&self, week: &Week) -> Week {
        self.make(week.first().date)
    }

    fn style_date(&self, date: Date) -> StyledDate {
        let mut style = Style::new();
        self.decorator.decorate_day(date, &mut style);
        StyledDate { date, style }
    }

    // Returns the Week containing the given date, which can be at any day of
    // the week
    pub(super) fn make(&self, date: Date) -> Week {
        let i = usize::from(self.week_start.column(date.weekday()));
        let mut week = Week([None; DAYS_IN_WEEK]);
        week.0[i] = Some(self.style_date(date));
        for (j, d) in (0..i).rev().zip(iter_days_before(date)) {
            week.0[j] = Some(self.style_date(d));
        }
        for (j, d) in ((i + 1)..DAYS_IN_WEEK).zip(iter_days_after(date)) {
            week.0[j] = Some(self.style_date(d));
        }
        week
    }

    pub(super) fn week_before(&self, week: &Week) -> Option<Week> {
        week.first().date.previous_day().map(|d| self.make(d))
    }

    pub(super) fn week_after(&self, week: &Week) -> Option<Week> {
        week.last().date.next_day().map(|d| self.make(d))
    }

    fn iter_weeks_before(&self, week: Week) -> impl Iterator<Item = Week> + '_ {
        successors(Some(week), |w| self.week_before(w)).skip(1)
    }

    fn iter_weeks_after(&self, week: Week) -> impl Iterator<Item = Week> + '_ {
        successors(Some(week), |w| self.week_after(w)).skip(1)
    }

    // Returns `None` if there are no weeks before `week`.  If there are weeks
    // before `week`, but not `qty` of them, only as many weeks as possible are
    // returned.
    pub(super) fn weeks_before(&self, week: Week, qty: usize) -> Option<VecDeque<Week>> {
        let mut iter = self.iter_weeks_before(week);
        let first_week = iter.next()?;
        let mut weeks = VecDeque::with_capacity(qty + 1);
        weeks.push_front(first_week);
        for w in iter.take(qty.saturating_sub(1)) {
            weeks.push_front(w);
        }
        Some(weeks)
    }

    // Returns `None` if there are no weeks after `week`.  If there are weeks
    // after `week`, but not `qty` of them, only as many weeks as possible are
    // returned.
    pub(super) fn weeks_after(&self, week: Week, qty: usize) -> Option<VecDeque<Week>> {
        let mut iter = self.iter_weeks_after(week);
        let first_week = iter.next()?;
        let mut weeks = VecDeque::with_capacity(qty + 1);
        weeks.push_back(first_week);
        weeks.extend(iter.take(qty.saturating_sub(1)));
        Some(weeks)
    }
}

fn iter_days_after(date: Date) -> impl Iterator<Item = Date> {
    successors(Some(date), |&d| d.next_day()).skip(1)
}

fn iter_days_before(date: Date) -> impl Iterator<Item = Date> {
    successors(Some(date), |&d| d.previous_day()).skip(1)
}
