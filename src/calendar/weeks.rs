use super::util::{Week, WeekFactory};
use super::widget::cell_at;
use super::{CalendarEvent, CalendarSurface, DayDecorator, Decoration, WeekStart};
use crate::day::add_days;
use ratatui::layout::Rect;
use ratatui::style::Color;
use std::cmp::Ordering;
use std::collections::VecDeque;
use thiserror::Error;
use time::Date;

/// State of a scrolling terminal calendar: which weeks are on screen, which
/// day has the cursor, the decorations to paint, and the notifications not
/// yet collected by the controller
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WeekWindow<D> {
    pub(super) today: Date,
    pub(super) cursor: Date,
    // Invariant: if Some, the deque is nonempty
    pub(super) weeks: Option<VecDeque<Week>>,
    week_factory: WeekFactory<D>,
    decorations: Vec<Decoration>,
    events: VecDeque<CalendarEvent>,
    /// Area the calendar grid occupied in the last render, for mouse hits
    pub(super) grid_area: Option<Rect>,
}

impl<D: DayDecorator> WeekWindow<D> {
    pub fn new(today: Date, decorator: D, week_start: WeekStart) -> Self {
        WeekWindow {
            today,
            cursor: today,
            weeks: None,
            week_factory: WeekFactory::new(decorator, week_start),
            decorations: Vec::new(),
            events: VecDeque::new(),
            grid_area: None,
        }
    }

    /// Place the cursor (and thus the initial view) on `date` instead of today
    #[must_use]
    pub fn start_date(mut self, date: Date) -> Self {
        self.cursor = date;
        self
    }

    pub fn today(&self) -> Date {
        self.today
    }

    pub fn cursor(&self) -> Date {
        self.cursor
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_factory.week_start()
    }

    /// The first and last dates currently on screen, if the calendar has been
    /// rendered yet
    pub fn visible_range(&self) -> Option<(Date, Date)> {
        let weeks = self.weeks.as_ref()?;
        Some((weeks.front()?.first().date, weeks.back()?.last().date))
    }

    fn is_visible(&self, date: Date) -> bool {
        self.visible_range()
            .is_some_and(|(first, last)| first <= date && date <= last)
    }

    /// Colour of the most recently added decoration covering `date`
    pub(super) fn decoration_color(&self, date: Date) -> Option<Color> {
        self.decorations
            .iter()
            .rev()
            .find(|deco| deco.contains(date))
            .map(|deco| deco.color)
    }

    fn view_changed(&mut self) {
        self.events.push_back(CalendarEvent::ViewChanged);
    }

    /// Make sure the window holds `week_qty` weeks (or as many as exist),
    /// creating it around the cursor on first use
    pub(super) fn ensure_weeks(&mut self, week_qty: usize) {
        let week_qty = week_qty.max(1);
        let Some(weeks) = self.weeks.as_mut() else {
            self.weeks = Some(self.week_factory.around_date(self.cursor, week_qty));
            self.view_changed();
            return;
        };
        match weeks.len().cmp(&week_qty) {
            Ordering::Less => {
                let missing = week_qty - weeks.len();
                if let Some(mut extension) = weeks
                    .back()
                    .and_then(|w| self.week_factory.weeks_after(*w, missing))
                {
                    weeks.append(&mut extension);
                }
                let missing = week_qty.saturating_sub(weeks.len());
                if missing > 0 {
                    // The terminal was heightened while at the end of time,
                    // so "scroll" the calendar down by prepending weeks from
                    // before the window.
                    if let Some(mut prextension) = weeks
                        .front()
                        .and_then(|w| self.week_factory.weeks_before(*w, missing))
                    {
                        prextension.append(weeks);
                        *weeks = prextension;
                    }
                }
            }
            Ordering::Greater => weeks.truncate(week_qty),
            Ordering::Equal => return,
        }
        if !self.is_visible(self.cursor) {
            self.recenter(self.cursor);
        }
        self.view_changed();
    }

    fn recenter(&mut self, date: Date) {
        if let Some(weeks) = self.weeks.as_mut() {
            *weeks = self.week_factory.around_date(date, weeks.len());
        }
    }

    /// Move the cursor to today and show the weeks around it
    pub fn jump_to_today(&mut self) {
        self.cursor = self.today;
        if self.weeks.is_some() {
            self.recenter(self.today);
            self.view_changed();
        }
    }

    /// Move the cursor by `days` days, scrolling just far enough to keep it on
    /// screen
    pub fn move_cursor(&mut self, days: i64) -> Result<(), OutOfTimeError> {
        let target = add_days(self.cursor, days).ok_or(OutOfTimeError)?;
        self.cursor = target;
        let Some(weeks) = self.weeks.as_mut() else {
            return Ok(());
        };
        let len = weeks.len();
        let mut scrolled = false;
        for _ in 0..len {
            let Some(front) = weeks.front().copied() else {
                break;
            };
            let Some(back) = weeks.back().copied() else {
                break;
            };
            if target < front.first().date {
                match self.week_factory.week_before(&front) {
                    Some(w) => {
                        weeks.push_front(w);
                        weeks.pop_back();
                    }
                    None => break,
                }
            } else if target > back.last().date {
                match self.week_factory.week_after(&back) {
                    Some(w) => {
                        weeks.push_back(w);
                        weeks.pop_front();
                    }
                    None => break,
                }
            } else {
                break;
            }
            scrolled = true;
        }
        if !self.is_visible(target) {
            self.recenter(target);
            scrolled = true;
        }
        if scrolled {
            self.view_changed();
        }
        Ok(())
    }

    pub fn one_week_forwards(&mut self) -> Result<(), OutOfTimeError> {
        let Some(weeks) = self.weeks.as_mut() else {
            return Ok(());
        };
        let w = weeks
            .back()
            .and_then(|w| self.week_factory.week_after(w))
            .ok_or(OutOfTimeError)?;
        weeks.push_back(w);
        weeks.pop_front();
        self.shift_cursor(7);
        self.view_changed();
        Ok(())
    }

    pub fn one_week_backwards(&mut self) -> Result<(), OutOfTimeError> {
        let Some(weeks) = self.weeks.as_mut() else {
            return Ok(());
        };
        let w = weeks
            .front()
            .and_then(|w| self.week_factory.week_before(w))
            .ok_or(OutOfTimeError)?;
        weeks.push_front(w);
        weeks.pop_back();
        self.shift_cursor(-7);
        self.view_changed();
        Ok(())
    }

    pub fn one_page_forwards(&mut self) -> Result<(), OutOfTimeError> {
        let Some(weeks) = self.weeks.as_mut() else {
            return Ok(());
        };
        let week_qty = weeks.len();
        let mut page = weeks
            .back()
            .and_then(|w| self.week_factory.weeks_after(*w, week_qty))
            .ok_or(OutOfTimeError)?;
        let shifted = page.len();
        if shifted == week_qty {
            *weeks = page;
        } else {
            weeks.append(&mut page);
            for _ in 0..shifted {
                weeks.pop_front();
            }
        }
        self.shift_cursor(weeks_to_days(shifted));
        self.view_changed();
        Ok(())
    }

    pub fn one_page_backwards(&mut self) -> Result<(), OutOfTimeError> {
        let Some(weeks) = self.weeks.as_mut() else {
            return Ok(());
        };
        let week_qty = weeks.len();
        let mut page = self
            .week_factory
            .weeks_before(weeks[0], week_qty)
            .ok_or(OutOfTimeError)?;
        let shifted = page.len();
        weeks.truncate(week_qty - shifted);
        page.append(weeks);
        *weeks = page;
        self.shift_cursor(-weeks_to_days(shifted));
        self.view_changed();
        Ok(())
    }

    // Move the cursor along with a scroll so that it stays on the same row,
    // then pull it back on screen if the edge of time got in the way
    fn shift_cursor(&mut self, days: i64) {
        if let Some(d) = add_days(self.cursor, days) {
            self.cursor = d;
        }
        if let Some((first, last)) = self.visible_range() {
            self.cursor = self.cursor.clamp(first, last);
        }
    }

    /// Report a click on the day under the cursor
    pub fn click_cursor(&mut self) {
        self.events.push_back(CalendarEvent::DateClick(self.cursor));
    }

    /// The day drawn at terminal position (`x`, `y`) in the last render
    pub fn date_at(&self, x: u16, y: u16) -> Option<Date> {
        let (week_no, col) = cell_at(self.grid_area?, x, y)?;
        let weeks = self.weeks.as_ref()?;
        Some(weeks.get(week_no)?.get(col)?.date)
    }

    /// Report a click at terminal position (`x`, `y`).  Returns `false` if
    /// there is no day there.
    pub fn click_at(&mut self, x: u16, y: u16) -> bool {
        match self.date_at(x, y) {
            Some(date) => {
                self.cursor = date;
                self.events.push_back(CalendarEvent::DateClick(date));
                true
            }
            None => false,
        }
    }
}

impl<D: DayDecorator> CalendarSurface for WeekWindow<D> {
    fn next_event(&mut self) -> Option<CalendarEvent> {
        self.events.pop_front()
    }

    fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    fn add_decoration(&mut self, decoration: Decoration) {
        self.decorations.push(decoration);
    }

    fn remove_decoration(&mut self, id: &str) -> Option<Decoration> {
        let i = self.decorations.iter().position(|d| d.id == id)?;
        Some(self.decorations.remove(i))
    }

    fn refresh(&mut self) {
        if let Some(weeks) = self.weeks.as_mut() {
            for w in weeks.iter_mut() {
                *w = self.week_factory.restyle(w);
            }
        }
    }
}

fn weeks_to_days(weeks: usize) -> i64 {
    i64::try_from(weeks).unwrap_or(i64::MAX).saturating_mul(7)
}

#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
#[error("reached the end of time")]
pub struct OutOfTimeError;
