use super::weeks::WeekWindow;
use super::{DayDecorator, WeekStart};
use crate::theme::{HIGHLIGHT_TEXT, MONTH_STYLE, TODAY_MODIFIER, WEEKDAY_STYLE, YEAR_STYLE};
use ratatui::{prelude::*, widgets::Paragraph};
use std::marker::PhantomData;
use time::{
    Month::{self, January},
    Weekday,
};

/// Width of the calendar in columns, not counting the year and months in the
/// margins
const MAIN_WIDTH: u16 = 46;

/// Number of columns on the left side of the calendar, used as the margin in
/// which the year is written
const LEFT_MARGIN: u16 = 6;

const LONGEST_MONTH_NAME_LEN: u16 = 9; // September

/// Columns between the right edge of the calendar and the start of the month
/// name
const MONTH_GUTTER: u16 = 2;

/// Number of columns on the right side of the calendar, used as the margin in
/// which the month is written
const RIGHT_MARGIN: u16 = LONGEST_MONTH_NAME_LEN + MONTH_GUTTER;

const TOTAL_WIDTH: u16 = LEFT_MARGIN + MAIN_WIDTH + RIGHT_MARGIN;

/// Number of lines taken up by the header and its rule
const HEADER_LINES: u16 = 2;

/// Number of lines taken up by each week of the calendar
const WEEK_LINES: u16 = 2;

/// When inserting a vertical bar-like character between consecutive days in
/// the same week but different months, draw it this many columns to the right
/// of the left edge of the day on the left.
const VBAR_OFFSET: u16 = 5;

/// Number of columns per day of week
const DAY_WIDTH: u16 = 7;

/// Column of the last day of the week
const LAST_COL: u16 = 6;

const ACS_HLINE: char = '─';
const ACS_VLINE: char = '│';
const ACS_TTEE: char = '┬';
const ACS_ULCORNER: char = '┌';
const ACS_LRCORNER: char = '┘';

/// Stateless widget that draws a [`WeekWindow`]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Calendar<D> {
    _data: PhantomData<D>,
}

impl<D> Calendar<D> {
    pub fn new() -> Calendar<D> {
        Calendar { _data: PhantomData }
    }

    fn weeks_for_lines(lines: u16) -> usize {
        // ceil((lines - HEADER_LINES)/2)
        (lines.saturating_sub(HEADER_LINES).saturating_add(1) / 2).into()
    }
}

impl<D> Default for Calendar<D> {
    fn default() -> Calendar<D> {
        Calendar::new()
    }
}

impl<D: DayDecorator> StatefulWidget for Calendar<D> {
    type State = WeekWindow<D>;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let left = (area.width.saturating_sub(MAIN_WIDTH) / 2).max(LEFT_MARGIN) - LEFT_MARGIN;
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(left),
                Constraint::Length(TOTAL_WIDTH.min(area.width)),
                Constraint::Min(0),
            ])
            .split(area);
        let area = chunks[1];
        state.ensure_weeks(Self::weeks_for_lines(area.height));
        state.grid_area = Some(area);
        let Some(weeks) = state.weeks.as_ref() else {
            return;
        };
        let mut canvas = BufferCanvas::new(area, buf);
        canvas.draw_header(state.week_start());
        let top = weeks[0];
        canvas.draw_year(0, top.first().year());
        canvas.draw_month(0, top.last().month());
        for (i, week) in std::iter::zip(0u16.., weeks) {
            if week.has_month_start() {
                let last = week.last();
                canvas.draw_month(i, last.month());
                if last.month() == January {
                    if week.first().month() == January {
                        canvas.draw_year(i, week.first().year());
                    } else if usize::from(i + 1) < weeks.len() {
                        canvas.draw_year(i + 1, last.year());
                    }
                }
            }
            for (col, sd) in week.enumerate() {
                let mut style = sd.style;
                if sd.date == state.today {
                    style = style.add_modifier(TODAY_MODIFIER);
                }
                if let Some(color) = state.decoration_color(sd.date) {
                    // Keep any foreground the day hook chose
                    style = style.bg(color);
                    if sd.style.fg.is_none() {
                        style = style.fg(HIGHLIGHT_TEXT);
                    }
                }
                canvas.draw_day(i, col, sd.label(sd.date == state.cursor), style);
                if sd.is_last_day_of_month() {
                    canvas.draw_month_border(i, col);
                }
            }
        }
    }
}

/// Map a terminal position to the (week index, column) of the day cell drawn
/// there, given the area the calendar grid was drawn in.  Both lines of a week
/// belong to it.
pub(super) fn cell_at(area: Rect, x: u16, y: u16) -> Option<(usize, u16)> {
    if !area.contains(Position::new(x, y)) {
        return None;
    }
    let row = (y - area.y).checked_sub(HEADER_LINES)?;
    let x = (x - area.x).checked_sub(LEFT_MARGIN)?;
    (x < MAIN_WIDTH).then_some((usize::from(row / WEEK_LINES), x / DAY_WIDTH))
}

fn header(week_start: WeekStart) -> String {
    week_start
        .weekdays()
        .map(|wd| format!(" {} ", weekday_abbrev(wd)))
        .collect::<Vec<_>>()
        .join("   ")
}

fn weekday_abbrev(wd: Weekday) -> &'static str {
    match wd {
        Weekday::Sunday => "Su",
        Weekday::Monday => "Mo",
        Weekday::Tuesday => "Tu",
        Weekday::Wednesday => "We",
        Weekday::Thursday => "Th",
        Weekday::Friday => "Fr",
        Weekday::Saturday => "Sa",
    }
}

#[derive(Debug, Eq, PartialEq)]
struct BufferCanvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl<'a> BufferCanvas<'a> {
    fn new(area: Rect, buf: &'a mut Buffer) -> Self {
        Self { area, buf }
    }

    fn draw_header(&mut self, week_start: WeekStart) {
        self.mvprint(0, LEFT_MARGIN, header(week_start), Some(WEEKDAY_STYLE));
        self.hline(1, LEFT_MARGIN, ACS_HLINE, MAIN_WIDTH);
    }

    fn draw_year(&mut self, week_no: u16, year: i32) {
        self.mvprint(
            week_no * WEEK_LINES + HEADER_LINES,
            0,
            year.to_string(),
            Some(YEAR_STYLE),
        );
    }

    fn draw_month(&mut self, week_no: u16, month: Month) {
        self.mvprint(
            week_no * WEEK_LINES + HEADER_LINES,
            LEFT_MARGIN + MAIN_WIDTH + MONTH_GUTTER,
            month.to_string(),
            Some(MONTH_STYLE),
        );
    }

    fn draw_day(&mut self, week_no: u16, col: u16, label: String, style: Style) {
        self.mvprint(
            week_no * WEEK_LINES + HEADER_LINES,
            LEFT_MARGIN + DAY_WIDTH * col,
            label,
            Some(style),
        );
    }

    // `week_no` and `col` specify the "coordinates" of the last day of the
    // month after which the border is drawn
    fn draw_month_border(&mut self, week_no: u16, col: u16) {
        let y = week_no * WEEK_LINES + HEADER_LINES;
        let offset = DAY_WIDTH * col;
        let bar_col = LEFT_MARGIN + offset + VBAR_OFFSET;
        if col != LAST_COL {
            self.mvaddch(y, bar_col, ACS_VLINE);
            self.mvaddch(
                y - 1,
                bar_col,
                if week_no == 0 { ACS_TTEE } else { ACS_ULCORNER },
            );
            if week_no > 0 {
                if let Some(length) = MAIN_WIDTH.checked_sub(offset + VBAR_OFFSET + 1) {
                    self.hline(y - 1, bar_col + 1, ACS_HLINE, length);
                }
            }
            self.mvaddch(y + 1, bar_col, ACS_LRCORNER);
        }
        self.hline(y + 1, LEFT_MARGIN, ACS_HLINE, offset + VBAR_OFFSET);
    }

    fn mvaddch(&mut self, y: u16, x: u16, ch: char) {
        if y < self.area.height && x < self.area.width {
            if let Some(cell) = self.buf.cell_mut((x + self.area.x, y + self.area.y)) {
                cell.set_char(ch);
            }
        }
    }

    fn mvprint<S: AsRef<str>>(&mut self, y: u16, x: u16, s: S, style: Option<Style>) {
        if y < self.area.height && x < self.area.width {
            let text = Text::styled(s.as_ref(), style.unwrap_or_default());
            let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
            // Using a Paragraph lets us truncate text that extends beyond the
            // calendar's area, though we need to be sure that the Rect passed
            // to the Paragraph is entirely within the frame lest a panic
            // result.
            Paragraph::new(text).render(
                Rect {
                    x: x + self.area.x,
                    y: y + self.area.y,
                    width: (self.area.width - x).min(width),
                    height: 1,
                },
                self.buf,
            );
        }
    }

    fn hline(&mut self, y: u16, x: u16, ch: char, length: u16) {
        self.mvprint(y, x, String::from(ch).repeat(length.into()), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{CalendarEvent, CalendarSurface, Decoration};
    use crate::selector::WeekendTint;
    use ratatui::buffer::Cell;
    use time::{macros::date, Date};

    struct NullDecorator;

    impl DayDecorator for NullDecorator {
        fn decorate_day(&self, _date: Date, _cell: &mut Style) {}
    }

    fn lines(buf: &Buffer) -> Vec<String> {
        buf.content
            .chunks(usize::from(buf.area.width))
            .map(|row| row.iter().map(Cell::symbol).collect())
            .collect()
    }

    fn render(state: &mut WeekWindow<NullDecorator>, area: Rect) -> Buffer {
        let mut buffer = Buffer::empty(area);
        Calendar::new().render(area, &mut buffer, state);
        buffer
    }

    #[test]
    fn test_across_year() {
        let mut state = WeekWindow::new(date!(2025 - 01 - 22), NullDecorator, WeekStart::Sunday);
        let buffer = render(&mut state, Rect::new(0, 0, 80, 24));
        assert_eq!(
            lines(&buffer),
            [
                "                  Su     Mo     Tu     We     Th     Fr     Sa                  ",
                "                 ──────────────────────────────────────────────                 ",
                "           2024   15     16     17     18     19     20     21   December       ",
                "                                                                                ",
                "                  22     23     24     25     26     27     28                  ",
                "                                    ┌──────────────────────────                 ",
                "                  29     30     31  │   1      2      3      4   January        ",
                "                 ───────────────────┘                                           ",
                "           2025    5      6      7      8      9     10     11                  ",
                "                                                                                ",
                "                  12     13     14     15     16     17     18                  ",
                "                                                                                ",
                "                  19     20     21    [22]    23     24     25                  ",
                "                                                         ┌─────                 ",
                "                  26     27     28     29     30     31  │   1   February       ",
                "                 ────────────────────────────────────────┘                      ",
                "                   2      3      4      5      6      7      8                  ",
                "                                                                                ",
                "                   9     10     11     12     13     14     15                  ",
                "                                                                                ",
                "                  16     17     18     19     20     21     22                  ",
                "                                                         ┌─────                 ",
                "                  23     24     25     26     27     28  │   1   March          ",
                "                 ────────────────────────────────────────┘                      ",
            ]
        );
        assert!(buffer[(39, 12)].modifier.contains(TODAY_MODIFIER));
        assert!(!buffer[(46, 12)].modifier.contains(TODAY_MODIFIER));
    }

    #[test]
    fn test_monday_start() {
        let mut state = WeekWindow::new(date!(2024 - 03 - 13), NullDecorator, WeekStart::Monday)
            .start_date(date!(2024 - 03 - 14));
        let buffer = render(&mut state, Rect::new(0, 0, 80, 8));
        assert_eq!(
            lines(&buffer),
            [
                "                  Mo     Tu     We     Th     Fr     Sa     Su                  ",
                "                 ──────────────────────────────────────────────                 ",
                "           2024    4      5      6      7      8      9     10   March          ",
                "                                                                                ",
                "                  11     12     13    [14]    15     16     17                  ",
                "                                                                                ",
                "                  18     19     20     21     22     23     24                  ",
                "                                                                                ",
            ]
        );
    }

    #[test]
    fn test_decoration_painted() {
        let mut state = WeekWindow::new(date!(2024 - 03 - 13), NullDecorator, WeekStart::Monday);
        state.add_decoration(Decoration {
            id: String::from("selected-range"),
            start: date!(2024 - 03 - 12),
            end: Some(date!(2024 - 03 - 14)),
            color: Color::Blue,
        });
        let buffer = render(&mut state, Rect::new(0, 0, 80, 8));
        // Row of March 11-17; columns of the 12th, 13th, and 14th
        assert_eq!(buffer[(25, 4)].bg, Color::Blue);
        assert_eq!(buffer[(25, 4)].fg, HIGHLIGHT_TEXT);
        assert_eq!(buffer[(32, 4)].bg, Color::Blue);
        assert_ne!(buffer[(39, 4)].bg, Color::Blue);
        assert_ne!(buffer[(18, 4)].bg, Color::Blue);
    }

    #[test]
    fn test_decoration_keeps_weekend_tint() {
        let mut state = WeekWindow::new(
            date!(2024 - 03 - 13),
            WeekendTint(Color::LightRed),
            WeekStart::Monday,
        );
        state.add_decoration(Decoration {
            id: String::from("selected-range"),
            start: date!(2024 - 03 - 15),
            end: Some(date!(2024 - 03 - 18)),
            color: Color::Blue,
        });
        let mut buffer = Buffer::empty(Rect::new(0, 0, 80, 8));
        Calendar::new().render(buffer.area, &mut buffer, &mut state);
        // Friday the 15th: highlighted weekday
        assert_eq!(buffer[(46, 4)].bg, Color::Blue);
        assert_eq!(buffer[(46, 4)].fg, HIGHLIGHT_TEXT);
        // Saturday the 16th and Sunday the 17th: highlighted and tinted
        for x in [53, 60] {
            assert_eq!(buffer[(x, 4)].bg, Color::Blue);
            assert_eq!(buffer[(x, 4)].fg, Color::LightRed);
        }
        // Saturday the 9th: tinted only
        assert_eq!(buffer[(53, 2)].fg, Color::LightRed);
        assert_ne!(buffer[(53, 2)].bg, Color::Blue);
    }

    #[test]
    fn test_cell_at() {
        let area = Rect::new(11, 0, 63, 24);
        // Header
        assert_eq!(cell_at(area, 20, 0), None);
        // Year margin
        assert_eq!(cell_at(area, 12, 2), None);
        assert_eq!(cell_at(area, 17, 2), Some((0, 0)));
        assert_eq!(cell_at(area, 17, 3), Some((0, 0)));
        assert_eq!(cell_at(area, 39, 12), Some((5, 3)));
        assert_eq!(cell_at(area, 62, 12), Some((5, 6)));
        // Month margin
        assert_eq!(cell_at(area, 66, 12), None);
        assert_eq!(cell_at(area, 79, 12), None);
    }

    #[test]
    fn test_click_at() {
        let mut state = WeekWindow::new(date!(2025 - 01 - 22), NullDecorator, WeekStart::Sunday);
        render(&mut state, Rect::new(0, 0, 80, 24));
        while state.next_event().is_some() {}
        assert!(state.click_at(39, 6));
        assert_eq!(state.cursor(), date!(2025 - 01 - 01));
        assert_eq!(
            state.next_event(),
            Some(CalendarEvent::DateClick(date!(2025 - 01 - 01)))
        );
        assert!(!state.click_at(5, 6));
        assert_eq!(state.next_event(), None);
    }
}
