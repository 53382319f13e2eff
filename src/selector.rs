//! The controller tying the selection state machine to a calendar and a page.
use crate::calendar::{CalendarEvent, CalendarSurface, DayDecorator, Decoration};
use crate::config::{Config, ConfigError, Validated};
use crate::day::{format_day_opt, is_weekend};
use crate::page::{ButtonType, Element, ElementKind, Node, Page};
use crate::selection::Selection;
use log::{debug, info, warn};
use ratatui::style::{Color, Style};
use time::{format_description::OwnedFormatItem, Date};

/// ID of the decoration used to highlight the selected range
pub const HIGHLIGHT_ID: &str = "selected-range";

/// A date-range picker attached to one calendar and one page.
///
/// Every change to the selection is immediately reflected in the status
/// line, the two hidden inputs, the submit button, and the calendar
/// highlight.  Any of those page elements may be missing, in which case the
/// corresponding update is skipped.
#[derive(Clone, Debug)]
pub struct RangeSelector<C> {
    selection: Selection,
    calendar: C,
    page: Page,
    targets: Targets,
    display_format: OwnedFormatItem,
    highlight_color: Color,
}

// IDs of the page elements that resolved at attach time
#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct Targets {
    calendar: Option<String>,
    clear_button: Option<String>,
    start_input: Option<String>,
    end_input: Option<String>,
    info_container: Option<String>,
    info_text: Option<String>,
    submit: Option<String>,
}

impl<C: CalendarSurface> RangeSelector<C> {
    /// Attach a picker to `calendar`, writing into the elements of `page`
    /// named by `config`.
    ///
    /// The configuration is validated here; an invalid configuration is the
    /// only way for this to fail.  Elements that cannot be found are logged
    /// and skipped.  If the calendar slot exists, a "Clear selection" button
    /// is added right after it.
    pub fn attach(config: &Config, mut page: Page, calendar: C) -> Result<Self, ConfigError> {
        let Validated {
            display_format,
            submit_selector,
        } = config.validate()?;
        let mut targets = Targets {
            calendar: resolve(&page, &config.calendar_id, ElementKind::Calendar),
            clear_button: None,
            start_input: resolve(&page, &config.start_input_id, ElementKind::Input),
            end_input: resolve(&page, &config.end_input_id, ElementKind::Input),
            info_container: resolve(&page, &config.info_container_id, ElementKind::Container),
            info_text: resolve(&page, &config.info_text_id, ElementKind::Text),
            submit: page
                .select(&submit_selector)
                .filter(|n| n.element.kind() == ElementKind::Button)
                .map(|n| n.id.clone()),
        };
        if targets.submit.is_none() {
            warn!(
                "No button matches {:?}; submission will not be gated",
                config.submit_selector
            );
        }
        if let Some(cal_id) = targets.calendar.as_deref() {
            let clear_id = format!("{cal_id}-clear");
            let parent = page
                .nodes()
                .iter()
                .find(|n| n.id == cal_id)
                .and_then(|n| n.parent.clone());
            page.insert_after(
                cal_id,
                Node {
                    id: clear_id.clone(),
                    parent,
                    element: Element::Button {
                        label: String::from("Clear selection"),
                        button_type: ButtonType::Button,
                        disabled: false,
                    },
                },
            );
            targets.clear_button = Some(clear_id);
        }
        let mut selector = RangeSelector {
            selection: Selection::new(),
            calendar,
            page,
            targets,
            display_format,
            highlight_color: config.highlight_color,
        };
        selector.apply();
        selector.calendar.refresh();
        info!("Attached date range picker to {:?}", config.calendar_id);
        Ok(selector)
    }

    /// Handle a click on `day`: start a new range, or complete the current
    /// one
    pub fn handle_date_click(&mut self, day: Date) {
        let before = self.selection.phase();
        self.selection = self.selection.click(day);
        debug!(
            "Clicked {day}: {before:?} -> {:?} ({:?} to {:?})",
            self.selection.phase(),
            self.selection.start(),
            self.selection.end()
        );
        self.apply();
    }

    /// Reissue the highlight after the calendar's visible dates changed
    pub fn handle_view_change(&mut self) {
        debug!("Calendar view changed; reapplying highlight");
        self.apply_highlight();
    }

    pub fn clear(&mut self) {
        info!("Clearing selection");
        self.selection = self.selection.cleared();
        self.apply();
    }

    /// Set the selection programmatically, e.g., to show an existing range.
    /// The endpoints are put in order; a lone endpoint starts an unfinished
    /// range, and no endpoints at all is the same as [`clear()`](Self::clear).
    pub fn set_range(&mut self, start: Option<Date>, end: Option<Date>) {
        self.selection = Selection::with_range(start, end);
        debug!(
            "Range set to {:?} .. {:?}",
            self.selection.start(),
            self.selection.end()
        );
        self.apply();
    }

    pub fn get_start(&self) -> Option<Date> {
        self.selection.start()
    }

    pub fn get_end(&self) -> Option<Date> {
        self.selection.end()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn handle_event(&mut self, event: CalendarEvent) {
        match event {
            CalendarEvent::DateClick(day) => self.handle_date_click(day),
            CalendarEvent::ViewChanged => self.handle_view_change(),
        }
    }

    /// Handle all notifications the calendar has queued up
    pub fn pump_events(&mut self) {
        while let Some(event) = self.calendar.next_event() {
            self.handle_event(event);
        }
    }

    /// Whether the page may be submitted now.  Without a submit button there
    /// is nothing to gate, so this is always true.
    pub fn can_submit(&self) -> bool {
        self.targets
            .submit
            .as_deref()
            .and_then(|id| self.page.is_disabled(id))
            .map_or(true, |disabled| !disabled)
    }

    /// Returns the `(id, value)` pairs of the page's inputs if the page may
    /// be submitted now
    pub fn submit(&self) -> Option<Vec<(String, String)>> {
        if !self.can_submit() {
            debug!("Submission refused; range is incomplete");
            return None;
        }
        let data = self
            .page
            .form_data()
            .into_iter()
            .map(|(id, value)| (id.to_owned(), value.to_owned()))
            .collect::<Vec<_>>();
        info!("Submitting {data:?}");
        Some(data)
    }

    pub fn calendar(&self) -> &C {
        &self.calendar
    }

    pub fn calendar_mut(&mut self) -> &mut C {
        &mut self.calendar
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// ID of the "Clear selection" button added at attach time, if any
    pub fn clear_button_id(&self) -> Option<&str> {
        self.targets.clear_button.as_deref()
    }

    /// ID of the submit button being gated, if any
    pub fn submit_button_id(&self) -> Option<&str> {
        self.targets.submit.as_deref()
    }

    /// ID of the calendar slot, if the page has one
    pub fn calendar_slot_id(&self) -> Option<&str> {
        self.targets.calendar.as_deref()
    }

    fn apply(&mut self) {
        self.update_status();
        self.update_inputs();
        self.update_submit_state();
        self.apply_highlight();
    }

    fn update_status(&mut self) {
        let text = self.selection.status().text(&self.display_format);
        if let Some(id) = &self.targets.info_text {
            self.page.set_text(id, &text);
        }
        if let Some(id) = &self.targets.info_container {
            self.page.set_hidden(id, text.is_empty());
        }
    }

    fn update_inputs(&mut self) {
        if let Some(id) = &self.targets.start_input {
            self.page.set_value(id, &format_day_opt(self.selection.start()));
        }
        if let Some(id) = &self.targets.end_input {
            self.page.set_value(id, &format_day_opt(self.selection.end()));
        }
    }

    fn update_submit_state(&mut self) {
        if let Some(id) = &self.targets.submit {
            self.page.set_disabled(id, !self.selection.submit_enabled());
        }
    }

    fn clear_highlight(&mut self) {
        while self.calendar.remove_decoration(HIGHLIGHT_ID).is_some() {}
    }

    // An unchanged highlight stays where it is in the calendar's decoration
    // order, so decorations added after it keep painting over it
    fn apply_highlight(&mut self) {
        let wanted = self.selection.highlight().map(|region| Decoration {
            id: String::from(HIGHLIGHT_ID),
            start: region.start(),
            end: region.end_exclusive(),
            color: self.highlight_color,
        });
        let mut current = self
            .calendar
            .decorations()
            .iter()
            .filter(|d| d.id == HIGHLIGHT_ID);
        if current.next() == wanted.as_ref() && current.next().is_none() {
            return;
        }
        self.clear_highlight();
        if let Some(deco) = wanted {
            self.calendar.add_decoration(deco);
        }
    }
}

fn resolve(page: &Page, id: &str, kind: ElementKind) -> Option<String> {
    match page.by_id(id) {
        Some(elem) if elem.kind() == kind => Some(id.to_owned()),
        Some(elem) => {
            warn!(
                "Element {id:?} is a {}, not a {kind}; ignoring it",
                elem.kind()
            );
            None
        }
        None => {
            warn!("No element {id:?} on the page; ignoring it");
            None
        }
    }
}

/// Day hook that tints Saturdays and Sundays
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WeekendTint(pub Color);

impl DayDecorator for WeekendTint {
    fn decorate_day(&self, date: Date, cell: &mut Style) {
        if is_weekend(date) {
            *cell = cell.fg(self.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageParts;
    use std::collections::VecDeque;
    use time::macros::date;

    #[derive(Debug, Default)]
    struct FakeCalendar {
        decorations: Vec<Decoration>,
        events: VecDeque<CalendarEvent>,
        refreshes: usize,
    }

    impl CalendarSurface for FakeCalendar {
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
            self.refreshes += 1;
        }
    }

    fn picker() -> RangeSelector<FakeCalendar> {
        let config = Config::default();
        let page = Page::standard(&config, PageParts::default());
        RangeSelector::attach(&config, page, FakeCalendar::default()).unwrap()
    }

    fn highlights(sel: &RangeSelector<FakeCalendar>) -> Vec<&Decoration> {
        sel.calendar()
            .decorations()
            .iter()
            .filter(|d| d.id == HIGHLIGHT_ID)
            .collect()
    }

    fn assert_mirrored(sel: &RangeSelector<FakeCalendar>) {
        assert_eq!(
            sel.page().value("range-start"),
            Some(format_day_opt(sel.get_start()).as_str())
        );
        assert_eq!(
            sel.page().value("range-end"),
            Some(format_day_opt(sel.get_end()).as_str())
        );
    }

    #[test]
    fn test_attach() {
        let sel = picker();
        assert_eq!(sel.get_start(), None);
        assert_eq!(sel.get_end(), None);
        assert_eq!(sel.page().is_disabled("submit"), Some(true));
        assert!(!sel.can_submit());
        assert_eq!(sel.page().text("range-text"), Some(""));
        assert!(!sel.page().is_visible("range-text"));
        assert!(highlights(&sel).is_empty());
        assert_eq!(sel.calendar().refreshes, 1);
        assert_eq!(sel.clear_button_id(), Some("date-range-calendar-clear"));
        assert_eq!(sel.page().nodes()[1].id, "date-range-calendar-clear");
        assert_mirrored(&sel);
    }

    #[test]
    fn test_attach_invalid_config() {
        let config = Config {
            start_input_id: String::new(),
            ..Config::default()
        };
        let page = Page::standard(&config, PageParts::default());
        assert!(RangeSelector::attach(&config, page, FakeCalendar::default()).is_err());
    }

    #[test]
    fn test_click_once() {
        let mut sel = picker();
        sel.handle_date_click(date!(2024 - 03 - 10));
        assert_eq!(sel.get_start(), Some(date!(2024 - 03 - 10)));
        assert_eq!(sel.get_end(), None);
        assert_eq!(sel.page().is_disabled("submit"), Some(true));
        assert_eq!(
            sel.page().text("range-text"),
            Some("Start: 10/03/2024, select end date")
        );
        assert!(sel.page().is_visible("range-text"));
        let hl = highlights(&sel);
        assert_eq!(hl.len(), 1);
        assert_eq!(hl[0].start, date!(2024 - 03 - 10));
        assert_eq!(hl[0].end, Some(date!(2024 - 03 - 11)));
        assert_mirrored(&sel);
    }

    #[test]
    fn test_click_twice_out_of_order() {
        let mut sel = picker();
        sel.handle_date_click(date!(2024 - 03 - 10));
        sel.handle_date_click(date!(2024 - 03 - 05));
        assert_eq!(sel.get_start(), Some(date!(2024 - 03 - 05)));
        assert_eq!(sel.get_end(), Some(date!(2024 - 03 - 10)));
        assert_eq!(sel.page().is_disabled("submit"), Some(false));
        assert!(sel.can_submit());
        assert_eq!(
            sel.page().text("range-text"),
            Some("✅ 05/03/2024 → 10/03/2024")
        );
        let hl = highlights(&sel);
        assert_eq!(hl.len(), 1);
        assert_eq!(hl[0].start, date!(2024 - 03 - 05));
        assert_eq!(hl[0].end, Some(date!(2024 - 03 - 11)));
        assert_eq!(hl[0].color, Config::default().highlight_color);
        assert_mirrored(&sel);
    }

    #[test]
    fn test_third_click_starts_fresh() {
        let mut sel = picker();
        sel.handle_date_click(date!(2024 - 03 - 05));
        sel.handle_date_click(date!(2024 - 03 - 10));
        sel.handle_date_click(date!(2024 - 05 - 01));
        assert_eq!(sel.get_start(), Some(date!(2024 - 05 - 01)));
        assert_eq!(sel.get_end(), None);
        assert_eq!(sel.page().is_disabled("submit"), Some(true));
        assert_eq!(highlights(&sel).len(), 1);
        assert_mirrored(&sel);
    }

    #[test]
    fn test_clear_from_any_state() {
        let setups: [&[Date]; 3] = [
            &[],
            &[date!(2024 - 03 - 05)],
            &[date!(2024 - 03 - 05), date!(2024 - 03 - 10)],
        ];
        for clicks in setups {
            let mut sel = picker();
            for &d in clicks {
                sel.handle_date_click(d);
            }
            sel.clear();
            assert_eq!(sel.get_start(), None);
            assert_eq!(sel.get_end(), None);
            assert_eq!(sel.page().is_disabled("submit"), Some(true));
            assert_eq!(sel.page().text("range-text"), Some(""));
            assert!(!sel.page().is_visible("range-info"));
            assert!(highlights(&sel).is_empty());
            assert_mirrored(&sel);
        }
    }

    #[test]
    fn test_set_range_orders_endpoints() {
        let days = [
            date!(2023 - 12 - 31),
            date!(2024 - 01 - 01),
            date!(2024 - 02 - 29),
            date!(2024 - 03 - 10),
        ];
        let mut sel = picker();
        for a in days {
            for b in days {
                sel.set_range(Some(a), Some(b));
                assert_eq!(sel.get_start(), Some(a.min(b)));
                assert_eq!(sel.get_end(), Some(a.max(b)));
                assert_eq!(sel.page().is_disabled("submit"), Some(false));
                assert_eq!(highlights(&sel).len(), 1);
                assert_mirrored(&sel);
            }
        }
    }

    #[test]
    fn test_set_range_partial() {
        let mut sel = picker();
        sel.set_range(None, Some(date!(2024 - 03 - 10)));
        assert_eq!(sel.get_start(), Some(date!(2024 - 03 - 10)));
        assert_eq!(sel.get_end(), None);
        assert_eq!(sel.page().is_disabled("submit"), Some(true));
        // The next click completes the pre-seeded range
        sel.handle_date_click(date!(2024 - 03 - 12));
        assert_eq!(sel.get_end(), Some(date!(2024 - 03 - 12)));
        sel.set_range(None, None);
        assert_eq!(sel.selection(), Selection::new());
        assert!(highlights(&sel).is_empty());
        assert_mirrored(&sel);
    }

    #[test]
    fn test_view_change_idempotent() {
        let mut sel = picker();
        sel.handle_date_click(date!(2024 - 03 - 05));
        sel.handle_date_click(date!(2024 - 03 - 10));
        let before = highlights(&sel).into_iter().cloned().collect::<Vec<_>>();
        for _ in 0..5 {
            sel.handle_view_change();
        }
        let after = highlights(&sel).into_iter().cloned().collect::<Vec<_>>();
        assert_eq!(after.len(), 1);
        assert_eq!(before, after);
    }

    #[test]
    fn test_view_change_when_empty() {
        let mut sel = picker();
        sel.handle_view_change();
        sel.handle_view_change();
        assert!(highlights(&sel).is_empty());
    }

    #[test]
    fn test_other_decorations_untouched() {
        let mut sel = picker();
        sel.calendar_mut().add_decoration(Decoration {
            id: String::from("holiday"),
            start: date!(2024 - 03 - 08),
            end: Some(date!(2024 - 03 - 09)),
            color: Color::Red,
        });
        sel.handle_date_click(date!(2024 - 03 - 05));
        sel.handle_view_change();
        sel.clear();
        assert_eq!(sel.calendar().decorations().len(), 1);
        assert_eq!(sel.calendar().decorations()[0].id, "holiday");
    }

    #[test]
    fn test_view_change_keeps_decoration_order() {
        let mut sel = picker();
        sel.handle_date_click(date!(2024 - 03 - 05));
        sel.handle_date_click(date!(2024 - 03 - 10));
        sel.calendar_mut().add_decoration(Decoration {
            id: String::from("holiday"),
            start: date!(2024 - 03 - 08),
            end: Some(date!(2024 - 03 - 09)),
            color: Color::Red,
        });
        sel.handle_view_change();
        let ids = sel
            .calendar()
            .decorations()
            .iter()
            .map(|d| d.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, [HIGHLIGHT_ID, "holiday"]);
        // A changed highlight is reissued
        sel.handle_date_click(date!(2024 - 04 - 01));
        let ids = sel
            .calendar()
            .decorations()
            .iter()
            .map(|d| d.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["holiday", HIGHLIGHT_ID]);
    }

    #[test]
    fn test_stale_highlights_removed() {
        let mut sel = picker();
        // Simulate a duplicate left behind by someone else
        for _ in 0..2 {
            sel.calendar_mut().add_decoration(Decoration {
                id: String::from(HIGHLIGHT_ID),
                start: date!(2020 - 01 - 01),
                end: None,
                color: Color::Red,
            });
        }
        sel.handle_view_change();
        assert!(highlights(&sel).is_empty());
    }

    #[test]
    fn test_pump_events() {
        let mut sel = picker();
        sel.calendar_mut().events.extend([
            CalendarEvent::ViewChanged,
            CalendarEvent::DateClick(date!(2024 - 03 - 10)),
            CalendarEvent::ViewChanged,
            CalendarEvent::DateClick(date!(2024 - 03 - 05)),
        ]);
        sel.pump_events();
        assert_eq!(sel.get_start(), Some(date!(2024 - 03 - 05)));
        assert_eq!(sel.get_end(), Some(date!(2024 - 03 - 10)));
        assert!(sel.calendar().events.is_empty());
        assert_eq!(highlights(&sel).len(), 1);
    }

    #[test]
    fn test_missing_elements() {
        let config = Config::default();
        let page = Page::standard(
            &config,
            PageParts {
                inputs: false,
                status: false,
                submit: false,
            },
        );
        let mut sel = RangeSelector::attach(&config, page, FakeCalendar::default()).unwrap();
        assert!(sel.can_submit());
        sel.handle_date_click(date!(2024 - 03 - 10));
        assert!(sel.can_submit());
        sel.handle_date_click(date!(2024 - 03 - 05));
        assert_eq!(sel.get_start(), Some(date!(2024 - 03 - 05)));
        assert_eq!(highlights(&sel).len(), 1);
        sel.clear();
        assert!(sel.page().form_data().is_empty());
        assert_eq!(sel.submit_button_id(), None);
    }

    #[test]
    fn test_no_calendar_slot() {
        let config = Config::default();
        let page = Page::new().with(
            "range-start",
            Element::Input {
                value: String::from("stale"),
            },
        );
        let mut sel = RangeSelector::attach(&config, page, FakeCalendar::default()).unwrap();
        assert_eq!(sel.calendar_slot_id(), None);
        assert_eq!(sel.clear_button_id(), None);
        // The mirror is brought in line with the empty selection right away
        assert_eq!(sel.page().value("range-start"), Some(""));
        sel.handle_date_click(date!(2024 - 03 - 10));
        assert_eq!(sel.page().value("range-start"), Some("2024-03-10"));
    }

    #[test]
    fn test_wrong_kind_ignored() {
        let page = Page::standard(&Config::default(), PageParts::default());
        let config = Config {
            start_input_id: String::from("range-info"),
            ..Config::default()
        };
        let mut sel = RangeSelector::attach(&config, page, FakeCalendar::default()).unwrap();
        sel.handle_date_click(date!(2024 - 03 - 10));
        assert_eq!(
            sel.page().by_id("range-info"),
            Some(&Element::Container { hidden: false })
        );
        assert_eq!(sel.page().value("range-start"), Some(""));
        sel.handle_date_click(date!(2024 - 03 - 12));
        assert_eq!(sel.page().value("range-end"), Some("2024-03-12"));
        assert_eq!(sel.page().is_disabled("submit"), Some(false));
    }

    #[test]
    fn test_submit_selector_by_id() {
        let config = Config {
            submit_selector: String::from("#go"),
            ..Config::default()
        };
        let page = Page::standard(&config, PageParts::default()).with(
            "go",
            Element::Button {
                label: String::from("Go"),
                button_type: ButtonType::Button,
                disabled: false,
            },
        );
        let sel = RangeSelector::attach(&config, page, FakeCalendar::default()).unwrap();
        assert_eq!(sel.submit_button_id(), Some("go"));
        assert_eq!(sel.page().is_disabled("go"), Some(true));
        assert_eq!(sel.page().is_disabled("submit"), Some(false));
    }

    #[test]
    fn test_submit() {
        let mut sel = picker();
        assert_eq!(sel.submit(), None);
        sel.handle_date_click(date!(2024 - 03 - 10));
        assert_eq!(sel.submit(), None);
        sel.handle_date_click(date!(2024 - 03 - 05));
        assert_eq!(
            sel.submit(),
            Some(vec![
                (String::from("range-start"), String::from("2024-03-05")),
                (String::from("range-end"), String::from("2024-03-10")),
            ])
        );
    }

    #[test]
    fn test_weekend_tint() {
        let tint = WeekendTint(Color::LightRed);
        for (date, weekend) in [
            (date!(2024 - 03 - 08), false),
            (date!(2024 - 03 - 09), true),
            (date!(2024 - 03 - 10), true),
            (date!(2024 - 03 - 11), false),
        ] {
            let mut style = Style::new();
            tint.decorate_day(date, &mut style);
            let expected = if weekend {
                Style::new().fg(Color::LightRed)
            } else {
                Style::new()
            };
            assert_eq!(style, expected, "styling {date}");
        }
    }
}
