use crate::help::Help;
use crossterm::event::{
    read, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use rangecal::calendar::{Calendar, DayDecorator, WeekWindow};
use rangecal::page::Element;
use rangecal::theme::{
    form::{BUTTON_STYLE, DISABLED_BUTTON_STYLE, HINT_STYLE, STATUS_STYLE},
    BASE_STYLE,
};
use rangecal::RangeSelector;
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Position, Rect},
    style::Style,
    text::Line,
    widgets::{StatefulWidget, Widget},
    Terminal,
};
use std::io::{self, Write};

#[derive(Clone, Debug)]
pub(crate) struct App<D> {
    selector: RangeSelector<WeekWindow<D>>,
    state: AppState,
    // Clickable buttons as drawn in the last render
    buttons: Vec<(Rect, ButtonAction)>,
}

/// How the user left the picker
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Outcome {
    Submitted(Vec<(String, String)>),
    Cancelled,
}

impl<D: DayDecorator> App<D> {
    pub(crate) fn new(selector: RangeSelector<WeekWindow<D>>) -> App<D> {
        App {
            selector,
            state: AppState::Calendar,
            buttons: Vec::new(),
        }
    }

    pub(crate) fn run<B: Backend>(mut self, terminal: &mut Terminal<B>) -> io::Result<Outcome> {
        while !self.finished() {
            self.draw(terminal)?;
            // Drawing may have resized the calendar
            self.selector.pump_events();
            self.handle_input()?;
        }
        Ok(self.outcome())
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|frame| frame.render_widget(&mut *self, frame.area()))?;
        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        let event = read()?;
        if let Some(KeyEvent {
            code, modifiers, ..
        }) = event.as_key_press_event()
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                self.beep()?;
            }
        } else if let Event::Mouse(mouse) = event {
            if !self.handle_mouse(mouse) {
                self.beep()?;
            }
        }
        // else: Redraw on resize, and we might as well redraw on other stuff
        // too
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key
    fn handle_key(&mut self, key: KeyCode) -> bool {
        match self.state {
            AppState::Calendar => match key {
                KeyCode::Char('h') | KeyCode::Left => self.move_cursor(-1),
                KeyCode::Char('l') | KeyCode::Right => self.move_cursor(1),
                KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-7),
                KeyCode::Char('j') | KeyCode::Down => self.move_cursor(7),
                KeyCode::Char('w') | KeyCode::PageUp => self.page_up(),
                KeyCode::Char('z') | KeyCode::PageDown => self.page_down(),
                KeyCode::Char('0') | KeyCode::Home => {
                    self.selector.calendar_mut().jump_to_today();
                    true
                }
                KeyCode::Enter | KeyCode::Char(' ') => {
                    self.selector.calendar_mut().click_cursor();
                    self.selector.pump_events();
                    true
                }
                KeyCode::Char('c') | KeyCode::Backspace => {
                    self.selector.clear();
                    true
                }
                KeyCode::Char('s') => self.submit(),
                KeyCode::Char('?') => {
                    self.state = AppState::Helping;
                    true
                }
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.state = AppState::Quitting;
                    true
                }
                _ => false,
            },
            AppState::Helping => {
                self.state = AppState::Calendar;
                true
            }
            AppState::Submitted(_) | AppState::Quitting => false,
        }
    }

    // Returns `false` if the mouse did something invalid
    fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        match self.state {
            AppState::Calendar => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => self.click(mouse.column, mouse.row),
                MouseEventKind::ScrollDown => self.scroll_down(),
                MouseEventKind::ScrollUp => self.scroll_up(),
                _ => true,
            },
            AppState::Helping => {
                if matches!(mouse.kind, MouseEventKind::Down(_)) {
                    self.state = AppState::Calendar;
                }
                true
            }
            AppState::Submitted(_) | AppState::Quitting => true,
        }
    }

    fn click(&mut self, x: u16, y: u16) -> bool {
        let pos = Position::new(x, y);
        let action = self
            .buttons
            .iter()
            .find(|(area, _)| area.contains(pos))
            .map(|&(_, action)| action);
        match action {
            Some(ButtonAction::Clear) => {
                self.selector.clear();
                true
            }
            Some(ButtonAction::Submit) => self.submit(),
            None => {
                if self.selector.calendar_mut().click_at(x, y) {
                    self.selector.pump_events();
                }
                true
            }
        }
    }

    fn submit(&mut self) -> bool {
        match self.selector.submit() {
            Some(data) => {
                self.state = AppState::Submitted(data);
                true
            }
            None => false,
        }
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")?;
        io::stdout().flush()
    }

    fn finished(&self) -> bool {
        matches!(self.state, AppState::Submitted(_) | AppState::Quitting)
    }

    fn outcome(self) -> Outcome {
        match self.state {
            AppState::Submitted(data) => Outcome::Submitted(data),
            _ => Outcome::Cancelled,
        }
    }

    fn move_cursor(&mut self, days: i64) -> bool {
        self.selector.calendar_mut().move_cursor(days).is_ok()
    }

    fn scroll_down(&mut self) -> bool {
        self.selector.calendar_mut().one_week_forwards().is_ok()
    }

    fn scroll_up(&mut self) -> bool {
        self.selector.calendar_mut().one_week_backwards().is_ok()
    }

    fn page_down(&mut self) -> bool {
        self.selector.calendar_mut().one_page_forwards().is_ok()
    }

    fn page_up(&mut self) -> bool {
        self.selector.calendar_mut().one_page_backwards().is_ok()
    }

    // The page elements that take up screen space, in document order
    fn rows(&self) -> Vec<Row> {
        let page = self.selector.page();
        page.nodes()
            .iter()
            .filter_map(|node| match &node.element {
                Element::Calendar => {
                    (self.selector.calendar_slot_id() == Some(node.id.as_str()))
                        .then_some(Row::Calendar)
                }
                Element::Text { content } => Some(Row::Text {
                    content: content.clone(),
                    visible: page.is_visible(&node.id),
                }),
                Element::Button {
                    label, disabled, ..
                } => {
                    let action = if self.selector.clear_button_id() == Some(node.id.as_str()) {
                        Some(ButtonAction::Clear)
                    } else if self.selector.submit_button_id() == Some(node.id.as_str()) {
                        Some(ButtonAction::Submit)
                    } else {
                        None
                    };
                    page.is_visible(&node.id).then(|| Row::Button {
                        label: label.clone(),
                        disabled: *disabled,
                        action,
                    })
                }
                Element::Input { .. } | Element::Container { .. } => None,
            })
            .collect()
    }
}

impl<D: DayDecorator> Widget for &mut App<D> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        self.buttons.clear();
        let rows = self.rows();
        let mut constraints = rows
            .iter()
            .map(|r| match r {
                Row::Calendar => Constraint::Min(0),
                _ => Constraint::Length(1),
            })
            .collect::<Vec<_>>();
        if !rows.contains(&Row::Calendar) {
            constraints.push(Constraint::Fill(1));
        }
        let areas = Layout::vertical(constraints).split(area);
        for (row, &row_area) in std::iter::zip(rows, areas.iter()) {
            match row {
                Row::Calendar => {
                    Calendar::<D>::new().render(row_area, buf, self.selector.calendar_mut());
                }
                Row::Text { content, visible } => {
                    if visible {
                        Line::styled(content, STATUS_STYLE)
                            .centered()
                            .render(row_area, buf);
                    }
                }
                Row::Button {
                    label,
                    disabled,
                    action,
                } => {
                    let line = Line::raw(format!("[ {label} ]"));
                    let width = u16::try_from(line.width()).unwrap_or(u16::MAX);
                    let [button_area] = Layout::horizontal([width])
                        .flex(Flex::Center)
                        .areas(row_area);
                    line.style(button_style(disabled, action))
                        .render(button_area, buf);
                    if let Some(action) = action {
                        self.buttons.push((button_area, action));
                    }
                }
            }
        }
        if self.state == AppState::Helping {
            Help(BASE_STYLE).render(area, buf);
        }
    }
}

fn button_style(disabled: bool, action: Option<ButtonAction>) -> Style {
    if disabled {
        DISABLED_BUTTON_STYLE
    } else if action == Some(ButtonAction::Clear) {
        HINT_STYLE
    } else {
        BUTTON_STYLE
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum AppState {
    Calendar,
    Helping,
    Submitted(Vec<(String, String)>),
    Quitting,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ButtonAction {
    Clear,
    Submit,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Row {
    Calendar,
    Text { content: String, visible: bool },
    Button {
        label: String,
        disabled: bool,
        action: Option<ButtonAction>,
    },
}
