//! A two-click date-range picker.
//!
//! A [`RangeSelector`] listens to a calendar implementing [`CalendarSurface`].
//! The first click on a day starts a range and the second completes it, in
//! either order.  The selection is highlighted on the calendar, mirrored into
//! two hidden inputs of a [`Page`], summarized in a status line, and used to
//! enable or disable the page's submit button.
pub mod calendar;
pub mod config;
pub mod day;
pub mod page;
pub mod selection;
pub mod selector;
pub mod theme;
pub use crate::calendar::{CalendarEvent, CalendarSurface, WeekStart};
pub use crate::config::{Config, ConfigError};
pub use crate::page::{Page, PageParts};
pub use crate::selection::{Selection, Status};
pub use crate::selector::{RangeSelector, WeekendTint};
