use crate::calendar::WeekStart;
use crate::page::{Selector, SelectorError};
use ratatui::style::Color;
use thiserror::Error;
use time::{
    format_description::{parse_owned, OwnedFormatItem},
    Date,
};

/// Names of the page elements a [`RangeSelector`](crate::RangeSelector)
/// drives, plus presentation settings.  Every field has a default; see
/// [`Config::default()`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Page slot the calendar is mounted in
    pub calendar_id: String,
    /// Hidden input mirroring the start date
    pub start_input_id: String,
    /// Hidden input mirroring the end date
    pub end_input_id: String,
    /// Container of the status line; hidden whenever the status is empty
    pub info_container_id: String,
    /// Element holding the status line text
    pub info_text_id: String,
    /// Selector for the button that is only enabled once a range is complete
    pub submit_selector: String,
    pub week_start: WeekStart,
    /// `time` format description used for dates in the status line
    pub display_format: String,
    /// Background of the days in the selected range
    pub highlight_color: Color,
    /// Tint applied to Saturdays & Sundays
    pub weekend_color: Color,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            calendar_id: String::from("date-range-calendar"),
            start_input_id: String::from("range-start"),
            end_input_id: String::from("range-end"),
            info_container_id: String::from("range-info"),
            info_text_id: String::from("range-text"),
            submit_selector: String::from(r#"button[type="submit"]"#),
            week_start: WeekStart::Monday,
            display_format: String::from("[day]/[month]/[year]"),
            highlight_color: Color::Rgb(0xCD, 0xE8, 0xFF),
            weekend_color: Color::Rgb(0xFA, 0xC8, 0xC8),
        }
    }
}

impl Config {
    /// Check the configuration and parse the parts of it that need parsing.
    /// Whether the named elements actually exist is not checked here; missing
    /// elements are tolerated.
    pub fn validate(&self) -> Result<Validated, ConfigError> {
        for (option, value) in [
            ("calendar_id", &self.calendar_id),
            ("start_input_id", &self.start_input_id),
            ("end_input_id", &self.end_input_id),
            ("info_container_id", &self.info_container_id),
            ("info_text_id", &self.info_text_id),
        ] {
            if value.is_empty() {
                return Err(ConfigError::EmptyId(option));
            }
        }
        if self.start_input_id == self.end_input_id {
            return Err(ConfigError::SharedInput(self.start_input_id.clone()));
        }
        let display_format =
            parse_owned::<1>(&self.display_format).map_err(|source| ConfigError::Format {
                value: self.display_format.clone(),
                source,
            })?;
        Date::MIN
            .format(&display_format)
            .map_err(|source| ConfigError::DateFormat {
                value: self.display_format.clone(),
                source,
            })?;
        let submit_selector = self.submit_selector.parse::<Selector>()?;
        Ok(Validated {
            display_format,
            submit_selector,
        })
    }
}

/// The parsed parts of a valid [`Config`]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Validated {
    pub display_format: OwnedFormatItem,
    pub submit_selector: Selector,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    EmptyId(&'static str),
    #[error("start and end dates cannot share the input {0:?}")]
    SharedInput(String),
    #[error("invalid display format {value:?}")]
    Format {
        value: String,
        source: time::error::InvalidFormatDescription,
    },
    #[error("display format {value:?} cannot be used for dates")]
    DateFormat {
        value: String,
        source: time::error::Format,
    },
    #[error("invalid submit selector")]
    Selector(#[from] SelectorError),
}
