//! Display styles for rendered lines.
//!
//! Styles are explicit values threaded through [`Options`](crate::Options);
//! there is no process-wide palette. [`Styles::default`] and
//! [`Styles::plain`] are pure factories returning fresh bundles.

use core::fmt;
use std::borrow::Cow;
use std::collections::BTreeMap;

use owo_colors::{OwoColorize as _, Style};

use crate::level::Level;

/// The display style and tag for one level.
#[derive(Debug, Clone)]
pub struct LevelStyle {
    /// The rendered tag, e.g. `INF`.
    pub label: Cow<'static, str>,
    /// The tag's style.
    pub style: Style,
}

impl LevelStyle {
    /// A level style from a tag and a style.
    pub fn new(label: impl Into<Cow<'static, str>>, style: Style) -> LevelStyle {
        LevelStyle {
            label: label.into(),
            style,
        }
    }
}

/// The full style bundle consulted by a handler.
#[derive(Debug, Clone)]
pub struct Styles {
    /// Style for the time field.
    pub time: Style,
    /// Default style for attributes; keys render a dimmed variant of it.
    pub attr: Style,
    /// Style for the prefix segment ahead of the message.
    pub prefix: Style,
    /// Style for the `<file:line>` call-site field.
    pub source: Style,
    /// Tag and style per level. Levels missing here render their display
    /// form in the attr style.
    pub levels: BTreeMap<Level, LevelStyle>,
}

impl Default for Styles {
    /// The colored default palette.
    fn default() -> Styles {
        Styles {
            time: Style::new().bright_black(),
            attr: Style::new().bright_white(),
            prefix: Style::new().bright_magenta(),
            source: Style::new().bright_black(),
            levels: BTreeMap::from([
                (Level::DEBUG, LevelStyle::new("DBG", Style::new().bright_white())),
                (Level::INFO, LevelStyle::new("INF", Style::new().blue())),
                (Level::WARN, LevelStyle::new("WRN", Style::new().yellow())),
                (Level::ERROR, LevelStyle::new("ERR", Style::new().red())),
            ]),
        }
    }
}

impl Styles {
    /// A bundle with no styling at all; output is plain bytes.
    pub fn plain() -> Styles {
        Styles {
            time: Style::new(),
            attr: Style::new(),
            prefix: Style::new(),
            source: Style::new(),
            levels: BTreeMap::from([
                (Level::DEBUG, LevelStyle::new("DBG", Style::new())),
                (Level::INFO, LevelStyle::new("INF", Style::new())),
                (Level::WARN, LevelStyle::new("WRN", Style::new())),
                (Level::ERROR, LevelStyle::new("ERR", Style::new())),
            ]),
        }
    }
}

/// The style [`err`](crate::err) attributes carry.
pub fn error_attr_style() -> Style {
    Style::new().red()
}

/// The style [`service`](crate::service) attributes carry.
pub fn service_attr_style() -> Style {
    Style::new().bright_magenta()
}

/// Writes `text` into `buf`, styled. A plain style is byte-transparent: no
/// escape sequences are emitted at all.
pub(crate) fn push_styled<T: fmt::Display>(buf: &mut String, text: T, style: Style) {
    use core::fmt::Write as _;

    let _ = if style.is_plain() {
        write!(buf, "{text}")
    } else {
        write!(buf, "{}", text.style(style))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_styles_are_byte_transparent() {
        let mut buf = String::new();
        push_styled(&mut buf, "hello", Style::new());
        assert_eq!(buf, "hello");
    }

    #[test]
    fn styled_text_wraps_in_escapes() {
        let mut buf = String::new();
        push_styled(&mut buf, "hello", Style::new().red());
        assert!(buf.contains("hello"));
        assert!(buf.contains('\u{1b}'));
    }
}
