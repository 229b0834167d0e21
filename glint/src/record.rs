//! Log records and call-site capture.

use core::panic::Location;
use std::borrow::Cow;

use jiff::Zoned;

use crate::attr::{AnyValue, Attr};
use crate::level::Level;

/// One log event.
#[derive(Debug, Clone)]
pub struct Record {
    /// When the event happened. `None` omits the time field entirely.
    pub time: Option<Zoned>,
    /// Event severity.
    pub level: Level,
    /// The log message.
    pub message: String,
    /// Where the event was logged from, if captured.
    pub source: Option<Source>,
    /// Attributes in declaration order.
    pub attrs: Vec<Attr>,
}

impl Record {
    /// A bare record with no time and no call-site.
    pub fn new(level: Level, message: impl Into<String>) -> Record {
        Record {
            time: None,
            level,
            message: message.into(),
            source: None,
            attrs: Vec::new(),
        }
    }

    /// A record stamped with the current wall-clock time and the caller's
    /// source location.
    #[track_caller]
    pub fn now(level: Level, message: impl Into<String>) -> Record {
        Record {
            time: Some(Zoned::now()),
            source: Some(Source::caller()),
            ..Record::new(level, message)
        }
    }

    /// Sets the timestamp.
    pub fn with_time(mut self, time: Zoned) -> Record {
        self.time = Some(time);
        self
    }

    /// Sets the call-site.
    pub fn with_source(mut self, source: Source) -> Record {
        self.source = Some(source);
        self
    }

    /// Appends one attribute.
    pub fn with_attr(mut self, attr: Attr) -> Record {
        self.attrs.push(attr);
        self
    }

    /// Appends attributes, preserving order.
    pub fn with_attrs(mut self, attrs: impl IntoIterator<Item = Attr>) -> Record {
        self.attrs.extend(attrs);
        self
    }
}

/// The source location a record was logged from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Source file path as known to the compiler.
    pub file: Cow<'static, str>,
    /// 1-based line number.
    pub line: u32,
}

impl Source {
    /// The caller's own location.
    #[track_caller]
    pub fn caller() -> Source {
        let location = Location::caller();
        Source {
            file: Cow::Borrowed(location.file()),
            line: location.line(),
        }
    }
}

// Lets a call-site travel through the attribute-replacement hook as a
// synthetic attribute and be recognized on the way back out.
impl AnyValue for Source {
    fn display_text(&self) -> Option<String> {
        Some(format!("{}:{}", self.file, self.line))
    }
}
