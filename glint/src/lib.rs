#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod attr;
mod handler;
mod level;
mod options;
mod record;
mod styles;

pub use owo_colors::Style;

pub use attr::{err, service, AnyValue, Attr, BoxError, Value, ERR_KEY, SERVICE_KEY};
pub use handler::{Handler, PrettyHandler, LEVEL_KEY, SOURCE_KEY, TIME_KEY};
pub use level::{Level, ParseLevelError};
pub use options::{
    file_source_link, Options, ReplaceAttr, SourceLink, DEFAULT_LEVEL, DEFAULT_TIME_FORMAT,
};
pub use record::{Record, Source};
pub use styles::{error_attr_style, service_attr_style, LevelStyle, Styles};
