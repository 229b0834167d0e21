//! Handler configuration.

use std::sync::Arc;

use crate::attr::Attr;
use crate::level::Level;
use crate::record::Source;
use crate::styles::Styles;

/// The default minimum level.
pub const DEFAULT_LEVEL: Level = Level::INFO;

/// The default time format: wall-clock `HH:MM:SS`, strftime syntax.
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";

/// Rewrites one attribute before it is rendered.
///
/// Called per leaf attribute with the names of the groups enclosing it, and
/// once per synthetic `time`/`level`/`source` attribute (with no groups)
/// ahead of each header field. Returning [`Attr::empty`] drops the entry.
pub type ReplaceAttr = Arc<dyn Fn(&[String], Attr) -> Attr + Send + Sync>;

/// Produces a hyperlink target for a call-site, or `None` for no link.
pub type SourceLink = Arc<dyn Fn(&Source) -> Option<String> + Send + Sync>;

/// Configuration for a [`PrettyHandler`](crate::PrettyHandler).
///
/// Every field has a usable default; `Options::default()` constructs a
/// working handler.
#[derive(Clone)]
pub struct Options {
    pub(crate) level: Level,
    pub(crate) time_format: String,
    pub(crate) replace_attr: Option<ReplaceAttr>,
    pub(crate) add_source: bool,
    pub(crate) add_prefix: bool,
    pub(crate) source_link: Option<SourceLink>,
    pub(crate) styles: Styles,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            level: DEFAULT_LEVEL,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            replace_attr: None,
            add_source: false,
            add_prefix: true,
            source_link: Some(Arc::new(file_source_link)),
            styles: Styles::default(),
        }
    }
}

impl Options {
    /// Default options.
    pub fn new() -> Options {
        Options::default()
    }

    /// Sets the minimum enabled level.
    pub fn with_level(mut self, level: Level) -> Options {
        self.level = level;
        self
    }

    /// Sets the strftime-style time format.
    pub fn with_time_format(mut self, format: impl Into<String>) -> Options {
        self.time_format = format.into();
        self
    }

    /// Installs an attribute-replacement hook.
    pub fn with_replace_attr(
        mut self,
        replace: impl Fn(&[String], Attr) -> Attr + Send + Sync + 'static,
    ) -> Options {
        self.replace_attr = Some(Arc::new(replace));
        self
    }

    /// Whether to render the `<file:line>` call-site field. Off by default.
    pub fn with_source(mut self, add_source: bool) -> Options {
        self.add_source = add_source;
        self
    }

    /// Whether prefix-marked attributes render ahead of the message.
    /// On by default; when off they render as ordinary attributes.
    pub fn with_prefix(mut self, add_prefix: bool) -> Options {
        self.add_prefix = add_prefix;
        self
    }

    /// Sets the style bundle.
    pub fn with_styles(mut self, styles: Styles) -> Options {
        self.styles = styles;
        self
    }

    /// Sets the call-site hyperlink function. The rendered `<file:line>`
    /// label is wrapped in an OSC 8 terminal hyperlink to whatever URL it
    /// returns. The default is [`file_source_link`].
    pub fn with_source_link(
        mut self,
        link: impl Fn(&Source) -> Option<String> + Send + Sync + 'static,
    ) -> Options {
        self.source_link = Some(Arc::new(link));
        self
    }

    /// Removes the call-site hyperlink function; call-sites render as plain
    /// labels.
    pub fn without_source_link(mut self) -> Options {
        self.source_link = None;
        self
    }
}

/// The default [`SourceLink`]: a `file://` URL for the source file.
pub fn file_source_link(source: &Source) -> Option<String> {
    if source.file.is_empty() {
        return None;
    }
    Some(format!("file://{}", source.file))
}
