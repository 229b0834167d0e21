//! The handler: line assembly, attribute writing and derivation.
//!
//! A [`PrettyHandler`] is an immutable snapshot. [`with_attrs`] and
//! [`with_group`] derive new snapshots instead of mutating, and attributes
//! attached at derivation time are rendered once into a buffer the derived
//! handler replays verbatim on every event. All snapshots derived from one
//! root share a single mutex around the sink, so lines from the whole family
//! never interleave.
//!
//! [`with_attrs`]: PrettyHandler::with_attrs
//! [`with_group`]: PrettyHandler::with_group

use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use jiff::fmt::strtime;
use jiff::Zoned;
use owo_colors::Style;

use crate::attr::{write_value, Attr, Value};
use crate::level::Level;
use crate::options::Options;
use crate::record::{Record, Source};
use crate::styles::push_styled;

/// Key of the synthetic time attribute offered to the replacement hook.
pub const TIME_KEY: &str = "time";
/// Key of the synthetic level attribute offered to the replacement hook.
pub const LEVEL_KEY: &str = "level";
/// Key of the synthetic source attribute offered to the replacement hook.
pub const SOURCE_KEY: &str = "source";

/// The structured-logging handler contract.
///
/// Implementations are immutable: the derivation methods return new handlers
/// and never change the receiver. Derived handlers share the original's sink
/// and its write serialization.
pub trait Handler: Send + Sync {
    /// Whether records at `level` should be handled at all.
    ///
    /// Pure; safe to call concurrently with [`handle`](Handler::handle).
    fn enabled(&self, level: Level) -> bool;

    /// Renders one record as a line and writes it to the sink.
    ///
    /// The caller is expected to have checked [`enabled`](Handler::enabled).
    /// A sink write failure is the only error; there is no retry and no
    /// buffering across calls.
    fn handle(&self, record: &Record) -> io::Result<()>;

    /// A handler that renders `attrs` ahead of every record's own
    /// attributes. Passing no attributes is a no-op.
    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler>;

    /// A handler whose subsequently attached attribute keys are namespaced
    /// under `name`. Passing an empty name is a no-op.
    fn with_group(&self, name: &str) -> Arc<dyn Handler>;
}

/// Renders records as styled, human-readable lines.
///
/// The output format is
/// `[time] LEVEL [<file:line>] [prefix: ]message[ key=value]...`, each
/// bracketed field present only when enabled and non-empty, with a single
/// `write` per event under the shared lock.
pub struct PrettyHandler<W> {
    writer: Arc<Mutex<W>>,
    opts: Arc<Options>,

    // dot-terminated key prefix accumulated by with_group, and the raw
    // group names for the replacement hook
    group: String,
    groups: Vec<String>,

    // pre-rendered derivation state: prefix segments (each dot-terminated)
    // and leading-space attribute entries
    prefix: String,
    attrs: String,
}

impl<W> Clone for PrettyHandler<W> {
    fn clone(&self) -> Self {
        PrettyHandler {
            writer: Arc::clone(&self.writer),
            opts: Arc::clone(&self.opts),
            group: self.group.clone(),
            groups: self.groups.clone(),
            prefix: self.prefix.clone(),
            attrs: self.attrs.clone(),
        }
    }
}

impl<W: io::Write> PrettyHandler<W> {
    /// A handler with default [`Options`] writing to `writer`.
    pub fn new(writer: W) -> PrettyHandler<W> {
        PrettyHandler::with_options(writer, Options::default())
    }

    /// A handler with explicit options writing to `writer`.
    pub fn with_options(writer: W, options: Options) -> PrettyHandler<W> {
        PrettyHandler {
            writer: Arc::new(Mutex::new(writer)),
            opts: Arc::new(options),
            group: String::new(),
            groups: Vec::new(),
            prefix: String::new(),
            attrs: String::new(),
        }
    }

    /// Whether records at `level` meet the configured minimum.
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.opts.level
    }

    /// Derives a handler with `attrs` pre-rendered.
    ///
    /// Prefix-marked attributes (the first one per call, when prefix
    /// handling is enabled) go to the prefix buffer; everything else is
    /// rendered under the current group prefix and appended to an
    /// independent copy of the attribute buffer, so siblings derived from
    /// the same parent never see each other's attachments.
    pub fn with_attrs(&self, attrs: Vec<Attr>) -> PrettyHandler<W> {
        if attrs.is_empty() {
            return self.clone();
        }

        let mut derived = self.clone();
        let mut prefix_taken = false;
        for attr in attrs {
            if self.opts.add_prefix && !prefix_taken && attr.value.is_prefix() {
                prefix_taken = true;
                let style = attr.value.style_override().unwrap_or(self.opts.styles.prefix);
                write_value(&mut derived.prefix, &attr.value, style, false);
                derived.prefix.push('.');
            } else {
                self.write_attr(&mut derived.attrs, attr, &self.group, &self.groups);
            }
        }
        derived
    }

    /// Derives a handler whose future attribute keys live under `name`.
    ///
    /// Already pre-rendered attributes keep their old keys; the prefix is
    /// not retroactive.
    pub fn with_group(&self, name: &str) -> PrettyHandler<W> {
        if name.is_empty() {
            return self.clone();
        }

        let mut derived = self.clone();
        derived.group.push_str(name);
        derived.group.push('.');
        derived.groups.push(name.to_string());
        derived
    }

    /// Renders `record` as one line and writes it to the sink.
    ///
    /// Rendering happens outside the lock; only the single sink write is
    /// serialized with the rest of the derivation family.
    pub fn handle(&self, record: &Record) -> io::Result<()> {
        let mut buf =
            String::with_capacity(64 + self.prefix.len() + self.attrs.len() + record.message.len());

        if let Some(time) = &record.time {
            self.write_time(&mut buf, time);
        }

        self.write_level(&mut buf, record.level);

        if self.opts.add_source {
            if let Some(source) = &record.source {
                self.write_source(&mut buf, source);
            }
        }

        let mut event_prefix = None;
        if self.opts.add_prefix {
            event_prefix = record.attrs.iter().position(|attr| attr.value.is_prefix());
            self.write_prefix(&mut buf, event_prefix.map(|idx| &record.attrs[idx]));
        }

        buf.push_str(&record.message);

        buf.push_str(&self.attrs);
        for (idx, attr) in record.attrs.iter().enumerate() {
            if Some(idx) == event_prefix {
                continue;
            }
            self.write_attr(&mut buf, attr.clone(), &self.group, &self.groups);
        }

        buf.push('\n');

        let mut writer = match self.writer.lock() {
            Ok(guard) => guard,
            // the buffer was fully assembled before the lock; a poisoned
            // sink holds no half-written line
            Err(poisoned) => poisoned.into_inner(),
        };
        writer.write_all(buf.as_bytes())
    }

    fn write_time(&self, buf: &mut String, time: &Zoned) {
        let mut attr = Attr::new(TIME_KEY, Value::Timestamp(time.clone()));
        if let Some(replace) = &self.opts.replace_attr {
            attr = replace(&[], attr);
            if attr.is_empty() {
                return;
            }
        }
        match &attr.value {
            Value::Timestamp(time) => {
                // an unformattable time falls back to its default textual form
                let text = strtime::format(&self.opts.time_format, time)
                    .unwrap_or_else(|_| time.to_string());
                push_styled(buf, text, self.opts.styles.time);
            }
            // the hook changed the kind: render a generic attribute in the
            // time position
            _ => self.write_pair(buf, &attr.key, &attr.value, ""),
        }
        buf.push(' ');
    }

    fn write_level(&self, buf: &mut String, level: Level) {
        let mut level = level;
        if let Some(replace) = &self.opts.replace_attr {
            let attr = replace(&[], Attr::any(LEVEL_KEY, level));
            if attr.is_empty() {
                return;
            }
            match attr.value.downcast_ref::<Level>() {
                Some(replaced) => level = *replaced,
                None => {
                    // the hook substituted its own value; render its text
                    write_value(buf, &attr.value, self.opts.styles.attr, false);
                    buf.push(' ');
                    return;
                }
            }
        }
        match self.opts.styles.levels.get(&level) {
            Some(level_style) => push_styled(buf, &level_style.label, level_style.style),
            // unmapped levels fall through to their display form
            None => push_styled(buf, level, self.opts.styles.attr),
        }
        buf.push(' ');
    }

    fn write_source(&self, buf: &mut String, source: &Source) {
        let mut source = source.clone();
        if let Some(replace) = &self.opts.replace_attr {
            let attr = replace(&[], Attr::any(SOURCE_KEY, source.clone()));
            if attr.is_empty() {
                return;
            }
            // a replacement of some other kind keeps the original call-site
            if let Some(replaced) = attr.value.downcast_ref::<Source>() {
                source = replaced.clone();
            }
        }

        let file = Path::new(source.file.as_ref())
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        if file.is_empty() {
            return;
        }

        let label = format!("<{file}:{}>", source.line);
        let link = self.opts.source_link.as_ref().and_then(|link| link(&source));
        match link {
            Some(url) => push_styled(buf, hyperlink(&url, &label), self.opts.styles.source),
            None => push_styled(buf, label, self.opts.styles.source),
        }
        buf.push(' ');
    }

    /// Writes the prefix segment: cached derivation-time segments joined by
    /// dots, then the event's own prefix attribute if it carries one, then
    /// the `": "` separator.
    fn write_prefix(&self, buf: &mut String, event_attr: Option<&Attr>) {
        if self.prefix.is_empty() && event_attr.is_none() {
            return;
        }

        if !self.prefix.is_empty() {
            match event_attr {
                // keep the trailing dot as a joiner when a segment follows
                Some(_) => buf.push_str(&self.prefix),
                None => buf.push_str(&self.prefix[..self.prefix.len() - 1]),
            }
        }
        if let Some(attr) = event_attr {
            let style = attr.value.style_override().unwrap_or(self.opts.styles.prefix);
            write_value(buf, &attr.value, style, false);
        }
        buf.push_str(": ");
    }

    /// Writes one attribute: hook, tombstone check, group flattening, then
    /// a leading-space `key=value` pair.
    fn write_attr(&self, buf: &mut String, attr: Attr, prefix: &str, groups: &[String]) {
        let attr = if let Some(replace) = &self.opts.replace_attr {
            // the hook sees leaves, not groups
            if matches!(attr.value, Value::Group(_)) {
                attr
            } else {
                replace(groups, attr)
            }
        } else {
            attr
        };

        if attr.is_empty() {
            return;
        }

        let Attr { key, value } = attr;
        if let Value::Group(children) = value {
            if key.is_empty() {
                // transparent group: no prefix segment
                for child in children {
                    self.write_attr(buf, child, prefix, groups);
                }
            } else {
                let child_prefix = format!("{prefix}{key}.");
                let mut child_groups = groups.to_vec();
                child_groups.push(key.into_owned());
                for child in children {
                    self.write_attr(buf, child, &child_prefix, &child_groups);
                }
            }
            return;
        }

        buf.push(' ');
        self.write_pair(buf, &key, &value, prefix);
    }

    /// Writes one `key=value` pair under `prefix` with the resolved styles.
    /// The key takes
    /// a dimmed variant of whatever style the value resolved to; the value
    /// keeps its own style only when it was attribute-specific.
    fn write_pair(&self, buf: &mut String, key: &str, value: &Value, prefix: &str) {
        let (style, from_value) = self.resolve_style(value);
        // a plain style stays plain rather than gaining a lone dim flag
        let key_style = if style.is_plain() { style } else { style.dimmed() };
        push_styled(buf, format_args!("{prefix}{key}="), key_style);
        let value_style = if from_value { style } else { Style::new() };
        write_value(buf, value, value_style, true);
    }

    fn resolve_style(&self, value: &Value) -> (Style, bool) {
        match value.style_override() {
            Some(style) => (style, true),
            None => (self.opts.styles.attr, false),
        }
    }
}

impl<W: io::Write + Send + 'static> Handler for PrettyHandler<W> {
    fn enabled(&self, level: Level) -> bool {
        PrettyHandler::enabled(self, level)
    }

    fn handle(&self, record: &Record) -> io::Result<()> {
        PrettyHandler::handle(self, record)
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        Arc::new(PrettyHandler::with_attrs(self, attrs))
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        Arc::new(PrettyHandler::with_group(self, name))
    }
}

// OSC 8 terminal hyperlink around `label`.
fn hyperlink(url: &str, label: &str) -> String {
    format!("\x1b]8;;{url}\x1b\\{label}\x1b]8;;\x1b\\")
}
