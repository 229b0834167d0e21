//! Attributes: keyed, typed values attached to log records.
//!
//! Every attribute pairs a key with a [`Value`]. Scalar values render as
//! `key=value`; a [`Value::Group`] nests further attributes and namespaces
//! their keys with a dot-joined prefix. Opaque values implement [`AnyValue`],
//! which doubles as the capability surface: a value may carry its own display
//! style or mark itself as a log prefix.

use core::any::Any;
use core::fmt;
use std::borrow::Cow;
use std::sync::Arc;

use jiff::fmt::friendly::{Designator, Spacing, SpanPrinter};
use jiff::{SignedDuration, Zoned};
use owo_colors::Style;

use crate::styles::{error_attr_style, push_styled, service_attr_style};

/// Key used by [`err`] attributes.
pub const ERR_KEY: &str = "err";
/// Key used by [`service`] attributes.
pub const SERVICE_KEY: &str = "service";

/// A boxed error, as accepted by [`err`] and returned by
/// [`AnyValue::marshal_text`] implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An opaque attribute value, and the capability surface attached to it.
///
/// All methods have defaults, so a plain `impl AnyValue for T {}` gets debug
/// rendering and no capabilities. The renderer resolves the textual form in
/// priority order: [`marshal_text`](AnyValue::marshal_text), then
/// [`display_text`](AnyValue::display_text), then the `Debug` dump. A
/// marshaling failure renders as empty text rather than aborting the line;
/// this is a deliberate best-effort policy.
pub trait AnyValue: Any + fmt::Debug + Send + Sync {
    /// Canonical textual form, if this value marshals itself to text.
    fn marshal_text(&self) -> Option<Result<String, BoxError>> {
        None
    }

    /// Human-readable form, consulted when [`marshal_text`](Self::marshal_text)
    /// yields nothing.
    fn display_text(&self) -> Option<String> {
        None
    }

    /// A display style for this value, overriding the handler default.
    fn style(&self) -> Option<Style> {
        None
    }

    /// Whether this value renders as a leading `name: ` prefix segment
    /// instead of a trailing `key=value` pair.
    fn is_prefix(&self) -> bool {
        false
    }
}

/// The value half of an [`Attr`].
#[derive(Debug, Clone)]
pub enum Value {
    /// The absent value; an attribute with an empty key and an `Empty` value
    /// is skipped entirely. The attribute-replacement hook returns
    /// [`Attr::empty`] to delete an entry.
    Empty,
    /// A string, quoted when rendered in `key=value` position.
    Str(Cow<'static, str>),
    /// `true` or `false`.
    Bool(bool),
    /// A signed integer, rendered base-10.
    I64(i64),
    /// An unsigned integer, rendered base-10.
    U64(u64),
    /// A float, rendered in its shortest round-trippable decimal form.
    F64(f64),
    /// A point in time.
    Timestamp(Zoned),
    /// An elapsed time, rendered compactly (`1h2m3s`) and never quoted.
    Duration(SignedDuration),
    /// An ordered sequence of attributes whose keys are namespaced by this
    /// attribute's key.
    Group(Vec<Attr>),
    /// An opaque value, rendered through its [`AnyValue`] capabilities.
    Any(Arc<dyn AnyValue>),
}

impl Value {
    /// Wraps an opaque value.
    pub fn any(value: impl AnyValue) -> Value {
        Value::Any(Arc::new(value))
    }

    /// Whether this value is empty (absent, or an empty string).
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Str(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Whether this value opts into prefix rendering.
    pub fn is_prefix(&self) -> bool {
        matches!(self, Value::Any(v) if v.is_prefix())
    }

    /// The value's own display style, if it declares one.
    pub fn style_override(&self) -> Option<Style> {
        match self {
            Value::Any(v) => v.style(),
            _ => None,
        }
    }

    /// Borrows the opaque payload as a concrete type, if it is one.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            Value::Any(v) => {
                let any: &dyn Any = &**v;
                any.downcast_ref::<T>()
            }
            _ => None,
        }
    }
}

impl From<&'static str> for Value {
    fn from(v: &'static str) -> Value {
        Value::Str(Cow::Borrowed(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        Value::Str(Cow::Owned(v))
    }
}

impl From<Cow<'static, str>> for Value {
    fn from(v: Cow<'static, str>) -> Value {
        Value::Str(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Value {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Value {
        Value::I64(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Value {
        Value::U64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Value {
        Value::F64(v)
    }
}

impl From<Zoned> for Value {
    fn from(v: Zoned) -> Value {
        Value::Timestamp(v)
    }
}

impl From<SignedDuration> for Value {
    fn from(v: SignedDuration) -> Value {
        Value::Duration(v)
    }
}

impl From<Vec<Attr>> for Value {
    fn from(v: Vec<Attr>) -> Value {
        Value::Group(v)
    }
}

/// A key/value pair attached to a log record.
///
/// Keys are not deduplicated; attributes render in declaration order.
#[derive(Debug, Clone)]
pub struct Attr {
    /// The attribute key. Group keys become dot-joined prefix segments.
    pub key: Cow<'static, str>,
    /// The attribute value.
    pub value: Value,
}

impl Attr {
    /// An attribute from a key and anything convertible to a [`Value`].
    pub fn new(key: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Attr {
        Attr {
            key: key.into(),
            value: value.into(),
        }
    }

    /// A string attribute.
    pub fn str(key: impl Into<Cow<'static, str>>, value: impl Into<Cow<'static, str>>) -> Attr {
        Attr::new(key, Value::Str(value.into()))
    }

    /// A boolean attribute.
    pub fn bool(key: impl Into<Cow<'static, str>>, value: bool) -> Attr {
        Attr::new(key, Value::Bool(value))
    }

    /// A signed integer attribute.
    pub fn int(key: impl Into<Cow<'static, str>>, value: i64) -> Attr {
        Attr::new(key, Value::I64(value))
    }

    /// An unsigned integer attribute.
    pub fn uint(key: impl Into<Cow<'static, str>>, value: u64) -> Attr {
        Attr::new(key, Value::U64(value))
    }

    /// A float attribute.
    pub fn float(key: impl Into<Cow<'static, str>>, value: f64) -> Attr {
        Attr::new(key, Value::F64(value))
    }

    /// A timestamp attribute.
    pub fn time(key: impl Into<Cow<'static, str>>, value: Zoned) -> Attr {
        Attr::new(key, Value::Timestamp(value))
    }

    /// A duration attribute.
    pub fn duration(key: impl Into<Cow<'static, str>>, value: SignedDuration) -> Attr {
        Attr::new(key, Value::Duration(value))
    }

    /// A group attribute: `key` namespaces every key inside `attrs`.
    pub fn group(key: impl Into<Cow<'static, str>>, attrs: Vec<Attr>) -> Attr {
        Attr::new(key, Value::Group(attrs))
    }

    /// An opaque attribute.
    pub fn any(key: impl Into<Cow<'static, str>>, value: impl AnyValue) -> Attr {
        Attr::new(key, Value::any(value))
    }

    /// The empty attribute, skipped by the renderer. The replacement hook
    /// returns this to delete an entry.
    pub fn empty() -> Attr {
        Attr {
            key: Cow::Borrowed(""),
            value: Value::Empty,
        }
    }

    /// Whether both key and value are empty.
    pub fn is_empty(&self) -> bool {
        self.key.is_empty() && self.value.is_empty()
    }
}

#[derive(Debug)]
struct ErrorValue(BoxError);

impl AnyValue for ErrorValue {
    fn display_text(&self) -> Option<String> {
        Some(self.0.to_string())
    }

    fn style(&self) -> Option<Style> {
        Some(error_attr_style())
    }
}

/// An `err="..."` attribute carrying the error display style.
pub fn err(error: impl Into<BoxError>) -> Attr {
    Attr::new(ERR_KEY, Value::any(ErrorValue(error.into())))
}

#[derive(Debug)]
struct ServiceValue(String);

impl AnyValue for ServiceValue {
    fn display_text(&self) -> Option<String> {
        Some(self.0.clone())
    }

    fn style(&self) -> Option<Style> {
        Some(service_attr_style())
    }

    fn is_prefix(&self) -> bool {
        true
    }
}

/// A service-name attribute. Styled distinctly and marked as a prefix, so a
/// handler that has it attached renders `name: ` ahead of the message
/// instead of a trailing `service=name` pair.
pub fn service(name: impl Into<String>) -> Attr {
    Attr::new(SERVICE_KEY, Value::any(ServiceValue(name.into())))
}

/// Renders one scalar value into `buf` with `style`.
///
/// Strings, timestamps and opaque values are quoted when `quote` is set;
/// numbers, booleans and durations never are. Group values are flattened by
/// the attribute writer and render as nothing here.
pub(crate) fn write_value(buf: &mut String, value: &Value, style: Style, quote: bool) {
    match value {
        Value::Empty => {}
        Value::Str(s) => push_text(buf, s, style, quote),
        Value::Bool(b) => push_styled(buf, b, style),
        Value::I64(n) => push_styled(buf, n, style),
        Value::U64(n) => push_styled(buf, n, style),
        Value::F64(n) => push_styled(buf, n, style),
        Value::Timestamp(t) => push_text(buf, &t.to_string(), style, quote),
        Value::Duration(d) => push_styled(buf, format_duration(d), style),
        Value::Group(_) => {}
        Value::Any(v) => {
            if let Some(result) = v.marshal_text() {
                // marshal failures render as empty text, not an aborted line
                if let Ok(text) = result {
                    push_text(buf, &text, style, quote);
                }
            } else if let Some(text) = v.display_text() {
                push_text(buf, &text, style, quote);
            } else {
                push_text(buf, &format!("{v:?}"), style, quote);
            }
        }
    }
}

fn push_text(buf: &mut String, text: &str, style: Style, quote: bool) {
    if quote {
        push_styled(buf, format_args!("{text:?}"), style);
    } else {
        push_styled(buf, text, style);
    }
}

fn format_duration(d: &SignedDuration) -> String {
    SpanPrinter::new()
        .designator(Designator::Compact)
        .spacing(Spacing::None)
        .duration_to_string(d)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(value: &Value, quote: bool) -> String {
        let mut buf = String::new();
        write_value(&mut buf, value, Style::new(), quote);
        buf
    }

    #[test]
    fn scalars() {
        assert_eq!(rendered(&Value::Bool(true), true), "true");
        assert_eq!(rendered(&Value::I64(-7), true), "-7");
        assert_eq!(rendered(&Value::U64(8080), true), "8080");
        assert_eq!(rendered(&Value::F64(1.5), true), "1.5");
        assert_eq!(rendered(&Value::F64(0.1), true), "0.1");
    }

    #[test]
    fn strings_quote_only_on_request() {
        let v = Value::from("a \"b\"\n");
        assert_eq!(rendered(&v, true), r#""a \"b\"\n""#);
        assert_eq!(rendered(&v, false), "a \"b\"\n");
    }

    #[test]
    fn durations_render_compact_and_unquoted() {
        let v = Value::Duration(SignedDuration::from_secs(3723));
        assert_eq!(rendered(&v, true), "1h2m3s");
    }

    #[test]
    fn any_resolution_order() {
        #[derive(Debug)]
        struct Marshals;
        impl AnyValue for Marshals {
            fn marshal_text(&self) -> Option<Result<String, BoxError>> {
                Some(Ok("canonical".into()))
            }
            fn display_text(&self) -> Option<String> {
                Some("shadowed".into())
            }
        }

        #[derive(Debug)]
        struct Displays;
        impl AnyValue for Displays {
            fn display_text(&self) -> Option<String> {
                Some("human".into())
            }
        }

        #[derive(Debug)]
        struct Dumps;
        impl AnyValue for Dumps {}

        assert_eq!(rendered(&Value::any(Marshals), true), r#""canonical""#);
        assert_eq!(rendered(&Value::any(Displays), true), r#""human""#);
        assert_eq!(rendered(&Value::any(Dumps), true), "\"Dumps\"");
    }

    #[test]
    fn marshal_failure_renders_nothing() {
        #[derive(Debug)]
        struct Broken;
        impl AnyValue for Broken {
            fn marshal_text(&self) -> Option<Result<String, BoxError>> {
                Some(Err("nope".into()))
            }
            fn display_text(&self) -> Option<String> {
                Some("unreachable".into())
            }
        }

        assert_eq!(rendered(&Value::any(Broken), true), "");
    }

    #[test]
    fn empty_attr_detection() {
        assert!(Attr::empty().is_empty());
        assert!(Attr::new("", "").is_empty());
        assert!(!Attr::str("k", "").is_empty());
        assert!(!Attr::int("k", 0).is_empty());
    }

    #[test]
    fn downcast_reaches_the_payload() {
        let attr = Attr::any("level", crate::Level::WARN);
        assert_eq!(attr.value.downcast_ref::<crate::Level>(), Some(&crate::Level::WARN));
        assert!(attr.value.downcast_ref::<String>().is_none());
    }
}
