//! Log severity levels.

use core::fmt;
use core::str::FromStr;

use crate::attr::AnyValue;

/// The severity of a log record.
///
/// Levels are open-ended: the four named severities sit on the usual spaced
/// numbering (`DEBUG` = -4, `INFO` = 0, `WARN` = 4, `ERROR` = 8) so callers
/// can mint intermediate levels with [`Level::new`]. Higher is more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(i16);

impl Level {
    /// Diagnostic detail, below the default threshold.
    pub const DEBUG: Level = Level(-4);
    /// Routine events. The default minimum level.
    pub const INFO: Level = Level(0);
    /// Something surprising that the program can tolerate.
    pub const WARN: Level = Level(4);
    /// An operation failed.
    pub const ERROR: Level = Level(8);

    /// A level with an arbitrary numeric severity.
    pub const fn new(value: i16) -> Level {
        Level(value)
    }

    /// The numeric severity of this level.
    pub const fn value(self) -> i16 {
        self.0
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::INFO
    }
}

impl fmt::Display for Level {
    /// Named form for the four known severities, nearest-named plus a signed
    /// offset otherwise (`"WARN+2"`, `"DEBUG-1"`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn named(f: &mut fmt::Formatter<'_>, name: &str, delta: i16) -> fmt::Result {
            if delta == 0 {
                f.write_str(name)
            } else {
                write!(f, "{name}{delta:+}")
            }
        }

        let v = self.0;
        if v < Level::INFO.0 {
            named(f, "DEBUG", v - Level::DEBUG.0)
        } else if v < Level::WARN.0 {
            named(f, "INFO", v - Level::INFO.0)
        } else if v < Level::ERROR.0 {
            named(f, "WARN", v - Level::WARN.0)
        } else {
            named(f, "ERROR", v - Level::ERROR.0)
        }
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    /// Parses `"debug"`, `"info"`, `"warn"` or `"error"` (case-insensitive),
    /// optionally followed by a signed offset as produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, delta) = match s.find(['+', '-']) {
            Some(idx) => {
                let delta = s[idx..]
                    .parse::<i16>()
                    .map_err(|_| ParseLevelError(s.to_string()))?;
                (&s[..idx], delta)
            }
            None => (s, 0),
        };

        let base = if name.eq_ignore_ascii_case("debug") {
            Level::DEBUG
        } else if name.eq_ignore_ascii_case("info") {
            Level::INFO
        } else if name.eq_ignore_ascii_case("warn") {
            Level::WARN
        } else if name.eq_ignore_ascii_case("error") {
            Level::ERROR
        } else {
            return Err(ParseLevelError(s.to_string()));
        };

        Ok(Level(base.0 + delta))
    }
}

/// A level string did not match any known severity.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown level: {0:?}")]
pub struct ParseLevelError(String);

// Lets a level travel through the attribute-replacement hook as a synthetic
// attribute and be recognized on the way back out.
impl AnyValue for Level {
    fn display_text(&self) -> Option<String> {
        Some(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering() {
        assert!(Level::DEBUG < Level::INFO);
        assert!(Level::INFO < Level::WARN);
        assert!(Level::WARN < Level::ERROR);
        assert!(Level::new(2) > Level::INFO);
        assert!(Level::new(2) < Level::WARN);
    }

    #[test]
    fn display_named_and_offset() {
        assert_eq!(Level::INFO.to_string(), "INFO");
        assert_eq!(Level::ERROR.to_string(), "ERROR");
        assert_eq!(Level::new(2).to_string(), "INFO+2");
        assert_eq!(Level::new(6).to_string(), "WARN+2");
        assert_eq!(Level::new(-5).to_string(), "DEBUG-1");
        assert_eq!(Level::new(12).to_string(), "ERROR+4");
    }

    #[test]
    fn parse_round_trips() {
        for level in [Level::DEBUG, Level::INFO, Level::WARN, Level::ERROR, Level::new(6)] {
            assert_eq!(level.to_string().parse::<Level>().unwrap(), level);
        }
        assert_eq!("WARN".parse::<Level>().unwrap(), Level::WARN);
        assert_eq!("warn".parse::<Level>().unwrap(), Level::WARN);
    }

    #[test]
    fn parse_rejects_unknown() {
        assert!("verbose".parse::<Level>().is_err());
        assert!("".parse::<Level>().is_err());
        assert!("info+x".parse::<Level>().is_err());
    }
}
