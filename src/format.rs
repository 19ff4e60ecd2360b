use std::io::Write;

use chrono::format::{Item, StrftimeItems};

use crate::error::LogError;
use crate::record::LogRecord;

/// Pattern used when a logger's configuration does not name one.
pub const DEFAULT_PATTERN: &str = "[%d{%H:%M:%S}][%t][%p][%c][%f:%l] %m%n";

/// One parsed element of a format pattern.
///
/// The closed set keeps rendering a simple exhaustive match instead of a
/// chain of boxed trait objects.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FormatItem {
    /// `%d{fmt}` — record time rendered with a strftime sub-format.
    Time(String),
    /// `%t` — emitting thread id.
    Thread,
    /// `%p` — level name.
    Level,
    /// `%c` — logger name.
    Name,
    /// `%f` — source file.
    File,
    /// `%l` — source line.
    Line,
    /// `%m` — payload text.
    Payload,
    /// `%n` — newline.
    NewLine,
    /// `%T` — tab.
    Tab,
    /// Literal text between tokens, including `%%` and `%{` escapes.
    Literal(String),
}

/// A compiled format pattern.
///
/// Parsing happens once at construction and rejects malformed patterns, so
/// a `Format` held by a logger can render any record without configuration
/// errors surfacing at runtime.
///
/// # Examples
///
/// ```
/// use rolling_logger::{Format, Level, LogRecord};
///
/// let format = Format::new("%p %m%n").unwrap();
/// let record = LogRecord::new("app", "main.rs", 7, Level::Info, "ready");
/// let bytes = format.render(&record).unwrap();
/// assert_eq!(bytes, b"INFO ready\n");
/// ```
#[derive(Debug, Clone)]
pub struct Format {
    items: Vec<FormatItem>,
}

impl Format {
    /// Parses `pattern` into a renderable format.
    ///
    /// Recognized tokens: `%d{fmt}` (default `%H:%M:%S`), `%t`, `%p`, `%c`,
    /// `%f`, `%l`, `%m`, `%n`, `%T`, plus the escapes `%%` and `%{`. Any
    /// other `%x`, a trailing `%`, or an unclosed `{` fails with
    /// [`LogError::Config`].
    pub fn new(pattern: &str) -> Result<Self, LogError> {
        let mut items = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            match chars.next() {
                None => {
                    return Err(LogError::Config(
                        "expected a formatting character after '%'".into(),
                    ))
                }
                // %% and %{ stay literal text
                Some(escaped @ ('%' | '{')) => literal.push(escaped),
                Some(key) if key.is_ascii_alphabetic() => {
                    if !literal.is_empty() {
                        items.push(FormatItem::Literal(std::mem::take(&mut literal)));
                    }
                    let mut value = String::new();
                    if chars.peek() == Some(&'{') {
                        chars.next();
                        loop {
                            match chars.next() {
                                None => {
                                    return Err(LogError::Config(format!(
                                        "expected '}}' to close '%{key}{{'"
                                    )))
                                }
                                Some('}') => break,
                                Some(v) => value.push(v),
                            }
                        }
                    }
                    items.push(Self::create_item(key, value)?);
                }
                Some(other) => {
                    return Err(LogError::Config(format!(
                        "%{other} is not a formatting token"
                    )))
                }
            }
        }
        if !literal.is_empty() {
            items.push(FormatItem::Literal(literal));
        }

        Ok(Self { items })
    }

    /// Renders `record` to bytes by walking the parsed items in order.
    ///
    /// Pure and side-effect free; the caller owns delivery of the result.
    pub fn render(&self, record: &LogRecord<'_>) -> Result<Vec<u8>, LogError> {
        let mut out = Vec::with_capacity(64 + record.payload.len());
        for item in &self.items {
            let res = match item {
                FormatItem::Time(fmt) => write!(out, "{}", record.time.format(fmt)),
                FormatItem::Thread => write!(out, "{:?}", record.tid),
                FormatItem::Level => write!(out, "{}", record.level.as_str()),
                FormatItem::Name => write!(out, "{}", record.name),
                FormatItem::File => write!(out, "{}", record.file),
                FormatItem::Line => write!(out, "{}", record.line),
                FormatItem::Payload => write!(out, "{}", record.payload),
                FormatItem::NewLine => write!(out, "\n"),
                FormatItem::Tab => write!(out, "\t"),
                FormatItem::Literal(text) => write!(out, "{text}"),
            };
            res.map_err(|e| LogError::Format(e.to_string()))?;
        }
        Ok(out)
    }

    fn create_item(key: char, value: String) -> Result<FormatItem, LogError> {
        match key {
            'd' => {
                let fmt = if value.is_empty() {
                    "%H:%M:%S".to_string()
                } else {
                    value
                };
                // Reject bad strftime specs here so they cannot surface as
                // render-time failures.
                if StrftimeItems::new(&fmt).any(|it| matches!(it, Item::Error)) {
                    return Err(LogError::Config(format!(
                        "invalid time sub-format: {fmt:?}"
                    )));
                }
                Ok(FormatItem::Time(fmt))
            }
            'T' => Ok(FormatItem::Tab),
            't' => Ok(FormatItem::Thread),
            'p' => Ok(FormatItem::Level),
            'c' => Ok(FormatItem::Name),
            'f' => Ok(FormatItem::File),
            'l' => Ok(FormatItem::Line),
            'm' => Ok(FormatItem::Payload),
            'n' => Ok(FormatItem::NewLine),
            other => Err(LogError::Config(format!(
                "%{other} is not a formatting token"
            ))),
        }
    }
}
