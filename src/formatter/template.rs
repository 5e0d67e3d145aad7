//! `%(field)s` style template formatter.
//!
//! Templates are parsed once into literal and field segments. Recognised
//! fields are `asctime`, `name`, `levelname`, `levelno`, `message`, `module`,
//! `filename`, `lineno` and `threadName`; any other placeholder is kept in
//! the output verbatim. `%%` renders a single percent sign.

use chrono::{DateTime, Local};

use super::LogFormatter;
use crate::log_record::LogRecord;

/// Date format used for `%(asctime)s` when none is configured.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    AscTime,
    Name,
    LevelName,
    LevelNo,
    Message,
    Module,
    Filename,
    LineNo,
    ThreadName,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "asctime" => Self::AscTime,
            "name" => Self::Name,
            "levelname" => Self::LevelName,
            "levelno" => Self::LevelNo,
            "message" => Self::Message,
            "module" => Self::Module,
            "filename" => Self::Filename,
            "lineno" => Self::LineNo,
            "threadName" => Self::ThreadName,
            _ => return None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

/// Formatter driven by a `%(field)s` template.
#[derive(Clone, Debug)]
pub struct TemplateFormatter {
    segments: Vec<Segment>,
    datefmt: String,
}

impl TemplateFormatter {
    /// Parse `template` using the default date format.
    pub fn new(template: &str) -> Self {
        Self {
            segments: parse_template(template),
            datefmt: DEFAULT_DATE_FORMAT.to_owned(),
        }
    }

    /// Override the `strftime` style format used for `%(asctime)s`.
    pub fn with_datefmt(mut self, datefmt: impl Into<String>) -> Self {
        self.datefmt = datefmt.into();
        self
    }

    fn render_field(&self, field: Field, record: &LogRecord, out: &mut String) {
        let meta = &record.metadata;
        match field {
            Field::AscTime => {
                let local: DateTime<Local> = meta.timestamp.into();
                out.push_str(&local.format(&self.datefmt).to_string());
            }
            Field::Name => out.push_str(&record.logger),
            Field::LevelName => out.push_str(record.level.as_str()),
            Field::LevelNo => out.push_str(&record.level.as_u8().to_string()),
            Field::Message => out.push_str(&record.message),
            Field::Module => out.push_str(&meta.module_path),
            Field::Filename => out.push_str(&meta.filename),
            Field::LineNo => out.push_str(&meta.line_number.to_string()),
            Field::ThreadName => out.push_str(meta.thread_name.as_deref().unwrap_or("unnamed")),
        }
    }
}

impl LogFormatter for TemplateFormatter {
    fn format(&self, record: &LogRecord) -> String {
        let mut out = String::with_capacity(record.message.len() + 64);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => self.render_field(*field, record, &mut out),
            }
        }
        out
    }
}

fn push_literal(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Literal(last)) = segments.last_mut() {
        last.push_str(text);
    } else {
        segments.push(Segment::Literal(text.to_owned()));
    }
}

fn parse_template(template: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = template;
    while let Some(pos) = rest.find('%') {
        push_literal(&mut segments, &rest[..pos]);
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix("%%") {
            push_literal(&mut segments, "%");
            rest = after;
            continue;
        }
        match parse_placeholder(tail) {
            Some((field, consumed)) => {
                segments.push(Segment::Field(field));
                rest = &tail[consumed..];
            }
            None => {
                push_literal(&mut segments, "%");
                rest = &tail[1..];
            }
        }
    }
    push_literal(&mut segments, rest);
    segments
}

/// Parse `%(name)<conv>` at the start of `input`, returning the field and the
/// number of bytes consumed.
fn parse_placeholder(input: &str) -> Option<(Field, usize)> {
    let body = input.strip_prefix("%(")?;
    let close = body.find(')')?;
    let field = Field::from_name(&body[..close])?;
    let conv = body[close + 1..].chars().next()?;
    if !matches!(conv, 's' | 'd' | 'r') {
        return None;
    }
    Some((field, 2 + close + 1 + conv.len_utf8()))
}
