//! Pattern compiler for `SimpleDateFormat`-style layouts.
//!
//! A pattern is a sequence of letter runs (`dd`, `MMM`, `yyyy`) and literal
//! text. Single quotes delimit literal text and `''` is a literal quote.
//! Unknown ASCII letters and unterminated quotes are rejected.

use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use thiserror::Error;

/// Pattern used whenever a user pattern cannot be applied.
pub const DEFAULT_FORMAT: &str = "dd.MM.yyyy, HH:mm:ss";

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// A pattern string that could not be compiled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid timestamp format {pattern:?}: {reason}")]
pub struct FormatError {
    /// The offending pattern
    pub pattern: String,
    /// What is wrong with it
    pub reason: String,
}

impl FormatError {
    fn new(pattern: &str, reason: impl Into<String>) -> Self {
        Self {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Era,
    Year,
    WeekYear,
    Month,
    WeekOfYear,
    WeekOfMonth,
    DayOfYear,
    Day,
    DayOfWeekInMonth,
    DayName,
    DayNumber,
    AmPm,
    Hour0To23,
    Hour1To24,
    Hour0To11,
    Hour1To12,
    Minute,
    Second,
    Millisecond,
    ZoneName,
    Rfc822Offset,
    IsoOffset,
}

impl Field {
    fn from_letter(letter: char) -> Option<Self> {
        let field = match letter {
            'G' => Field::Era,
            'y' => Field::Year,
            'Y' => Field::WeekYear,
            'M' | 'L' => Field::Month,
            'w' => Field::WeekOfYear,
            'W' => Field::WeekOfMonth,
            'D' => Field::DayOfYear,
            'd' => Field::Day,
            'F' => Field::DayOfWeekInMonth,
            'E' => Field::DayName,
            'u' => Field::DayNumber,
            'a' => Field::AmPm,
            'H' => Field::Hour0To23,
            'k' => Field::Hour1To24,
            'K' => Field::Hour0To11,
            'h' => Field::Hour1To12,
            'm' => Field::Minute,
            's' => Field::Second,
            'S' => Field::Millisecond,
            'z' => Field::ZoneName,
            'Z' => Field::Rfc822Offset,
            'X' => Field::IsoOffset,
            _ => return None,
        };
        Some(field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Field { field: Field, width: usize },
}

/// A compiled pattern. Rendering a layout cannot fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    tokens: Vec<Token>,
}

impl Layout {
    /// Compile a pattern string.
    pub fn parse(pattern: &str) -> Result<Self, FormatError> {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '\'' {
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    literal.push('\'');
                    continue;
                }

                let mut closed = false;
                while let Some(quoted) = chars.next() {
                    if quoted != '\'' {
                        literal.push(quoted);
                    } else if chars.peek() == Some(&'\'') {
                        chars.next();
                        literal.push('\'');
                    } else {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(FormatError::new(pattern, "unterminated quote"));
                }
            } else if c.is_ascii_alphabetic() {
                let field = Field::from_letter(c).ok_or_else(|| {
                    FormatError::new(pattern, format!("illegal pattern character '{c}'"))
                })?;
                let mut width = 1;
                while chars.peek() == Some(&c) {
                    chars.next();
                    width += 1;
                }
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                tokens.push(Token::Field { field, width });
            } else {
                literal.push(c);
            }
        }

        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Ok(Self { tokens })
    }

    /// Layout of [`DEFAULT_FORMAT`], built without going through the parser.
    pub fn fallback() -> Self {
        let field = |field, width| Token::Field { field, width };
        let text = |s: &str| Token::Literal(s.to_string());
        Self {
            tokens: vec![
                field(Field::Day, 2),
                text("."),
                field(Field::Month, 2),
                text("."),
                field(Field::Year, 4),
                text(", "),
                field(Field::Hour0To23, 2),
                text(":"),
                field(Field::Minute, 2),
                text(":"),
                field(Field::Second, 2),
            ],
        }
    }

    /// Append the rendering of `dt` to `out`.
    pub fn write(&self, dt: &DateTime<FixedOffset>, out: &mut String) {
        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Field { field, width } => write_field(*field, *width, dt, out),
            }
        }
    }

    /// Render `dt` into a new string.
    pub fn render(&self, dt: &DateTime<FixedOffset>) -> String {
        let mut out = String::new();
        self.write(dt, &mut out);
        out
    }
}

fn write_field(field: Field, width: usize, dt: &DateTime<FixedOffset>, out: &mut String) {
    match field {
        Field::Era => out.push_str(if dt.year() <= 0 { "BC" } else { "AD" }),
        Field::Year => push_year(out, dt.year(), width),
        Field::WeekYear => push_year(out, dt.iso_week().year(), width),
        Field::Month => {
            let name = MONTH_NAMES[dt.month0() as usize];
            match width {
                1 | 2 => push_padded(out, dt.month().into(), width),
                3 => out.push_str(&name[..3]),
                _ => out.push_str(name),
            }
        }
        Field::WeekOfYear => push_padded(out, dt.iso_week().week().into(), width),
        Field::WeekOfMonth => {
            let day0 = dt.day0();
            let weekday = dt.weekday().num_days_from_monday();
            let first_weekday = (weekday + 7 - day0 % 7) % 7;
            push_padded(out, ((day0 + first_weekday) / 7 + 1).into(), width);
        }
        Field::DayOfYear => push_padded(out, dt.ordinal().into(), width),
        Field::Day => push_padded(out, dt.day().into(), width),
        Field::DayOfWeekInMonth => push_padded(out, (dt.day0() / 7 + 1).into(), width),
        Field::DayName => {
            let name = DAY_NAMES[dt.weekday().num_days_from_monday() as usize];
            if width >= 4 {
                out.push_str(name);
            } else {
                out.push_str(&name[..3]);
            }
        }
        Field::DayNumber => push_padded(out, dt.weekday().number_from_monday().into(), width),
        Field::AmPm => out.push_str(if dt.hour12().0 { "PM" } else { "AM" }),
        Field::Hour0To23 => push_padded(out, dt.hour().into(), width),
        Field::Hour1To24 => {
            let hour = if dt.hour() == 0 { 24 } else { dt.hour() };
            push_padded(out, hour.into(), width);
        }
        Field::Hour0To11 => push_padded(out, (dt.hour() % 12).into(), width),
        Field::Hour1To12 => push_padded(out, dt.hour12().1.into(), width),
        Field::Minute => push_padded(out, dt.minute().into(), width),
        Field::Second => push_padded(out, dt.second().into(), width),
        // Leap seconds carry nanoseconds past 1e9.
        Field::Millisecond => push_padded(out, (dt.nanosecond() / 1_000_000 % 1000).into(), width),
        Field::ZoneName => {
            let seconds = dt.offset().local_minus_utc();
            if seconds == 0 {
                out.push_str("UTC");
            } else {
                out.push_str("GMT");
                push_offset(out, seconds, true, true);
            }
        }
        Field::Rfc822Offset => push_offset(out, dt.offset().local_minus_utc(), true, false),
        Field::IsoOffset => {
            let seconds = dt.offset().local_minus_utc();
            if seconds == 0 {
                out.push('Z');
            } else {
                push_offset(out, seconds, width >= 2, width >= 3);
            }
        }
    }
}

/// Year of era; two-letter runs keep only the last two digits.
fn push_year(out: &mut String, year: i32, width: usize) {
    let year_of_era = if year <= 0 {
        1 - i64::from(year)
    } else {
        i64::from(year)
    };
    if width == 2 {
        push_padded(out, year_of_era % 100, 2);
    } else {
        push_padded(out, year_of_era, width);
    }
}

fn push_padded(out: &mut String, value: i64, width: usize) {
    let digits = value.to_string();
    for _ in digits.len()..width {
        out.push('0');
    }
    out.push_str(&digits);
}

fn push_offset(out: &mut String, seconds: i32, with_minutes: bool, colon: bool) {
    out.push(if seconds < 0 { '-' } else { '+' });
    let minutes = seconds.unsigned_abs() / 60;
    push_padded(out, (minutes / 60).into(), 2);
    if with_minutes {
        if colon {
            out.push(':');
        }
        push_padded(out, (minutes % 60).into(), 2);
    }
}
