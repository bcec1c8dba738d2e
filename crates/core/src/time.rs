//! Time-tag parsing, range limits and balancing.
//!
//! Forms:
//! - absolute `Ayyyy-dddThh:mm:ss[.fff]`
//! - relative `R[ddd T]hh:mm:ss[.fff]` or `R<seconds>[.fff]`
//! - epoch `E[+|-]<duration>` (same duration grammar as relative)
//! - command complete `C`

use std::fmt;

/// Largest absolute time.
pub const MAX_ABSOLUTE: &str = "9999-365T23:59:59.999";
/// Largest relative or epoch duration.
pub const MAX_DURATION: &str = "365T23:59:59.999";

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;
const MAX_DURATION_MS: u64 = 365 * MS_PER_DAY + 23 * MS_PER_HOUR + 59 * MS_PER_MINUTE + 59_999;
const MAX_YEAR: u32 = 9999;

/// Which time-tag form a literal uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeForm {
    /// `A...`
    Absolute,
    /// `R...`
    Relative,
    /// `E...`
    Epoch,
    /// `C`
    Complete,
}

impl TimeForm {
    /// Lowercase name used in messages.
    pub fn as_str(self) -> &'static str {
        match self {
            TimeForm::Absolute => "absolute",
            TimeForm::Relative => "relative",
            TimeForm::Epoch => "epoch",
            TimeForm::Complete => "command complete",
        }
    }

    /// Largest representable value, `None` for command complete.
    pub fn max(self) -> Option<&'static str> {
        match self {
            TimeForm::Absolute => Some(MAX_ABSOLUTE),
            TimeForm::Relative | TimeForm::Epoch => Some(MAX_DURATION),
            TimeForm::Complete => None,
        }
    }
}

impl fmt::Display for TimeForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a time-tag literal was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeError {
    /// Not syntactically a time tag of its form.
    Invalid(TimeForm),
    /// Well-formed but beyond the form's maximum.
    Overflow(TimeForm),
}

impl fmt::Display for TimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeError::Invalid(form) => write!(f, "invalid {form} time tag"),
            TimeError::Overflow(form) => {
                write!(f, "maximum {form} time is {}", form.max().unwrap_or("-"))
            }
        }
    }
}

// ─── Fractional seconds ───

/// Milliseconds plus the number of digits written, so rendering keeps the
/// author's precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Fraction {
    /// Value in milliseconds (0..1000).
    pub millis: u32,
    /// Digits after the decimal point, 0 when absent.
    pub digits: u8,
}

impl Fraction {
    fn parse(text: Option<&str>) -> Option<Self> {
        let Some(text) = text else {
            return Some(Self::default());
        };
        if text.is_empty() || text.len() > 3 || !text.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let digits = text.len() as u8;
        let value: u32 = text.parse().ok()?;
        Some(Self {
            millis: value * 10u32.pow(3 - u32::from(digits)),
            digits,
        })
    }

    fn render(self) -> String {
        if self.digits == 0 {
            return String::new();
        }
        let scaled = self.millis / 10u32.pow(3 - u32::from(self.digits));
        format!(".{scaled:0width$}", width = self.digits as usize)
    }
}

// ─── Durations ───

/// A relative or epoch duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration {
    /// Epoch offsets may be negative.
    pub negative: bool,
    /// Whether the sign was written explicitly.
    pub signed: bool,
    /// Day count when written as `dddT`.
    pub days: Option<u32>,
    /// Hours field.
    pub hours: u32,
    /// Minutes field.
    pub minutes: u32,
    /// Seconds field (the whole value in seconds-only form).
    pub seconds: u64,
    /// Fractional seconds.
    pub fraction: Fraction,
    /// Written as a plain number of seconds.
    pub seconds_only: bool,
}

impl Duration {
    /// Total length in milliseconds.
    pub fn total_millis(&self) -> u64 {
        u64::from(self.days.unwrap_or(0)) * MS_PER_DAY
            + u64::from(self.hours) * MS_PER_HOUR
            + u64::from(self.minutes) * MS_PER_MINUTE
            + self.seconds * MS_PER_SECOND
            + u64::from(self.fraction.millis)
    }

    /// Whether every unit is within its natural bound. The seconds-only form
    /// is canonical by definition.
    pub fn is_balanced(&self) -> bool {
        self.seconds_only || (self.seconds < 60 && self.minutes < 60 && self.hours < 24)
    }

    /// The same duration with units carried upward.
    pub fn balanced(&self) -> Duration {
        if self.seconds_only {
            return *self;
        }
        let total_seconds = self.total_millis() / MS_PER_SECOND;
        let days = total_seconds / 86_400;
        let rem = total_seconds % 86_400;
        Duration {
            days: (days > 0 || self.days.is_some()).then_some(days as u32),
            hours: (rem / 3_600) as u32,
            minutes: (rem % 3_600 / 60) as u32,
            seconds: rem % 60,
            ..*self
        }
    }

    /// Render without the form prefix.
    pub fn render(&self) -> String {
        let sign = match (self.signed, self.negative) {
            (_, true) => "-",
            (true, false) => "+",
            (false, false) => "",
        };
        if self.seconds_only {
            return format!("{sign}{}{}", self.seconds, self.fraction.render());
        }
        let days = self.days.map(|d| format!("{d:03}T")).unwrap_or_default();
        format!(
            "{sign}{days}{:02}:{:02}:{:02}{}",
            self.hours,
            self.minutes,
            self.seconds,
            self.fraction.render()
        )
    }
}

fn digits<T: std::str::FromStr>(text: &str, min: usize, max: usize) -> Option<T> {
    if text.len() < min || text.len() > max || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Parse a duration body (no form prefix).
pub fn parse_duration(text: &str, form: TimeForm) -> Result<Duration, TimeError> {
    let invalid = TimeError::Invalid(form);
    let (negative, signed, body) = match text.as_bytes().first() {
        Some(b'-') => (true, true, &text[1..]),
        Some(b'+') => (false, true, &text[1..]),
        _ => (false, false, text),
    };
    let (whole, frac) = match body.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (body, None),
    };
    let fraction = Fraction::parse(frac).ok_or(invalid)?;

    let duration = if !whole.contains(':') {
        Duration {
            negative,
            signed,
            days: None,
            hours: 0,
            minutes: 0,
            seconds: digits(whole, 1, 12).ok_or(invalid)?,
            fraction,
            seconds_only: true,
        }
    } else {
        let (days, clock) = match whole.split_once('T') {
            Some((d, c)) => (Some(digits::<u32>(d, 1, 3).ok_or(invalid)?), c),
            None => (None, whole),
        };
        let mut parts = clock.split(':');
        let (Some(h), Some(m), Some(s), None) = (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid);
        };
        Duration {
            negative,
            signed,
            days,
            hours: digits(h, 2, 2).ok_or(invalid)?,
            minutes: digits(m, 2, 2).ok_or(invalid)?,
            seconds: digits(s, 2, 2).ok_or(invalid)?,
            fraction,
            seconds_only: false,
        }
    };
    if duration.total_millis() > MAX_DURATION_MS {
        return Err(TimeError::Overflow(form));
    }
    Ok(duration)
}

// ─── Absolute times ───

/// An absolute `yyyy-dddThh:mm:ss[.fff]` time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbsoluteTime {
    /// Four-digit year.
    pub year: u32,
    /// Day of year, starting at 1.
    pub day_of_year: u32,
    /// Hours field.
    pub hours: u32,
    /// Minutes field.
    pub minutes: u32,
    /// Seconds field.
    pub seconds: u32,
    /// Fractional seconds.
    pub fraction: Fraction,
}

/// Days in a Gregorian year.
pub fn days_in_year(year: u32) -> u32 {
    if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 {
        366
    } else {
        365
    }
}

impl AbsoluteTime {
    /// Whether every unit is within its natural bound.
    pub fn is_balanced(&self) -> bool {
        self.day_of_year <= days_in_year(self.year)
            && self.hours < 24
            && self.minutes < 60
            && self.seconds < 60
    }

    /// The same instant with units carried upward, possibly into later years.
    pub fn balanced(&self) -> AbsoluteTime {
        let total_seconds = u64::from(self.seconds)
            + u64::from(self.minutes) * 60
            + u64::from(self.hours) * 3_600;
        let mut day_of_year = self.day_of_year + (total_seconds / 86_400) as u32;
        let rem = total_seconds % 86_400;
        let mut year = self.year;
        while day_of_year > days_in_year(year) {
            day_of_year -= days_in_year(year);
            year += 1;
        }
        AbsoluteTime {
            year,
            day_of_year,
            hours: (rem / 3_600) as u32,
            minutes: (rem % 3_600 / 60) as u32,
            seconds: (rem % 60) as u32,
            fraction: self.fraction,
        }
    }

    /// Render without the form prefix.
    pub fn render(&self) -> String {
        format!(
            "{:04}-{:03}T{:02}:{:02}:{:02}{}",
            self.year,
            self.day_of_year,
            self.hours,
            self.minutes,
            self.seconds,
            self.fraction.render()
        )
    }
}

/// Parse an absolute time body (no `A` prefix).
pub fn parse_absolute(text: &str) -> Result<AbsoluteTime, TimeError> {
    let invalid = TimeError::Invalid(TimeForm::Absolute);
    let (date, clock) = text.split_once('T').ok_or(invalid)?;
    let (year, doy) = date.split_once('-').ok_or(invalid)?;
    let (clock, frac) = match clock.split_once('.') {
        Some((c, f)) => (c, Some(f)),
        None => (clock, None),
    };
    let mut parts = clock.split(':');
    let (Some(h), Some(m), Some(s), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid);
    };
    let time = AbsoluteTime {
        year: digits(year, 4, 4).ok_or(invalid)?,
        day_of_year: digits(doy, 3, 3).ok_or(invalid)?,
        hours: digits(h, 2, 2).ok_or(invalid)?,
        minutes: digits(m, 2, 2).ok_or(invalid)?,
        seconds: digits(s, 2, 2).ok_or(invalid)?,
        fraction: Fraction::parse(frac).ok_or(invalid)?,
    };
    if time.day_of_year == 0 {
        return Err(invalid);
    }
    if time.balanced().year > MAX_YEAR {
        return Err(TimeError::Overflow(TimeForm::Absolute));
    }
    Ok(time)
}

// ─── Time tags ───

/// A parsed time tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeTag {
    /// `A...`
    Absolute(AbsoluteTime),
    /// `R...`
    Relative(Duration),
    /// `E...`
    Epoch(Duration),
    /// `C`
    Complete,
}

impl TimeTag {
    /// Form of this tag.
    pub fn form(&self) -> TimeForm {
        match self {
            TimeTag::Absolute(_) => TimeForm::Absolute,
            TimeTag::Relative(_) => TimeForm::Relative,
            TimeTag::Epoch(_) => TimeForm::Epoch,
            TimeTag::Complete => TimeForm::Complete,
        }
    }

    /// Whether every unit is within its natural bound.
    pub fn is_balanced(&self) -> bool {
        match self {
            TimeTag::Absolute(t) => t.is_balanced(),
            TimeTag::Relative(d) | TimeTag::Epoch(d) => d.is_balanced(),
            TimeTag::Complete => true,
        }
    }

    /// The balanced equivalent.
    pub fn balanced(&self) -> TimeTag {
        match self {
            TimeTag::Absolute(t) => TimeTag::Absolute(t.balanced()),
            TimeTag::Relative(d) => TimeTag::Relative(d.balanced()),
            TimeTag::Epoch(d) => TimeTag::Epoch(d.balanced()),
            TimeTag::Complete => TimeTag::Complete,
        }
    }
}

impl fmt::Display for TimeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeTag::Absolute(t) => write!(f, "A{}", t.render()),
            TimeTag::Relative(d) => write!(f, "R{}", d.render()),
            TimeTag::Epoch(d) => write!(f, "E{}", d.render()),
            TimeTag::Complete => f.write_str("C"),
        }
    }
}

/// Parse a full time tag including its form prefix.
pub fn parse_time_tag(text: &str) -> Result<TimeTag, TimeError> {
    match text.as_bytes().first() {
        Some(b'A') => parse_absolute(&text[1..]).map(TimeTag::Absolute),
        Some(b'R') => parse_duration(&text[1..], TimeForm::Relative).map(TimeTag::Relative),
        Some(b'E') => parse_duration(&text[1..], TimeForm::Epoch).map(TimeTag::Epoch),
        Some(b'C') if text.len() == 1 => Ok(TimeTag::Complete),
        _ => Err(TimeError::Invalid(TimeForm::Relative)),
    }
}
