//! Reference time and Indonesian calendar vocabulary
//!
//! Interpreters never read the clock themselves. The caller hands them a
//! `ReferenceTime`, which carries the instant and the UTC offset it was
//! observed in, so every relative phrase resolves against the same point.

use crate::core::types::Deadline;
use chrono::{
    DateTime, Datelike, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
    Timelike, Weekday,
};

/// Full Indonesian month names, January first
pub const MONTH_NAMES: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// The instant every relative phrase is resolved against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceTime {
    now: DateTime<FixedOffset>,
}

impl ReferenceTime {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self { now }
    }

    /// Current wall-clock time in the machine's local offset
    pub fn local_now() -> Self {
        Self::new(Local::now().fixed_offset())
    }

    /// Build from a local wall-clock reading and an offset in hours east of UTC
    ///
    /// Returns None if the offset is outside +/-24h.
    pub fn from_local(local: NaiveDateTime, utc_offset_hours: f64) -> Option<Self> {
        let seconds = (utc_offset_hours * 3600.0).round() as i32;
        let offset = FixedOffset::east_opt(seconds)?;
        offset.from_local_datetime(&local).single().map(Self::new)
    }

    pub fn instant(&self) -> DateTime<FixedOffset> {
        self.now
    }

    /// Local calendar date of the reference instant
    pub fn date(&self) -> NaiveDate {
        self.now.date_naive()
    }

    pub fn offset(&self) -> FixedOffset {
        *self.now.offset()
    }

    /// Offset in hours, positive east of UTC
    pub fn utc_offset_hours(&self) -> f64 {
        f64::from(self.offset().local_minus_utc()) / 3600.0
    }

    /// Attach the reference offset to a local date and time
    pub fn at_local(&self, date: NaiveDate, time: NaiveTime) -> Option<DateTime<FixedOffset>> {
        self.offset()
            .from_local_datetime(&date.and_time(time))
            .single()
    }

    /// Human description used inside model prompts, e.g.
    /// `Senin, 1 Januari 2024 pukul 00.00`
    pub fn describe(&self) -> String {
        format!(
            "{}, {} {} {} pukul {:02}.{:02}",
            weekday_name(self.now.weekday()),
            self.now.day(),
            month_name(self.now.month()),
            self.now.year(),
            self.now.hour(),
            self.now.minute()
        )
    }
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Senin",
        Weekday::Tue => "Selasa",
        Weekday::Wed => "Rabu",
        Weekday::Thu => "Kamis",
        Weekday::Fri => "Jumat",
        Weekday::Sat => "Sabtu",
        Weekday::Sun => "Minggu",
    }
}

/// Month name for a 1-based month number
pub fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("")
}

/// Resolve a full or three-letter Indonesian month name (any case)
pub fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.trim().to_lowercase();
    if lower.len() < 3 {
        return None;
    }
    // "agt" is the common short form for Agustus alongside "agu"
    if lower == "agt" {
        return Some(8);
    }
    MONTH_NAMES
        .iter()
        .position(|m| {
            let m = m.to_lowercase();
            m == lower || (lower.len() == 3 && m.starts_with(&lower))
        })
        .map(|i| i as u32 + 1)
}

/// Locale display string stored as the record's `deadline`
///
/// `Selasa, 2 Januari` for date-only deadlines,
/// `Selasa, 2 Januari pukul 22.00` when a clock time was given.
pub fn format_deadline(deadline: &Deadline) -> String {
    let at = deadline.at;
    let date = format!(
        "{}, {} {}",
        weekday_name(at.weekday()),
        at.day(),
        month_name(at.month())
    );
    if deadline.has_time() {
        format!("{} pukul {:02}.{:02}", date, at.hour(), at.minute())
    } else {
        date
    }
}

/// `UTC+7`, `UTC+5.5`, `UTC-3`
pub fn format_offset(hours: f64) -> String {
    let sign = if hours < 0.0 { '-' } else { '+' };
    let abs = hours.abs();
    if abs.fract() == 0.0 {
        format!("UTC{}{}", sign, abs as i64)
    } else {
        format!("UTC{}{}", sign, abs)
    }
}
