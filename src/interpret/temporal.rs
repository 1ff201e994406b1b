//! Date and clock-time phrase recognition
//!
//! Date rules form an ordered list of matcher -> constructor pairs. They are
//! tried in declaration order and the first rule that both matches and
//! yields a real calendar date is applied. The clock-time phrase is a
//! separate, independent pass.

use crate::core::calendar::month_from_name;
use crate::core::error::{Result, TugasError};
use crate::interpret::remove_span;
use chrono::{Datelike, Days, NaiveDate, NaiveTime};
use regex::{Captures, Regex};

/// The kinds of date phrase we understand, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRuleKind {
    /// "hari ini"
    Today,
    /// "besok"
    Tomorrow,
    /// "lusa"
    DayAfterTomorrow,
    /// "N hari lagi"
    DaysFromNow,
    /// "minggu depan"
    NextWeek,
    /// "17 agustus", "3 des"
    DayMonth,
}

impl DateRuleKind {
    /// Fixed evaluation order
    pub const ORDER: [DateRuleKind; 6] = [
        DateRuleKind::Today,
        DateRuleKind::Tomorrow,
        DateRuleKind::DayAfterTomorrow,
        DateRuleKind::DaysFromNow,
        DateRuleKind::NextWeek,
        DateRuleKind::DayMonth,
    ];

    fn pattern(self) -> &'static str {
        match self {
            DateRuleKind::Today => r"(?i)\bhari\s+ini\b",
            DateRuleKind::Tomorrow => r"(?i)\bbesok\b",
            DateRuleKind::DayAfterTomorrow => r"(?i)\blusa\b",
            DateRuleKind::DaysFromNow => r"(?i)\b(\d{1,4})\s+hari\s+lagi\b",
            DateRuleKind::NextWeek => r"(?i)\bminggu\s+depan\b",
            DateRuleKind::DayMonth => {
                r"(?i)\b(\d{1,2})\s+(januari|februari|maret|april|mei|juni|juli|agustus|september|oktober|november|desember|jan|feb|mar|apr|jun|jul|agu|agt|sep|okt|nov|des)\b"
            }
        }
    }

    /// Build the concrete date for a match, or None if it is not a real date
    fn resolve(self, caps: &Captures<'_>, reference: NaiveDate) -> Option<NaiveDate> {
        let offset = |days: u64| reference.checked_add_days(Days::new(days));
        match self {
            DateRuleKind::Today => Some(reference),
            DateRuleKind::Tomorrow => offset(1),
            DateRuleKind::DayAfterTomorrow => offset(2),
            DateRuleKind::NextWeek => offset(7),
            DateRuleKind::DaysFromNow => offset(caps.get(1)?.as_str().parse().ok()?),
            DateRuleKind::DayMonth => {
                let day: u32 = caps.get(1)?.as_str().parse().ok()?;
                let month = month_from_name(caps.get(2)?.as_str())?;
                NaiveDate::from_ymd_opt(reference.year(), month, day)
            }
        }
    }
}

/// Period-of-day word following a clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPeriod {
    /// "pagi"
    Morning,
    /// "siang"
    Midday,
    /// "sore"
    Evening,
    /// "malam"
    Night,
}

impl DayPeriod {
    fn from_word(word: &str) -> Option<Self> {
        match word.to_lowercase().as_str() {
            "pagi" => Some(DayPeriod::Morning),
            "siang" => Some(DayPeriod::Midday),
            "sore" => Some(DayPeriod::Evening),
            "malam" => Some(DayPeriod::Night),
            _ => None,
        }
    }

    /// Convert a spoken hour to a 24h hour
    pub fn adjust(self, hour: u32) -> u32 {
        match self {
            DayPeriod::Morning if hour == 12 => 0,
            DayPeriod::Morning => hour,
            DayPeriod::Midday if (1..=5).contains(&hour) => hour + 12,
            DayPeriod::Midday => hour,
            DayPeriod::Evening | DayPeriod::Night if hour < 12 => hour + 12,
            DayPeriod::Evening | DayPeriod::Night => hour,
        }
    }
}

/// A date phrase found in a sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMatch {
    pub kind: DateRuleKind,
    pub date: NaiveDate,
    pub remaining: String,
}

/// A clock-time phrase found in a sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeMatch {
    pub time: NaiveTime,
    pub period: Option<DayPeriod>,
    pub remaining: String,
}

#[derive(Debug, Clone)]
struct DateRule {
    kind: DateRuleKind,
    pattern: Regex,
}

/// Compiled date rules plus the clock-time matcher
#[derive(Debug, Clone)]
pub struct TemporalRules {
    date_rules: Vec<DateRule>,
    time_pattern: Regex,
}

const TIME_PATTERN: &str = r"(?i)\bjam\s+(\d{1,2})(?:[:.](\d{2}))?(?:\s+(pagi|siang|sore|malam))?\b";

impl TemporalRules {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| TugasError::Config(format!("Bad pattern: {}", e)))
        };

        let date_rules = DateRuleKind::ORDER
            .iter()
            .map(|&kind| {
                Ok(DateRule {
                    kind,
                    pattern: compile(kind.pattern())?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            date_rules,
            time_pattern: compile(TIME_PATTERN)?,
        })
    }

    /// Apply the first date rule that matches `text`
    ///
    /// A number right after "jam" is an hour, so "jam 10 mei" is never read
    /// as the tenth of May; that occurrence is skipped and later ones are
    /// still considered.
    pub fn match_date(&self, text: &str, reference: NaiveDate) -> Option<DateMatch> {
        self.date_rules.iter().find_map(|rule| {
            rule.pattern
                .captures_iter(text)
                .filter(|caps| caps.get(0).is_some_and(|m| !follows_clock_word(text, m.start())))
                .find_map(|caps| {
                    let date = rule.kind.resolve(&caps, reference)?;
                    let span = caps.get(0)?.range();
                    Some(DateMatch {
                        kind: rule.kind,
                        date,
                        remaining: remove_span(text, span),
                    })
                })
        })
    }

    /// Find a clock-time phrase; out-of-range hours or minutes do not match
    pub fn match_time(&self, text: &str) -> Option<TimeMatch> {
        let caps = self.time_pattern.captures(text)?;
        let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
        let minute: u32 = match caps.get(2) {
            Some(m) => m.as_str().parse().ok()?,
            None => 0,
        };
        if hour > 23 {
            return None;
        }

        let period = caps.get(3).and_then(|m| DayPeriod::from_word(m.as_str()));
        let hour = period.map_or(hour, |p| p.adjust(hour));
        let time = NaiveTime::from_hms_opt(hour, minute, 0)?;

        Some(TimeMatch {
            time,
            period,
            remaining: remove_span(text, caps.get(0)?.range()),
        })
    }
}

/// Whether the text before `start` ends with the standalone word "jam"
fn follows_clock_word(text: &str, start: usize) -> bool {
    let head = &text[..start];
    let trimmed = head.trim_end();
    let cut = trimmed.len().saturating_sub(3);
    if trimmed.len() == head.len() || !trimmed.is_char_boundary(cut) {
        return false;
    }
    let (before, word) = trimmed.split_at(cut);
    word.eq_ignore_ascii_case("jam")
        && !before.chars().next_back().is_some_and(char::is_alphanumeric)
}
