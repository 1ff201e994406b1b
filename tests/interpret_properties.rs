//! Property tests for the local interpreter
//!
//! These check the behaviors every sentence must satisfy regardless of
//! wording: subject classification, the fallback subject, relative-day
//! arithmetic, and idempotent name clean-up.

use chrono::{Days, NaiveDate, Timelike};
use proptest::prelude::*;
use tugasku::core::calendar::ReferenceTime;
use tugasku::core::config::{default_subjects, TrackerConfig};
use tugasku::interpret::{LocalInterpreter, TaskNameCleaner};

/// Words that are neither subject keys nor date/time vocabulary
const FILLER: &[&str] = &[
    "tugas", "laporan", "baca", "kerjakan", "bab", "makalah", "revisi", "kelompok",
    "presentasi", "soal", "latihan", "rangkuman",
];

fn interpreter() -> LocalInterpreter {
    LocalInterpreter::from_config(&TrackerConfig::default()).unwrap()
}

fn filler_words() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(FILLER), 1..6)
}

fn reference_time() -> impl Strategy<Value = ReferenceTime> {
    (2000i32..2100, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, -12i32..=14).prop_map(
        |(y, m, d, h, min, offset)| {
            let local = NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, 0)
                .unwrap();
            ReferenceTime::from_local(local, f64::from(offset)).unwrap()
        },
    )
}

fn contains_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|w| w.eq_ignore_ascii_case(word))
}

proptest! {
    #[test]
    fn known_subject_is_classified_and_stripped(
        words in filler_words(),
        subject_index in 0usize..7,
        position in 0usize..6,
        upper in any::<bool>(),
        reference in reference_time(),
    ) {
        let entry = &default_subjects()[subject_index];
        let key = if upper { entry.key.to_uppercase() } else { entry.key.clone() };

        let mut tokens: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        let at = position.min(tokens.len());
        tokens.insert(at, key);
        let sentence = tokens.join(" ");

        let task = interpreter().interpret(&sentence, &reference);
        prop_assert_eq!(&task.subject, &entry.name);
        prop_assert!(!contains_word(&task.task_name, &entry.key));
        prop_assert!(task.deadline.is_none());
    }

    #[test]
    fn no_subject_falls_back_to_other(words in filler_words(), reference in reference_time()) {
        let sentence = words.join(" ");
        let task = interpreter().interpret(&sentence, &reference);
        prop_assert_eq!(task.subject, "Other");
        prop_assert!(!task.task_name.is_empty());
    }

    #[test]
    fn relative_day_resolves_from_reference_date(
        words in filler_words(),
        phrase_index in 0usize..5,
        hour in prop::option::of(0u32..24),
        reference in reference_time(),
    ) {
        let (phrase, days) = [
            ("hari ini", 0u64),
            ("besok", 1),
            ("lusa", 2),
            ("minggu depan", 7),
            ("4 hari lagi", 4),
        ][phrase_index];

        let mut sentence = format!("{} {}", words.join(" "), phrase);
        if let Some(h) = hour {
            sentence.push_str(&format!(" jam {}", h));
        }

        let task = interpreter().interpret(&sentence, &reference);
        let deadline = task.deadline.expect("deadline recognized");
        let expected = reference.date().checked_add_days(Days::new(days)).unwrap();
        prop_assert_eq!(deadline.at.date_naive(), expected);

        match hour {
            Some(h) => {
                prop_assert!(deadline.has_time());
                prop_assert_eq!(deadline.at.hour(), h);
                prop_assert_eq!(deadline.at.minute(), 0);
            }
            None => prop_assert!(!deadline.has_time()),
        }
    }

    #[test]
    fn cleanup_is_idempotent(text in "( |deadline|Deadline|tugas|imk|,|\\.|-|!|x|  ){0,12}") {
        let cleaner = TaskNameCleaner::new().unwrap();
        let once = cleaner.clean(&text);
        prop_assert_eq!(cleaner.clean(&once), once);
    }

    #[test]
    fn cleanup_is_idempotent_on_arbitrary_ascii(text in "[ -~]{0,40}") {
        let cleaner = TaskNameCleaner::new().unwrap();
        let once = cleaner.clean(&text);
        prop_assert_eq!(cleaner.clean(&once), once);
    }
}

#[test]
fn scenario_full_sentence() {
    let local = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let reference = ReferenceTime::from_local(local, 0.0).unwrap();

    let task = interpreter().interpret("tugas imk besok jam 10 malam", &reference);
    assert_eq!(task.subject, "Interaksi Manusia Komputer");
    assert!(task.task_name.starts_with("Tugas"));
    assert!(!contains_word(&task.task_name, "imk"));
    assert!(!contains_word(&task.task_name, "besok"));
    assert!(!contains_word(&task.task_name, "jam"));

    let deadline = task.deadline.unwrap();
    assert_eq!(
        deadline.at.naive_local(),
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(22, 0, 0)
            .unwrap()
    );
}

#[test]
fn scenario_plain_sentence() {
    let reference = ReferenceTime::local_now();
    let task = interpreter().interpret("baca jurnal", &reference);
    assert_eq!(task.subject, "Other");
    assert!(task.deadline.is_none());
    assert_eq!(task.task_name, "Baca jurnal");
}
