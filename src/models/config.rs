//! School layout configuration and its normalizer.
//!
//! Raw settings arrive from callers possibly partial or malformed.
//! `Configuration::normalize` turns them into one canonical, immutable
//! layout in a single pass: absent or invalid values are replaced by
//! defaults, never rejected. Every later component reads the canonical
//! form only.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default number of periods on a school day.
pub const DEFAULT_PERIODS_PER_DAY: u8 = 6;
/// Default grade list.
pub const DEFAULT_GRADES: [u8; 3] = [1, 2, 3];
/// Default section counts for the default grades.
pub const DEFAULT_SECTIONS: [u8; 3] = [4, 4, 3];
/// Largest accepted period count; values beyond this are treated as invalid.
const MAX_PERIODS: u8 = 12;
/// Largest accepted grade number.
const MAX_GRADE: u8 = 12;

/// A school day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Day {
    /// All days in weekday order.
    pub const ALL: [Day; 6] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    /// Parses a day from a full name or three-letter abbreviation,
    /// case-insensitive. Returns `None` for unrecognized spellings.
    pub fn parse(name: &str) -> Option<Day> {
        match name.trim().to_ascii_lowercase().as_str() {
            "monday" | "mon" => Some(Day::Monday),
            "tuesday" | "tue" => Some(Day::Tuesday),
            "wednesday" | "wed" => Some(Day::Wednesday),
            "thursday" | "thu" => Some(Day::Thursday),
            "friday" | "fri" => Some(Day::Friday),
            "saturday" | "sat" => Some(Day::Saturday),
            _ => None,
        }
    }

    /// Day name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
        }
    }
}

/// Raw school settings as a caller may supply them.
///
/// Every field is optional; unknown shapes are tolerated by the
/// normalizer rather than rejected. `sections_per_grade` pairs with
/// `grades` by position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSettings {
    /// Day names (full or three-letter). Unrecognized entries are skipped.
    pub days: Option<Vec<String>>,
    /// Periods on a weekday.
    pub periods_per_day: Option<i64>,
    /// Periods on Saturday, when Saturday is a school day.
    pub saturday_periods: Option<i64>,
    /// Grade numbers.
    pub grades: Option<Vec<i64>>,
    /// Section count per grade, positionally aligned with `grades`.
    pub sections_per_grade: Option<Vec<i64>>,
}

impl RawSettings {
    /// Creates empty settings (everything defaulted by the normalizer).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the day names.
    pub fn with_days(mut self, days: Vec<String>) -> Self {
        self.days = Some(days);
        self
    }

    /// Sets the weekday period count.
    pub fn with_periods_per_day(mut self, periods: i64) -> Self {
        self.periods_per_day = Some(periods);
        self
    }

    /// Sets the Saturday period count.
    pub fn with_saturday_periods(mut self, periods: i64) -> Self {
        self.saturday_periods = Some(periods);
        self
    }

    /// Sets the grade list.
    pub fn with_grades(mut self, grades: Vec<i64>) -> Self {
        self.grades = Some(grades);
        self
    }

    /// Sets the per-grade section counts (aligned with `grades`).
    pub fn with_sections_per_grade(mut self, sections: Vec<i64>) -> Self {
        self.sections_per_grade = Some(sections);
        self
    }
}

/// Canonicalized school layout. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// School days, in weekday order, deduplicated.
    pub days: Vec<Day>,
    /// Periods on a weekday.
    pub periods_per_day: u8,
    /// Periods on Saturday (may differ from weekdays).
    pub saturday_periods: u8,
    /// Grade numbers, deduplicated, first occurrence preserved.
    pub grades: Vec<u8>,
    /// Section count per grade.
    pub sections_by_grade: BTreeMap<u8, u8>,
}

impl Configuration {
    /// Builds the canonical configuration from raw settings.
    ///
    /// Pure and total: never fails. Absent or invalid values are
    /// replaced by defaults: Monday to Friday, 6 periods, Saturday
    /// matching the weekday count, grades 1–3 with 4/4/3 sections.
    pub fn normalize(raw: &RawSettings) -> Configuration {
        let periods_per_day = raw
            .periods_per_day
            .filter(|&p| p >= 1 && p <= MAX_PERIODS as i64)
            .map(|p| p as u8)
            .unwrap_or(DEFAULT_PERIODS_PER_DAY);

        let saturday_periods = raw
            .saturday_periods
            .filter(|&p| p >= 1 && p <= MAX_PERIODS as i64)
            .map(|p| p as u8)
            .unwrap_or(periods_per_day);

        let mut days: Vec<Day> = raw
            .days
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .filter_map(|name| Day::parse(name))
            .collect();
        days.sort();
        days.dedup();
        if days.is_empty() {
            days = vec![
                Day::Monday,
                Day::Tuesday,
                Day::Wednesday,
                Day::Thursday,
                Day::Friday,
            ];
        }

        let mut grades: Vec<u8> = Vec::new();
        for &g in raw.grades.as_deref().unwrap_or(&[]) {
            if g >= 1 && g <= MAX_GRADE as i64 && !grades.contains(&(g as u8)) {
                grades.push(g as u8);
            }
        }
        if grades.is_empty() {
            grades = DEFAULT_GRADES.to_vec();
        }

        let raw_sections = raw.sections_per_grade.as_deref().unwrap_or(&[]);
        let mut sections_by_grade = BTreeMap::new();
        for (i, &grade) in grades.iter().enumerate() {
            let fallback = DEFAULT_SECTIONS.get(i).copied().unwrap_or(1);
            let sections = raw_sections
                .get(i)
                .filter(|&&s| s >= 1 && s <= 26)
                .map(|&s| s as u8)
                .unwrap_or(fallback);
            sections_by_grade.insert(grade, sections);
        }

        Configuration {
            days,
            periods_per_day,
            saturday_periods,
            grades,
            sections_by_grade,
        }
    }

    /// The fully-defaulted layout.
    pub fn standard() -> Configuration {
        Self::normalize(&RawSettings::default())
    }

    /// Period count for a given day.
    #[inline]
    pub fn periods_for(&self, day: Day) -> u8 {
        if day == Day::Saturday {
            self.saturday_periods
        } else {
            self.periods_per_day
        }
    }

    /// Total teaching periods per week (sum over configured days).
    pub fn weekly_periods(&self) -> u32 {
        self.days.iter().map(|&d| self.periods_for(d) as u32).sum()
    }

    /// Section count for a grade (0 for unconfigured grades).
    #[inline]
    pub fn sections_for(&self, grade: u8) -> u8 {
        self.sections_by_grade.get(&grade).copied().unwrap_or(0)
    }

    /// All (grade, section) classes, sections 1-based.
    pub fn classes(&self) -> Vec<(u8, u8)> {
        let mut out = Vec::new();
        for &grade in &self.grades {
            for section in 1..=self.sections_for(grade) {
                out.push((grade, section));
            }
        }
        out
    }

    /// Total slot count across the whole grid.
    pub fn total_slots(&self) -> usize {
        self.weekly_periods() as usize * self.classes().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_parse() {
        assert_eq!(Day::parse("Monday"), Some(Day::Monday));
        assert_eq!(Day::parse("wed"), Some(Day::Wednesday));
        assert_eq!(Day::parse(" SAT "), Some(Day::Saturday));
        assert_eq!(Day::parse("someday"), None);
    }

    #[test]
    fn test_normalize_empty_settings() {
        let config = Configuration::normalize(&RawSettings::new());
        assert_eq!(config.days.len(), 5);
        assert_eq!(config.periods_per_day, 6);
        assert_eq!(config.saturday_periods, 6);
        assert_eq!(config.grades, vec![1, 2, 3]);
        assert_eq!(config.sections_for(1), 4);
        assert_eq!(config.sections_for(2), 4);
        assert_eq!(config.sections_for(3), 3);
    }

    #[test]
    fn test_normalize_replaces_invalid_values() {
        let raw = RawSettings::new()
            .with_periods_per_day(-3)
            .with_saturday_periods(99)
            .with_grades(vec![0, 2, 2, 50])
            .with_sections_per_grade(vec![-1]);
        let config = Configuration::normalize(&raw);
        assert_eq!(config.periods_per_day, 6);
        assert_eq!(config.saturday_periods, 6);
        // Only grade 2 survives; its invalid section count falls back
        assert_eq!(config.grades, vec![2]);
        assert_eq!(config.sections_for(2), 4);
    }

    #[test]
    fn test_normalize_skips_unknown_days() {
        let raw = RawSettings::new().with_days(vec![
            "mon".into(),
            "funday".into(),
            "fri".into(),
            "mon".into(),
        ]);
        let config = Configuration::normalize(&raw);
        assert_eq!(config.days, vec![Day::Monday, Day::Friday]);
    }

    #[test]
    fn test_normalize_all_invalid_days_defaults() {
        let raw = RawSettings::new().with_days(vec!["x".into(), "y".into()]);
        let config = Configuration::normalize(&raw);
        assert_eq!(config.days.len(), 5);
        assert!(!config.days.contains(&Day::Saturday));
    }

    #[test]
    fn test_saturday_defaults_to_weekday_count() {
        let raw = RawSettings::new()
            .with_days(vec!["mon".into(), "sat".into()])
            .with_periods_per_day(7);
        let config = Configuration::normalize(&raw);
        assert_eq!(config.periods_for(Day::Monday), 7);
        assert_eq!(config.periods_for(Day::Saturday), 7);
    }

    #[test]
    fn test_saturday_override() {
        let raw = RawSettings::new()
            .with_days(vec!["mon".into(), "sat".into()])
            .with_saturday_periods(4);
        let config = Configuration::normalize(&raw);
        assert_eq!(config.periods_for(Day::Monday), 6);
        assert_eq!(config.periods_for(Day::Saturday), 4);
        assert_eq!(config.weekly_periods(), 10);
    }

    #[test]
    fn test_total_slots() {
        // 5 days × 6 periods × (4 + 4 + 3) sections
        let config = Configuration::standard();
        assert_eq!(config.total_slots(), 30 * 11);
        assert_eq!(config.classes().len(), 11);
    }

    #[test]
    fn test_extra_grades_default_to_one_section() {
        let raw = RawSettings::new().with_grades(vec![1, 2, 3, 4]);
        let config = Configuration::normalize(&raw);
        assert_eq!(config.sections_for(4), 1);
    }

    #[test]
    fn test_raw_settings_tolerates_partial_json() {
        let raw: RawSettings =
            serde_json::from_str(r#"{"periods_per_day": 5}"#).unwrap();
        let config = Configuration::normalize(&raw);
        assert_eq!(config.periods_per_day, 5);
        assert_eq!(config.grades, vec![1, 2, 3]);
    }
}
