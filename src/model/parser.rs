// File: ./src/model/parser.rs
// Finds M/D/YY and M/D/YYYY tokens in free text
use crate::model::item::{ExtractedDate, YearPolicy};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

// ASCII digits only; `\d` would also accept other scripts' digits.
static DATE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([0-9]{1,2})/([0-9]{1,2})/([0-9]{4}|[0-9]{2})\b")
        .expect("date token pattern is valid")
});

/// Years below this pivot get 2000 added, the rest 1900.
const CENTURY_PIVOT: i32 = 69;

#[derive(Debug, Clone, Copy, Default)]
pub struct DateExtractor {
    policy: YearPolicy,
}

impl DateExtractor {
    pub fn new(policy: YearPolicy) -> Self {
        Self { policy }
    }

    /// Returns every valid date in `text`, in order of appearance.
    /// Tokens that do not form a real calendar date are skipped.
    pub fn extract(&self, text: &str) -> Vec<ExtractedDate> {
        let mut dates = Vec::new();
        for caps in DATE_TOKEN.captures_iter(text) {
            let (Some(whole), Some(m), Some(d), Some(y)) =
                (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
            else {
                continue;
            };

            match self.parse_parts(m.as_str(), d.as_str(), y.as_str()) {
                Some(date) => dates.push(ExtractedDate {
                    date,
                    token: whole.as_str().to_string(),
                    offset: whole.start(),
                }),
                None => debug!(token = whole.as_str(), "dropping unparsable date token"),
            }
        }
        dates
    }

    fn parse_parts(&self, month: &str, day: &str, year: &str) -> Option<NaiveDate> {
        let month = month.parse::<u32>().ok()?;
        let day = day.parse::<u32>().ok()?;
        let raw_year = year.parse::<i32>().ok()?;

        let year = match (year.len(), self.policy) {
            (4, _) => raw_year,
            (2, YearPolicy::Century) if raw_year < CENTURY_PIVOT => 2000 + raw_year,
            (2, YearPolicy::Century) => 1900 + raw_year,
            _ => return None,
        };
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// Extracts dates with the default two-digit year policy.
pub fn extract_dates(text: &str) -> Vec<ExtractedDate> {
    DateExtractor::default().extract(text)
}
