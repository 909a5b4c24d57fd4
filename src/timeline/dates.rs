//! Timeline date-key parsing.
//!
//! disease.sh keys its timelines as `M/D/YY`; other feeds use ISO dates.
//! Two-digit years always mean `20YY`.

use chrono::NaiveDate;

use crate::domain::RawTimeline;
use crate::error::PipelineError;

/// Parse a raw timeline key into a calendar day.
pub fn parse_date_key(key: &str) -> Result<NaiveDate, PipelineError> {
    let trimmed = key.trim();
    parse_slash_date(trimmed)
        .or_else(|| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok())
        .ok_or_else(|| PipelineError::Parse {
            key: key.to_string(),
        })
}

/// Parse every key of a metric series and sort ascending by date.
///
/// Fails on the first unparseable key; nothing is returned in that case.
pub fn sorted_by_date<'a, I>(entries: I) -> Result<Vec<(NaiveDate, u64)>, PipelineError>
where
    I: IntoIterator<Item = (&'a String, &'a u64)>,
{
    let mut out = Vec::new();
    for (key, value) in entries {
        out.push((parse_date_key(key)?, *value));
    }
    // Stable sort: duplicate dates keep their source order, last one wins later.
    out.sort_by_key(|(date, _)| *date);
    Ok(out)
}

/// Every metric of a timeline, parsed and sorted once.
///
/// Statistics, the latest sample and the chart all start from this, so a
/// recompute parses the payload a single time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortedTimeline {
    pub cases: Vec<(NaiveDate, u64)>,
    pub deaths: Vec<(NaiveDate, u64)>,
    /// `None` when the source reports no recoveries (absent or empty map).
    pub recovered: Option<Vec<(NaiveDate, u64)>>,
}

impl SortedTimeline {
    pub fn from_raw(timeline: &RawTimeline) -> Result<Self, PipelineError> {
        Ok(Self {
            cases: sorted_by_date(&timeline.cases)?,
            deaths: sorted_by_date(&timeline.deaths)?,
            recovered: match timeline.recovered_series() {
                Some(series) => Some(sorted_by_date(series)?),
                None => None,
            },
        })
    }

    /// Date of the newest record across all metrics.
    pub fn latest_date(&self) -> Option<NaiveDate> {
        [
            self.cases.last(),
            self.deaths.last(),
            self.recovered.as_ref().and_then(|r| r.last()),
        ]
        .into_iter()
        .flatten()
        .map(|(date, _)| *date)
        .max()
    }
}

fn parse_slash_date(s: &str) -> Option<NaiveDate> {
    let mut parts = s.split('/');
    let month = parse_digits(parts.next()?, 1, 2)?;
    let day = parse_digits(parts.next()?, 1, 2)?;
    let year_raw = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let year = match year_raw.len() {
        2 => 2000 + parse_digits(year_raw, 2, 2)? as i32,
        4 => parse_digits(year_raw, 4, 4)? as i32,
        _ => return None,
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_digits(s: &str, min_len: usize, max_len: usize) -> Option<u32> {
    if s.len() < min_len || s.len() > max_len || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
