use super::domain::{AdmissionRecord, Category};
use super::normalizer::is_special_track;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Keys our own serialized records carry that ingest derives instead of reading.
const DERIVED_KEYS: [&str; 1] = ["kind"];

/// Envelope returned by the statistics endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct StatsDocument {
    pub(crate) data: Vec<WireRecord>,
}

impl StatsDocument {
    pub(crate) fn into_records(self) -> Vec<AdmissionRecord> {
        self.data.into_iter().map(WireRecord::into_record).collect()
    }
}

impl<'de> Deserialize<'de> for AdmissionRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        WireRecord::deserialize(deserializer).map(WireRecord::into_record)
    }
}

/// A row as the source serializes it. The crawler emits Korean keys, newer
/// exports use camelCase English ones, and our own output uses snake_case.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireRecord {
    #[serde(default, alias = "계열")]
    category: Option<String>,
    #[serde(alias = "학과")]
    department: String,
    #[serde(alias = "전형명", alias = "track_name")]
    track_name: String,
    #[serde(default, alias = "모집인원", deserialize_with = "lenient_count")]
    capacity: Option<u32>,
    #[serde(default, alias = "지원자수", deserialize_with = "lenient_count")]
    applicants: Option<u32>,
    #[serde(
        default,
        alias = "subcategoryA",
        alias = "subcategory_a",
        deserialize_with = "lenient_count"
    )]
    applicants_subcategory_a: Option<u32>,
    #[serde(
        default,
        alias = "subcategoryB",
        alias = "subcategory_b",
        deserialize_with = "lenient_count"
    )]
    applicants_subcategory_b: Option<u32>,
    #[serde(
        default,
        alias = "경쟁률",
        alias = "competition_rate",
        deserialize_with = "lenient_rate"
    )]
    competition_rate: Option<f64>,
    #[serde(flatten)]
    unrecognized: BTreeMap<String, Value>,
}

impl WireRecord {
    /// Keys that matched no known field. A misspelled count would otherwise
    /// read as zero without notice.
    pub(crate) fn unrecognized_keys(&self) -> Vec<&str> {
        self.unrecognized
            .keys()
            .map(String::as_str)
            .filter(|key| !DERIVED_KEYS.contains(key))
            .collect()
    }

    pub(crate) fn into_record(self) -> AdmissionRecord {
        let unrecognized = self.unrecognized_keys();
        if !unrecognized.is_empty() {
            warn!(
                department = %self.department,
                track = %self.track_name,
                keys = ?unrecognized,
                "ignoring unrecognized statistics fields"
            );
        }

        let category = self
            .category
            .as_deref()
            .map(Category::from_label)
            .unwrap_or(Category::Other);
        let applicants = self.applicants.unwrap_or(0);

        let special = is_special_track(&self.track_name)
            || self.applicants_subcategory_a.is_some()
            || self.applicants_subcategory_b.is_some();

        if special {
            return AdmissionRecord::special(
                category,
                self.department,
                self.track_name,
                applicants,
                self.applicants_subcategory_a.unwrap_or(0),
                self.applicants_subcategory_b.unwrap_or(0),
            );
        }

        let record = AdmissionRecord::general(
            category,
            self.department,
            self.track_name,
            self.capacity.unwrap_or(0),
            applicants,
        );
        match self.competition_rate {
            Some(reported) => record.with_reported_rate(reported),
            None => record,
        }
    }
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::Number(number) => number
            .as_u64()
            .map(|count| count.min(u64::from(u32::MAX)) as u32)
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|count| count.is_finite() && *count >= 0.0)
                    .map(|count| count.round().min(f64::from(u32::MAX)) as u32)
            }),
        Value::String(raw) => Some(parse_count(&raw)),
        _ => None,
    }))
}

fn lenient_rate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => Some(parse_rate(&raw)),
        _ => None,
    }))
}

/// Parses a scraped head count. Blank cells and "no limit"/"none" markers
/// count as zero, as does anything else unparseable.
pub(crate) fn parse_count(raw: &str) -> u32 {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.contains("없음") {
        return 0;
    }
    trimmed.replace(',', "").parse::<u32>().unwrap_or(0)
}

/// Parses a scraped ratio such as `"12.5 : 1"`, keeping the left-hand side.
pub(crate) fn parse_rate(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.contains("없음") {
        return 0.0;
    }
    trimmed
        .split(':')
        .next()
        .map(str::trim)
        .and_then(|head| head.replace(',', "").parse::<f64>().ok())
        .filter(|rate| rate.is_finite())
        .unwrap_or(0.0)
}
