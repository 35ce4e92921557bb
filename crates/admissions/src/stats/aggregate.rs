use super::domain::{AdmissionRecord, Category};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaxRateEntry {
    pub department: String,
    pub track_name: String,
    pub competition_rate: f64,
}

impl MaxRateEntry {
    pub const NO_DATA: &'static str = "no data";

    pub fn no_data() -> Self {
        Self {
            department: Self::NO_DATA.to_string(),
            track_name: String::new(),
            competition_rate: 0.0,
        }
    }

    pub fn is_no_data(&self) -> bool {
        self.department == Self::NO_DATA && self.track_name.is_empty()
    }
}

/// Headline figures for a set of records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub record_count: usize,
    pub total_applicants: u64,
    pub total_capacity: u64,
    pub average_rate: f64,
    pub max_rate: MaxRateEntry,
}

/// Computes the summary cards. Capacity and rate figures only consider
/// records that carry a rate; applicant totals include every track.
pub fn aggregate(records: &[AdmissionRecord]) -> Summary {
    let total_applicants = records.iter().map(AdmissionRecord::total_applicants).sum();
    let total_capacity = records
        .iter()
        .filter(|record| !record.is_special())
        .map(|record| u64::from(record.capacity()))
        .sum();

    let mut rate_sum = 0.0;
    let mut rated = 0usize;
    let mut best: Option<&AdmissionRecord> = None;
    for record in records.iter().filter(|record| !record.is_special()) {
        let Some(rate) = record.competition_rate() else {
            continue;
        };
        rate_sum += rate;
        rated += 1;
        if best.map_or(true, |current| rate > current.rate_or_zero()) {
            best = Some(record);
        }
    }

    let average_rate = if rated > 0 {
        rate_sum / rated as f64
    } else {
        0.0
    };
    let max_rate = best
        .map(|record| MaxRateEntry {
            department: record.department.clone(),
            track_name: record.track_name.clone(),
            competition_rate: record.rate_or_zero(),
        })
        .unwrap_or_else(MaxRateEntry::no_data);

    Summary {
        record_count: records.len(),
        total_applicants,
        total_capacity,
        average_rate,
        max_rate,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackGroup {
    pub track_name: String,
    pub records: Vec<AdmissionRecord>,
}

/// Groups records by track name in order of first appearance.
pub fn group_by_track(records: &[AdmissionRecord]) -> Vec<TrackGroup> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<TrackGroup> = Vec::new();

    for record in records {
        let position = *positions
            .entry(record.track_name.as_str())
            .or_insert_with(|| {
                groups.push(TrackGroup {
                    track_name: record.track_name.clone(),
                    records: Vec::new(),
                });
                groups.len() - 1
            });
        groups[position].records.push(record.clone());
    }

    groups
}

/// Column a table or ranking can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    CompetitionRate,
    Applicants,
    Capacity,
    Department,
}

impl SortKey {
    pub const fn slug(self) -> &'static str {
        match self {
            Self::CompetitionRate => "competition_rate",
            Self::Applicants => "applicants",
            Self::Capacity => "capacity",
            Self::Department => "department",
        }
    }

    /// Ascending comparison on this key.
    pub fn compare(self, left: &AdmissionRecord, right: &AdmissionRecord) -> Ordering {
        match self {
            Self::CompetitionRate => left.rate_or_zero().total_cmp(&right.rate_or_zero()),
            Self::Applicants => left.total_applicants().cmp(&right.total_applicants()),
            Self::Capacity => left.capacity().cmp(&right.capacity()),
            Self::Department => left.department.cmp(&right.department),
        }
    }
}

impl Default for SortKey {
    fn default() -> Self {
        Self::CompetitionRate
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "competition_rate" | "rate" => Ok(Self::CompetitionRate),
            "applicants" => Ok(Self::Applicants),
            "capacity" => Ok(Self::Capacity),
            "department" => Ok(Self::Department),
            _ => Err(format!(
                "unknown sort key '{value}' (expected competition_rate, applicants, capacity, or department)"
            )),
        }
    }
}

/// The `n` highest records by `key`. Equal keys keep their input order.
pub fn rank_top(records: &[AdmissionRecord], n: usize, key: SortKey) -> Vec<AdmissionRecord> {
    let mut ranked: Vec<&AdmissionRecord> = records.iter().collect();
    ranked.sort_by(|left, right| key.compare(right, left));
    ranked.into_iter().take(n).cloned().collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub category_label: &'static str,
    pub applicants: u64,
}

/// Applicant totals per category, in order of first appearance.
pub fn category_totals(records: &[AdmissionRecord]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for record in records {
        match totals
            .iter_mut()
            .find(|total| total.category == record.category)
        {
            Some(total) => total.applicants += record.total_applicants(),
            None => totals.push(CategoryTotal {
                category: record.category,
                category_label: record.category.label(),
                applicants: record.total_applicants(),
            }),
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn general(department: &str, track: &str, capacity: u32, applicants: u32) -> AdmissionRecord {
        AdmissionRecord::general(Category::Engineering, department, track, capacity, applicants)
    }

    #[test]
    fn empty_input_aggregates_to_zero() {
        let summary = aggregate(&[]);
        assert_eq!(summary.total_applicants, 0);
        assert_eq!(summary.total_capacity, 0);
        assert_eq!(summary.average_rate, 0.0);
        assert!(summary.max_rate.is_no_data());
        assert_eq!(summary.max_rate.competition_rate, 0.0);
    }

    #[test]
    fn aggregate_excludes_special_track_from_capacity_and_rates() {
        let records = vec![
            general("A", "general", 10, 30),
            general("B", "general", 10, 10),
            general("C", "general", 0, 5),
            AdmissionRecord::special(Category::Other, "D", "special", 2, 3, 4),
        ];

        let summary = aggregate(&records);
        assert_eq!(summary.record_count, 4);
        assert_eq!(summary.total_applicants, 30 + 10 + 5 + 9);
        assert_eq!(summary.total_capacity, 20);
        assert_eq!(summary.average_rate, 2.0);
        assert_eq!(summary.max_rate.department, "A");
        assert_eq!(summary.max_rate.competition_rate, 3.0);
    }

    #[test]
    fn max_rate_ties_keep_first_record() {
        let records = vec![general("first", "t", 2, 4), general("second", "t", 1, 2)];
        assert_eq!(aggregate(&records).max_rate.department, "first");
    }

    #[test]
    fn grouping_preserves_first_seen_order() {
        let records = vec![
            general("a", "T1", 1, 1),
            general("b", "T2", 1, 1),
            general("c", "T1", 1, 1),
        ];

        let groups = group_by_track(&records);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].track_name, "T1");
        let departments: Vec<&str> = groups[0]
            .records
            .iter()
            .map(|record| record.department.as_str())
            .collect();
        assert_eq!(departments, ["a", "c"]);
        assert_eq!(groups[1].track_name, "T2");
        assert_eq!(groups[1].records.len(), 1);
    }

    #[test]
    fn rank_top_is_descending_stable_and_truncated() {
        let records: Vec<AdmissionRecord> = (0..15)
            .map(|index| general(&format!("d{index}"), "t", 1, (index % 4) as u32))
            .collect();

        let top = rank_top(&records, 10, SortKey::CompetitionRate);
        assert_eq!(top.len(), 10);
        assert!(top
            .windows(2)
            .all(|pair| pair[0].rate_or_zero() >= pair[1].rate_or_zero()));

        let leaders: Vec<&str> = top
            .iter()
            .take(3)
            .map(|record| record.department.as_str())
            .collect();
        assert_eq!(leaders, ["d3", "d7", "d11"]);

        assert_eq!(rank_top(&records[..2], 10, SortKey::Applicants).len(), 2);
    }

    #[test]
    fn category_totals_follow_first_seen_order() {
        let records = vec![
            AdmissionRecord::general(Category::ArtsSports, "a", "t", 1, 5),
            AdmissionRecord::general(Category::Engineering, "b", "t", 1, 7),
            AdmissionRecord::special(Category::ArtsSports, "c", "special", 1, 1, 1),
        ];

        let totals = category_totals(&records);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].category, Category::ArtsSports);
        assert_eq!(totals[0].applicants, 8);
        assert_eq!(totals[1].category, Category::Engineering);
        assert_eq!(totals[1].applicants, 7);
    }

    #[test]
    fn sort_key_parses_aliases() {
        assert_eq!("rate".parse::<SortKey>(), Ok(SortKey::CompetitionRate));
        assert_eq!("competition-rate".parse::<SortKey>(), Ok(SortKey::CompetitionRate));
        assert!("bogus".parse::<SortKey>().is_err());
    }
}
