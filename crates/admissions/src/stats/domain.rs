use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Academic field a department belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Engineering,
    ArtsSports,
    HumanitiesSocial,
    Other,
}

impl Category {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Engineering,
            Self::ArtsSports,
            Self::HumanitiesSocial,
            Self::Other,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Engineering => "Engineering",
            Self::ArtsSports => "Arts & Sports",
            Self::HumanitiesSocial => "Humanities & Social Sciences",
            Self::Other => "Other",
        }
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Engineering => "engineering",
            Self::ArtsSports => "arts-sports",
            Self::HumanitiesSocial => "humanities-social",
            Self::Other => "other",
        }
    }

    /// Maps a source label onto a category. Unknown labels land in `Other`.
    pub fn from_label(value: &str) -> Self {
        Self::parse(value).unwrap_or(Self::Other)
    }

    fn parse(value: &str) -> Option<Self> {
        let compact: String = value.split_whitespace().collect::<String>().to_lowercase();
        let compact = compact.trim_end_matches("계열");
        match compact {
            "engineering" | "공학" | "공과" => Some(Self::Engineering),
            "arts-sports" | "artssports" | "예체능" => Some(Self::ArtsSports),
            "humanities-social" | "humanitiessocial" | "인문사회" | "인문" | "사회" => {
                Some(Self::HumanitiesSocial)
            }
            "other" | "기타" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| {
            format!(
                "unknown category '{value}' (expected one of: {})",
                Self::ordered().map(Self::slug).join(", ")
            )
        })
    }
}

/// Track-specific figures. The special track reports applicants split into
/// two sub-populations instead of a capacity and rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackKind {
    General {
        capacity: u32,
        competition_rate: Option<f64>,
    },
    Special {
        subcategory_a: u32,
        subcategory_b: u32,
    },
}

/// One department offered under one admission track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdmissionRecord {
    pub category: Category,
    pub department: String,
    pub track_name: String,
    pub applicants: u32,
    #[serde(flatten)]
    pub kind: TrackKind,
}

impl AdmissionRecord {
    pub fn general(
        category: Category,
        department: impl Into<String>,
        track_name: impl Into<String>,
        capacity: u32,
        applicants: u32,
    ) -> Self {
        Self {
            category,
            department: department.into(),
            track_name: track_name.into(),
            applicants,
            kind: TrackKind::General {
                capacity,
                competition_rate: competition_rate(applicants, capacity),
            },
        }
    }

    pub fn special(
        category: Category,
        department: impl Into<String>,
        track_name: impl Into<String>,
        applicants: u32,
        subcategory_a: u32,
        subcategory_b: u32,
    ) -> Self {
        Self {
            category,
            department: department.into(),
            track_name: track_name.into(),
            applicants,
            kind: TrackKind::Special {
                subcategory_a,
                subcategory_b,
            },
        }
    }

    /// Replaces the computed rate with one reported by the source. Ignored
    /// when the record has no capacity or the value is not a usable rate.
    pub fn with_reported_rate(mut self, reported: f64) -> Self {
        if let TrackKind::General {
            capacity,
            competition_rate,
        } = &mut self.kind
        {
            if *capacity > 0 && reported.is_finite() && reported >= 0.0 {
                *competition_rate = Some(reported);
            }
        }
        self
    }

    pub fn is_special(&self) -> bool {
        matches!(self.kind, TrackKind::Special { .. })
    }

    /// Recruitment slots; the special track has none.
    pub fn capacity(&self) -> u32 {
        match self.kind {
            TrackKind::General { capacity, .. } => capacity,
            TrackKind::Special { .. } => 0,
        }
    }

    pub fn competition_rate(&self) -> Option<f64> {
        match self.kind {
            TrackKind::General {
                competition_rate, ..
            } => competition_rate,
            TrackKind::Special { .. } => None,
        }
    }

    pub fn rate_or_zero(&self) -> f64 {
        self.competition_rate().unwrap_or(0.0)
    }

    /// Applicants including both special-track sub-populations.
    pub fn total_applicants(&self) -> u64 {
        let extra = match self.kind {
            TrackKind::General { .. } => 0,
            TrackKind::Special {
                subcategory_a,
                subcategory_b,
            } => u64::from(subcategory_a) + u64::from(subcategory_b),
        };
        u64::from(self.applicants) + extra
    }

    /// Applicants as a whole-number percentage of capacity.
    pub fn fill_percent(&self) -> u32 {
        let capacity = self.capacity();
        if capacity == 0 {
            return 0;
        }
        let percent = (f64::from(self.applicants) / f64::from(capacity) * 100.0).round();
        percent.min(f64::from(u32::MAX)) as u32
    }

    /// Fill percentage capped for progress-bar display.
    pub fn progress_percent(&self) -> u32 {
        self.fill_percent().min(100)
    }

    pub fn tier(&self) -> Option<CompetitionTier> {
        self.competition_rate().map(CompetitionTier::for_rate)
    }
}

/// `applicants / capacity`, absent when there is no capacity to divide by.
pub fn competition_rate(applicants: u32, capacity: u32) -> Option<f64> {
    if capacity == 0 {
        None
    } else {
        Some(f64::from(applicants) / f64::from(capacity))
    }
}

/// Display band for a competition rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionTier {
    Normal,
    Elevated,
    High,
    Extreme,
}

impl CompetitionTier {
    pub fn for_rate(rate: f64) -> Self {
        if rate >= 50.0 {
            Self::Extreme
        } else if rate >= 20.0 {
            Self::High
        } else if rate >= 10.0 {
            Self::Elevated
        } else {
            Self::Normal
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Elevated => "Elevated",
            Self::High => "High",
            Self::Extreme => "Extreme",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_has_no_rate() {
        let record = AdmissionRecord::general(Category::Engineering, "A", "general", 0, 12);
        assert_eq!(record.competition_rate(), None);
        assert_eq!(record.rate_or_zero(), 0.0);
        assert_eq!(record.fill_percent(), 0);
        assert!(record.tier().is_none());

        let reported = record.with_reported_rate(f64::INFINITY);
        assert_eq!(reported.competition_rate(), None);
    }

    #[test]
    fn reported_rate_overrides_computed_value() {
        let record = AdmissionRecord::general(Category::Other, "A", "general", 10, 25)
            .with_reported_rate(2.4);
        assert_eq!(record.competition_rate(), Some(2.4));

        let rejected = AdmissionRecord::general(Category::Other, "A", "general", 10, 25)
            .with_reported_rate(f64::NAN);
        assert_eq!(rejected.competition_rate(), Some(2.5));
    }

    #[test]
    fn special_records_sum_subcategories() {
        let record = AdmissionRecord::special(Category::Other, "Nursing", "special", 3, 4, 5);
        assert!(record.is_special());
        assert_eq!(record.total_applicants(), 12);
        assert_eq!(record.capacity(), 0);
        assert_eq!(record.competition_rate(), None);
    }

    #[test]
    fn fill_percent_rounds_and_progress_caps() {
        let record = AdmissionRecord::general(Category::Engineering, "A", "general", 3, 10);
        assert_eq!(record.fill_percent(), 333);
        assert_eq!(record.progress_percent(), 100);
    }

    #[test]
    fn tiers_follow_rate_thresholds() {
        assert_eq!(CompetitionTier::for_rate(50.0), CompetitionTier::Extreme);
        assert_eq!(CompetitionTier::for_rate(49.9), CompetitionTier::High);
        assert_eq!(CompetitionTier::for_rate(20.0), CompetitionTier::High);
        assert_eq!(CompetitionTier::for_rate(10.0), CompetitionTier::Elevated);
        assert_eq!(CompetitionTier::for_rate(9.99), CompetitionTier::Normal);
    }

    #[test]
    fn category_labels_accept_source_spellings() {
        assert_eq!(Category::from_label("공학계열"), Category::Engineering);
        assert_eq!(Category::from_label("예체능"), Category::ArtsSports);
        assert_eq!(Category::from_label("인문사회 계열"), Category::HumanitiesSocial);
        assert_eq!(Category::from_label("mystery"), Category::Other);
        assert_eq!("arts-sports".parse::<Category>(), Ok(Category::ArtsSports));
        assert!("mystery".parse::<Category>().is_err());
    }
}
