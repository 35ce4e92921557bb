use super::super::aggregate::SortKey;
use super::super::domain::{AdmissionRecord, Category};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            _ => Err(format!("unknown sort direction '{value}' (expected asc or desc)")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn compare(self, left: &AdmissionRecord, right: &AdmissionRecord) -> Ordering {
        let ordering = self.key.compare(left, right);
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Dashboard section the caller is looking at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Overview,
    Tracks,
    Comparison,
}

impl Tab {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Tracks => "Tracks",
            Self::Comparison => "Comparison",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "overview" => Ok(Self::Overview),
            "tracks" => Ok(Self::Tracks),
            "comparison" | "compare" => Ok(Self::Comparison),
            _ => Err(format!(
                "unknown tab '{value}' (expected overview, tracks, or comparison)"
            )),
        }
    }
}

/// User-controlled inputs of the dashboard. Every change produces a new
/// value; views are derived from it from scratch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    pub search: String,
    pub category: Option<Category>,
    pub sort: SortOrder,
    pub tab: Tab,
    pub top: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: None,
            sort: SortOrder::default(),
            tab: Tab::default(),
            top: DEFAULT_TOP_N,
        }
    }
}

impl ViewState {
    pub fn with_search(self, search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..self
        }
    }

    pub fn with_category(self, category: Option<Category>) -> Self {
        Self { category, ..self }
    }

    /// Selecting the active key flips the direction; a new key starts descending.
    pub fn with_sort_toggled(self, key: SortKey) -> Self {
        let sort = if self.sort.key == key {
            SortOrder {
                key,
                direction: self.sort.direction.toggled(),
            }
        } else {
            SortOrder {
                key,
                direction: SortDirection::Descending,
            }
        };
        Self { sort, ..self }
    }

    pub fn with_sort(self, sort: SortOrder) -> Self {
        Self { sort, ..self }
    }

    pub fn with_tab(self, tab: Tab) -> Self {
        Self { tab, ..self }
    }

    pub fn with_top(self, top: usize) -> Self {
        Self { top, ..self }
    }

    /// Case-insensitive search over department and track, plus the category filter.
    pub fn matches(&self, record: &AdmissionRecord) -> bool {
        if let Some(category) = self.category {
            if record.category != category {
                return false;
            }
        }

        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || record.department.to_lowercase().contains(&needle)
            || record.track_name.to_lowercase().contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_the_active_key_flips_direction() {
        let state = ViewState::default();
        assert_eq!(state.sort.direction, SortDirection::Descending);

        let state = state.with_sort_toggled(SortKey::CompetitionRate);
        assert_eq!(state.sort.direction, SortDirection::Ascending);

        let state = state.with_sort_toggled(SortKey::Applicants);
        assert_eq!(state.sort.key, SortKey::Applicants);
        assert_eq!(state.sort.direction, SortDirection::Descending);
    }

    #[test]
    fn matches_search_and_category() {
        let record = AdmissionRecord::general(Category::Engineering, "Computer Science", "general", 1, 1);

        assert!(ViewState::default().matches(&record));
        assert!(ViewState::default().with_search("computer").matches(&record));
        assert!(ViewState::default().with_search("GENERAL").matches(&record));
        assert!(!ViewState::default().with_search("nursing").matches(&record));
        assert!(!ViewState::default()
            .with_category(Some(Category::ArtsSports))
            .matches(&record));
    }

    #[test]
    fn deserializes_partial_state() {
        let state: ViewState =
            serde_json::from_str(r#"{"search": "a", "sort": {"key": "applicants", "direction": "ascending"}}"#)
                .expect("state parses");
        assert_eq!(state.search, "a");
        assert_eq!(state.sort.key, SortKey::Applicants);
        assert_eq!(state.top, DEFAULT_TOP_N);
        assert_eq!(state.tab, Tab::Overview);
    }
}
