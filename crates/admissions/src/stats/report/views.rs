use super::super::aggregate::{CategoryTotal, Summary};
use super::super::domain::{AdmissionRecord, Category, CompetitionTier, TrackKind};
use super::super::reconcile::{Delta, ReconciledRecord};
use super::state::{Tab, ViewState};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordView {
    pub category: Category,
    pub category_label: &'static str,
    pub department: String,
    pub track_name: String,
    pub special: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    pub applicants: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory_a: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory_b: Option<u32>,
    pub total_applicants: u64,
    pub competition_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<CompetitionTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier_label: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_percent: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_percent: Option<u32>,
}

impl From<&AdmissionRecord> for RecordView {
    fn from(record: &AdmissionRecord) -> Self {
        let (capacity, subcategory_a, subcategory_b) = match record.kind {
            TrackKind::General { capacity, .. } => (Some(capacity), None, None),
            TrackKind::Special {
                subcategory_a,
                subcategory_b,
            } => (None, Some(subcategory_a), Some(subcategory_b)),
        };
        let tier = record.tier();
        let general = !record.is_special();

        Self {
            category: record.category,
            category_label: record.category.label(),
            department: record.department.clone(),
            track_name: record.track_name.clone(),
            special: record.is_special(),
            capacity,
            applicants: record.applicants,
            subcategory_a,
            subcategory_b,
            total_applicants: record.total_applicants(),
            competition_rate: record.competition_rate(),
            tier,
            tier_label: tier.map(CompetitionTier::label),
            fill_percent: general.then(|| record.fill_percent()),
            progress_percent: general.then(|| record.progress_percent()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackGroupView {
    pub track_name: String,
    pub department_count: usize,
    pub records: Vec<RecordView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRowView {
    pub current: RecordView,
    pub prior: Option<RecordView>,
    pub delta: Option<Delta>,
}

impl From<&ReconciledRecord> for ComparisonRowView {
    fn from(row: &ReconciledRecord) -> Self {
        Self {
            current: RecordView::from(&row.current),
            prior: row.prior.as_ref().map(RecordView::from),
            delta: row.delta,
        }
    }
}

/// A notable year-over-year applicant movement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicantShift {
    pub department: String,
    pub track_name: String,
    pub current_applicants: u32,
    pub prior_applicants: u32,
    pub change_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparisonInsights {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub largest_increase: Option<ApplicantShift>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub largest_decrease: Option<ApplicantShift>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub new_demand: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonView {
    pub matched: usize,
    pub unmatched: usize,
    pub rows: Vec<ComparisonRowView>,
    pub insights: ComparisonInsights,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub tab: Tab,
    pub state: ViewState,
    pub summary: Summary,
    pub top: Vec<RecordView>,
    pub category_totals: Vec<CategoryTotal>,
    pub tracks: Vec<TrackGroupView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonView>,
}
