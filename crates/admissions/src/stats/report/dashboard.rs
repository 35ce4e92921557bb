use super::super::aggregate::{aggregate, category_totals, group_by_track, rank_top, SortKey};
use super::super::domain::AdmissionRecord;
use super::super::reconcile::reconcile;
use super::insights::generate_insights;
use super::state::ViewState;
use super::views::{
    ComparisonRowView, ComparisonView, DashboardView, RecordView, TrackGroupView,
};

/// The raw collections a dashboard is derived from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Datasets {
    pub current: Vec<AdmissionRecord>,
    pub prior: Option<Vec<AdmissionRecord>>,
}

impl Datasets {
    pub fn current_only(current: Vec<AdmissionRecord>) -> Self {
        Self {
            current,
            prior: None,
        }
    }

    pub fn with_prior(current: Vec<AdmissionRecord>, prior: Vec<AdmissionRecord>) -> Self {
        Self {
            current,
            prior: Some(prior),
        }
    }

    /// Derives every dashboard view for the given state.
    pub fn dashboard(&self, state: &ViewState) -> DashboardView {
        derive_dashboard(self, state)
    }
}

/// Recomputes every view from the datasets and the current view state.
/// Filters apply to all sections; the tab only selects what callers show.
pub fn derive_dashboard(datasets: &Datasets, state: &ViewState) -> DashboardView {
    let visible: Vec<AdmissionRecord> = datasets
        .current
        .iter()
        .filter(|record| state.matches(record))
        .cloned()
        .collect();

    let tracks = group_by_track(&visible)
        .into_iter()
        .map(|mut group| {
            group
                .records
                .sort_by(|left, right| state.sort.compare(left, right));
            TrackGroupView {
                department_count: group.records.len(),
                records: group.records.iter().map(RecordView::from).collect(),
                track_name: group.track_name,
            }
        })
        .collect();

    let top = rank_top(&visible, state.top, SortKey::CompetitionRate)
        .iter()
        .map(RecordView::from)
        .collect();

    let comparison = datasets.prior.as_deref().map(|prior| {
        let rows = reconcile(&visible, prior);
        let matched = rows.iter().filter(|row| row.is_matched()).count();
        ComparisonView {
            matched,
            unmatched: rows.len() - matched,
            insights: generate_insights(&rows),
            rows: rows.iter().map(ComparisonRowView::from).collect(),
        }
    });

    DashboardView {
        tab: state.tab,
        state: state.clone(),
        summary: aggregate(&visible),
        top,
        category_totals: category_totals(&visible),
        tracks,
        comparison,
    }
}
