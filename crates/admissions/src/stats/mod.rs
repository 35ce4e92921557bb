//! Admissions competition statistics: ingest, year-over-year reconciliation,
//! aggregation, and dashboard derivation.

pub mod aggregate;
pub mod domain;
pub mod export;
mod ingest;
mod normalizer;
pub mod reconcile;
pub mod report;
pub mod source;

pub use aggregate::{
    aggregate, category_totals, group_by_track, rank_top, CategoryTotal, MaxRateEntry, SortKey,
    Summary, TrackGroup,
};
pub use domain::{competition_rate, AdmissionRecord, Category, CompetitionTier, TrackKind};
pub use reconcile::{match_prior, percent_change, reconcile, Delta, PercentChange, ReconciledRecord};
pub use report::{derive_dashboard, Datasets, SortDirection, SortOrder, Tab, ViewState};
pub use source::{DatasetSource, FetchError, Period, StatsClient};
