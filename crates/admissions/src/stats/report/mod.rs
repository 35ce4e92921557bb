mod dashboard;
mod insights;
pub mod state;
pub mod views;

pub use dashboard::{derive_dashboard, Datasets};
pub use state::{SortDirection, SortOrder, Tab, ViewState, DEFAULT_TOP_N};
