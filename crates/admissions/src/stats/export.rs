use super::reconcile::{PercentChange, ReconciledRecord};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct ComparisonRow<'a> {
    track_name: &'a str,
    category: &'static str,
    department: &'a str,
    capacity: u32,
    applicants: u64,
    competition_rate: Option<f64>,
    prior_capacity: Option<u32>,
    prior_applicants: Option<u64>,
    prior_competition_rate: Option<f64>,
    applicants_change_pct: Option<PercentChange>,
    capacity_change_pct: Option<PercentChange>,
    competition_rate_change_pct: Option<PercentChange>,
}

impl<'a> From<&'a ReconciledRecord> for ComparisonRow<'a> {
    fn from(row: &'a ReconciledRecord) -> Self {
        let current = &row.current;
        let prior = row.prior.as_ref();
        Self {
            track_name: &current.track_name,
            category: current.category.slug(),
            department: &current.department,
            capacity: current.capacity(),
            applicants: current.total_applicants(),
            competition_rate: current.competition_rate(),
            prior_capacity: prior.map(|prior| prior.capacity()),
            prior_applicants: prior.map(|prior| prior.total_applicants()),
            prior_competition_rate: prior.and_then(|prior| prior.competition_rate()),
            applicants_change_pct: row.delta.map(|delta| delta.applicants),
            capacity_change_pct: row.delta.map(|delta| delta.capacity),
            competition_rate_change_pct: row.delta.map(|delta| delta.competition_rate),
        }
    }
}

/// Writes reconciled rows as CSV with a header line. Missing prior values
/// are empty cells; unbounded changes are written as `unbounded`.
pub fn write_comparison_csv<W: Write>(
    rows: &[ReconciledRecord],
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(ComparisonRow::from(row))?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::domain::{AdmissionRecord, Category};
    use crate::stats::reconcile::reconcile;

    #[test]
    fn writes_matched_and_unmatched_rows() {
        let current = vec![
            AdmissionRecord::general(Category::Engineering, "A", "general", 10, 25),
            AdmissionRecord::general(Category::Engineering, "B", "general", 5, 5),
        ];
        let prior = vec![
            AdmissionRecord::general(Category::Engineering, "A", "general-high-school", 8, 20),
        ];

        let mut buffer = Vec::new();
        write_comparison_csv(&reconcile(&current, &prior), &mut buffer).expect("csv written");
        let output = String::from_utf8(buffer).expect("utf8");
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("track_name,category,department,capacity"));
        assert_eq!(lines[1], "general,engineering,A,10,25,2.5,8,20,2.5,25.0,25.0,0.0");
        assert_eq!(lines[2], "general,engineering,B,5,5,1.0,,,,,,");
    }
}
