use super::super::reconcile::ReconciledRecord;
use super::views::{ApplicantShift, ComparisonInsights};

pub(crate) fn generate_insights(rows: &[ReconciledRecord]) -> ComparisonInsights {
    let mut largest_increase: Option<(f64, &ReconciledRecord)> = None;
    let mut largest_decrease: Option<(f64, &ReconciledRecord)> = None;
    let mut new_demand = Vec::new();

    for row in rows {
        let Some(delta) = row.delta else {
            continue;
        };

        match delta.applicants.finite() {
            Some(change) if change > 0.0 => {
                if largest_increase.map_or(true, |(best, _)| change > best) {
                    largest_increase = Some((change, row));
                }
            }
            Some(change) if change < 0.0 => {
                if largest_decrease.map_or(true, |(best, _)| change < best) {
                    largest_decrease = Some((change, row));
                }
            }
            Some(_) => {}
            None => new_demand.push(format!(
                "{} ({})",
                row.current.department, row.current.track_name
            )),
        }
    }

    ComparisonInsights {
        largest_increase: largest_increase.map(shift),
        largest_decrease: largest_decrease.map(shift),
        new_demand,
    }
}

fn shift((change_pct, row): (f64, &ReconciledRecord)) -> ApplicantShift {
    ApplicantShift {
        department: row.current.department.clone(),
        track_name: row.current.track_name.clone(),
        current_applicants: row.current.applicants,
        prior_applicants: row
            .prior
            .as_ref()
            .map(|prior| prior.applicants)
            .unwrap_or(0),
        change_pct,
    }
}
