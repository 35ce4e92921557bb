use super::domain::AdmissionRecord;
use super::normalizer::tracks_correspond;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use tracing::debug;

/// Relative change between two periods, in percent.
///
/// A change from nothing to something has no finite percentage and is
/// reported as [`PercentChange::Unbounded`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PercentChange {
    Finite(f64),
    Unbounded,
}

impl PercentChange {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Finite(value) => value,
            Self::Unbounded => f64::INFINITY,
        }
    }

    pub fn is_unbounded(self) -> bool {
        matches!(self, Self::Unbounded)
    }

    pub fn finite(self) -> Option<f64> {
        match self {
            Self::Finite(value) => Some(value),
            Self::Unbounded => None,
        }
    }
}

impl Serialize for PercentChange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Finite(value) => serializer.serialize_f64(*value),
            Self::Unbounded => serializer.serialize_str("unbounded"),
        }
    }
}

pub fn percent_change(current: f64, prior: Option<f64>) -> PercentChange {
    match prior {
        Some(prior) if prior != 0.0 => PercentChange::Finite((current - prior) / prior * 100.0),
        _ if current > 0.0 => PercentChange::Unbounded,
        _ => PercentChange::Finite(0.0),
    }
}

/// Year-over-year change of the compared figures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Delta {
    pub applicants: PercentChange,
    pub capacity: PercentChange,
    pub competition_rate: PercentChange,
}

impl Delta {
    pub fn between(current: &AdmissionRecord, prior: &AdmissionRecord) -> Self {
        Self {
            applicants: percent_change(
                f64::from(current.applicants),
                Some(f64::from(prior.applicants)),
            ),
            capacity: percent_change(
                f64::from(current.capacity()),
                Some(f64::from(prior.capacity())),
            ),
            competition_rate: percent_change(current.rate_or_zero(), prior.competition_rate()),
        }
    }
}

/// A current-period record joined to its prior-period counterpart, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledRecord {
    pub current: AdmissionRecord,
    pub prior: Option<AdmissionRecord>,
    pub delta: Option<Delta>,
}

impl ReconciledRecord {
    fn new(current: &AdmissionRecord, prior: Option<&AdmissionRecord>) -> Self {
        Self {
            current: current.clone(),
            prior: prior.cloned(),
            delta: prior.map(|prior| Delta::between(current, prior)),
        }
    }

    pub fn is_matched(&self) -> bool {
        self.prior.is_some()
    }
}

fn is_counterpart(current: &AdmissionRecord, candidate: &AdmissionRecord) -> bool {
    !candidate.is_special()
        && candidate.department == current.department
        && tracks_correspond(&current.track_name, &candidate.track_name)
}

/// Finds the prior-period record for `current`: same department, corresponding
/// track, first in prior order. Special-track records never match.
pub fn match_prior<'a>(
    current: &AdmissionRecord,
    prior: &'a [AdmissionRecord],
) -> Option<&'a AdmissionRecord> {
    if current.is_special() {
        return None;
    }
    prior
        .iter()
        .find(|candidate| is_counterpart(current, candidate))
}

/// Prior-period records bucketed by department, keeping prior order inside
/// each bucket.
pub struct PriorIndex<'a> {
    by_department: HashMap<&'a str, Vec<&'a AdmissionRecord>>,
}

impl<'a> PriorIndex<'a> {
    pub fn new(prior: &'a [AdmissionRecord]) -> Self {
        let mut by_department: HashMap<&'a str, Vec<&'a AdmissionRecord>> = HashMap::new();
        for record in prior.iter().filter(|record| !record.is_special()) {
            by_department
                .entry(record.department.as_str())
                .or_default()
                .push(record);
        }
        Self { by_department }
    }

    pub fn find(&self, current: &AdmissionRecord) -> Option<&'a AdmissionRecord> {
        if current.is_special() {
            return None;
        }
        self.by_department
            .get(current.department.as_str())?
            .iter()
            .copied()
            .find(|candidate| is_counterpart(current, candidate))
    }
}

/// Joins every current record to its prior counterpart, preserving current order.
pub fn reconcile(current: &[AdmissionRecord], prior: &[AdmissionRecord]) -> Vec<ReconciledRecord> {
    let index = PriorIndex::new(prior);
    let reconciled: Vec<ReconciledRecord> = current
        .iter()
        .map(|record| ReconciledRecord::new(record, index.find(record)))
        .collect();

    debug!(
        current = current.len(),
        prior = prior.len(),
        matched = reconciled.iter().filter(|row| row.is_matched()).count(),
        "reconciled admission periods"
    );

    reconciled
}
