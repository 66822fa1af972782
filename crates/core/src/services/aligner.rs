use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};

use crate::models::chart::ChartSeriesPoint;

/// One named value-history series before alignment. Timestamps carry no
/// guarantee of being shared with any other series.
#[derive(Debug, Clone)]
pub struct NamedSeries {
    pub name: String,
    pub points: Vec<ChartSeriesPoint>,
}

/// A series re-sampled onto the common axis. `None` marks "no data at this
/// instant" — rendering connects across it rather than dropping to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Result of aligning N series onto one chronological axis.
///
/// `Empty` is deliberately distinct from a chart whose series are all-`None`
/// or all-zero: it tells the caller to render the dedicated empty state
/// instead of a misleading flat line.
#[derive(Debug, Clone, PartialEq)]
pub enum AlignedChart {
    Empty,
    Data {
        /// Strictly increasing instants; one entry per distinct timestamp
        /// across all inputs.
        axis: Vec<DateTime<Utc>>,
        series: Vec<AlignedSeries>,
    },
}

impl AlignedChart {
    pub fn is_empty(&self) -> bool {
        matches!(self, AlignedChart::Empty)
    }
}

/// Merge independently-timestamped series onto one sorted common axis.
///
/// The axis is the union of all input timestamps, ordered chronologically
/// (instants, not strings). Each series contributes its own value where it
/// has one and `None` elsewhere. Duplicate timestamps within a single
/// series keep the last value seen.
pub fn align(input: &[NamedSeries]) -> AlignedChart {
    let mut axis: BTreeSet<DateTime<Utc>> = BTreeSet::new();
    for series in input {
        for point in &series.points {
            axis.insert(point.timestamp);
        }
    }

    if axis.is_empty() {
        return AlignedChart::Empty;
    }

    let axis: Vec<DateTime<Utc>> = axis.into_iter().collect();

    let series = input
        .iter()
        .map(|s| {
            let by_instant: HashMap<DateTime<Utc>, f64> = s
                .points
                .iter()
                .map(|p| (p.timestamp, p.value))
                .collect();
            AlignedSeries {
                name: s.name.clone(),
                values: axis.iter().map(|t| by_instant.get(t).copied()).collect(),
            }
        })
        .collect();

    AlignedChart::Data { axis, series }
}
