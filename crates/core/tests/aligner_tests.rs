// ═══════════════════════════════════════════════════════════════════
// Time-Series Aligner Tests — common axis, gap markers, empty state
// ═══════════════════════════════════════════════════════════════════

use chrono::{DateTime, TimeZone, Utc};

use dashboard_core::models::chart::ChartSeriesPoint;
use dashboard_core::services::aligner::{align, AlignedChart, NamedSeries};

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, hour, minute, 0).unwrap()
}

fn series(name: &str, points: &[(DateTime<Utc>, f64)]) -> NamedSeries {
    NamedSeries {
        name: name.to_string(),
        points: points
            .iter()
            .map(|(timestamp, value)| ChartSeriesPoint {
                timestamp: *timestamp,
                value: *value,
            })
            .collect(),
    }
}

#[test]
fn axis_is_union_of_distinct_instants_strictly_increasing() {
    let input = vec![
        series("alpha", &[(at(10, 0), 100.0), (at(12, 0), 110.0)]),
        series("beta", &[(at(11, 0), 50.0), (at(12, 0), 55.0)]),
    ];

    let AlignedChart::Data { axis, series } = align(&input) else {
        panic!("two non-empty series must produce data");
    };

    // 3 distinct instants across both inputs (12:00 shared).
    assert_eq!(axis.len(), 3);
    assert!(axis.windows(2).all(|w| w[0] < w[1]));

    assert_eq!(series.len(), 2);
    assert_eq!(series[0].values, vec![Some(100.0), None, Some(110.0)]);
    assert_eq!(series[1].values, vec![None, Some(50.0), Some(55.0)]);
}

#[test]
fn gaps_are_explicit_none_never_zero() {
    let input = vec![
        series("alpha", &[(at(10, 0), 100.0)]),
        series("beta", &[(at(11, 0), 50.0)]),
    ];

    let AlignedChart::Data { series, .. } = align(&input) else {
        panic!("expected data");
    };

    // No fabricated zeros anywhere: a gap is None, full stop.
    for s in &series {
        assert!(s.values.iter().all(|v| *v != Some(0.0)));
        assert_eq!(s.values.iter().filter(|v| v.is_none()).count(), 1);
    }
}

#[test]
fn all_empty_series_yield_dedicated_empty_state() {
    let input = vec![series("alpha", &[]), series("beta", &[])];
    assert_eq!(align(&input), AlignedChart::Empty);
    assert_eq!(align(&[]), AlignedChart::Empty);
}

#[test]
fn zero_valued_series_is_data_not_empty() {
    // A series that genuinely sits at zero must render as a flat line,
    // not the empty-state visualization.
    let input = vec![series("alpha", &[(at(10, 0), 0.0), (at(11, 0), 0.0)])];
    let chart = align(&input);
    assert!(!chart.is_empty());
    let AlignedChart::Data { series, .. } = chart else {
        unreachable!();
    };
    assert_eq!(series[0].values, vec![Some(0.0), Some(0.0)]);
}

#[test]
fn one_empty_series_among_full_ones_is_all_gaps() {
    let input = vec![
        series("alpha", &[(at(10, 0), 100.0)]),
        series("ghost", &[]),
    ];
    let AlignedChart::Data { axis, series } = align(&input) else {
        panic!("expected data");
    };
    assert_eq!(axis.len(), 1);
    assert_eq!(series[1].values, vec![None]);
}

#[test]
fn duplicate_instants_within_one_series_keep_last_value() {
    let input = vec![series(
        "alpha",
        &[(at(10, 0), 100.0), (at(10, 0), 105.0), (at(11, 0), 110.0)],
    )];
    let AlignedChart::Data { axis, series } = align(&input) else {
        panic!("expected data");
    };
    // Duplicates collapse: the axis holds distinct instants only.
    assert_eq!(axis.len(), 2);
    assert_eq!(series[0].values, vec![Some(105.0), Some(110.0)]);
}

#[test]
fn out_of_order_input_still_produces_sorted_axis() {
    let input = vec![series(
        "alpha",
        &[(at(12, 0), 3.0), (at(10, 0), 1.0), (at(11, 0), 2.0)],
    )];
    let AlignedChart::Data { axis, series } = align(&input) else {
        panic!("expected data");
    };
    assert_eq!(axis, vec![at(10, 0), at(11, 0), at(12, 0)]);
    assert_eq!(series[0].values, vec![Some(1.0), Some(2.0), Some(3.0)]);
}
