mod support;

use pnlchart::calendar::Calendar;
use pnlchart::models::PeriodSelector;
use pnlchart::series::ReconcileStrategy;
use rust_decimal::Decimal;
use support::{builder_at, dec, now, record, utc, utc_builder};

fn display(run: &pnlchart::series::SeriesRun) -> Vec<Option<Decimal>> {
    run.points.iter().map(|p| p.display_value).collect()
}

#[test]
fn last_three_days_matching_total_is_left_alone() {
    let records = vec![
        record(utc(2026, 10, 17, 9, 0), "100", "0"),
        record(utc(2026, 10, 18, 15, 30), "-40", "0"),
    ];
    let run = utc_builder().build(&records, Some(dec("60")), &PeriodSelector::LastDays { days: 3 });

    assert_eq!(display(&run), vec![Some(dec("100.00")), Some(dec("-40.00")), Some(dec("0.00"))]);
    assert_eq!(run.report.applied, None);
    assert_eq!(run.points[0].label, "2026-10-17");
}

#[test]
fn last_three_days_scales_to_total() {
    let records = vec![
        record(utc(2026, 10, 17, 9, 0), "100", "0"),
        record(utc(2026, 10, 18, 15, 30), "-40", "0"),
    ];
    let run = utc_builder().build(&records, Some(dec("120")), &PeriodSelector::LastDays { days: 3 });

    assert_eq!(display(&run), vec![Some(dec("200.00")), Some(dec("-80.00")), Some(dec("0.00"))]);
    assert_eq!(run.report.applied, Some(ReconcileStrategy::Scale));
    assert_eq!(run.report.raw_total, dec("60"));
}

#[test]
fn today_scales_then_accumulates_and_ends_on_total() {
    let records = vec![
        record(utc(2026, 10, 19, 9, 15), "30", "0"),
        record(utc(2026, 10, 19, 14, 45), "-10", "0"),
    ];
    let run = utc_builder().build(&records, Some(dec("25")), &PeriodSelector::Today);
    let values = display(&run);

    assert_eq!(values.len(), 24);
    assert!(values[..9].iter().all(|v| *v == Some(Decimal::ZERO)));
    assert!(values[9..14].iter().all(|v| *v == Some(dec("37.50"))));
    assert!(values[14..].iter().all(|v| *v == Some(dec("25.00"))));
    assert_eq!(run.points[23].raw_precise, Some(dec("25")));
}

#[test]
fn zero_raw_total_redistributes_by_notional() {
    // Net-zero day with a non-zero server total: weights decide the shape.
    let records = vec![
        record(utc(2026, 10, 17, 9, 0), "5", "750"),
        record(utc(2026, 10, 17, 10, 0), "-5", "750"),
        record(utc(2026, 10, 19, 11, 0), "0", "500"),
    ];
    let run = utc_builder().build(&records, Some(dec("20")), &PeriodSelector::LastDays { days: 3 });

    assert_eq!(run.report.applied, Some(ReconcileStrategy::WeightProportional));
    assert_eq!(display(&run), vec![Some(dec("15.00")), Some(dec("0.00")), Some(dec("5.00"))]);
}

#[test]
fn nothing_in_range_spreads_evenly() {
    let records = vec![record(utc(2026, 9, 1, 9, 0), "500", "500")];
    let run = utc_builder().build(&records, Some(dec("10")), &PeriodSelector::LastDays { days: 4 });

    assert_eq!(run.report.applied, Some(ReconcileStrategy::EqualSpread));
    assert_eq!(run.report.records_out_of_range, 1);
    assert_eq!(display(&run), vec![Some(dec("2.50")); 4]);
}

#[test]
fn missing_total_keeps_raw_values() {
    let records = vec![record(utc(2026, 10, 19, 9, 0), "12.345", "0")];
    let run = utc_builder().build(&records, None, &PeriodSelector::Today);

    assert_eq!(run.report.applied, None);
    assert_eq!(run.points[23].display_value, Some(dec("12.35")));
    assert_eq!(run.points[23].raw_precise, Some(dec("12.345")));
}

#[test]
fn monthly_buckets_follow_the_calendar() {
    let ny = Calendar::parse("America/New_York").expect("zone");
    // 02:30Z on Oct 1 is still Sep 30 in New York.
    let records = vec![
        record(utc(2026, 10, 1, 2, 30), "7", "0"),
        record(utc(2026, 9, 15, 16, 0), "3", "0"),
    ];
    let run = builder_at(now(), ny).build(
        &records,
        Some(dec("10")),
        &PeriodSelector::Monthly { year: 2026, month: 9 },
    );

    assert_eq!(run.points.len(), 30);
    assert_eq!(run.points[14].display_value, Some(dec("3.00")));
    assert_eq!(run.points[29].display_value, Some(dec("7.00")));
    assert_eq!(run.report.records_out_of_range, 0);
}
