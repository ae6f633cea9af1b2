mod common;

use common::{csv_table, store_table};
use storeviz::chart_data::{prepare_heatmap, prepare_line_chart, prepare_pie_chart};
use storeviz::classify::{all_columns, classify};
use storeviz::config::ChartConfig;
use storeviz::selection::{ChartKind, ChartSelection, SelectorId};
use storeviz::statistics::{describe, SummaryStatistics};
use storeviz::{Dashboard, Table};
use polars::prelude::*;

fn selection_for(table: &Table) -> ChartSelection {
    let mut selection = ChartSelection::default();
    selection.rebuild(&classify(table), &all_columns(table));
    selection
}

#[test]
fn test_classification_is_a_partition_in_table_order() {
    let table = store_table();
    let classification = classify(&table);
    assert_eq!(classification.numeric, vec!["sales", "units"]);
    assert_eq!(classification.categorical, vec!["date", "region", "product"]);
    for name in &classification.numeric {
        assert!(!classification.is_categorical(name));
    }
}

#[test]
fn test_summary_of_one_to_four() {
    let table = csv_table("v\n1\n2\n3\n4\n");
    let stats = describe(&table, &classify(&table)).unwrap();
    let SummaryStatistics::Numeric(columns) = stats else {
        panic!("expected numeric summary");
    };
    let v = &columns[0];
    assert_eq!(v.count, 4);
    assert!((v.mean - 2.5).abs() < 1e-12);
    assert!((v.std - 1.2909944487).abs() < 1e-9);
    assert_eq!((v.min, v.q25, v.median, v.q75, v.max), (1.0, 1.75, 2.5, 3.25, 4.0));
}

#[test]
fn test_summary_of_empty_numeric_column_is_nan() {
    let table = Table::new(df!("v" => [None::<f64>, None], "w" => [1.0, 2.0]).unwrap());
    let stats = describe(&table, &classify(&table)).unwrap();
    let SummaryStatistics::Numeric(columns) = stats else {
        panic!("expected numeric summary");
    };
    assert_eq!(columns[0].name, "v");
    assert_eq!(columns[0].count, 0);
    assert!(columns[0].mean.is_nan());
    assert!(columns[0].max.is_nan());
    assert_eq!(columns[1].count, 2);
}

#[test]
fn test_pie_counts_in_descending_order() {
    let table = csv_table("c\nb\na\na\n");
    let pie = prepare_pie_chart(&table, "c").unwrap();
    assert_eq!(pie.slices, vec![("a".to_string(), 2), ("b".to_string(), 1)]);
    assert_eq!(pie.title, "Distribution of c");
    assert!((pie.fraction(0) - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn test_line_sorts_by_x_and_is_idempotent() {
    let table = csv_table("x,y\n3,30\n1,10\n2,20\n");
    let line = prepare_line_chart(&table, "x", "y", None).unwrap();
    assert_eq!(line.points, vec![(1.0, 10.0), (2.0, 20.0), (3.0, 30.0)]);
    assert_eq!(line.title, "y over x");

    let sorted = csv_table("x,y\n1,10\n2,20\n3,30\n");
    let again = prepare_line_chart(&sorted, "x", "y", None).unwrap();
    assert_eq!(again.points, line.points);
}

#[test]
fn test_heatmap_of_identical_columns() {
    let table = csv_table("a,b\n1,1\n2,2\n3,3\n");
    let heatmap = prepare_heatmap(&table, &classify(&table).numeric)
        .unwrap()
        .unwrap();
    assert_eq!(heatmap.annotation(0, 1), "1.00");
    assert_eq!(heatmap.annotation(1, 0), "1.00");
}

#[test]
fn test_heatmap_needs_two_numeric_columns() {
    let table = csv_table("a,label\n1,x\n2,y\n");
    assert!(prepare_heatmap(&table, &classify(&table).numeric)
        .unwrap()
        .is_none());
}

#[test]
fn test_dashboard_rebuild_is_deterministic() {
    let table = store_table();
    let selection = selection_for(&table);
    let config = ChartConfig::default();
    let first = Dashboard::build(&table, &selection, &config).unwrap();
    let second = Dashboard::build(&table, &selection, &config).unwrap();
    assert_eq!(first, second);

    let bar = first.bar.as_ref().unwrap();
    assert_eq!(bar.title, "sales by date");
    assert!(first.pie.is_some());
    assert!(first.line.is_some());
    assert_eq!(first.heatmap.as_ref().unwrap().matrix.len(), 2);
}

#[test]
fn test_selector_change_changes_only_its_chart() {
    let table = store_table();
    let mut selection = selection_for(&table);
    let config = ChartConfig::default();
    let before = Dashboard::build(&table, &selection, &config).unwrap();

    selection.focus_chart(ChartKind::Bar);
    assert_eq!(selection.focused(), SelectorId::BarX);
    assert!(selection.cycle(true));
    let after = Dashboard::build(&table, &selection, &config).unwrap();

    assert_eq!(after.bar.as_ref().unwrap().title, "sales by region");
    assert_eq!(after.pie, before.pie);
    assert_eq!(after.line, before.line);
    assert_eq!(after.summary, before.summary);
}

#[test]
fn test_table_without_categorical_columns_skips_bar_and_pie() {
    let table = csv_table("a,b\n1,2\n3,4\n");
    let dashboard = Dashboard::build(&table, &selection_for(&table), &ChartConfig::default()).unwrap();
    assert!(dashboard.bar.is_none());
    assert!(dashboard.pie.is_none());
    assert!(dashboard.line.is_some());
}

#[test]
fn test_large_upload_charts_every_row() {
    let mut csv = String::from("region,sales\n");
    for i in 0..12_000 {
        csv.push_str(&format!("r{},{}\n", i % 4, i));
    }
    let table = csv_table(&csv);
    let dashboard = Dashboard::build(&table, &selection_for(&table), &ChartConfig::default()).unwrap();

    let bar = dashboard.bar.as_ref().unwrap();
    assert_eq!(bar.groups.iter().map(|g| g.values.len()).sum::<usize>(), 12_000);
    // the line x selector starts on region
    let line = dashboard.line.as_ref().unwrap();
    assert_eq!(line.points.len(), 12_000);
}
