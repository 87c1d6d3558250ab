// Pipeline tests
// Author: Gabriel Demetrios Lafis

use report_engine::{
    data::{DataSet, Row, Value},
    processing::{
        AggregateMethod, Aggregator, DateTimeFormatter, MathOperation, OrderBy, Pipeline,
        ProcessingError, SortOrder, StringFormatter, Transformer, TransformerConfig,
        TransformerKind,
    },
    report::{Column, Report},
    storage::FileFormat,
};

fn text_rows(columns: &[&str], records: &[&[&str]]) -> DataSet {
    let rows = records
        .iter()
        .map(|record| {
            Row::from_pairs(
                columns
                    .iter()
                    .zip(record.iter())
                    .map(|(c, v)| (c.to_string(), Value::text(*v))),
            )
        })
        .collect();

    DataSet::from_rows(columns.iter().map(|c| c.to_string()).collect(), rows)
}

#[test]
fn test_date_reformat_scenario() {
    let mut dataset = text_rows(&["date"], &[&["2024-09-28T18:05:15Z"], &["2024-01-01"]]);

    let pipeline = Pipeline::new("dates").add(DateTimeFormatter::new("date", "yyyy/MM/dd", "date"));
    pipeline.execute(&mut dataset).unwrap();

    assert_eq!(dataset.data[0].get("date"), Some(&Value::text("2024/09/28")));
    assert_eq!(dataset.data[1].get("date"), Some(&Value::text("2024/01/01")));
}

#[test]
fn test_aggregate_scenario() {
    let mut dataset = text_rows(
        &["grp", "val"],
        &[&["a", "10"], &["a", "20"], &["b", "5"]],
    );

    let pipeline = Pipeline::new("sums").add(Aggregator::new("grp").sum("val", "total"));
    pipeline.execute(&mut dataset).unwrap();

    assert_eq!(dataset.len(), 2);

    let mut found_a = false;
    let mut found_b = false;

    for row in &dataset.data {
        assert_eq!(row.len(), 2);
        if row.get("grp") == Some(&Value::text("a")) {
            found_a = true;
            assert_eq!(row.get("total"), Some(&Value::Float(30.0)));
        } else if row.get("grp") == Some(&Value::text("b")) {
            found_b = true;
            assert_eq!(row.get("total"), Some(&Value::Float(5.0)));
        }
    }

    assert!(found_a);
    assert!(found_b);
}

#[test]
fn test_subtract_scenario() {
    let mut dataset = DataSet::from_rows(
        vec!["x".to_string(), "y".to_string()],
        vec![Row::from_pairs([("x", Value::Integer(10)), ("y", Value::Integer(3))])],
    );

    let pipeline = Pipeline::new("math").add(MathOperation::subtract(&["x", "y"], "diff"));
    pipeline.execute(&mut dataset).unwrap();

    assert_eq!(dataset.data[0].get("diff"), Some(&Value::Float(7.0)));
}

#[test]
fn test_stages_run_in_declared_order() {
    // Aggregate first so the math stage sees numbers, then sort and label.
    let mut dataset = text_rows(
        &["team", "won", "lost"],
        &[
            &["red", "3", "1"],
            &["blue", "5", "0"],
            &["red", "2", "2"],
            &["blue", "1", "3"],
        ],
    );

    let pipeline = Pipeline::new("league")
        .add(
            Aggregator::new("team")
                .sum("won", "won_total")
                .sum("lost", "lost_total"),
        )
        .add(MathOperation::subtract(&["won_total", "lost_total"], "balance"))
        .add(OrderBy::desc("team"))
        .add(StringFormatter::new(&["team", "balance"], "%s: %.1f", "label"));

    assert_eq!(pipeline.len(), 4);
    pipeline.execute(&mut dataset).unwrap();

    let labels: Vec<String> = dataset
        .iter()
        .map(|row| row.get("label").map(Value::to_string).unwrap_or_default())
        .collect();

    assert_eq!(labels, vec!["red: 2.0", "blue: 3.0"]);
}

#[test]
fn test_math_before_aggregation_is_fatal() {
    // CSV values are text, so arithmetic on them fails the run.
    let mut dataset = text_rows(&["x", "y"], &[&["1", "2"]]);

    let pipeline = Pipeline::new("bad")
        .add(MathOperation::add(&["x", "y"], "sum"))
        .add(OrderBy::asc("x"));

    let err = pipeline.execute(&mut dataset).unwrap_err();
    assert!(matches!(err, ProcessingError::NotNumeric { ref column, .. } if column == "x"));
    assert!(!dataset.data[0].contains("sum"));
}

#[test]
fn test_pipeline_from_report() {
    let report = Report::new("daily", FileFormat::Jsonl)
        .column(Column::new("day"))
        .column(Column::new("amount"))
        .column(Column::new("total"))
        .transformer(DateTimeFormatter::new("day", "dd.MM.yyyy", "day"))
        .transformer(Aggregator::new("day").aggregate("amount", AggregateMethod::Avg, "total"))
        .transformer(OrderBy::new("day", SortOrder::Asc))
        .output("day")
        .output("total");

    let pipeline = Pipeline::from_report(&report);
    assert_eq!(pipeline.name(), "daily");
    assert_eq!(pipeline.len(), 3);

    let kinds: Vec<TransformerKind> = report.transformers.iter().map(|t| t.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            TransformerKind::DateTimeFormatter,
            TransformerKind::Aggregator,
            TransformerKind::Ordering
        ]
    );

    let mut dataset = text_rows(
        &["day", "amount"],
        &[
            &["2024-03-02", "4"],
            &["2024-03-01T10:00:00Z", "1"],
            &["2024-03-02", "8"],
        ],
    );
    pipeline.execute(&mut dataset).unwrap();

    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.data[0].get("day"), Some(&Value::text("01.03.2024")));
    assert_eq!(dataset.data[0].get("total"), Some(&Value::Float(1.0)));
    assert_eq!(dataset.data[1].get("day"), Some(&Value::text("02.03.2024")));
    assert_eq!(dataset.data[1].get("total"), Some(&Value::Float(6.0)));
}

#[test]
fn test_config_dispatch_matches_variant() {
    let config: TransformerConfig = OrderBy::asc("x").into();
    assert_eq!(config.kind(), TransformerKind::Ordering);
    assert_eq!(config.name(), "Ordering");
    assert_eq!(config.referenced_columns(), vec!["x"]);

    let config: TransformerConfig = StringFormatter::new(&["a", "b"], "%s-%s", "c").into();
    assert_eq!(config.kind(), TransformerKind::StringFormatter);
    assert_eq!(config.referenced_columns(), vec!["a", "b", "c"]);
}

#[test]
fn test_empty_pipeline_leaves_rows_untouched() {
    let mut dataset = text_rows(&["a"], &[&["2"], &["1"]]);
    let before = dataset.data.clone();

    let pipeline = Pipeline::new("noop");
    assert!(pipeline.is_empty());
    pipeline.execute(&mut dataset).unwrap();

    assert_eq!(dataset.data, before);
}
