// Transformer tests
// Author: Gabriel Demetrios Lafis

use std::cmp::Ordering;

use chrono::NaiveDate;
use report_engine::{
    data::{DataSet, Row, Value},
    processing::{
        AbsentPolicy, AggregateMethod, Aggregator, DateTimeFormatter, MathOperation, OrderBy,
        ProcessingError, Transformer,
    },
};

fn dataset(columns: &[&str], rows: Vec<Row>) -> DataSet {
    DataSet::from_rows(columns.iter().map(|c| c.to_string()).collect(), rows)
}

fn column_values(rows: &DataSet, column: &str) -> Vec<Option<String>> {
    rows.iter()
        .map(|row| row.get(column).map(Value::to_string))
        .collect()
}

fn keyed(keys: &[Option<&str>]) -> DataSet {
    let rows = keys
        .iter()
        .enumerate()
        .map(|(i, key)| {
            let mut row = Row::from_pairs([("id", Value::Integer(i as i64))]);
            if let Some(key) = key {
                row.insert("k", Value::text(*key));
            }
            row
        })
        .collect();

    dataset(&["id", "k"], rows)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// DateTimeFormatter

#[test]
fn test_datetime_formatter_instant_with_time_fields() {
    let mut rows = dataset(
        &["ts"],
        vec![Row::from_pairs([("ts", Value::text("2024-09-28T18:05:15Z"))])],
    );

    DateTimeFormatter::new("ts", "yyyy-MM-dd HH:mm", "pretty")
        .transform(&mut rows)
        .unwrap();

    assert_eq!(rows.data[0].get("pretty"), Some(&Value::text("2024-09-28 18:05")));
    assert_eq!(
        rows.data[0].get("ts"),
        Some(&Value::text("2024-09-28T18:05:15Z"))
    );
}

#[test]
fn test_datetime_formatter_passes_unparseable_text_through() {
    let mut rows = dataset(
        &["d"],
        vec![Row::from_pairs([("d", Value::text("not a date"))])],
    );

    DateTimeFormatter::new("d", "dd/MM/yyyy", "out")
        .transform(&mut rows)
        .unwrap();

    assert_eq!(rows.data[0].get("out"), Some(&Value::text("not a date")));
}

#[test]
fn test_datetime_formatter_skips_non_text_and_absent_values() {
    let mut rows = dataset(
        &["d"],
        vec![
            Row::from_pairs([("d", Value::Integer(20240101))]),
            Row::new(),
            Row::from_pairs([("d", Value::Date(date(2024, 1, 1)))]),
        ],
    );

    DateTimeFormatter::new("d", "yyyy", "out")
        .transform(&mut rows)
        .unwrap();

    assert!(rows.iter().all(|row| !row.contains("out")));
}

#[test]
fn test_datetime_formatter_rejects_invalid_pattern() {
    let mut rows = dataset(&["d"], Vec::new());

    let err = DateTimeFormatter::new("d", "yyyy-qq", "out")
        .transform(&mut rows)
        .unwrap_err();

    assert!(matches!(err, ProcessingError::InvalidPattern(_)));
}

#[test]
fn test_datetime_formatter_time_fields_on_plain_date_fail() {
    let mut rows = dataset(
        &["d"],
        vec![Row::from_pairs([("d", Value::text("2024-01-01"))])],
    );

    let err = DateTimeFormatter::new("d", "yyyy-MM-dd HH:mm", "out")
        .transform(&mut rows)
        .unwrap_err();

    assert!(matches!(err, ProcessingError::InvalidPattern(_)));
}

// Aggregator

#[test]
fn test_aggregator_keeps_first_seen_group_order() {
    let rows = vec![
        Row::from_pairs([("g", Value::text("b")), ("v", Value::text("1"))]),
        Row::from_pairs([("g", Value::text("a")), ("v", Value::text("2"))]),
        Row::from_pairs([("g", Value::text("b")), ("v", Value::text("3"))]),
        Row::from_pairs([("g", Value::text("c")), ("v", Value::text("4"))]),
    ];
    let mut rows = dataset(&["g", "v"], rows);

    Aggregator::new("g").sum("v", "s").transform(&mut rows).unwrap();

    assert_eq!(
        column_values(&rows, "g"),
        vec![Some("b".to_string()), Some("a".to_string()), Some("c".to_string())]
    );
    assert_eq!(rows.data[0].get("s"), Some(&Value::Float(4.0)));
    assert_eq!(rows.data[1].get("s"), Some(&Value::Float(2.0)));
    assert_eq!(rows.data[2].get("s"), Some(&Value::Float(4.0)));
}

#[test]
fn test_aggregator_drops_rows_without_group_key() {
    let rows = vec![
        Row::from_pairs([("g", Value::text("a")), ("v", Value::text("1"))]),
        Row::from_pairs([("v", Value::text("100"))]),
        Row::from_pairs([("g", Value::text("a")), ("v", Value::text("2"))]),
    ];
    let mut rows = dataset(&["g", "v"], rows);

    Aggregator::new("g").sum("v", "s").transform(&mut rows).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows.data[0].get("s"), Some(&Value::Float(3.0)));
}

#[test]
fn test_aggregator_ignores_unusable_values() {
    let rows = vec![
        Row::from_pairs([("g", Value::text("a")), ("v", Value::text("10"))]),
        Row::from_pairs([("g", Value::text("a")), ("v", Value::text("oops"))]),
        Row::from_pairs([("g", Value::text("a"))]),
        Row::from_pairs([("g", Value::text("a")), ("v", Value::Date(date(2024, 1, 1)))]),
        Row::from_pairs([("g", Value::text("a")), ("v", Value::text(" 20 "))]),
    ];
    let mut rows = dataset(&["g", "v"], rows);

    Aggregator::new("g")
        .avg("v", "mean")
        .sum("v", "total")
        .transform(&mut rows)
        .unwrap();

    assert_eq!(rows.data[0].get("mean"), Some(&Value::Float(15.0)));
    assert_eq!(rows.data[0].get("total"), Some(&Value::Float(30.0)));
}

#[test]
fn test_aggregator_average_of_nothing_is_zero() {
    let rows = vec![Row::from_pairs([
        ("g", Value::text("a")),
        ("v", Value::text("n/a")),
    ])];
    let mut rows = dataset(&["g", "v"], rows);

    Aggregator::new("g").avg("v", "mean").transform(&mut rows).unwrap();

    assert_eq!(rows.data[0].get("mean"), Some(&Value::Float(0.0)));
    assert_eq!(AggregateMethod::Avg.apply(&[]), 0.0);
    assert_eq!(AggregateMethod::Sum.apply(&[]), 0.0);
}

#[test]
fn test_aggregator_output_rows_hold_only_key_and_aggregates() {
    let rows = vec![
        Row::from_pairs([
            ("g", Value::Integer(1)),
            ("v", Value::Integer(2)),
            ("extra", Value::text("x")),
        ]),
        Row::from_pairs([("g", Value::Integer(1)), ("v", Value::Float(0.5))]),
    ];
    let mut rows = dataset(&["g", "v", "extra"], rows);

    Aggregator::new("g").sum("v", "s").transform(&mut rows).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows.data[0].column_names(), vec!["g", "s"]);
    assert_eq!(rows.data[0].get("g"), Some(&Value::Integer(1)));
    assert_eq!(rows.data[0].get("s"), Some(&Value::Float(2.5)));
}

#[test]
fn test_aggregator_on_empty_rows() {
    let mut rows = dataset(&["g"], Vec::new());
    Aggregator::new("g").sum("v", "s").transform(&mut rows).unwrap();
    assert!(rows.is_empty());
}

// MathOperation

#[test]
fn test_math_add_is_order_independent() {
    let row = Row::from_pairs([
        ("a", Value::Integer(1)),
        ("b", Value::Float(2.5)),
        ("c", Value::Integer(3)),
    ]);

    let forward = MathOperation::add(&["a", "b", "c"], "out").evaluate(&row).unwrap();
    let shuffled = MathOperation::add(&["c", "a", "b"], "out").evaluate(&row).unwrap();

    assert_eq!(forward, 6.5);
    assert_eq!(forward, shuffled);
}

#[test]
fn test_math_subtract_depends_on_order() {
    let row = Row::from_pairs([("x", Value::Integer(10)), ("y", Value::Integer(3))]);

    assert_eq!(MathOperation::subtract(&["x", "y"], "d").evaluate(&row).unwrap(), 7.0);
    assert_eq!(MathOperation::subtract(&["y", "x"], "d").evaluate(&row).unwrap(), -7.0);
    assert_eq!(MathOperation::subtract(&["x"], "d").evaluate(&row).unwrap(), 10.0);
}

#[test]
fn test_math_rejects_missing_and_text_inputs() {
    let row = Row::from_pairs([("x", Value::Integer(1)), ("t", Value::text("2"))]);

    let err = MathOperation::add(&["x", "missing"], "o").evaluate(&row).unwrap_err();
    assert!(matches!(
        err,
        ProcessingError::NotNumeric { ref column, ref found } if column == "missing" && found == "nothing"
    ));

    let err = MathOperation::add(&["x", "t"], "o").evaluate(&row).unwrap_err();
    assert!(matches!(
        err,
        ProcessingError::NotNumeric { ref column, ref found } if column == "t" && found == "string"
    ));
}

#[test]
fn test_math_failure_writes_nothing() {
    let rows = vec![
        Row::from_pairs([("x", Value::Integer(1)), ("y", Value::Integer(2))]),
        Row::from_pairs([("x", Value::Integer(1))]),
    ];
    let mut rows = dataset(&["x", "y"], rows);

    assert!(MathOperation::add(&["x", "y"], "s").transform(&mut rows).is_err());
    assert!(rows.iter().all(|row| !row.contains("s")));
}

#[test]
fn test_math_overwrites_existing_output() {
    let rows = vec![Row::from_pairs([
        ("x", Value::Integer(4)),
        ("y", Value::Integer(1)),
    ])];
    let mut rows = dataset(&["x", "y"], rows);

    MathOperation::subtract(&["x", "y"], "x").transform(&mut rows).unwrap();

    assert_eq!(rows.data[0].get("x"), Some(&Value::Float(3.0)));
}

// OrderBy

#[test]
fn test_ordering_text_ascending() {
    let mut rows = keyed(&[Some("pear"), Some("apple"), Some("fig")]);
    OrderBy::asc("k").transform(&mut rows).unwrap();

    assert_eq!(
        column_values(&rows, "k"),
        vec![Some("apple".to_string()), Some("fig".to_string()), Some("pear".to_string())]
    );
}

#[test]
fn test_ordering_iso_dates_chronologically() {
    let mut rows = keyed(&[Some("2024-02-01"), Some("2023-12-31"), Some("2024-01-15")]);
    OrderBy::asc("k").transform(&mut rows).unwrap();

    assert_eq!(
        column_values(&rows, "k"),
        vec![
            Some("2023-12-31".to_string()),
            Some("2024-01-15".to_string()),
            Some("2024-02-01".to_string())
        ]
    );
}

#[test]
fn test_ordering_desc_reverses_asc() {
    let keys = [Some("d"), Some("b"), Some("e"), Some("a"), Some("c")];

    let mut asc = keyed(&keys);
    OrderBy::asc("k").transform(&mut asc).unwrap();

    let mut desc = keyed(&keys);
    OrderBy::desc("k").transform(&mut desc).unwrap();

    let mut reversed = column_values(&asc, "k");
    reversed.reverse();
    assert_eq!(column_values(&desc, "k"), reversed);
}

#[test]
fn test_ordering_is_idempotent_and_stable() {
    let mut rows = keyed(&[Some("b"), Some("a"), Some("b"), Some("a")]);
    let order = OrderBy::asc("k");

    order.transform(&mut rows).unwrap();
    let once = rows.data.clone();
    order.transform(&mut rows).unwrap();

    assert_eq!(rows.data, once);
    assert_eq!(
        column_values(&rows, "id"),
        vec![Some("1".to_string()), Some("3".to_string()), Some("0".to_string()), Some("2".to_string())]
    );
}

#[test]
fn test_ordering_absent_values_compare_equal_by_default() {
    let mut rows = keyed(&[None, Some("a")]);
    OrderBy::asc("k").transform(&mut rows).unwrap();

    assert_eq!(column_values(&rows, "k"), vec![None, Some("a".to_string())]);
}

#[test]
fn test_ordering_absent_last_policy() {
    let mut rows = keyed(&[Some("b"), None, Some("a")]);
    OrderBy::asc("k")
        .with_absent(AbsentPolicy::Last)
        .transform(&mut rows)
        .unwrap();
    assert_eq!(
        column_values(&rows, "k"),
        vec![Some("a".to_string()), Some("b".to_string()), None]
    );

    let mut rows = keyed(&[Some("b"), None, Some("a")]);
    OrderBy::desc("k")
        .with_absent(AbsentPolicy::Last)
        .transform(&mut rows)
        .unwrap();
    assert_eq!(
        column_values(&rows, "k"),
        vec![Some("b".to_string()), Some("a".to_string()), None]
    );
}

#[test]
fn test_ordering_numbers_are_unsupported() {
    let rows = vec![
        Row::from_pairs([("n", Value::Integer(2))]),
        Row::from_pairs([("n", Value::Integer(1))]),
    ];
    let mut rows = dataset(&["n"], rows);
    let before = rows.data.clone();

    let err = OrderBy::asc("n").transform(&mut rows).unwrap_err();

    assert!(matches!(
        err,
        ProcessingError::UnsupportedType { ref type_name, .. } if type_name == "integer"
    ));
    assert_eq!(rows.data, before);
}

#[test]
fn test_ordering_cross_type_comparisons() {
    let order = OrderBy::asc("k");

    let cmp = order
        .compare_values(&Value::Date(date(2024, 1, 2)), &Value::text("2024-01-01"))
        .unwrap();
    assert_eq!(cmp, Ordering::Greater);

    let cmp = order
        .compare_values(
            &Value::DateTime(date(2024, 1, 1).and_hms_opt(10, 0, 0).unwrap()),
            &Value::Date(date(2024, 1, 1)),
        )
        .unwrap();
    assert_eq!(cmp, Ordering::Greater);

    let cmp = order
        .compare_values(&Value::text("10"), &Value::Integer(9))
        .unwrap();
    assert_eq!(cmp, Ordering::Less);

    assert!(order
        .compare_values(&Value::Float(1.0), &Value::text("a"))
        .is_err());
}
