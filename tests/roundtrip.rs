//! End-to-end tests over the public API: encode a result set the way a
//! server frame would carry it, decode it back into rows, and stream the
//! rows through a cursor from a producer thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use pretty_assertions::assert_eq;

use cql_proto::{Column, Int64, ResultCursor, Row, TypeHint, Value, decode, encode};

fn schema() -> Vec<Column> {
    vec![
        Column::new("id", TypeHint::parse("uuid").unwrap()),
        Column::new("name", TypeHint::parse("text").unwrap()),
        Column::new("visits", TypeHint::parse("bigint").unwrap()),
        Column::new("tags", TypeHint::parse("set<text>").unwrap()),
    ]
}

fn cell(row: &[Value], index: usize, columns: &[Column]) -> Option<Vec<u8>> {
    encode(&row[index], Some(&columns[index].hint)).unwrap()
}

/// Encode every cell, decode it back under the column hint, and assemble
/// rows the way the connection layer does.
fn marshal_rows(data: Vec<Vec<Value>>) -> Vec<Row> {
    let columns = schema();
    data.into_iter()
        .map(|source| {
            let mut row = Row::new(schema());
            for index in 0..columns.len() {
                let value = match cell(&source, index, &columns) {
                    Some(bytes) => decode(&bytes, &columns[index].hint).unwrap(),
                    None => Value::Null,
                };
                row.push_value(value);
            }
            row
        })
        .collect()
}

#[test]
fn result_set_survives_the_wire() {
    let uuid = "f47ac10b-58cc-4372-a567-0e02b2c3d479";
    let rows = marshal_rows(vec![
        vec![
            Value::from(uuid),
            Value::from("Ada"),
            Value::from(Int64::new(9007199254740995)),
            Value::Set(vec!["ops".into(), "core".into()]),
        ],
        vec![Value::from(uuid), Value::Null, Value::from(Int64::new(-3)), Value::Null],
    ]);

    let first = &rows[0];
    assert_eq!(first.get("name").unwrap(), &Value::from("Ada"));
    assert_eq!(first.get(1).unwrap(), first.get("name").unwrap());
    // exact beyond 2^53, where f64 would already be lossy
    assert_eq!(
        first.get("visits").unwrap(),
        &Value::Bigint(Int64::new(9007199254740995))
    );
    assert_eq!(
        first.get("tags").unwrap(),
        &Value::Set(vec!["ops".into(), "core".into()])
    );

    let second = &rows[1];
    assert_eq!(second.get("name").unwrap(), &Value::Null);
    assert_eq!(second.get("tags").unwrap(), &Value::Null);
    assert_eq!(second.get("id").unwrap(), first.get("id").unwrap());
}

#[test]
fn rows_stream_in_order_across_threads() {
    let cursor: ResultCursor<usize> = ResultCursor::new();
    let ended = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ended);
    cursor.on_end(move || flag.store(true, Ordering::SeqCst));

    let producer = cursor.clone();
    let handle = std::thread::spawn(move || {
        for n in 0..200 {
            producer.append(n).unwrap();
        }
        producer.append_end().unwrap();
    });

    let mut seen = Vec::with_capacity(200);
    while !ended.load(Ordering::SeqCst) {
        match cursor.read() {
            Some(n) => seen.push(n),
            None => std::thread::yield_now(),
        }
    }
    handle.join().unwrap();

    assert_eq!(seen, (0..200).collect::<Vec<_>>());
    assert!(cursor.is_ended());
    assert_eq!(cursor.read(), None);
}

#[test]
fn simple_query_path_inlines_literals() {
    let tags = Value::Set(vec!["a/b".into(), "it's".into()]);
    let params = [
        cql_proto::query::to_query_literal(&tags),
        cql_proto::query::to_query_literal(&Value::Int(12)),
    ];
    let query = cql_proto::query::substitute(
        "UPDATE users SET tags = ? WHERE id = ? AND note = 'keep?'",
        Some(&[params[0].as_str(), params[1].as_str()]),
    );
    assert_eq!(
        query,
        "UPDATE users SET tags = {'a/b', 'it''s'} WHERE id = 12 AND note = 'keep?'"
    );
}
