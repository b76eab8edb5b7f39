use std::fs;

use anyhow::Result;
use serde_json::{Map, Value, json};
use snapex::library::export::{flatten_record, save_to_csv, save_to_json};
use tempfile::tempdir;

fn record(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected a JSON object"),
    }
}

fn read_csv(path: &std::path::Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for row in reader.records() {
        rows.push(row?.iter().map(str::to_string).collect());
    }

    Ok((headers, rows))
}

#[test]
fn test_flatten_nested_object() {
    let flat = flatten_record(&record(json!({
        "uuid": "s1",
        "volume": { "uuid": "v1", "name": "vol0" },
    })));

    assert_eq!(flat.get("uuid"), Some(&json!("s1")));
    assert_eq!(flat.get("volume.uuid"), Some(&json!("v1")));
    assert_eq!(flat.get("volume.name"), Some(&json!("vol0")));
    assert!(flat.get("volume").is_none());
}

#[test]
fn test_flatten_chains_dots_for_deep_nesting() {
    let flat = flatten_record(&record(json!({
        "svm": { "_links": { "self": { "href": "/api/svm/svms/1" } } },
    })));

    assert_eq!(flat.get("svm._links.self.href"), Some(&json!("/api/svm/svms/1")));
}

#[test]
fn test_flatten_keeps_arrays_intact() {
    let flat = flatten_record(&record(json!({
        "uuid": "s1",
        "labels": ["daily", "weekly"],
    })));

    assert_eq!(flat.get("labels"), Some(&json!(["daily", "weekly"])));
}

#[test]
fn test_save_to_json_pretty_prints_all_records() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("output.json");

    let records = vec![
        record(json!({ "uuid": "a", "name": "s1" })),
        record(json!({ "uuid": "b", "name": "s2" })),
    ];

    save_to_json(&records, &path)?;

    let content = fs::read_to_string(&path)?;
    let exported: Vec<Map<String, Value>> = serde_json::from_str(&content)?;

    assert_eq!(exported.len(), 2);
    assert_eq!(exported[0].get("uuid"), Some(&json!("a")));
    assert_eq!(exported[1].get("uuid"), Some(&json!("b")));
    assert!(content.contains("\n  "), "export should be pretty-printed");

    Ok(())
}

#[test]
fn test_save_to_csv_one_row_per_snapshot() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("output.csv");

    let records = vec![
        record(json!({ "uuid": "a", "name": "s1" })),
        record(json!({ "uuid": "b", "name": "s2" })),
        record(json!({ "uuid": "c", "name": "s3" })),
    ];

    save_to_csv(&records, &path)?;

    let (headers, rows) = read_csv(&path)?;
    let uuid = headers.iter().position(|h| h == "uuid").unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][uuid], "a");
    assert_eq!(rows[1][uuid], "b");
    assert_eq!(rows[2][uuid], "c");

    Ok(())
}

#[test]
fn test_save_to_csv_unions_columns_across_records() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("output.csv");

    let records = vec![
        record(json!({ "uuid": "a", "name": "s1" })),
        record(json!({ "uuid": "b", "reclaimable_space": 1024 })),
    ];

    save_to_csv(&records, &path)?;

    let (headers, rows) = read_csv(&path)?;
    let name = headers.iter().position(|h| h == "name").unwrap();
    let space = headers.iter().position(|h| h == "reclaimable_space").unwrap();

    assert_eq!(rows[0][name], "s1");
    assert_eq!(rows[0][space], "", "missing value should be an empty cell");
    assert_eq!(rows[1][name], "");
    assert_eq!(rows[1][space], "1024");

    Ok(())
}

#[test]
fn test_save_to_csv_flattens_nested_fields() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("output.csv");

    let records = vec![record(json!({
        "uuid": "x",
        "volume": { "uuid": "v1" },
    }))];

    save_to_csv(&records, &path)?;

    let (headers, rows) = read_csv(&path)?;
    let column = headers.iter().position(|h| h == "volume.uuid").unwrap();

    assert_eq!(rows[0][column], "v1");

    Ok(())
}

#[test]
fn test_save_to_csv_writes_arrays_as_json() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("output.csv");

    let records = vec![record(json!({
        "uuid": "x",
        "labels": ["daily", "weekly"],
    }))];

    save_to_csv(&records, &path)?;

    let (headers, rows) = read_csv(&path)?;
    let labels = headers.iter().position(|h| h == "labels").unwrap();

    assert_eq!(rows[0][labels], r#"["daily","weekly"]"#);

    Ok(())
}

#[test]
fn test_save_empty_record_set() -> Result<()> {
    let dir = tempdir()?;
    let json_path = dir.path().join("output.json");
    let csv_path = dir.path().join("output.csv");

    save_to_json(&[], &json_path)?;
    save_to_csv(&[], &csv_path)?;

    assert_eq!(fs::read_to_string(&json_path)?, "[]");
    assert_eq!(fs::read_to_string(&csv_path)?, "");

    Ok(())
}
