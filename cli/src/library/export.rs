use std::fs;
use std::path::Path;

use itertools::Itertools;
use serde_json::{Map, Value};

/// Write all merged snapshot records as a pretty-printed JSON array.
pub fn save_to_json(records: &[Map<String, Value>], path: &Path) -> anyhow::Result<()> {
    fs::write(path, serde_json::to_string_pretty(records)?)?;

    Ok(())
}

/// Write all merged snapshot records as a flat CSV table.
///
/// The header row is the union of all flattened keys in first-seen order.
/// Records missing a column get an empty cell.
pub fn save_to_csv(records: &[Map<String, Value>], path: &Path) -> anyhow::Result<()> {
    let flattened = records.iter().map(flatten_record).collect::<Vec<_>>();

    let columns = flattened
        .iter()
        .flat_map(|record| record.keys())
        .unique()
        .cloned()
        .collect::<Vec<String>>();

    let mut writer = csv::Writer::from_path(path)?;

    if !columns.is_empty() {
        writer.write_record(&columns)?;
    }

    for record in &flattened {
        let row = columns
            .iter()
            .map(|column| record.get(column).map(csv_field).unwrap_or_default());

        writer.write_record(row)?;
    }

    writer.flush()?;

    Ok(())
}

/// Flatten nested objects into dotted-path keys, e.g. `volume.uuid`.
/// Arrays and scalars are kept intact.
pub fn flatten_record(record: &Map<String, Value>) -> Map<String, Value> {
    let mut flat = Map::new();

    for (key, value) in record {
        flatten_value(key, value, &mut flat);
    }

    flat
}

fn flatten_value(path: &str, value: &Value, flat: &mut Map<String, Value>) {
    match value {
        Value::Object(nested) => {
            for (key, value) in nested {
                flatten_value(&format!("{}.{}", path, key), value, flat);
            }
        }
        other => {
            flat.insert(path.to_string(), other.clone());
        }
    }
}

fn csv_field(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
