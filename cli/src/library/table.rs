use console::style;
use serde_json::{Map, Value};
use tabled::{
    builder::Builder,
    settings::{Style, Theme},
};

pub fn print_snapshot_table(records: &[Map<String, Value>]) {
    let header = ["Snapshot Name", "Create Time", "Reclaimable Space", "UUID"]
        .iter()
        .map(|s| style(s).green().bold().to_string())
        .collect::<Vec<String>>();

    let mut builder = Builder::default();
    builder.push_record(header);

    for record in records {
        let size = match record.get("reclaimable_space").and_then(Value::as_u64) {
            Some(size) => (size / 1024 / 1024).to_string() + " MB",
            None => "Unavailable".to_string(),
        };

        builder.push_record(vec![
            field_text(record, "name"),
            field_text(record, "create_time"),
            size,
            field_text(record, "uuid"),
        ]);
    }

    let mut table = builder.build();

    let mut style = Theme::from_style(Style::markdown());
    style.remove_borders_horizontal();

    table.with(style);

    println!("{}", table.to_string());
}

fn field_text(record: &Map<String, Value>, key: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("Unavailable")
        .to_string()
}
