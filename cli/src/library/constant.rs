use std::sync::LazyLock;

pub static VERSION: LazyLock<String> = LazyLock::new(|| env!("CARGO_PKG_VERSION").to_string());

pub const OUTPUT_JSON: &str = "output.json";
pub const OUTPUT_CSV: &str = "output.csv";

pub const USERNAME_ENV: &str = "SNAPEX_USERNAME";
pub const PASSWORD_ENV: &str = "SNAPEX_PASSWORD";
