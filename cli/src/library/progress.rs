use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub fn create_spinner(message: String) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();

    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);

    Ok(pb)
}
