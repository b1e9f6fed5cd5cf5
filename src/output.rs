//! Colored status narration
//!
//! User-facing progress signal (what is being downloaded, checked out,
//! updated), not an error channel. Uses owo-colors for terminal colors and
//! indicatif for spinners.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::time::Duration;

/// Print an action header (blue, bold)
/// Example: "==> Downloading https://..."
pub fn action(message: &str) {
    println!("{} {}", "==>".blue().bold(), message.bold());
}

/// Print a detail line (dimmed prefix)
pub fn detail(message: &str) {
    println!("     {}", message.dimmed());
}

/// Print a skip message (dimmed)
/// Example: "==> Already downloaded: /var/cache/srcfetch/bash-5.2.26.tar.gz"
pub fn skip(message: &str) {
    println!("{} {}", "==>".dimmed(), message.dimmed());
}

/// Print a warning message (yellow)
pub fn warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}

/// Print an error message (red)
pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message.red());
}

/// Create a spinner shown while a quiet external command runs
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("     {spinner:.cyan} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
