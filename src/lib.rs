//! Super Lotto ticket checking.
//!
//! Reads ticket text (from photos via OCR, or already recognized), extracts
//! the draw period and bets, looks up the official result and computes the
//! prize, expanding compound bets into every single bet they cover.
//!
//! The core is three pure functions: [`normalize`], [`extract`] and
//! [`score`]. Everything else is plumbing around them.

pub mod check;
pub mod config;
pub mod draw;
pub mod ocr;
pub mod paths;
pub mod prize;
pub mod ticket;

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;

pub use prize::{score, score_detailed};
pub use ticket::{extract, normalize};

/// Logs a message to stderr and the log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    eprint!("{}", line);
    let log_path = paths::get_logs_dir().join("dlt_checker.log");
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}
