//! Ticket checking: recognized lines in, scored report out.
//!
//! This module provides:
//! - The single-ticket pipeline (extract, look up the draw, score)
//! - A worker pool for checking many tickets in parallel
//! - Text and JSON report rendering

pub mod batch;
pub mod pipeline;
pub mod report;

pub use batch::{run_batch, BatchContext};
pub use pipeline::{check_lines, Outcome, TicketReport};
pub use report::{render_json, render_text_all};
