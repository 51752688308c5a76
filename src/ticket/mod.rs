//! Ticket text parsing: normalization, ticket types and field extraction.

pub mod extract;
pub mod normalize;
pub mod types;

pub use extract::{extract, parse_bet_line, ExtractRules, TicketFields};
pub use normalize::normalize;
pub use types::{Bet, DrawPeriod, BACK_PICK, FRONT_PICK};
