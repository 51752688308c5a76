//! Official draw results.
//!
//! Results are looked up by period through the [`DrawSource`] trait. The
//! checker only ever sees a record or `None`; fetching, caching and fallback
//! amounts are the business of the source implementations here.

pub mod cache;
pub mod record;
pub mod web;

pub use cache::CachedDrawSource;
pub use record::{DrawRecord, DrawSource, ManualDrawSource, PrizeTable, StaticDrawSource};
pub use web::WebDrawSource;
