//! Filtering and aggregation core for Press Council of India complaint
//! records.
//!
//! Raw rows from the two source tables are normalized once by [`loader`],
//! narrowed by a [`filter::FilterSpec`], and turned into chart data by
//! [`reports`] using the primitives in [`aggregate`], [`labels`] and
//! [`stats`]. [`output`] writes the results; [`fetch`] talks to the backend.
pub mod aggregate;
pub mod config;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod labels;
pub mod loader;
pub mod output;
pub mod reports;
pub mod stats;
pub mod types;
pub mod util;
