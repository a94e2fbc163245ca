//! FFTT club licensee fetcher.
//!
//! Retrieves the licensees of a table-tennis club from the FFTT SmartPing
//! API, falls back to scraping the PingPocket roster page, and produces a
//! single JSON-serializable result for the club website.
//!
//! # Modules
//!
//! - `adapter`: Conversion to the club website's licensee format.
//! - `config`: Environment configuration and command-line arguments.
//! - `errors`: Error handling types.
//! - `models`: Licensee records and the emitted result.
//! - `pingpocket`: PingPocket HTML scraper (fallback source).
//! - `pipeline`: Source selection and degradation to mock data.
//! - `smartping`: SmartPing API client (primary source).

pub mod adapter;
pub mod config;
pub mod errors;
pub mod models;
pub mod pingpocket;
pub mod pipeline;
pub mod smartping;
