//! Raw extract ingestion
//!
//! This crate handles:
//! - Reading the listings and reviews CSV extracts
//! - Capturing the header so column presence can be checked downstream
//! - Mapping rows onto typed raw records (every field optional text)

pub mod extractor;

pub use extractor::{read_table, ExtractError, Extractor, RawExtract};
