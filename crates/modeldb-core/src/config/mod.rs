//! Configuration for the catalog tools.
//!
//! [`settings::Settings`] holds the allowed value sets used by the validator
//! and the defaults used by the schema normalizer.

pub mod settings;
