//! Core types for the Octet Encoding Rules codec
//!
//! This crate provides the error type shared by the encoder, decoder and
//! schema compiler, and the runtime value model that compiled types encode
//! from and decode into.

pub mod error;
pub mod datatypes;

pub use error::{Error, OerResult};
pub use datatypes::{BitString, Value};
