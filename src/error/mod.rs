//! Error stacking built on `std::error::Error`.
//!
//! This module provides the composite error that holds one error on top of
//! another, the traversal that sees through it, and operational helpers for
//! attaching markers and reporting whole chains.


pub mod chain;
pub mod composite;
pub mod marker;
pub mod operational;

pub use {
    chain::{Chain, ErrorRef, Layer, Stack, chain, find, is, is_value, next_layer},
    composite::{Composite, SharedError, with},
    marker::{Context, Marker, shared, wrap},
    operational::{ErrorReporter, ResultExt},
};
