//! Core types and trait definitions for the Waypost facility directory.
//!
//! This crate is deliberately free of HTTP dependencies. It holds the
//! canonical [`facility::Facility`] schema every upstream registry is mapped
//! into, the distance calculator and proximity query engine ([`geo`]), and
//! the [`provider::FacilityProvider`] contract the source adapters implement.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod facility;
pub mod geo;
pub mod provider;

pub use error::{Error, Result};
