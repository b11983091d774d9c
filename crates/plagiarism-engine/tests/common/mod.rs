//! Shared test utilities for plagiarism-engine integration tests.
//!
//! - `TestHarness` wires an in-memory store, fake collaborators and a manual clock
//! - Fakes for the file catalog, text extractor and clock

pub mod fakes;
pub mod harness;

pub use fakes::*;
pub use harness::TestHarness;
