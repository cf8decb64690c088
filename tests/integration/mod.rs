//! Integration test suite for anvil.
//!
//! These tests exercise the execution core end to end: registering
//! components, resolving factories, constructing tasks from configuration,
//! and driving them through the full lifecycle. They verify that all
//! components work together correctly.
//!
//! # Test Categories
//!
//! - `lifecycle`: Driver guarantees (teardown on every exit path, cancellation)
//! - `registry`: Component registration, resolution, and instantiation
//! - `adapter`: Foreign-convention definitions behind the native contract

mod fixtures;

mod adapter;
mod registry;
