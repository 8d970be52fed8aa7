//! Integration tests for texnorm crates.
//!
//! End-to-end runs through the orchestrator against images written to
//! temporary directories, verifying the pipeline-wide behavior the unit
//! tests of the individual crates cannot cover.
