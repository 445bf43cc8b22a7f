//! Property tests for the pure pieces of the pipeline.

mod determinism_tests;
mod fusion_tests;
