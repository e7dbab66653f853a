//! Single test binary entry point.
//!
//! All integration tests link into one binary instead of one per file.
//!
//! Structure:
//! - helpers: table builders, fixture files and stores for driving the pipeline
//! - integration: multi-component workflows (store + pipeline + sink)
//! - unit: single-component tests through the public API
