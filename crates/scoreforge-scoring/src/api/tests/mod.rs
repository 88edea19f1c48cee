//! Consolidated tests for api module.
