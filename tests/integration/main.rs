//! Integration tests
//!
//! These tests use wiremock to stand in for dealer sites and the extraction
//! service, and exercise jobs and the HTTP API end-to-end.

mod common;
mod job_tests;
mod server_tests;
