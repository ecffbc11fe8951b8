//! Integration tests for the harvester
//!
//! These tests use wiremock to stand up a mock news portal and exercise
//! fetching, pagination, and full crawls end-to-end.

mod crawl_tests;
mod fetch_tests;
mod portal;
