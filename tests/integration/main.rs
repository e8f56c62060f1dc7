//! Integration tests against a running server
//!
//! Start the server with an `[admin]` section configured, then run:
//! `cargo test --test integration -- --ignored`

mod api_tests;
mod circulation_tests;
mod common;
