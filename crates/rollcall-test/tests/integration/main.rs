//! Integration tests against a real Postgres database.

mod api;
mod finalizer;
mod helpers;
