//! This crate provides a small web service that charts daily COVID-19 case trends. It loads a CSV
//! dataset of per-country daily records once, then answers trend queries by grouping the rows for
//! a country (or the whole world) by date and totalling a chosen metric for each day.
//!
//! A second server, the monitor, reports the state of the dataset, a log of recent load and
//! trend jobs, and Prometheus metrics. The web page links to it.
//!
//! The service is built on top of a number of open source components.
//!
//! * [Tokio](tokio), the most popular asynchronous Rust runtime.
//! * [Axum](axum) web framework, built by the Tokio team, on top of the [hyper] HTTP library.
//! * [Serde](serde) performs (de)serialisation of query parameters and JSON response data.
//! * The [csv] crate reads the dataset.
//! * [time] parses and formats calendar dates.

pub mod app;
pub mod app_state;
pub mod cli;
pub mod dataset;
pub mod diagnostics;
pub mod error;
pub mod metrics;
pub mod models;
pub mod operation;
pub mod operations;
pub mod processor;
pub mod resource_manager;
pub mod server;
#[cfg(test)]
pub mod test_utils;
pub mod tracing;
pub mod types;
pub mod validated_query;
