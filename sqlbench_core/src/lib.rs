//! # sqlbench core
//!
//! Benchmarks relational database servers against each other: creates a fixed schema,
//! loads synthetic users, times a fixed query workload and renders the results as text,
//! JSON or SVG bar charts.

#![forbid(unsafe_code)]

pub mod chart;
pub mod commands;
pub mod comparison;
pub mod configuration;
pub mod dataset;
pub mod measurement;
pub mod report;
pub mod schema;
pub mod target;
pub mod workload;
