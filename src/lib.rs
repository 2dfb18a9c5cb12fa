//! xray-audit - chest X-ray dataset inspection
//!
//! Counts and validates a `<root>/<subset>/<class>/<images>` tree, derives
//! class weights, samples image properties and renders a chart plus a JSON
//! report.

pub mod cli;
pub mod config;
pub mod dataset;
pub mod logging;
pub mod models;
pub mod reporters;
