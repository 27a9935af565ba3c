//! Store sales and traffic dashboard backend
//!
//! Resolves date windows, pulls orders and analytics reports from two
//! sources, and reduces them into KPIs, time series and top-N tables.

pub mod cli;
pub mod config;
pub mod services;
pub mod sources;
pub mod types;
