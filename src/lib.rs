//! loaneda: Loan Decision Exploratory Analysis
//!
//! Loads a loan decision dataset, prepares it for analysis (identifier
//! removal, decision and rating encoding), ranks columns by correlation with
//! the decision, estimates the empirical acceptance score cutoff and renders
//! the exploratory charts.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
