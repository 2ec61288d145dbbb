//! Core implementation: error taxonomy, configuration and the IAM evaluator

pub mod config;
pub mod error;
pub mod iam;
