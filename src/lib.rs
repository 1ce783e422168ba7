//! Model Evaluator
//!
//! An evaluation and drift detection engine for deployed prediction models
//! whose automated scores are periodically checked against expert ground
//! truth.
//!
//! # Features
//!
//! - Pass/fail classification metrics and confidence calibration
//! - Two-period drift detection within a lookback window
//! - Residual analysis with Tukey outliers and error patterns
//! - Ordered, data-driven recommendation rules
//! - Dated, effort-estimated action plans
//! - `SQLite` record loader behind a mockable trait
//!
//! # Quick Start
//!
//! ```bash
//! EVAL_MODEL_IDS=model-a,model-b ./model-evaluator > reports.json
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐  VerificationSource  ┌──────────────────────────────────────┐
//! │  SQLite  │─────────────────────▶│ metrics ─┐                           │
//! └──────────┘                      │ drift  ──┼─▶ recommender ─▶ planner │──▶ JSON report
//!                                   │ errors ──┘                           │
//!                                   └──────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod evaluation;
pub mod storage;
pub mod traits;

#[cfg(test)]
mod test_utils;
