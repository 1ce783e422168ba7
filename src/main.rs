//! Model Evaluator binary entry point.
//!
//! Evaluates every configured model over the lookback window and prints one
//! JSON report per model to stdout. All logs go to stderr.
//!
//! Coverage is excluded because the main function needs a populated
//! database and process environment.

// Enable the coverage attribute when running with nightly for llvm-cov exclusions
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use std::sync::Arc;

use model_evaluator::config::Config;
use model_evaluator::error::AppError;
use model_evaluator::evaluation::{EvaluationReport, Evaluator};
use model_evaluator::storage::SqliteStorage;
use tokio::task::JoinSet;

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_logging("info");
            tracing::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config.log_level);
    tracing::info!("model-evaluator starting...");
    tracing::info!(
        "Configuration loaded: database={}, models={}, lookback={}d",
        config.database_path,
        config.model_ids.len(),
        config.lookback_days
    );

    let storage = match SqliteStorage::new(&config.database_path).await {
        Ok(storage) => Arc::new(storage),
        Err(e) => {
            tracing::error!("Storage error: {e}");
            std::process::exit(1);
        }
    };

    let evaluator = Arc::new(Evaluator::new(config.policy));
    let failures = run_evaluations(&config, &storage, &evaluator).await;

    tracing::info!(
        evaluated = config.model_ids.len().saturating_sub(failures),
        failed = failures,
        "model-evaluator finished"
    );
    if failures > 0 {
        std::process::exit(1);
    }
}

fn init_logging(level: &str) {
    // Logs go to stderr; stdout carries the JSON reports
    tracing_subscriber::fmt()
        .with_env_filter(
            level
                .parse()
                .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

/// Evaluate all configured models as independent tasks and print each report.
///
/// Returns the number of models that could not be evaluated.
async fn run_evaluations(
    config: &Config,
    storage: &Arc<SqliteStorage>,
    evaluator: &Arc<Evaluator>,
) -> usize {
    let mut tasks: JoinSet<(String, Result<EvaluationReport, AppError>)> = JoinSet::new();
    for model_id in &config.model_ids {
        let storage = Arc::clone(storage);
        let evaluator = Arc::clone(evaluator);
        let model_id = model_id.clone();
        let lookback_days = config.lookback_days;
        tasks.spawn(async move {
            let result = evaluator
                .evaluate_model(storage.as_ref(), &model_id, lookback_days)
                .await;
            (model_id, result)
        });
    }

    let mut failures = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((model_id, Ok(report))) => match serde_json::to_string_pretty(&report) {
                Ok(json) => {
                    println!("{json}");
                    tracing::info!(
                        model_id = %model_id,
                        status = ?report.evaluation.executive_summary.overall_status,
                        drift_detected = report.evaluation.drift_analysis.drift_detected,
                        "Report written"
                    );
                }
                Err(e) => {
                    failures += 1;
                    tracing::error!(model_id = %model_id, "Failed to serialize report: {e}");
                }
            },
            Ok((model_id, Err(e))) => {
                failures += 1;
                tracing::error!(model_id = %model_id, "Evaluation failed: {e}");
            }
            Err(e) => {
                failures += 1;
                tracing::error!("Evaluation task panicked: {e}");
            }
        }
    }
    failures
}
