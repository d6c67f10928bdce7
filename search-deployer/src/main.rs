//! Search Deployer Main Entry Point
//!
//! Runs one index lifecycle action for the target described by the
//! environment (see `DeployerSettings::from_env`).
//!
//! Usage: `search-deployer <create|delete|upgrade|commit|dependents PATH...>`

use std::env;

use dotenv::dotenv;
use search_deployer::lifecycle::{LifecycleEvent, LifecycleHook};
use search_deployer::processor::SearchIndexingProcessor;
use search_deployer::upgrade::{UpgradeOperation, UpgradeOutcome};
use search_deployer::{Dependencies, DeployerError};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(
            "search_deployer=info,search_deployer_repository=info,search_deployer_shared=info",
        )
    });

    let json_logs = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logs {
        // Structured output for log collectors
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .init();
    }

    info!(
        service_name = "search-deployer",
        service_version = env!("CARGO_PKG_VERSION"),
        json = json_logs,
        "Tracing initialized"
    );
}

async fn run(deps: &Dependencies, action: &str, args: &[String]) -> Result<(), DeployerError> {
    match action {
        "create" => {
            deps.lifecycle_hook
                .execute(LifecycleEvent::TargetCreated)
                .await?
        }
        "delete" => {
            deps.lifecycle_hook
                .execute(LifecycleEvent::TargetDeleted)
                .await?
        }
        "upgrade" => match deps.upgrade_operation.execute(&deps.target).await? {
            UpgradeOutcome::NotApplicable { reason } => {
                info!(target_id = %deps.target.id, reason = %reason, "Upgrade skipped")
            }
            UpgradeOutcome::Recreated { alias } => {
                info!(target_id = %deps.target.id, alias = %alias, "Upgrade completed")
            }
        },
        "commit" => deps.indexing_processor.do_commit(&deps.index_id).await?,
        "dependents" => {
            if args.is_empty() {
                return Err(DeployerError::usage("dependents requires at least one path"));
            }
            let dependents = deps
                .indexing_processor
                .find_dependents(&deps.index_id, args)
                .await?;
            for path in &dependents {
                println!("{}", path);
            }
            info!(count = dependents.len(), "Dependents found");
        }
        other => {
            return Err(DeployerError::usage(format!(
                "unknown action '{}', expected create, delete, upgrade, commit or dependents",
                other
            )))
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), DeployerError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some((action, rest)) = args.split_first() else {
        return Err(DeployerError::usage(
            "missing action, expected create, delete, upgrade, commit or dependents",
        ));
    };

    info!(action = %action, "Starting search deployer");

    let deps = match Dependencies::new() {
        Ok(deps) => deps,
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    match run(&deps, action, rest).await {
        Ok(()) => {
            info!(action = %action, "Search deployer completed successfully");
            Ok(())
        }
        Err(e) => {
            error!(action = %action, error = %e, "Search deployer failed");
            Err(e)
        }
    }
}
