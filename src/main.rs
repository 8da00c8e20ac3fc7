//! Failcast - main entry point

use clap::Parser;
use failcast::cli::{cmd_info, cmd_ingest, cmd_predict, report_failure, Cli, Commands};
use failcast::config::PipelineConfig;

fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "failcast=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ingest { data, store } => cmd_ingest(&data, &store),
        Commands::Predict {
            store,
            output,
            failure_threshold,
            rolling_window,
            key_sensors,
            n_estimators,
        } => {
            let mut config = PipelineConfig {
                failure_threshold,
                rolling_window,
                ..Default::default()
            };
            if let Some(sensors) = key_sensors {
                config.key_sensors = sensors;
            }
            cmd_predict(&store, &output, config, n_estimators)
        }
        Commands::Info { store } => cmd_info(&store),
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            report_failure(&err);
            std::process::ExitCode::FAILURE
        }
    }
}
