use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use falcosidekick_deploy::{
    acceptance::{run_scenario, Scenario},
    config::{Config, LogFormat, RevisionOverride},
    deploy::{DeploymentInvoker, CHARM_NAME},
    init_tracing,
    juju::JujuClient,
    provider::{InMemoryProvisioner, ProviderHandle},
};

#[derive(Parser)]
#[command(name = "falcosidekick-deploy")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Deploy falcosidekick-k8s onto a Juju model", long_about = None)]
struct Cli {
    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Provisioning backend
    #[arg(long, global = true, value_enum, default_value_t = ProviderKind::Juju)]
    provider: ProviderKind,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProviderKind {
    /// The local `juju` client
    Juju,
    /// In-process platform, for rehearsals
    Memory,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy or refresh the application
    Deploy {
        /// Release channel, `<track>/<risk>`
        #[arg(long)]
        channel: Option<String>,

        /// Pin an exact revision
        #[arg(long, allow_negative_numbers = true, conflicts_with = "latest")]
        revision: Option<i64>,

        /// Follow the newest revision in the channel, ignoring any configured pin
        #[arg(long)]
        latest: bool,
    },

    /// Show the deployed application
    Status,

    /// Remove the application from the model
    Teardown,

    /// Run an acceptance scenario
    Acceptance {
        #[arg(long, default_value = "basic_deploy")]
        scenario: String,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

fn bind_provider(kind: ProviderKind, config: &Config) -> Result<ProviderHandle> {
    let handle = match kind {
        ProviderKind::Juju => {
            ProviderHandle::bind(JujuClient::new(config.juju_binary.clone(), CHARM_NAME))
        }
        ProviderKind::Memory => ProviderHandle::bind(InMemoryProvisioner::seeded()),
    };
    handle.context("Failed to bind provisioning provider")
}

async fn run(cli: Cli, config: Config) -> Result<bool> {
    let provider = bind_provider(cli.provider, &config)?;

    match cli.command {
        Commands::Deploy {
            channel,
            revision,
            latest,
        } => {
            let revision = match (revision, latest) {
                (Some(r), _) => RevisionOverride::Pin(r),
                (None, true) => RevisionOverride::Latest,
                (None, false) => RevisionOverride::Keep,
            };
            let params = config.with_overrides(channel, revision).deploy_params();

            let deployed = DeploymentInvoker::new(&provider)
                .deploy(&params)
                .await
                .context("Deployment failed")?;
            print_json(&deployed)?;
            Ok(true)
        }
        Commands::Status => {
            let status = DeploymentInvoker::new(&provider)
                .status()
                .await
                .context("Failed to read status")?;
            print_json(&status)?;
            Ok(true)
        }
        Commands::Teardown => {
            DeploymentInvoker::new(&provider)
                .teardown()
                .await
                .context("Teardown failed")?;
            Ok(true)
        }
        Commands::Acceptance { scenario } => {
            let scenario = Scenario::by_name(&scenario)?;
            let report = run_scenario(&provider, &scenario)
                .await
                .with_context(|| format!("Scenario {} could not run", scenario.name))?;
            print_json(&report)?;
            Ok(report.passed())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(if cli.json { LogFormat::Json } else { LogFormat::Text });
            tracing::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let format = if cli.json { LogFormat::Json } else { config.log_format };
    init_tracing(format);
    tracing::info!(channel = %config.channel, revision = ?config.revision, "Configuration loaded");

    match run(cli, config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
