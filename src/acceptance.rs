//! Acceptance scenarios
//!
//! A scenario deploys through the regular invoker with its own parameters and
//! then makes exactly one assertion about what the platform reports. An
//! assertion failure yields a failed report, while a provisioning failure is
//! returned as an error. Nothing is cleaned up afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::deploy::{DeploymentInvoker, APP_NAME};
use crate::error::{AppError, AppResult};
use crate::models::{DeployParams, DeployedApplication};
use crate::provider::ProviderHandle;

/// Message reported when the deployed app name is wrong
pub const APP_NAME_MISMATCH: &str = "falcosidekick-k8s app_name did not match expected";

/// Outcome of a scenario run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestStatus::Passed => write!(f, "passed"),
            TestStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A named deploy-and-check scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub params: DeployParams,
}

impl Scenario {
    pub fn basic_deploy() -> Self {
        Self {
            name: "basic_deploy".to_string(),
            params: DeployParams {
                channel: "latest/edge".to_string(),
                revision: Some(1),
            },
        }
    }

    /// All known scenarios
    pub fn all() -> Vec<Self> {
        vec![Self::basic_deploy()]
    }

    pub fn by_name(name: &str) -> AppResult<Self> {
        Self::all()
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| AppError::config(&format!("unknown scenario '{}'", name)))
    }
}

/// Result of running one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub scenario: String,
    pub status: TestStatus,
    pub message: Option<String>,
    pub deployed: DeployedApplication,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.status == TestStatus::Passed
    }
}

/// Deploy `scenario` through `provider` and check the reported app name
pub async fn run_scenario(
    provider: &ProviderHandle,
    scenario: &Scenario,
) -> AppResult<ScenarioReport> {
    let started_at = Utc::now();
    info!(scenario = %scenario.name, "Running scenario");

    let invoker = DeploymentInvoker::new(provider);
    let deployed = invoker.deploy(&scenario.params).await?;

    let (status, message) = if deployed.app_name == APP_NAME {
        (TestStatus::Passed, None)
    } else {
        error!(
            scenario = %scenario.name,
            expected = APP_NAME,
            actual = %deployed.app_name,
            "{}", APP_NAME_MISMATCH
        );
        (TestStatus::Failed, Some(APP_NAME_MISMATCH.to_string()))
    };

    let completed_at = Utc::now();
    info!(scenario = %scenario.name, %status, "Scenario finished");

    Ok(ScenarioReport {
        scenario: scenario.name.clone(),
        status,
        message,
        deployed,
        started_at,
        completed_at,
        duration_ms: (completed_at - started_at).num_milliseconds(),
    })
}
