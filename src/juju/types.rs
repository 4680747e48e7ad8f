use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ProvisionError;
use crate::models::{AppStatus, DeployedApplication};

/// Subset of `juju status --format json`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StatusOutput {
    #[serde(default)]
    pub applications: HashMap<String, ApplicationStatus>,
}

/// One entry of `applications` in the status output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationStatus {
    pub charm: Option<String>,
    #[serde(rename = "charm-channel")]
    pub charm_channel: Option<String>,
    #[serde(rename = "charm-rev")]
    pub charm_rev: Option<u64>,
    #[serde(rename = "application-status")]
    pub application_status: Option<StatusInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusInfo {
    pub current: String,
    pub message: Option<String>,
}

impl StatusOutput {
    /// Extract the deployed application named `app_name`, if present
    pub fn application(
        &self,
        app_name: &str,
        model: &str,
    ) -> Result<Option<DeployedApplication>, ProvisionError> {
        let Some(app) = self.applications.get(app_name) else {
            return Ok(None);
        };

        let revision_resolved = app.charm_rev.ok_or_else(|| {
            ProvisionError::UnexpectedOutput(format!("no charm-rev reported for {}", app_name))
        })?;
        let status = app
            .application_status
            .as_ref()
            .map(|s| AppStatus::from(s.current.as_str()))
            .unwrap_or(AppStatus::Unknown);

        Ok(Some(DeployedApplication {
            app_name: app_name.to_string(),
            model: model.to_string(),
            channel: app.charm_channel.clone().unwrap_or_default(),
            status,
            revision_resolved,
        }))
    }
}
