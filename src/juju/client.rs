use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error, info, instrument, warn};

use super::types::StatusOutput;
use crate::error::ProvisionError;
use crate::models::{Channel, DeployedApplication, DeploymentSpec};
use crate::provider::{InterfaceVersion, Provisioner};

/// Interface version implemented by this backend
pub const JUJU_INTERFACE_VERSION: InterfaceVersion = InterfaceVersion::new(0, 20, 0);

/// Client that shells out to the Juju CLI
#[derive(Debug, Clone)]
pub struct JujuClient {
    binary: String,
    charm: String,
}

/// What a failing command was asked to do, used to classify its stderr
#[derive(Debug, Clone, Copy)]
struct RequestContext<'a> {
    model: &'a str,
    channel: Option<&'a str>,
    revision: Option<i64>,
}

impl JujuClient {
    pub fn new(binary: impl Into<String>, charm: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            charm: charm.into(),
        }
    }

    /// Run one juju command, returning stdout on success
    async fn run(
        &self,
        args: &[String],
        ctx: RequestContext<'_>,
    ) -> Result<String, ProvisionError> {
        let command_line = format!("{} {}", self.binary, args.join(" "));
        debug!(command = %command_line, "Running juju");

        let output = Command::new(&self.binary)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                ProvisionError::Unreachable(format!("failed to execute {}: {}", self.binary, e))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if output.status.success() {
            if !stderr.trim().is_empty() {
                debug!(stderr = %stderr.trim(), "juju stderr");
            }
            Ok(stdout.to_string())
        } else {
            error!(command = %command_line, "juju command failed: {}", stderr.trim());
            Err(classify(&command_line, &stderr, ctx))
        }
    }

    /// Make sure `model` exists, creating it if needed
    #[instrument(skip(self))]
    async fn ensure_model(&self, model: &str) -> Result<(), ProvisionError> {
        let ctx = RequestContext {
            model,
            channel: None,
            revision: None,
        };

        match self.run(&args(&["show-model", model]), ctx).await {
            Ok(_) => Ok(()),
            Err(ProvisionError::ModelNotFound(_)) => {
                info!("Model not found, creating it");
                match self.run(&args(&["add-model", model]), ctx).await {
                    Ok(_) => Ok(()),
                    Err(e @ (ProvisionError::Unauthorized(_) | ProvisionError::Unreachable(_))) => {
                        Err(e)
                    }
                    Err(e) => {
                        warn!(error = %e, "Model creation failed");
                        Err(ProvisionError::ModelNotFound(model.to_string()))
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn read_status(
        &self,
        app_name: &str,
        model: &str,
    ) -> Result<Option<DeployedApplication>, ProvisionError> {
        let ctx = RequestContext {
            model,
            channel: None,
            revision: None,
        };
        let stdout = self
            .run(
                &args(&["status", app_name, "--model", model, "--format", "json"]),
                ctx,
            )
            .await?;

        let status: StatusOutput = serde_json::from_str(&stdout)
            .map_err(|e| ProvisionError::UnexpectedOutput(format!("juju status: {}", e)))?;
        status.application(app_name, model)
    }
}

fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

fn with_target(mut cmd: Vec<String>, spec: &DeploymentSpec) -> Vec<String> {
    cmd.extend(args(&["--model", &spec.model, "--channel", &spec.channel]));
    if let Some(revision) = spec.revision {
        cmd.push("--revision".to_string());
        cmd.push(revision.to_string());
    }
    cmd
}

/// Map juju stderr onto a provisioning failure
fn classify(command: &str, stderr: &str, ctx: RequestContext<'_>) -> ProvisionError {
    let msg = stderr.trim();
    let lower = msg.to_lowercase();
    let missing = ["not found", "not available", "does not exist", "no releases"]
        .iter()
        .any(|needle| lower.contains(needle));

    if ["permission denied", "unauthorized", "access denied"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        return ProvisionError::Unauthorized(msg.to_string());
    }

    if [
        "no controller",
        "cannot connect",
        "connection refused",
        "unable to connect",
        "no such host",
    ]
    .iter()
    .any(|needle| lower.contains(needle))
    {
        return ProvisionError::Unreachable(msg.to_string());
    }

    if lower.contains("model") && missing {
        return ProvisionError::ModelNotFound(ctx.model.to_string());
    }

    if let (Some(revision), Some(channel)) = (ctx.revision, ctx.channel) {
        if lower.contains("revision") && missing {
            return ProvisionError::RevisionNotFound {
                channel: channel.to_string(),
                revision,
            };
        }
    }

    if let Some(channel) = ctx.channel {
        if lower.contains("channel") && (missing || lower.contains("unknown")) {
            return ProvisionError::UnknownChannel(channel.to_string());
        }
    }

    ProvisionError::CommandFailed {
        command: command.to_string(),
        stderr: msg.to_string(),
    }
}

#[async_trait]
impl Provisioner for JujuClient {
    fn interface_version(&self) -> InterfaceVersion {
        JUJU_INTERFACE_VERSION
    }

    #[instrument(
        skip(self, spec),
        fields(app_name = %spec.app_name, model = %spec.model, channel = %spec.channel)
    )]
    async fn ensure_deployed(
        &self,
        spec: &DeploymentSpec,
    ) -> Result<DeployedApplication, ProvisionError> {
        Channel::parse(&spec.channel)?;
        if let Some(revision) = spec.revision {
            if revision < 0 {
                return Err(ProvisionError::InvalidRevision(revision));
            }
        }

        self.ensure_model(&spec.model).await?;

        let ctx = RequestContext {
            model: &spec.model,
            channel: Some(&spec.channel),
            revision: spec.revision,
        };

        match self.read_status(&spec.app_name, &spec.model).await? {
            None => {
                info!(charm = %self.charm, "Deploying application");
                let cmd = with_target(args(&["deploy", &self.charm, &spec.app_name]), spec);
                self.run(&cmd, ctx).await?;
            }
            Some(current)
                if current.channel == spec.channel
                    && spec.revision.map(|r| r as u64) == Some(current.revision_resolved) =>
            {
                info!(
                    revision = current.revision_resolved,
                    "Application already at requested revision"
                );
            }
            Some(current) => {
                info!(
                    from_channel = %current.channel,
                    from_revision = current.revision_resolved,
                    "Refreshing application"
                );
                let cmd = with_target(args(&["refresh", &spec.app_name]), spec);
                match self.run(&cmd, ctx).await {
                    Ok(_) => {}
                    Err(ProvisionError::CommandFailed { stderr, .. })
                        if stderr.to_lowercase().contains("already running") =>
                    {
                        debug!("Refresh was a no-op");
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        self.read_status(&spec.app_name, &spec.model)
            .await?
            .ok_or_else(|| {
                ProvisionError::UnexpectedOutput(format!(
                    "{} missing from status after deploy",
                    spec.app_name
                ))
            })
    }

    async fn status(
        &self,
        app_name: &str,
        model: &str,
    ) -> Result<Option<DeployedApplication>, ProvisionError> {
        self.read_status(app_name, model).await
    }

    #[instrument(skip(self))]
    async fn remove(&self, app_name: &str, model: &str) -> Result<(), ProvisionError> {
        let ctx = RequestContext {
            model,
            channel: None,
            revision: None,
        };
        let cmd = args(&["remove-application", app_name, "--model", model, "--no-prompt"]);

        match self.run(&cmd, ctx).await {
            Ok(_) => {
                info!("Application removal requested");
                Ok(())
            }
            Err(ProvisionError::CommandFailed { stderr, .. })
                if stderr.to_lowercase().contains("not found") =>
            {
                warn!("Application not deployed, nothing to remove");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
