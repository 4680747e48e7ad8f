//! In-process provisioning platform
//!
//! Keeps a release catalog, a set of models and the deployments placed in
//! them. Behaves like the real platform for everything this crate relies on:
//! unpinned deploys resolve to the newest revision of the channel at request
//! time, re-deploys overwrite the previous channel/revision, and malformed
//! input is rejected here rather than by callers.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::{InterfaceVersion, Provisioner, REQUIRED_INTERFACE};
use crate::error::ProvisionError;
use crate::models::{AppStatus, Channel, DeployedApplication, DeploymentSpec};

#[derive(Debug, Default)]
struct PlatformState {
    /// Canonical channel -> published revisions
    catalog: HashMap<String, BTreeSet<u64>>,
    models: BTreeSet<String>,
    /// (model, app_name) -> deployment
    deployments: BTreeMap<(String, String), DeployedApplication>,
    reachable: bool,
    authorized: bool,
    allow_model_creation: bool,
}

/// A provisioning platform held entirely in memory
#[derive(Debug)]
pub struct InMemoryProvisioner {
    version: InterfaceVersion,
    state: RwLock<PlatformState>,
}

impl Default for InMemoryProvisioner {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryProvisioner {
    /// An empty, reachable platform that creates models on demand
    pub fn new() -> Self {
        Self {
            version: REQUIRED_INTERFACE,
            state: RwLock::new(PlatformState {
                reachable: true,
                authorized: true,
                allow_model_creation: true,
                ..Default::default()
            }),
        }
    }

    /// Platform pre-loaded with the channels the falcosidekick charm publishes
    pub fn seeded() -> Self {
        Self::new()
            .with_release("2.32.0/edge", [1, 2, 3, 4])
            .with_release("2.32.0/stable", [1, 2])
            .with_release("latest/edge", [1, 2, 3, 4, 5])
            .with_release("latest/stable", [1, 2, 3])
    }

    pub fn with_release<I>(mut self, channel: &str, revisions: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        self.state
            .get_mut()
            .catalog
            .entry(canonical(channel))
            .or_default()
            .extend(revisions);
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.state.get_mut().models.insert(model.to_string());
        self
    }

    pub fn without_model_creation(mut self) -> Self {
        self.state.get_mut().allow_model_creation = false;
        self
    }

    /// Report a different interface version, for binding tests
    pub fn with_interface_version(mut self, version: InterfaceVersion) -> Self {
        self.version = version;
        self
    }

    /// Publish a new revision to a channel
    pub async fn publish(&self, channel: &str, revision: u64) {
        let mut state = self.state.write().await;
        state
            .catalog
            .entry(canonical(channel))
            .or_default()
            .insert(revision);
        debug!(channel = %channel, revision, "Published revision");
    }

    pub async fn set_reachable(&self, reachable: bool) {
        self.state.write().await.reachable = reachable;
    }

    pub async fn set_authorized(&self, authorized: bool) {
        self.state.write().await.authorized = authorized;
    }

    pub async fn has_model(&self, model: &str) -> bool {
        self.state.read().await.models.contains(model)
    }

    /// Number of applications currently deployed across all models
    pub async fn deployment_count(&self) -> usize {
        self.state.read().await.deployments.len()
    }
}

/// Catalog key for a channel string; unparseable strings are kept verbatim
fn canonical(channel: &str) -> String {
    Channel::parse(channel)
        .map(|c| c.to_string())
        .unwrap_or_else(|_| channel.to_string())
}

impl PlatformState {
    fn check_access(&self) -> Result<(), ProvisionError> {
        if !self.reachable {
            return Err(ProvisionError::Unreachable(
                "in-memory platform is offline".to_string(),
            ));
        }
        if !self.authorized {
            return Err(ProvisionError::Unauthorized(
                "credentials rejected by in-memory platform".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Provisioner for InMemoryProvisioner {
    fn interface_version(&self) -> InterfaceVersion {
        self.version
    }

    #[instrument(skip(self, spec), fields(app_name = %spec.app_name, model = %spec.model))]
    async fn ensure_deployed(
        &self,
        spec: &DeploymentSpec,
    ) -> Result<DeployedApplication, ProvisionError> {
        let mut state = self.state.write().await;
        state.check_access()?;

        let channel = Channel::parse(&spec.channel)?.to_string();
        if let Some(revision) = spec.revision {
            if revision < 0 {
                return Err(ProvisionError::InvalidRevision(revision));
            }
        }

        if !state.models.contains(&spec.model) {
            if !state.allow_model_creation {
                return Err(ProvisionError::ModelNotFound(spec.model.clone()));
            }
            info!("Creating model");
            state.models.insert(spec.model.clone());
        }

        let revisions = state
            .catalog
            .get(&channel)
            .ok_or_else(|| ProvisionError::UnknownChannel(spec.channel.clone()))?;

        let revision_resolved = match spec.revision {
            Some(pinned) => {
                let pinned_u = pinned as u64;
                if !revisions.contains(&pinned_u) {
                    return Err(ProvisionError::RevisionNotFound {
                        channel: spec.channel.clone(),
                        revision: pinned,
                    });
                }
                pinned_u
            }
            None => *revisions
                .iter()
                .next_back()
                .ok_or_else(|| ProvisionError::UnknownChannel(spec.channel.clone()))?,
        };

        let deployed = DeployedApplication {
            app_name: spec.app_name.clone(),
            model: spec.model.clone(),
            channel,
            status: AppStatus::Active,
            revision_resolved,
        };

        let key = (spec.model.clone(), spec.app_name.clone());
        match state.deployments.insert(key, deployed.clone()) {
            Some(previous) if previous != deployed => info!(
                from_channel = %previous.channel,
                from_revision = previous.revision_resolved,
                to_channel = %deployed.channel,
                to_revision = deployed.revision_resolved,
                "Application refreshed"
            ),
            Some(_) => debug!("Application already at requested state"),
            None => info!(revision = revision_resolved, "Application deployed"),
        }

        Ok(deployed)
    }

    async fn status(
        &self,
        app_name: &str,
        model: &str,
    ) -> Result<Option<DeployedApplication>, ProvisionError> {
        let state = self.state.read().await;
        state.check_access()?;
        if !state.models.contains(model) {
            return Err(ProvisionError::ModelNotFound(model.to_string()));
        }
        Ok(state
            .deployments
            .get(&(model.to_string(), app_name.to_string()))
            .cloned())
    }

    #[instrument(skip(self))]
    async fn remove(&self, app_name: &str, model: &str) -> Result<(), ProvisionError> {
        let mut state = self.state.write().await;
        state.check_access()?;
        if state
            .deployments
            .remove(&(model.to_string(), app_name.to_string()))
            .is_none()
        {
            warn!("Application not deployed, nothing to remove");
        }
        Ok(())
    }
}
