//! Deployment invoker
//!
//! Turns deploy parameters into a single `ensure_deployed` request for the
//! falcosidekick application. Failures are returned as-is; there are no
//! retries at this layer.

use tracing::{info, instrument};

use crate::error::AppResult;
use crate::models::{DeployParams, DeployedApplication, DeploymentSpec};
use crate::provider::ProviderHandle;

/// Application name the charm is deployed under
pub const APP_NAME: &str = "falcosidekick-k8s";

/// Charm published on Charmhub
pub const CHARM_NAME: &str = "falcosidekick-k8s";

/// Target model
pub const MODEL_NAME: &str = "prod-falcosidekick-k8s-example";

/// Issues deploy requests for the fixed application/model pair
pub struct DeploymentInvoker<'a> {
    provider: &'a ProviderHandle,
}

impl<'a> DeploymentInvoker<'a> {
    pub fn new(provider: &'a ProviderHandle) -> Self {
        Self { provider }
    }

    /// Build the full spec for `params`
    pub fn spec(&self, params: &DeployParams) -> DeploymentSpec {
        DeploymentSpec {
            app_name: APP_NAME.to_string(),
            channel: params.channel.clone(),
            model: MODEL_NAME.to_string(),
            revision: params.revision,
        }
    }

    #[instrument(
        skip(self, params),
        fields(
            app_name = APP_NAME,
            model = MODEL_NAME,
            channel = %params.channel,
            revision = ?params.revision
        )
    )]
    pub async fn deploy(&self, params: &DeployParams) -> AppResult<DeployedApplication> {
        let spec = self.spec(params);
        let deployed = self.provider.ensure_deployed(&spec).await?;

        info!(
            status = %deployed.status,
            revision = deployed.revision_resolved,
            "Deployment ensured"
        );
        Ok(deployed)
    }

    pub async fn status(&self) -> AppResult<Option<DeployedApplication>> {
        Ok(self.provider.status(APP_NAME, MODEL_NAME).await?)
    }

    /// Remove the application. Never called implicitly.
    #[instrument(skip(self), fields(app_name = APP_NAME, model = MODEL_NAME))]
    pub async fn teardown(&self) -> AppResult<()> {
        self.provider.remove(APP_NAME, MODEL_NAME).await?;
        info!("Teardown complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::InMemoryProvisioner;

    #[test]
    fn test_spec_uses_fixed_names() {
        let handle = ProviderHandle::bind(InMemoryProvisioner::new()).unwrap();
        let invoker = DeploymentInvoker::new(&handle);
        let spec = invoker.spec(&DeployParams {
            channel: "2.32.0/edge".to_string(),
            revision: None,
        });

        assert_eq!(spec.app_name, "falcosidekick-k8s");
        assert_eq!(spec.model, "prod-falcosidekick-k8s-example");
        assert_eq!(spec.channel, "2.32.0/edge");
        assert_eq!(spec.revision, None);
    }

    #[tokio::test]
    async fn test_teardown_removes_application() {
        let handle = ProviderHandle::bind(InMemoryProvisioner::seeded()).unwrap();
        let invoker = DeploymentInvoker::new(&handle);
        invoker
            .deploy(&DeployParams {
                channel: "latest/edge".to_string(),
                revision: Some(2),
            })
            .await
            .unwrap();
        assert!(invoker.status().await.unwrap().is_some());

        invoker.teardown().await.unwrap();
        assert!(invoker.status().await.unwrap().is_none());
    }
}
