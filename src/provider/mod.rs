//! Provisioning interface
//!
//! A `Provisioner` is the binding to the platform that actually places
//! charms into models. The binding is constructed once at process start,
//! checked against the interface version this crate was written for, and
//! passed explicitly to everything that deploys.

pub mod memory;
mod version;

use std::ops::Deref;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::error::ProvisionError;
use crate::models::{DeployedApplication, DeploymentSpec};

pub use memory::InMemoryProvisioner;
pub use version::InterfaceVersion;

/// Interface family every backend must belong to
pub const REQUIRED_INTERFACE: InterfaceVersion = InterfaceVersion::new(0, 20, 0);

/// Operations offered by a provisioning platform
#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Interface version implemented by this backend
    fn interface_version(&self) -> InterfaceVersion;

    /// Create the application, or move it to the requested channel/revision
    /// if it already exists.
    async fn ensure_deployed(
        &self,
        spec: &DeploymentSpec,
    ) -> Result<DeployedApplication, ProvisionError>;

    /// Current state of an application, `None` if it is not deployed
    async fn status(
        &self,
        app_name: &str,
        model: &str,
    ) -> Result<Option<DeployedApplication>, ProvisionError>;

    /// Remove an application from a model
    async fn remove(&self, app_name: &str, model: &str) -> Result<(), ProvisionError>;
}

/// A bound, version-checked provisioner
#[derive(Clone)]
pub struct ProviderHandle {
    inner: Arc<dyn Provisioner>,
}

impl ProviderHandle {
    /// Bind to a provisioner, rejecting incompatible interface versions
    pub fn bind<P>(provisioner: P) -> Result<Self, ProvisionError>
    where
        P: Provisioner + 'static,
    {
        Self::bind_shared(Arc::new(provisioner))
    }

    pub fn bind_shared(provisioner: Arc<dyn Provisioner>) -> Result<Self, ProvisionError> {
        let found = provisioner.interface_version();
        if !found.is_compatible_with(&REQUIRED_INTERFACE) {
            return Err(ProvisionError::IncompatibleProvider {
                found: found.to_string(),
                required: format!("{}.{}.x", REQUIRED_INTERFACE.major, REQUIRED_INTERFACE.minor),
            });
        }

        info!(interface_version = %found, "Provider bound");
        Ok(Self { inner: provisioner })
    }
}

impl Deref for ProviderHandle {
    type Target = dyn Provisioner;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}
