use serde::{Deserialize, Serialize};
use strum::Display;

/// Workload status of a deployed application, as reported by the platform
#[derive(Debug, Clone, Serialize, Deserialize, Display, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AppStatus {
    Active,
    Waiting,
    Maintenance,
    Blocked,
    Error,
    Unknown,
}

impl From<String> for AppStatus {
    fn from(s: String) -> Self {
        AppStatus::from(s.as_str())
    }
}

impl From<&str> for AppStatus {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "active" => AppStatus::Active,
            "waiting" => AppStatus::Waiting,
            "maintenance" => AppStatus::Maintenance,
            "blocked" => AppStatus::Blocked,
            "error" => AppStatus::Error,
            _ => AppStatus::Unknown,
        }
    }
}

/// Desired state of one deployment unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeploymentSpec {
    pub app_name: String,
    pub channel: String,
    pub model: String,
    /// Exact build to pin. `None` follows the latest revision in `channel`.
    pub revision: Option<i64>,
}

/// Caller-facing parameters of a deploy request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeployParams {
    pub channel: String,
    pub revision: Option<i64>,
}

/// What the provisioning platform reports after `ensure_deployed`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeployedApplication {
    pub app_name: String,
    pub model: String,
    pub channel: String,
    pub status: AppStatus,
    pub revision_resolved: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_status_from_platform_string() {
        assert_eq!(AppStatus::from("active"), AppStatus::Active);
        assert_eq!(AppStatus::from("Waiting"), AppStatus::Waiting);
        assert_eq!(AppStatus::from("terminated"), AppStatus::Unknown);
        assert_eq!(AppStatus::Maintenance.to_string(), "maintenance");
    }

    #[test]
    fn test_deployed_application_serialization() {
        let app = DeployedApplication {
            app_name: "falcosidekick-k8s".to_string(),
            model: "m".to_string(),
            channel: "latest/edge".to_string(),
            status: AppStatus::Active,
            revision_resolved: 3,
        };

        let json = serde_json::to_value(&app).unwrap();
        assert_eq!(json["app_name"], "falcosidekick-k8s");
        assert_eq!(json["status"], "active");
        assert_eq!(json["revision_resolved"], 3);
    }
}
