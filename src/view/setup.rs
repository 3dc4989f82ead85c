//! Setup instructions shown instead of the app when configuration is invalid.

use serde::Serialize;

use crate::error::ConfigError;

pub const CLOUD_DASHBOARD_URL: &str = "https://cloud.reown.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupNotice {
    pub title: String,
    pub summary: String,
    pub steps: Vec<String>,
}

impl SetupNotice {
    pub fn missing_project_id() -> Self {
        Self {
            title: "Project ID Missing".into(),
            summary: "A project ID is required before the wallet connection can start.".into(),
            steps: vec![
                format!("Visit {} and sign in.", CLOUD_DASHBOARD_URL),
                "Create a new project, or open an existing one.".into(),
                "Copy the Project ID from the project dashboard.".into(),
                "Set PROJECT_ID in your environment (or .env file).".into(),
                "Restart the app.".into(),
            ],
        }
    }

    /// Instructions for any startup configuration error.
    pub fn for_error(error: &ConfigError) -> Self {
        match error {
            ConfigError::MissingProjectId => Self::missing_project_id(),
            other => Self {
                title: "Configuration Error".into(),
                summary: other.to_string(),
                steps: vec![
                    "Check the values in your environment (or .env file).".into(),
                    "Restart the app.".into(),
                ],
            },
        }
    }
}
