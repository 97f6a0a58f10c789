use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::error;

/// The only thing that outlives a restart: which user the dashboard tracks.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct StoredProfile {
    #[serde(default)]
    pub username: Option<String>,
}

pub async fn load_profile(path: &Path) -> StoredProfile {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(profile) => profile,
            Err(err) => {
                error!("failed to parse profile file: {err}");
                StoredProfile::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoredProfile::default(),
        Err(err) => {
            error!("failed to read profile file: {err}");
            StoredProfile::default()
        }
    }
}

pub async fn persist_profile(path: &Path, profile: &StoredProfile) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let payload = serde_json::to_vec_pretty(profile).map_err(AppError::internal)?;
    fs::write(path, payload).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("goal_dashboard_{}_{name}", std::process::id()));
        path
    }

    #[tokio::test]
    async fn missing_file_means_no_user() {
        let profile = load_profile(&temp_path("missing.json")).await;
        assert_eq!(profile.username, None);
    }

    #[tokio::test]
    async fn username_survives_a_round_trip() {
        let path = temp_path("nested").join("profile.json");
        let profile = StoredProfile {
            username: Some("U0123".to_string()),
        };
        persist_profile(&path, &profile).await.unwrap();
        assert_eq!(load_profile(&path).await, profile);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn corrupt_file_is_ignored() {
        let path = temp_path("corrupt.json");
        std::fs::write(&path, b"{not json").unwrap();
        assert_eq!(load_profile(&path).await, StoredProfile::default());
        let _ = std::fs::remove_file(&path);
    }
}
