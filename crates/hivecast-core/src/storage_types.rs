use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// Reported by drivers in their info descriptor so that callers can route and
/// serialize sessions without knowing the concrete driver type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum StorageType {
    Swarm,
}

impl FromStr for StorageType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "swarm" => Ok(StorageType::Swarm),
            _ => Err(anyhow::anyhow!("Invalid storage type: {}", s)),
        }
    }
}

impl Display for StorageType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageType::Swarm => write!(f, "swarm"),
        }
    }
}

/// How a Swarm deployment performs uploads.
///
/// Chosen once per deployment, never per call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    /// Direct HTTP upload for content; the external tool only for feed manifests.
    #[default]
    Api,
    /// The external tool for every upload.
    Cli,
}

impl FromStr for UploadMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "api" => Ok(UploadMode::Api),
            "cli" => Ok(UploadMode::Cli),
            _ => Err(anyhow::anyhow!("Invalid upload mode: {}", s)),
        }
    }
}

impl Display for UploadMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadMode::Api => write!(f, "api"),
            UploadMode::Cli => write!(f, "cli"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_mode_parses_case_insensitively() {
        assert_eq!("API".parse::<UploadMode>().unwrap(), UploadMode::Api);
        assert_eq!(" cli ".parse::<UploadMode>().unwrap(), UploadMode::Cli);
        assert!("ftp".parse::<UploadMode>().is_err());
    }

    #[test]
    fn storage_type_display_round_trips() {
        let parsed: StorageType = StorageType::Swarm.to_string().parse().unwrap();
        assert_eq!(parsed, StorageType::Swarm);
    }
}
