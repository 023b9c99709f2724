// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Cloud configuration loaded from YAML

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::CloudError;
use crate::metadata::StaticMetadata;

/// Page size the service accepts at most for access point listings
pub const MAX_LIST_RESULTS: i64 = 1000;

fn default_list_max_results() -> i64 {
    MAX_LIST_RESULTS
}

/// Example:
///
/// ```yaml
/// region: us-west-2
/// instance_id: i-0abcdef1234567890
/// availability_zone: us-west-2a
/// call_timeout_secs: 30
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudConfig {
    pub region: String,

    #[serde(default)]
    pub instance_id: String,

    #[serde(default)]
    pub availability_zone: String,

    /// Deadline for each remote call; unset means wait as long as the client does
    #[serde(default)]
    pub call_timeout_secs: Option<u64>,

    /// Page size used when searching access points by client token
    #[serde(default = "default_list_max_results")]
    pub list_max_results: i64,
}

impl CloudConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            instance_id: String::new(),
            availability_zone: String::new(),
            call_timeout_secs: None,
            list_max_results: MAX_LIST_RESULTS,
        }
    }

    /// Load and validate configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CloudError> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self, CloudError> {
        let config: CloudConfig = serde_yaml_ng::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CloudError> {
        if self.region.trim().is_empty() {
            return Err(CloudError::Configuration(
                "region cannot be empty".to_string(),
            ));
        }
        if self.call_timeout_secs == Some(0) {
            return Err(CloudError::Configuration(
                "call_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if !(1..=MAX_LIST_RESULTS).contains(&self.list_max_results) {
            return Err(CloudError::Configuration(format!(
                "list_max_results must be between 1 and {}, got {}",
                MAX_LIST_RESULTS, self.list_max_results
            )));
        }
        Ok(())
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_secs.map(Duration::from_secs)
    }

    pub fn metadata(&self) -> StaticMetadata {
        StaticMetadata::new(&self.region)
            .with_instance(&self.instance_id, &self.availability_zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataService;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = CloudConfig::from_yaml_str("region: us-east-1\n").unwrap();
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.list_max_results, MAX_LIST_RESULTS);
        assert_eq!(config.call_timeout(), None);
        assert_eq!(config.metadata().region(), "us-east-1");
        assert_eq!(config.metadata().availability_zone(), "");
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
region: eu-west-1
instance_id: i-0abcdef1234567890
availability_zone: eu-west-1b
call_timeout_secs: 15
list_max_results: 200
"#;
        let config = CloudConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.call_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.list_max_results, 200);
        let metadata = config.metadata();
        assert_eq!(metadata.instance_id(), "i-0abcdef1234567890");
        assert_eq!(metadata.availability_zone(), "eu-west-1b");
    }

    #[test]
    fn test_rejects_empty_region() {
        let err = CloudConfig::from_yaml_str("region: \"\"\n").unwrap_err();
        assert!(matches!(err, CloudError::Configuration(_)));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = CloudConfig::from_yaml_str("region: us-east-1\ncall_timeout_secs: 0\n").unwrap_err();
        assert!(matches!(err, CloudError::Configuration(_)));
    }

    #[test]
    fn test_rejects_oversized_page() {
        let err = CloudConfig::from_yaml_str("region: us-east-1\nlist_max_results: 5000\n").unwrap_err();
        assert!(err.to_string().contains("list_max_results"));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = CloudConfig::from_yaml_str("region: [unclosed").unwrap_err();
        assert!(matches!(err, CloudError::Yaml(_)));
    }
}
