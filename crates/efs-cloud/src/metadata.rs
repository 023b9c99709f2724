// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Instance metadata exposed alongside the cloud operations

use serde::{Deserialize, Serialize};

/// Where the driver runs. Discovery of these values is the caller's job.
pub trait MetadataService: Send + Sync {
    fn region(&self) -> &str;
    fn instance_id(&self) -> &str;
    fn availability_zone(&self) -> &str;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticMetadata {
    pub region: String,
    #[serde(default)]
    pub instance_id: String,
    #[serde(default)]
    pub availability_zone: String,
}

impl StaticMetadata {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Default::default()
        }
    }

    pub fn with_instance(
        mut self,
        instance_id: impl Into<String>,
        availability_zone: impl Into<String>,
    ) -> Self {
        self.instance_id = instance_id.into();
        self.availability_zone = availability_zone.into();
        self
    }
}

impl MetadataService for StaticMetadata {
    fn region(&self) -> &str {
        &self.region
    }

    fn instance_id(&self) -> &str {
        &self.instance_id
    }

    fn availability_zone(&self) -> &str {
        &self.availability_zone
    }
}
