// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Domain model exposed to the provisioning driver
//!
//! These are local projections of remote state, fetched fresh on every call.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tag key the driver uses to record the originating volume claim
pub const PVC_NAME_TAG_KEY: &str = "pvcName";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystem {
    pub file_system_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosixUser {
    pub uid: i64,
    pub gid: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPoint {
    pub access_point_id: String,
    pub file_system_id: String,
    /// Root directory path inside the file system; empty unless described
    #[serde(default)]
    pub root_dir: String,
    /// Echo of the requested capacity. The service does not enforce capacity,
    /// it is carried for callers that do their own bookkeeping.
    #[serde(default)]
    pub capacity_gib: i64,
    #[serde(default)]
    pub posix_user: Option<PosixUser>,
}

/// Parameters for creating an access point
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPointOptions {
    #[serde(default)]
    pub capacity_gib: i64,
    pub file_system_id: String,
    pub uid: i64,
    pub gid: i64,
    /// Octal permissions for the root directory, e.g. "0700"
    pub directory_perms: String,
    pub directory_path: String,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

/// A network attachment point of a file system in one availability zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountTarget {
    pub az_name: String,
    pub az_id: String,
    pub mount_target_id: String,
    pub ip_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Convert a tag mapping into the key/value list the service expects.
///
/// The result is sorted by key so request logs are stable; the service
/// itself treats tags as an unordered set.
pub fn tags_from_map(tags: &HashMap<String, String>) -> Vec<Tag> {
    let mut list: Vec<Tag> = tags.iter().map(|(k, v)| Tag::new(k, v)).collect();
    list.sort_by(|a, b| a.key.cmp(&b.key));
    list
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_from_map_keeps_every_pair() {
        let mut tags = HashMap::new();
        tags.insert(PVC_NAME_TAG_KEY.to_string(), "pvc-123".to_string());
        tags.insert("env".to_string(), "prod".to_string());

        let list = tags_from_map(&tags);

        assert_eq!(list.len(), 2);
        assert!(list.contains(&Tag::new("pvcName", "pvc-123")));
        assert!(list.contains(&Tag::new("env", "prod")));
    }

    #[test]
    fn test_tags_from_empty_map() {
        assert!(tags_from_map(&HashMap::new()).is_empty());
    }

    #[test]
    fn test_access_point_options_from_yaml() {
        let yaml = r#"
file_system_id: fs-0123456789abcdef0
uid: 1000
gid: 1000
directory_perms: "0700"
directory_path: /dynamic/pvc-123
tags:
  pvcName: pvc-123
"#;
        let opts: AccessPointOptions = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(opts.file_system_id, "fs-0123456789abcdef0");
        assert_eq!(opts.capacity_gib, 0);
        assert_eq!(opts.directory_perms, "0700");
        assert_eq!(opts.tags.get(PVC_NAME_TAG_KEY).map(String::as_str), Some("pvc-123"));
    }
}
