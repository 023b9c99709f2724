// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Storage-service client capability
//!
//! `EfsApi` is the narrow slice of the remote file service that the cloud
//! layer consumes. A ready-to-use implementation is supplied by the caller
//! (an SDK wrapper in production, [`crate::MemoryEfs`] in tests). Request and
//! response types carry only the fields the cloud layer reads or writes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{PosixUser, Tag};

/// Error code returned when the caller lacks permission for an action
pub const ACCESS_DENIED_EXCEPTION: &str = "AccessDeniedException";

/// Error code for a conflicting access point creation
pub const ACCESS_POINT_ALREADY_EXISTS: &str = "AccessPointAlreadyExists";

/// Error code when the referenced file system does not exist
pub const FILE_SYSTEM_NOT_FOUND: &str = "FileSystemNotFound";

/// Error code when the referenced access point does not exist
pub const ACCESS_POINT_NOT_FOUND: &str = "AccessPointNotFound";

/// Structured error reported by a service client.
///
/// Service-side failures carry a machine-readable code. Transport failures
/// (connection reset, malformed response, ...) have none and are always
/// treated as generic by the cloud layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    code: Option<String>,
    message: String,
}

impl ApiError {
    /// An error returned by the service with a structured code
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// An error that never reached the service or could not be decoded
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    /// The service error code, if this error exposes one
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// True when this error exposes `code`
    pub fn has_code(&self, code: &str) -> bool {
        self.code() == Some(code)
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{}: {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ApiError {}

/// Lifecycle state of a remote resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifeCycleState {
    Creating,
    Available,
    Updating,
    Deleting,
    Deleted,
    Error,
}

/// Ownership and permissions applied when the service creates the root directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationInfo {
    pub owner_uid: i64,
    pub owner_gid: i64,
    /// Octal permission string, e.g. "0755"
    pub permissions: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootDirectory {
    pub path: String,
    #[serde(default)]
    pub creation_info: Option<CreationInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAccessPointInput {
    /// Idempotency key; repeated requests with the same token create at most one access point
    pub client_token: String,
    pub file_system_id: String,
    pub posix_user: PosixUser,
    pub root_directory: RootDirectory,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAccessPointOutput {
    pub access_point_id: String,
    pub file_system_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAccessPointInput {
    pub access_point_id: String,
}

/// Either `access_point_id` or `file_system_id` scopes the request; with
/// neither set every access point visible to the caller is returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribeAccessPointsInput {
    pub access_point_id: Option<String>,
    pub file_system_id: Option<String>,
    pub max_results: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPointDescription {
    pub access_point_id: String,
    pub file_system_id: String,
    #[serde(default)]
    pub client_token: Option<String>,
    #[serde(default)]
    pub root_directory: Option<RootDirectory>,
    #[serde(default)]
    pub posix_user: Option<PosixUser>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub life_cycle_state: LifeCycleState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribeAccessPointsOutput {
    pub access_points: Vec<AccessPointDescription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribeFileSystemsInput {
    pub file_system_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystemDescription {
    pub file_system_id: String,
    pub life_cycle_state: LifeCycleState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribeFileSystemsOutput {
    pub file_systems: Vec<FileSystemDescription>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribeMountTargetsInput {
    pub file_system_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountTargetDescription {
    pub mount_target_id: String,
    pub file_system_id: String,
    pub availability_zone_name: String,
    pub availability_zone_id: String,
    pub ip_address: String,
    pub life_cycle_state: LifeCycleState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribeMountTargetsOutput {
    pub mount_targets: Vec<MountTargetDescription>,
}

/// Remote file service operations used by [`crate::EfsCloud`].
///
/// Implementations must be safe to share between concurrent callers.
#[async_trait]
pub trait EfsApi: Send + Sync {
    async fn create_access_point(
        &self,
        input: CreateAccessPointInput,
    ) -> Result<CreateAccessPointOutput, ApiError>;

    async fn delete_access_point(&self, input: DeleteAccessPointInput) -> Result<(), ApiError>;

    async fn describe_access_points(
        &self,
        input: DescribeAccessPointsInput,
    ) -> Result<DescribeAccessPointsOutput, ApiError>;

    async fn describe_file_systems(
        &self,
        input: DescribeFileSystemsInput,
    ) -> Result<DescribeFileSystemsOutput, ApiError>;

    async fn describe_mount_targets(
        &self,
        input: DescribeMountTargetsInput,
    ) -> Result<DescribeMountTargetsOutput, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_exposes_code() {
        let err = ApiError::service(ACCESS_DENIED_EXCEPTION, "not allowed");
        assert_eq!(err.code(), Some(ACCESS_DENIED_EXCEPTION));
        assert!(err.has_code(ACCESS_DENIED_EXCEPTION));
        assert!(!err.has_code(FILE_SYSTEM_NOT_FOUND));
        assert_eq!(err.to_string(), "AccessDeniedException: not allowed");
    }

    #[test]
    fn test_transport_error_has_no_code() {
        let err = ApiError::transport("connection reset by peer");
        assert_eq!(err.code(), None);
        assert!(!err.has_code(ACCESS_DENIED_EXCEPTION));
        assert_eq!(err.to_string(), "connection reset by peer");
    }

    #[test]
    fn test_lifecycle_state_wire_format() {
        let state: LifeCycleState = serde_yaml_ng::from_str("available").unwrap();
        assert_eq!(state, LifeCycleState::Available);
        let text = serde_yaml_ng::to_string(&LifeCycleState::Creating).unwrap();
        assert_eq!(text.trim(), "creating");
    }
}
