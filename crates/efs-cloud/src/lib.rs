// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Cloud adapter for a managed elastic file service
//!
//! This crate gives a storage provisioning driver a small typed view of the
//! remote file service: file systems, access points and mount targets. It
//! translates requests and responses and normalizes service errors into
//! [`CloudError::NotFound`], [`CloudError::AccessDenied`] and generic
//! failures. The service client itself is supplied by the caller through the
//! [`EfsApi`] trait; credentials, endpoints and region discovery are the
//! caller's concern.
//!
//! # Architecture
//!
//! - **Cloud**: the six operations the driver uses, plus instance metadata
//! - **EfsCloud**: `Cloud` over an `EfsApi` client, a mount target picker and
//!   an optional per-call deadline
//! - **MemoryEfs**: an in-process `EfsApi` for tests and sanity checks
//!
//! # Usage
//!
//! ```no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use efs_cloud::{AccessPointOptions, Cloud, CloudConfig, EfsCloud, MemoryEfs};
//! use std::sync::Arc;
//!
//! let config = CloudConfig::load("/etc/efs-cloud.yaml")?;
//! let api = Arc::new(MemoryEfs::new());
//! api.add_file_system("fs-0123456789abcdef0");
//! let cloud = EfsCloud::from_config(api, &config)?;
//!
//! let options = AccessPointOptions {
//!     file_system_id: "fs-0123456789abcdef0".to_string(),
//!     uid: 1000,
//!     gid: 1000,
//!     directory_perms: "0700".to_string(),
//!     directory_path: "/dynamic/pvc-123".to_string(),
//!     ..Default::default()
//! };
//! let access_point = cloud.create_access_point("pvc-123", &options, true).await?;
//! let mount_target = cloud
//!     .describe_mount_targets(&access_point.file_system_id, Some("us-west-2a"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod api;
mod cloud;
mod config;
mod error;
mod memory;
mod metadata;
mod model;
mod selection;

pub use api::{
    ACCESS_DENIED_EXCEPTION, ACCESS_POINT_ALREADY_EXISTS, ACCESS_POINT_NOT_FOUND,
    AccessPointDescription, ApiError, CreateAccessPointInput, CreateAccessPointOutput,
    CreationInfo, DeleteAccessPointInput, DescribeAccessPointsInput, DescribeAccessPointsOutput,
    DescribeFileSystemsInput, DescribeFileSystemsOutput, DescribeMountTargetsInput,
    DescribeMountTargetsOutput, EfsApi, FILE_SYSTEM_NOT_FOUND, FileSystemDescription,
    LifeCycleState, MountTargetDescription, RootDirectory,
};
pub use cloud::{Cloud, EfsCloud};
pub use config::{CloudConfig, MAX_LIST_RESULTS};
pub use error::{CloudError, Result};
pub use memory::{MemoryEfs, Operation};
pub use metadata::{MetadataService, StaticMetadata};
pub use model::{
    AccessPoint, AccessPointOptions, FileSystem, MountTarget, PVC_NAME_TAG_KEY, PosixUser, Tag,
    tags_from_map,
};
pub use selection::{FirstPicker, MountTargetPicker, RandomPicker};
