// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Access point manager over the remote file service
//!
//! Every operation is one stateless round trip: build the request, call the
//! client, translate the response or normalize the error. Nothing is cached
//! and nothing is retried; retry policy belongs to the caller. Dropping an
//! operation's future cancels the in-flight call.

use async_trait::async_trait;
use diagnostics::{debug, info};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::api::{
    ACCESS_POINT_NOT_FOUND, ApiError, CreateAccessPointInput, CreationInfo,
    DeleteAccessPointInput, DescribeAccessPointsInput, DescribeFileSystemsInput,
    DescribeMountTargetsInput, EfsApi, FILE_SYSTEM_NOT_FOUND, LifeCycleState,
    MountTargetDescription, RootDirectory,
};
use crate::config::{CloudConfig, MAX_LIST_RESULTS};
use crate::error::{CloudError, Result};
use crate::metadata::MetadataService;
use crate::model::{
    AccessPoint, AccessPointOptions, FileSystem, MountTarget, PosixUser, tags_from_map,
};
use crate::selection::{MountTargetPicker, RandomPicker};

/// Root path the service assigns when an access point has no explicit root directory
const DEFAULT_ROOT_DIR: &str = "/";

/// Cloud operations consumed by the provisioning driver
#[async_trait]
pub trait Cloud: Send + Sync {
    fn metadata(&self) -> &dyn MetadataService;

    /// Create an access point, or with `reuse_existing` return the one already
    /// created under `client_token` on the same file system.
    async fn create_access_point(
        &self,
        client_token: &str,
        options: &AccessPointOptions,
        reuse_existing: bool,
    ) -> Result<AccessPoint>;

    async fn delete_access_point(&self, access_point_id: &str) -> Result<()>;

    async fn describe_access_point(&self, access_point_id: &str) -> Result<AccessPoint>;

    /// List access points of a file system. A denied or missing file system
    /// yields an empty list rather than an error.
    async fn list_access_points(&self, file_system_id: &str) -> Result<Vec<AccessPoint>>;

    async fn describe_file_system(&self, file_system_id: &str) -> Result<FileSystem>;

    /// Pick an available mount target, preferring `az_name` when given.
    async fn describe_mount_targets(
        &self,
        file_system_id: &str,
        az_name: Option<&str>,
    ) -> Result<MountTarget>;
}

/// [`Cloud`] implementation backed by an [`EfsApi`] client
pub struct EfsCloud {
    api: Arc<dyn EfsApi>,
    metadata: Arc<dyn MetadataService>,
    picker: Arc<dyn MountTargetPicker>,
    call_timeout: Option<Duration>,
    list_max_results: i64,
}

impl EfsCloud {
    pub fn new(api: Arc<dyn EfsApi>, metadata: Arc<dyn MetadataService>) -> Self {
        Self {
            api,
            metadata,
            picker: Arc::new(RandomPicker),
            call_timeout: None,
            list_max_results: MAX_LIST_RESULTS,
        }
    }

    pub fn from_config(api: Arc<dyn EfsApi>, config: &CloudConfig) -> Result<Self> {
        config.validate()?;
        let region = config.region.as_str();
        debug!("Creating cloud for region {region}", region: region);

        let mut cloud = Self::new(api, Arc::new(config.metadata()))
            .with_list_max_results(config.list_max_results);
        if let Some(timeout) = config.call_timeout() {
            cloud = cloud.with_call_timeout(timeout);
        }
        Ok(cloud)
    }

    pub fn with_picker(mut self, picker: Arc<dyn MountTargetPicker>) -> Self {
        self.picker = picker;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Page size of the client-token lookup, clamped to `1..=MAX_LIST_RESULTS`
    pub fn with_list_max_results(mut self, max_results: i64) -> Self {
        self.list_max_results = max_results.clamp(1, MAX_LIST_RESULTS);
        self
    }

    /// Run one client call under the configured deadline. The outer result
    /// reports the deadline, the inner one is the client's own outcome.
    async fn call<T, F>(
        &self,
        operation: &'static str,
        request: F,
    ) -> Result<std::result::Result<T, ApiError>>
    where
        T: Send,
        F: Future<Output = std::result::Result<T, ApiError>> + Send,
    {
        match self.call_timeout {
            Some(timeout) => tokio::time::timeout(timeout, request)
                .await
                .map_err(|_| CloudError::Timeout { operation, timeout }),
            None => Ok(request.await),
        }
    }

    async fn find_access_point_by_client_token(
        &self,
        client_token: &str,
        options: &AccessPointOptions,
    ) -> Result<Option<AccessPoint>> {
        let file_system_id = options.file_system_id.as_str();
        debug!(
            "Searching access points of {file_system_id} for client token {client_token}",
            file_system_id: file_system_id,
            client_token: client_token
        );

        let input = DescribeAccessPointsInput {
            file_system_id: Some(options.file_system_id.clone()),
            max_results: Some(self.list_max_results),
            ..Default::default()
        };
        let res = match self
            .call("DescribeAccessPoints", self.api.describe_access_points(input))
            .await?
        {
            Ok(res) => res,
            Err(err) => {
                return match CloudError::translate(
                    &format!("List access points of file system {}", file_system_id),
                    err,
                    &[FILE_SYSTEM_NOT_FOUND],
                ) {
                    CloudError::AccessDenied | CloudError::NotFound => Ok(None),
                    other => Err(other),
                };
            }
        };

        let found = res
            .access_points
            .into_iter()
            .find(|ap| ap.client_token.as_deref() == Some(client_token))
            .map(|ap| AccessPoint {
                access_point_id: ap.access_point_id,
                file_system_id: ap.file_system_id,
                root_dir: ap
                    .root_directory
                    .map(|root| root.path)
                    .unwrap_or_else(|| DEFAULT_ROOT_DIR.to_string()),
                capacity_gib: 0,
                posix_user: ap.posix_user,
            });
        if found.is_none() {
            debug!("No access point exists for client token {client_token}", client_token: client_token);
        }
        Ok(found)
    }
}

#[async_trait]
impl Cloud for EfsCloud {
    fn metadata(&self) -> &dyn MetadataService {
        self.metadata.as_ref()
    }

    async fn create_access_point(
        &self,
        client_token: &str,
        options: &AccessPointOptions,
        reuse_existing: bool,
    ) -> Result<AccessPoint> {
        if reuse_existing {
            let existing = self
                .find_access_point_by_client_token(client_token, options)
                .await
                .map_err(|err| CloudError::Lookup {
                    client_token: client_token.to_string(),
                    source: Box::new(err),
                })?;
            if let Some(existing) = existing {
                let access_point_id = existing.access_point_id.as_str();
                info!(
                    "Reusing existing access point {access_point_id} for client token {client_token}",
                    access_point_id: access_point_id,
                    client_token: client_token
                );
                return Ok(AccessPoint {
                    access_point_id: existing.access_point_id,
                    file_system_id: existing.file_system_id,
                    root_dir: String::new(),
                    capacity_gib: options.capacity_gib,
                    posix_user: None,
                });
            }
        }

        let input = CreateAccessPointInput {
            client_token: client_token.to_string(),
            file_system_id: options.file_system_id.clone(),
            posix_user: PosixUser {
                uid: options.uid,
                gid: options.gid,
            },
            root_directory: RootDirectory {
                path: options.directory_path.clone(),
                creation_info: Some(CreationInfo {
                    owner_uid: options.uid,
                    owner_gid: options.gid,
                    permissions: options.directory_perms.clone(),
                }),
            },
            tags: tags_from_map(&options.tags),
        };
        let request = format!("{:?}", input);
        debug!("Calling CreateAccessPoint with input: {request}", request: request);

        let res = self
            .call("CreateAccessPoint", self.api.create_access_point(input))
            .await?
            .map_err(|err| CloudError::translate("Create access point", err, &[]))?;
        let response = format!("{:?}", res);
        debug!("CreateAccessPoint response: {response}", response: response);

        Ok(AccessPoint {
            access_point_id: res.access_point_id,
            file_system_id: res.file_system_id,
            root_dir: String::new(),
            capacity_gib: options.capacity_gib,
            posix_user: None,
        })
    }

    async fn delete_access_point(&self, access_point_id: &str) -> Result<()> {
        debug!("Calling DeleteAccessPoint for {access_point_id}", access_point_id: access_point_id);
        let input = DeleteAccessPointInput {
            access_point_id: access_point_id.to_string(),
        };
        self.call("DeleteAccessPoint", self.api.delete_access_point(input))
            .await?
            .map_err(|err| {
                CloudError::translate(
                    &format!("Delete access point {}", access_point_id),
                    err,
                    &[ACCESS_POINT_NOT_FOUND],
                )
            })
    }

    async fn describe_access_point(&self, access_point_id: &str) -> Result<AccessPoint> {
        let input = DescribeAccessPointsInput {
            access_point_id: Some(access_point_id.to_string()),
            ..Default::default()
        };
        let res = self
            .call("DescribeAccessPoints", self.api.describe_access_points(input))
            .await?
            .map_err(|err| {
                CloudError::translate("Describe access point", err, &[ACCESS_POINT_NOT_FOUND])
            })?;

        let mut access_points = res.access_points;
        if access_points.len() != 1 {
            return Err(CloudError::UnexpectedCount {
                operation: "Describe access point",
                resource: "access point",
                count: access_points.len(),
            });
        }
        let ap = access_points.remove(0);

        Ok(AccessPoint {
            access_point_id: ap.access_point_id,
            file_system_id: ap.file_system_id,
            root_dir: ap
                .root_directory
                .map(|root| root.path)
                .unwrap_or_else(|| DEFAULT_ROOT_DIR.to_string()),
            capacity_gib: 0,
            posix_user: None,
        })
    }

    async fn list_access_points(&self, file_system_id: &str) -> Result<Vec<AccessPoint>> {
        let input = DescribeAccessPointsInput {
            file_system_id: Some(file_system_id.to_string()),
            ..Default::default()
        };
        let res = match self
            .call("DescribeAccessPoints", self.api.describe_access_points(input))
            .await?
        {
            Ok(res) => res,
            Err(err) => {
                return match CloudError::translate("List access points", err, &[FILE_SYSTEM_NOT_FOUND]) {
                    CloudError::AccessDenied | CloudError::NotFound => {
                        debug!(
                            "Access points of {file_system_id} are not visible, returning none",
                            file_system_id: file_system_id
                        );
                        Ok(Vec::new())
                    }
                    other => Err(other),
                };
            }
        };

        let access_points = res
            .access_points
            .into_iter()
            .map(|ap| AccessPoint {
                access_point_id: ap.access_point_id,
                file_system_id: ap.file_system_id,
                root_dir: String::new(),
                capacity_gib: 0,
                // uid is reported from the record's gid; see DESIGN.md before changing
                posix_user: ap.posix_user.map(|user| PosixUser {
                    uid: user.gid,
                    gid: user.gid,
                }),
            })
            .collect();
        Ok(access_points)
    }

    async fn describe_file_system(&self, file_system_id: &str) -> Result<FileSystem> {
        let input = DescribeFileSystemsInput {
            file_system_id: file_system_id.to_string(),
        };
        let request = format!("{:?}", input);
        debug!("Calling DescribeFileSystems with input: {request}", request: request);

        let res = self
            .call("DescribeFileSystems", self.api.describe_file_systems(input))
            .await?
            .map_err(|err| {
                CloudError::translate("Describe file system", err, &[FILE_SYSTEM_NOT_FOUND])
            })?;

        let mut file_systems = res.file_systems;
        if file_systems.len() != 1 {
            return Err(CloudError::UnexpectedCount {
                operation: "Describe file system",
                resource: "file system",
                count: file_systems.len(),
            });
        }
        Ok(FileSystem {
            file_system_id: file_systems.remove(0).file_system_id,
        })
    }

    async fn describe_mount_targets(
        &self,
        file_system_id: &str,
        az_name: Option<&str>,
    ) -> Result<MountTarget> {
        let input = DescribeMountTargetsInput {
            file_system_id: file_system_id.to_string(),
        };
        let request = format!("{:?}", input);
        debug!("Calling DescribeMountTargets with input: {request}", request: request);

        let res = self
            .call("DescribeMountTargets", self.api.describe_mount_targets(input))
            .await?
            .map_err(|err| {
                CloudError::translate("Describe mount targets", err, &[FILE_SYSTEM_NOT_FOUND])
            })?;

        if res.mount_targets.is_empty() {
            return Err(CloudError::NoMountTargets(file_system_id.to_string()));
        }

        let available = available_mount_targets(res.mount_targets);
        if available.is_empty() {
            return Err(CloudError::NoAvailableMountTargets(file_system_id.to_string()));
        }

        let chosen = match az_name.filter(|az| !az.is_empty()) {
            Some(az) => mount_target_for_az(&available, az),
            None => None,
        };
        let chosen = match chosen {
            Some(mt) => mt,
            None => {
                let candidates = available.len();
                info!("Picking a random mount target among {candidates} available", candidates: candidates);
                let index = self.picker.pick(candidates).min(candidates - 1);
                &available[index]
            }
        };

        Ok(MountTarget {
            az_name: chosen.availability_zone_name.clone(),
            az_id: chosen.availability_zone_id.clone(),
            mount_target_id: chosen.mount_target_id.clone(),
            ip_address: chosen.ip_address.clone(),
        })
    }
}

fn available_mount_targets(mount_targets: Vec<MountTargetDescription>) -> Vec<MountTargetDescription> {
    mount_targets
        .into_iter()
        .filter(|mt| mt.life_cycle_state == LifeCycleState::Available)
        .collect()
}

fn mount_target_for_az<'a>(
    mount_targets: &'a [MountTargetDescription],
    az_name: &str,
) -> Option<&'a MountTargetDescription> {
    let found = mount_targets
        .iter()
        .find(|mt| mt.availability_zone_name == az_name);
    if found.is_none() {
        info!("There is no available mount target in {az_name}", az_name: az_name);
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryEfs;
    use crate::metadata::StaticMetadata;

    fn cloud_with_page(max_results: i64) -> EfsCloud {
        EfsCloud::new(Arc::new(MemoryEfs::new()), Arc::new(StaticMetadata::new("us-east-1")))
            .with_list_max_results(max_results)
    }

    #[test]
    fn test_list_max_results_is_clamped() {
        assert_eq!(cloud_with_page(0).list_max_results, 1);
        assert_eq!(cloud_with_page(-5).list_max_results, 1);
        assert_eq!(cloud_with_page(250).list_max_results, 250);
        assert_eq!(cloud_with_page(5000).list_max_results, MAX_LIST_RESULTS);
    }

    fn mount_target(id: &str, az: &str, state: LifeCycleState) -> MountTargetDescription {
        MountTargetDescription {
            mount_target_id: id.to_string(),
            file_system_id: "fs-1".to_string(),
            availability_zone_name: az.to_string(),
            availability_zone_id: format!("{}-id", az),
            ip_address: "10.0.0.1".to_string(),
            life_cycle_state: state,
        }
    }

    #[test]
    fn test_available_filter_keeps_order() {
        let targets = vec![
            mount_target("fsmt-1", "us-east-1a", LifeCycleState::Available),
            mount_target("fsmt-2", "us-east-1b", LifeCycleState::Creating),
            mount_target("fsmt-3", "us-east-1c", LifeCycleState::Available),
            mount_target("fsmt-4", "us-east-1d", LifeCycleState::Deleting),
        ];
        let ids: Vec<String> = available_mount_targets(targets)
            .into_iter()
            .map(|mt| mt.mount_target_id)
            .collect();
        assert_eq!(ids, vec!["fsmt-1", "fsmt-3"]);
    }

    #[test]
    fn test_mount_target_for_az() {
        let targets = vec![
            mount_target("fsmt-1", "us-east-1a", LifeCycleState::Available),
            mount_target("fsmt-2", "us-east-1b", LifeCycleState::Available),
        ];
        let found = mount_target_for_az(&targets, "us-east-1b").map(|mt| mt.mount_target_id.as_str());
        assert_eq!(found, Some("fsmt-2"));
        assert!(mount_target_for_az(&targets, "us-east-1z").is_none());
    }
}
