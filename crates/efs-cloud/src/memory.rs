// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory file service
//!
//! `MemoryEfs` answers the [`EfsApi`] calls from process-local state with the
//! same observable rules as the remote service: existence checks, error
//! codes, client-token idempotency and page truncation. Tests seed it with
//! file systems, mount targets and raw access point records, inject failures
//! per operation, and count the calls that reached it.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::api::{
    ACCESS_POINT_NOT_FOUND, AccessPointDescription, ApiError, CreateAccessPointInput,
    CreateAccessPointOutput, DeleteAccessPointInput, DescribeAccessPointsInput,
    DescribeAccessPointsOutput, DescribeFileSystemsInput, DescribeFileSystemsOutput,
    DescribeMountTargetsInput, DescribeMountTargetsOutput, EfsApi, FILE_SYSTEM_NOT_FOUND,
    FileSystemDescription, LifeCycleState, MountTargetDescription,
};

/// The client operations, used to inject failures and count calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateAccessPoint,
    DeleteAccessPoint,
    DescribeAccessPoints,
    DescribeFileSystems,
    DescribeMountTargets,
}

#[derive(Default)]
struct State {
    file_systems: Vec<FileSystemDescription>,
    access_points: Vec<AccessPointDescription>,
    mount_targets: Vec<MountTargetDescription>,
    failures: HashMap<Operation, ApiError>,
    calls: HashMap<Operation, usize>,
    next_access_point: u64,
}

impl State {
    fn has_file_system(&self, file_system_id: &str) -> bool {
        self.file_systems
            .iter()
            .any(|fs| fs.file_system_id == file_system_id)
    }

    /// Count the call and return the injected failure, if any
    fn enter(&mut self, op: Operation) -> Result<(), ApiError> {
        *self.calls.entry(op).or_insert(0) += 1;
        match self.failures.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

fn file_system_not_found(file_system_id: &str) -> ApiError {
    ApiError::service(
        FILE_SYSTEM_NOT_FOUND,
        format!("File system '{}' does not exist.", file_system_id),
    )
}

fn access_point_not_found(access_point_id: &str) -> ApiError {
    ApiError::service(
        ACCESS_POINT_NOT_FOUND,
        format!("Access point '{}' does not exist.", access_point_id),
    )
}

#[derive(Default)]
pub struct MemoryEfs {
    state: Mutex<State>,
}

impl MemoryEfs {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register an available file system
    pub fn add_file_system(&self, file_system_id: impl Into<String>) {
        self.lock().file_systems.push(FileSystemDescription {
            file_system_id: file_system_id.into(),
            life_cycle_state: LifeCycleState::Available,
        });
    }

    /// Register a mount target; its file system is not checked so callers can
    /// model partially provisioned state.
    pub fn add_mount_target(&self, mount_target: MountTargetDescription) {
        self.lock().mount_targets.push(mount_target);
    }

    /// Insert a raw access point record, bypassing creation rules.
    /// Duplicate ids are kept, which models a misbehaving service.
    pub fn insert_access_point(&self, access_point: AccessPointDescription) {
        self.lock().access_points.push(access_point);
    }

    /// Make every following call of `op` fail with `err`
    pub fn fail(&self, op: Operation, err: ApiError) {
        self.lock().failures.insert(op, err);
    }

    pub fn clear_failure(&self, op: Operation) {
        self.lock().failures.remove(&op);
    }

    /// Number of calls of `op` received so far, failed ones included
    pub fn calls(&self, op: Operation) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn access_point_count(&self) -> usize {
        self.lock().access_points.len()
    }
}

#[async_trait]
impl EfsApi for MemoryEfs {
    async fn create_access_point(
        &self,
        input: CreateAccessPointInput,
    ) -> Result<CreateAccessPointOutput, ApiError> {
        let mut state = self.lock();
        state.enter(Operation::CreateAccessPoint)?;

        if !state.has_file_system(&input.file_system_id) {
            return Err(file_system_not_found(&input.file_system_id));
        }

        if let Some(existing) = state
            .access_points
            .iter()
            .find(|ap| ap.client_token.as_deref() == Some(input.client_token.as_str()))
        {
            return Ok(CreateAccessPointOutput {
                access_point_id: existing.access_point_id.clone(),
                file_system_id: existing.file_system_id.clone(),
            });
        }

        state.next_access_point += 1;
        let access_point_id = format!("fsap-{:017x}", state.next_access_point);
        state.access_points.push(AccessPointDescription {
            access_point_id: access_point_id.clone(),
            file_system_id: input.file_system_id.clone(),
            client_token: Some(input.client_token),
            root_directory: Some(input.root_directory),
            posix_user: Some(input.posix_user),
            tags: input.tags,
            life_cycle_state: LifeCycleState::Available,
        });

        Ok(CreateAccessPointOutput {
            access_point_id,
            file_system_id: input.file_system_id,
        })
    }

    async fn delete_access_point(&self, input: DeleteAccessPointInput) -> Result<(), ApiError> {
        let mut state = self.lock();
        state.enter(Operation::DeleteAccessPoint)?;

        let before = state.access_points.len();
        state
            .access_points
            .retain(|ap| ap.access_point_id != input.access_point_id);
        if state.access_points.len() == before {
            return Err(access_point_not_found(&input.access_point_id));
        }
        Ok(())
    }

    async fn describe_access_points(
        &self,
        input: DescribeAccessPointsInput,
    ) -> Result<DescribeAccessPointsOutput, ApiError> {
        let mut state = self.lock();
        state.enter(Operation::DescribeAccessPoints)?;

        let mut access_points: Vec<AccessPointDescription> = match (
            &input.access_point_id,
            &input.file_system_id,
        ) {
            (Some(access_point_id), _) => {
                let matching: Vec<_> = state
                    .access_points
                    .iter()
                    .filter(|ap| &ap.access_point_id == access_point_id)
                    .cloned()
                    .collect();
                if matching.is_empty() {
                    return Err(access_point_not_found(access_point_id));
                }
                matching
            }
            (None, Some(file_system_id)) => {
                if !state.has_file_system(file_system_id) {
                    return Err(file_system_not_found(file_system_id));
                }
                state
                    .access_points
                    .iter()
                    .filter(|ap| &ap.file_system_id == file_system_id)
                    .cloned()
                    .collect()
            }
            (None, None) => state.access_points.clone(),
        };

        if let Some(max) = input.max_results {
            access_points.truncate(usize::try_from(max).unwrap_or(0));
        }
        Ok(DescribeAccessPointsOutput { access_points })
    }

    async fn describe_file_systems(
        &self,
        input: DescribeFileSystemsInput,
    ) -> Result<DescribeFileSystemsOutput, ApiError> {
        let mut state = self.lock();
        state.enter(Operation::DescribeFileSystems)?;

        let file_systems: Vec<_> = state
            .file_systems
            .iter()
            .filter(|fs| fs.file_system_id == input.file_system_id)
            .cloned()
            .collect();
        if file_systems.is_empty() {
            return Err(file_system_not_found(&input.file_system_id));
        }
        Ok(DescribeFileSystemsOutput { file_systems })
    }

    async fn describe_mount_targets(
        &self,
        input: DescribeMountTargetsInput,
    ) -> Result<DescribeMountTargetsOutput, ApiError> {
        let mut state = self.lock();
        state.enter(Operation::DescribeMountTargets)?;

        if !state.has_file_system(&input.file_system_id) {
            return Err(file_system_not_found(&input.file_system_id));
        }
        let mount_targets = state
            .mount_targets
            .iter()
            .filter(|mt| mt.file_system_id == input.file_system_id)
            .cloned()
            .collect();
        Ok(DescribeMountTargetsOutput { mount_targets })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ACCESS_DENIED_EXCEPTION, RootDirectory};
    use crate::model::PosixUser;
    use tokio_test::block_on;

    fn create_input(fs: &str, token: &str) -> CreateAccessPointInput {
        CreateAccessPointInput {
            client_token: token.to_string(),
            file_system_id: fs.to_string(),
            posix_user: PosixUser { uid: 1000, gid: 1000 },
            root_directory: RootDirectory {
                path: format!("/dynamic/{}", token),
                creation_info: None,
            },
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_create_requires_file_system() {
        let efs = MemoryEfs::new();
        let err = block_on(efs.create_access_point(create_input("fs-missing", "t1"))).unwrap_err();
        assert!(err.has_code(FILE_SYSTEM_NOT_FOUND));
        assert_eq!(efs.access_point_count(), 0);
    }

    #[test]
    fn test_create_is_idempotent_per_client_token() {
        let efs = MemoryEfs::new();
        efs.add_file_system("fs-1");

        let first = block_on(efs.create_access_point(create_input("fs-1", "t1"))).unwrap();
        let second = block_on(efs.create_access_point(create_input("fs-1", "t1"))).unwrap();
        let other = block_on(efs.create_access_point(create_input("fs-1", "t2"))).unwrap();

        assert_eq!(first, second);
        assert_ne!(first.access_point_id, other.access_point_id);
        assert!(first.access_point_id.starts_with("fsap-"));
        assert_eq!(efs.access_point_count(), 2);
        assert_eq!(efs.calls(Operation::CreateAccessPoint), 3);
    }

    #[test]
    fn test_delete_unknown_access_point() {
        let efs = MemoryEfs::new();
        let err = block_on(efs.delete_access_point(DeleteAccessPointInput {
            access_point_id: "fsap-missing".to_string(),
        }))
        .unwrap_err();
        assert!(err.has_code(ACCESS_POINT_NOT_FOUND));
    }

    #[test]
    fn test_describe_truncates_to_max_results() {
        let efs = MemoryEfs::new();
        efs.add_file_system("fs-1");
        for token in ["a", "b", "c"] {
            block_on(efs.create_access_point(create_input("fs-1", token))).unwrap();
        }

        let res = block_on(efs.describe_access_points(DescribeAccessPointsInput {
            file_system_id: Some("fs-1".to_string()),
            max_results: Some(2),
            ..Default::default()
        }))
        .unwrap();
        assert_eq!(res.access_points.len(), 2);
    }

    #[test]
    fn test_injected_failure_persists_until_cleared() {
        let efs = MemoryEfs::new();
        efs.add_file_system("fs-1");
        efs.fail(
            Operation::DescribeFileSystems,
            ApiError::service(ACCESS_DENIED_EXCEPTION, "denied"),
        );

        let input = DescribeFileSystemsInput {
            file_system_id: "fs-1".to_string(),
        };
        assert!(block_on(efs.describe_file_systems(input.clone())).is_err());
        assert!(block_on(efs.describe_file_systems(input.clone())).is_err());

        efs.clear_failure(Operation::DescribeFileSystems);
        let res = block_on(efs.describe_file_systems(input)).unwrap();
        assert_eq!(res.file_systems.len(), 1);
        assert_eq!(efs.calls(Operation::DescribeFileSystems), 3);
    }
}
