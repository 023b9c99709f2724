// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for cloud operations

use std::time::Duration;
use thiserror::Error;

use crate::api::{ACCESS_DENIED_EXCEPTION, ApiError};

/// Result type for cloud operations
pub type Result<T> = std::result::Result<T, CloudError>;

#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Resource was not found")]
    NotFound,

    /// Reserved for creation conflicts; no operation raises it today
    #[error("Resource already exists")]
    AlreadyExists,

    #[error("Access denied")]
    AccessDenied,

    #[error("{operation} failed: {source}")]
    Service {
        operation: String,
        #[source]
        source: ApiError,
    },

    #[error(
        "{operation} failed: expected exactly 1 {resource} in result, received {count}"
    )]
    UnexpectedCount {
        operation: &'static str,
        resource: &'static str,
        count: usize,
    },

    #[error(
        "Cannot find mount targets for file system {0}. Please create mount targets for file system."
    )]
    NoMountTargets(String),

    #[error("No mount target for file system {0} is in available state. Please retry in 5 minutes.")]
    NoAvailableMountTargets(String),

    #[error("Failed to find access point with client token {client_token}: {source}")]
    Lookup {
        client_token: String,
        #[source]
        source: Box<CloudError>,
    },

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl CloudError {
    pub fn service(operation: impl Into<String>, source: ApiError) -> Self {
        CloudError::Service {
            operation: operation.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::NotFound)
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, CloudError::AlreadyExists)
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self, CloudError::AccessDenied)
    }

    /// Normalize a client error for `operation`.
    ///
    /// Access denied always wins; any code listed in `not_found_codes` becomes
    /// `NotFound`; everything else, including errors without a code, is
    /// wrapped as a generic service failure.
    pub(crate) fn translate(operation: &str, err: ApiError, not_found_codes: &[&str]) -> Self {
        if err.has_code(ACCESS_DENIED_EXCEPTION) {
            return CloudError::AccessDenied;
        }
        if not_found_codes.iter().any(|code| err.has_code(code)) {
            return CloudError::NotFound;
        }
        CloudError::service(operation, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ACCESS_POINT_NOT_FOUND, FILE_SYSTEM_NOT_FOUND};

    #[test]
    fn test_translate_access_denied() {
        let err = ApiError::service(ACCESS_DENIED_EXCEPTION, "denied");
        let translated = CloudError::translate("Delete access point", err, &[ACCESS_POINT_NOT_FOUND]);
        assert!(translated.is_access_denied());
    }

    #[test]
    fn test_translate_not_found_only_for_listed_codes() {
        let err = ApiError::service(FILE_SYSTEM_NOT_FOUND, "no such file system");
        assert!(CloudError::translate("Describe file system", err.clone(), &[FILE_SYSTEM_NOT_FOUND]).is_not_found());

        let other = CloudError::translate("Delete access point", err, &[ACCESS_POINT_NOT_FOUND]);
        assert!(matches!(other, CloudError::Service { .. }));
    }

    #[test]
    fn test_translate_without_code_is_generic() {
        let err = ApiError::transport("AccessDeniedException");
        let translated = CloudError::translate("Create access point", err, &[]);
        match translated {
            CloudError::Service { operation, source } => {
                assert_eq!(operation, "Create access point");
                assert_eq!(source.code(), None);
            }
            other => panic!("expected service error, got {other:?}"),
        }
    }

    #[test]
    fn test_service_error_message_names_operation() {
        let err = CloudError::service("Describe mount targets", ApiError::service("InternalServerError", "boom"));
        assert_eq!(
            err.to_string(),
            "Describe mount targets failed: InternalServerError: boom"
        );
    }

    #[test]
    fn test_mount_target_errors_are_distinct() {
        let none = CloudError::NoMountTargets("fs-1".to_string()).to_string();
        let unavailable = CloudError::NoAvailableMountTargets("fs-1".to_string()).to_string();
        assert!(none.contains("create mount targets"));
        assert!(unavailable.contains("retry"));
        assert_ne!(none, unavailable);
    }
}
