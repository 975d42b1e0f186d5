//! Error types for iacgen.
//!
//! This module defines the error hierarchy using `thiserror`. All errors
//! carry the source location they were raised from and can be propagated
//! with the `?` operator.
//!
//! # Error Categories
//!
//! - **Validation errors**: the collected configuration is incomplete
//! - **Prompt errors**: the operator aborted or the input stream closed
//! - **Render errors**: a block factory produced something HCL cannot express
//! - **IO errors**: the output directory or file could not be written
//! - **Config errors**: invalid `iacgen.yaml`
//!
//! # Example
//!
//! ```rust
//! use iacgen::error::{IacGenError, Result};
//!
//! fn read_config(path: &str) -> Result<String> {
//!     std::fs::read_to_string(path).map_err(|e| IacGenError::Io {
//!         path: path.into(),
//!         source: e,
//!         src_path: file!(),
//!         src_line: line!(),
//!     })
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Macro to create errors with automatic source location tracking.
///
/// Usage:
/// ```ignore
/// return Err(err!(ConfigMissing { key: "output.directory".to_string() }));
/// ```
#[macro_export]
macro_rules! err {
    ($variant:ident { $($field:ident: $value:expr),* $(,)? }) => {
        $crate::error::IacGenError::$variant {
            $($field: $value,)*
            src_path: file!(),
            src_line: line!(),
        }
    };
}

/// A specialized Result type for iacgen operations.
pub type Result<T> = std::result::Result<T, IacGenError>;

/// The main error type for iacgen.
#[derive(Error, Debug)]
pub enum IacGenError {
    // =========================================================================
    // I/O and File System Errors
    // =========================================================================
    /// I/O error with path context.
    #[error("I/O error at '{path}' ({src_path}:{src_line}): {source}")]
    Io {
        /// The path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    /// The home directory (default output location) could not be resolved.
    #[error("Unable to determine the home directory ({src_path}:{src_line})")]
    HomeDirectory {
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    // =========================================================================
    // Collection Errors
    // =========================================================================
    /// A prompt failed or the operator aborted input.
    #[error("Prompt '{question}' failed ({src_path}:{src_line}): {message}")]
    Prompt {
        /// The question being asked
        question: String,
        /// Error message
        message: String,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    /// The collected configuration failed a deferred check.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // =========================================================================
    // HCL Errors
    // =========================================================================
    /// HCL rendering error.
    #[error("Failed to render HCL ({src_path}:{src_line}): {message}")]
    HclRender {
        /// Error message
        message: String,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    /// Generated HCL does not parse back.
    #[error("Generated HCL is invalid ({src_path}:{src_line}): {message}")]
    HclParse {
        /// Error message
        message: String,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration parsing error.
    #[error("Failed to parse configuration ({src_path}:{src_line}): {message}")]
    ConfigParse {
        /// Error message
        message: String,
        /// The underlying error (if any)
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}' ({src_path}:{src_line}): {message}")]
    ConfigValue {
        /// The configuration key
        key: String,
        /// Error message
        message: String,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    /// Missing required configuration.
    #[error("Missing required configuration: {key} ({src_path}:{src_line})")]
    ConfigMissing {
        /// The missing configuration key
        key: String,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },

    // =========================================================================
    // Generic Errors
    // =========================================================================
    /// Internal error (a generator bug, never bad input).
    #[error("Internal error ({src_path}:{src_line}): {message}")]
    Internal {
        /// Error message
        message: String,
        /// Source file path
        src_path: &'static str,
        /// Source line number
        src_line: u32,
    },
}

/// Deferred checks run once collection has finished.
///
/// The messages are shown to the operator as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Neither integration was enabled.
    #[error("Must enable cloudtrail or config!")]
    NothingEnabled,

    /// An integration is enabled but no region was supplied.
    #[error("Must supply an AWS region!")]
    RegionRequired,

    /// An existing trail was requested without its bucket.
    #[error("Must supply bucket ARN when using an existing cloudtrail!")]
    BucketArnRequired,

    /// Only part of the existing IAM role was supplied.
    #[error("Must supply IAM role name, ARN and external ID when using an existing IAM role! (missing: {})", .missing.join(", "))]
    IncompleteIamRole {
        /// The fields left empty
        missing: Vec<&'static str>,
    },

    /// Sub-accounts were requested without a main account profile.
    #[error("Must supply the AWS profile for the main account!")]
    MainProfileRequired,

    /// A sub-account profile cannot be used as a provider alias.
    #[error("Invalid AWS profile name '{profile}'! Use letters, digits, '-' and '_', starting with a letter.")]
    InvalidProfile {
        /// The rejected profile name
        profile: String,
    },
}

impl IacGenError {
    /// Whether the operator can fix the error by changing their input.
    ///
    /// Render, parse and internal errors point at a generator defect.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Validation(_)
            | Self::Prompt { .. }
            | Self::ConfigParse { .. }
            | Self::ConfigValue { .. }
            | Self::ConfigMissing { .. }
            | Self::HomeDirectory { .. }
            | Self::Io { .. } => true,
            Self::HclRender { .. } | Self::HclParse { .. } | Self::Internal { .. } => false,
        }
    }

    /// Returns the appropriate exit code for the error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io { source, .. } if source.kind() == std::io::ErrorKind::PermissionDenied => 13,
            Self::Validation(_) => 2,
            Self::Prompt { .. } => 3,
            Self::ConfigParse { .. } => 18,
            Self::ConfigValue { .. } => 19,
            Self::ConfigMissing { .. } => 20,
            _ => 1,
        }
    }
}

/// Extension trait for `Result` to add context to errors.
pub trait ResultExt<T, E> {
    /// Adds a file path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| IacGenError::Io {
            path: path.into(),
            source: *e.into().downcast::<std::io::Error>().unwrap_or_else(|e| {
                Box::new(std::io::Error::new(std::io::ErrorKind::Other, e))
            }),
            src_path: file!(),
            src_line: line!(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_is_transparent() {
        let err: IacGenError = ValidationError::NothingEnabled.into();
        assert_eq!(err.to_string(), "Must enable cloudtrail or config!");
        assert_eq!(err.exit_code(), 2);
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_incomplete_role_lists_missing_fields() {
        let err = ValidationError::IncompleteIamRole { missing: vec!["name", "external ID"] };
        assert!(err.to_string().ends_with("(missing: name, external ID)"));
    }

    #[test]
    fn test_invalid_profile_names_the_profile() {
        let err: IacGenError = ValidationError::InvalidProfile { profile: "acme prod".to_string() }.into();
        assert!(err.to_string().starts_with("Invalid AWS profile name 'acme prod'!"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_err_macro_tracks_location() {
        let err = crate::err!(Internal { message: "boom".to_string() });
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("src/error.rs"));
    }

    #[test]
    fn test_with_path() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"));
        let err = result.with_path("/tmp/out").unwrap_err();
        assert_eq!(err.exit_code(), 13);
        assert!(err.to_string().contains("/tmp/out"));
    }
}
