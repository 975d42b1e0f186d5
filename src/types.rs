//! Core data types used throughout iacgen.
//!
//! This module defines:
//! - The AWS generation record filled in by the collection engine
//! - The interactive / non-interactive collection mode
//! - The report returned after a document is written

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Everything needed to generate the AWS Terraform document.
///
/// Created empty, filled in field by field by [`crate::collect`], then
/// read by [`crate::generate::AwsTerraform`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateAwsArgs {
    /// Configure the Cloudtrail integration
    pub configure_cloudtrail: bool,

    /// Configure the Config (CSPM) integration
    pub configure_config: bool,

    /// `configure_cloudtrail` was supplied on the command line
    pub configure_cloudtrail_cli: bool,

    /// `configure_config` was supplied on the command line
    pub configure_config_cli: bool,

    /// Region for the Cloudtrail, SNS and S3 resources
    pub aws_region: String,

    /// Profile for the main account, only used with sub-accounts
    pub aws_profile: String,

    /// Use an existing trail instead of creating one
    pub use_existing_cloudtrail: bool,

    /// Bucket of the existing trail
    pub existing_bucket_arn: String,

    /// Use an existing IAM role
    pub use_existing_iam_role: bool,

    /// Name of the existing IAM role
    pub existing_iam_role_name: String,

    /// ARN of the existing IAM role
    pub existing_iam_role_arn: String,

    /// External ID the existing IAM role trusts
    pub existing_iam_role_external_id: String,

    /// Existing SNS topic to reuse
    pub existing_sns_topic_arn: String,

    /// One trail shared by the main account and its sub-accounts
    pub use_consolidated_cloudtrail: bool,

    /// Destroy the new bucket even when it still holds logs
    pub force_destroy_s3_bucket: bool,

    /// Sub-account profile name to region
    pub profiles: BTreeMap<String, String>,

    /// Sub-accounts are being configured
    pub configure_more_accounts: bool,

    /// Lacework CLI profile for the `lacework` provider
    pub lacework_profile: String,
}

impl GenerateAwsArgs {
    /// Whether either integration is enabled.
    #[must_use]
    pub fn any_integration(&self) -> bool {
        self.configure_cloudtrail || self.configure_config
    }

    /// Whether any of the existing IAM role fields was supplied.
    #[must_use]
    pub fn has_existing_iam_role_details(&self) -> bool {
        !self.existing_iam_role_name.is_empty()
            || !self.existing_iam_role_arn.is_empty()
            || !self.existing_iam_role_external_id.is_empty()
    }

    /// Names of the existing IAM role fields left empty.
    #[must_use]
    pub fn missing_iam_role_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.existing_iam_role_name),
            ("ARN", &self.existing_iam_role_arn),
            ("external ID", &self.existing_iam_role_external_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

/// How the collection engine obtains answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollectMode {
    /// Ask the operator
    #[default]
    Interactive,
    /// Every question is skipped; fields keep their supplied values
    NonInteractive,
}

impl CollectMode {
    /// Whether questions are shown to the operator.
    #[must_use]
    pub fn is_interactive(self) -> bool {
        matches!(self, Self::Interactive)
    }
}

impl From<bool> for CollectMode {
    /// `true` means non-interactive.
    fn from(non_interactive: bool) -> Self {
        if non_interactive {
            Self::NonInteractive
        } else {
            Self::Interactive
        }
    }
}

/// Outcome of a successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateReport {
    /// Where the document was written
    pub location: PathBuf,

    /// Number of top-level blocks written
    pub blocks: usize,
}
