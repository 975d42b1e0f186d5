//! Command-line interface module.
//!
//! This module defines the CLI structure using Clap, including
//! all commands, arguments, and options.
//!
//! # Commands
//!
//! - `generate aws`: Collect settings and write Terraform code for AWS
//! - `init`: Create an example configuration file
//! - `validate`: Validate a configuration file
//!
//! # Example Usage
//!
//! ```bash
//! # Answer the questions interactively
//! iacgen generate aws
//!
//! # Everything from flags
//! iacgen --non-interactive generate aws --enable-config --enable-cloudtrail --aws-region us-east-2
//!
//! # Consolidated trail with two sub-accounts
//! iacgen --non-interactive iac aws --enable-config --enable-cloudtrail --aws-region us-east-2 \
//!     --consolidated-cloudtrail --aws-profile main \
//!     --aws-subaccount dev:us-east-1 --aws-subaccount prod:us-west-2
//!
//! # Initialize configuration
//! iacgen init
//! ```

use crate::types::GenerateAwsArgs;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// iacgen - Terraform code generator for the Lacework AWS integrations.
#[derive(Parser, Debug)]
#[command(
    name = "iacgen",
    author,
    version,
    about = "Terraform code generator for the Lacework AWS integrations",
    long_about = "iacgen asks which Lacework integrations to set up (Config, Cloudtrail, \
                  existing trails and IAM roles, sub-accounts), validates the answers and \
                  writes a ready-to-apply Terraform file."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "IACGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Never prompt; only use values passed as flags
    #[arg(long, global = true, env = "IACGEN_NONINTERACTIVE")]
    pub non_interactive: bool,

    /// Print the result as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate infrastructure-as-code
    #[command(visible_alias = "iac", alias = "iac-generate")]
    Generate(GenerateArgs),

    /// Create an example configuration file
    Init,

    /// Validate a configuration file
    Validate(ValidateArgs),
}

/// Arguments for the generate command.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Target cloud
    #[command(subcommand)]
    pub target: GenerateTarget,
}

/// Clouds code can be generated for.
#[derive(Subcommand, Debug)]
pub enum GenerateTarget {
    /// Terraform code for the Lacework AWS integrations
    Aws(AwsArgs),
}

/// Arguments for `generate aws`.
#[derive(Args, Debug, Default)]
pub struct AwsArgs {
    /// Enable the Cloudtrail integration
    #[arg(long)]
    pub enable_cloudtrail: bool,

    /// Enable the Config integration
    #[arg(long)]
    pub enable_config: bool,

    /// Region for the Cloudtrail, SNS and S3 resources
    #[arg(long, value_name = "REGION")]
    pub aws_region: Option<String>,

    /// Profile for the main account (used with sub-accounts)
    #[arg(long, value_name = "PROFILE")]
    pub aws_profile: Option<String>,

    /// Use one trail for the main account and its sub-accounts
    #[arg(long)]
    pub consolidated_cloudtrail: bool,

    /// Use an existing trail
    #[arg(long)]
    pub existing_cloudtrail: bool,

    /// Bucket ARN of the existing trail
    #[arg(long, value_name = "ARN")]
    pub existing_bucket_arn: Option<String>,

    /// Existing SNS topic ARN
    #[arg(long, value_name = "ARN")]
    pub existing_sns_topic_arn: Option<String>,

    /// Existing IAM role name
    #[arg(long, value_name = "NAME")]
    pub existing_iam_role_name: Option<String>,

    /// Existing IAM role ARN
    #[arg(long, value_name = "ARN")]
    pub existing_iam_role_arn: Option<String>,

    /// External ID of the existing IAM role
    #[arg(long = "existing-iam-role-externalid", value_name = "ID")]
    pub existing_iam_role_external_id: Option<String>,

    /// Enable force destroy on the new S3 bucket
    #[arg(long = "force-destroy-s3")]
    pub force_destroy_s3_bucket: bool,

    /// Sub-account to configure (repeatable)
    #[arg(long = "aws-subaccount", value_name = "PROFILE:REGION", value_parser = parse_sub_account)]
    pub sub_accounts: Vec<(String, String)>,

    /// Lacework CLI profile for the lacework provider
    #[arg(long, value_name = "PROFILE")]
    pub lacework_profile: Option<String>,

    /// Output directory (default: ~/lacework)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

impl AwsArgs {
    /// Seed the generation record from the flags.
    ///
    /// Integration flags mark the matching question as answered. Any
    /// `--aws-subaccount` implies multi-account configuration.
    #[must_use]
    pub fn to_generate_args(&self) -> GenerateAwsArgs {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();

        GenerateAwsArgs {
            configure_cloudtrail: self.enable_cloudtrail,
            configure_config: self.enable_config,
            configure_cloudtrail_cli: self.enable_cloudtrail,
            configure_config_cli: self.enable_config,
            aws_region: text(&self.aws_region),
            aws_profile: text(&self.aws_profile),
            use_existing_cloudtrail: self.existing_cloudtrail,
            existing_bucket_arn: text(&self.existing_bucket_arn),
            existing_iam_role_name: text(&self.existing_iam_role_name),
            existing_iam_role_arn: text(&self.existing_iam_role_arn),
            existing_iam_role_external_id: text(&self.existing_iam_role_external_id),
            existing_sns_topic_arn: text(&self.existing_sns_topic_arn),
            use_consolidated_cloudtrail: self.consolidated_cloudtrail,
            force_destroy_s3_bucket: self.force_destroy_s3_bucket,
            configure_more_accounts: !self.sub_accounts.is_empty(),
            profiles: self.sub_accounts.iter().cloned().collect(),
            lacework_profile: text(&self.lacework_profile),
            ..GenerateAwsArgs::default()
        }
    }
}

/// Arguments for the validate command.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(value_name = "FILE", default_value = "iacgen.yaml")]
    pub config: PathBuf,
}

/// Parse `PROFILE:REGION`.
fn parse_sub_account(value: &str) -> Result<(String, String), String> {
    match value.split_once(':') {
        Some((profile, region)) if !profile.trim().is_empty() && !region.trim().is_empty() => {
            Ok((profile.trim().to_string(), region.trim().to_string()))
        }
        _ => Err(format!("'{value}' is not in PROFILE:REGION form")),
    }
}
