//! The AWS collection table.
//!
//! Order matters twice: it is the order questions are asked in, and the
//! order deferred checks run in (first failure wins).

use super::{Question, Step};
use crate::error::ValidationError;
use crate::types::GenerateAwsArgs;
use hcl::Identifier;

type CheckResult = Result<(), ValidationError>;

pub(crate) fn aws_steps() -> Vec<Step> {
    vec![
        Step {
            id: "config-from-cli",
            when: |a| a.configure_config_cli,
            question: Question::Derive(|a| a.configure_config = true),
            check: None,
        },
        Step {
            id: "config",
            when: |a| !a.configure_config_cli,
            question: Question::Confirm {
                message: "Enable Config Integration?",
                get: |a| a.configure_config,
                set: |a, v| a.configure_config = v,
            },
            check: None,
        },
        Step {
            id: "cloudtrail-from-cli",
            when: |a| a.configure_cloudtrail_cli,
            question: Question::Derive(|a| a.configure_cloudtrail = true),
            check: None,
        },
        Step {
            id: "cloudtrail",
            when: |a| !a.configure_cloudtrail_cli,
            question: Question::Confirm {
                message: "Enable Cloudtrail Integration?",
                get: |a| a.configure_cloudtrail,
                set: |a, v| a.configure_cloudtrail = v,
            },
            check: Some(integration_enabled),
        },
        Step {
            id: "region",
            when: GenerateAwsArgs::any_integration,
            question: Question::Input {
                message: "Specify the AWS region Cloudtrail, SNS, and S3 resources should use:",
                required: true,
                get: |a| a.aws_region.as_str(),
                set: |a, v| a.aws_region = v,
            },
            check: Some(region_supplied),
        },
        Step {
            id: "consolidated-cloudtrail",
            when: |a| a.configure_cloudtrail,
            question: Question::Confirm {
                message: "Use consolidated Cloudtrail?",
                get: |a| a.use_consolidated_cloudtrail,
                set: |a, v| a.use_consolidated_cloudtrail = v,
            },
            check: None,
        },
        Step {
            id: "existing-cloudtrail-from-bucket",
            when: |a| !a.existing_bucket_arn.is_empty(),
            question: Question::Derive(|a| a.use_existing_cloudtrail = true),
            check: None,
        },
        Step {
            id: "existing-cloudtrail",
            when: |a| a.configure_cloudtrail,
            question: Question::Confirm {
                message: "Use an existing Cloudtrail?",
                get: |a| a.use_existing_cloudtrail,
                set: |a, v| a.use_existing_cloudtrail = v,
            },
            check: None,
        },
        Step {
            id: "existing-bucket-arn",
            when: |a| a.configure_cloudtrail && a.use_existing_cloudtrail,
            question: Question::Input {
                message: "Specify an existing bucket ARN used for Cloudtrail logs:",
                required: false,
                get: |a| a.existing_bucket_arn.as_str(),
                set: |a, v| a.existing_bucket_arn = v,
            },
            check: Some(bucket_supplied),
        },
        Step {
            id: "existing-sns-topic",
            when: |a| a.configure_cloudtrail,
            question: Question::Input {
                message: "(Optional) Specify an existing SNS topic ARN:",
                required: false,
                get: |a| a.existing_sns_topic_arn.as_str(),
                set: |a, v| a.existing_sns_topic_arn = v,
            },
            check: None,
        },
        Step {
            id: "existing-iam-role-from-fields",
            when: GenerateAwsArgs::has_existing_iam_role_details,
            question: Question::Derive(|a| a.use_existing_iam_role = true),
            check: Some(iam_role_complete),
        },
        Step {
            id: "existing-iam-role",
            when: |a| a.configure_cloudtrail,
            question: Question::Confirm {
                message: "Use an existing IAM Role?",
                get: |a| a.use_existing_iam_role,
                set: |a, v| a.use_existing_iam_role = v,
            },
            check: None,
        },
        Step {
            id: "existing-iam-role-name",
            when: |a| a.use_existing_iam_role,
            question: Question::Input {
                message: "Specify an existing IAM role name for Cloudtrail access:",
                required: true,
                get: |a| a.existing_iam_role_name.as_str(),
                set: |a, v| a.existing_iam_role_name = v,
            },
            check: None,
        },
        Step {
            id: "existing-iam-role-arn",
            when: |a| a.use_existing_iam_role,
            question: Question::Input {
                message: "Specify an existing IAM role ARN for Cloudtrail access:",
                required: true,
                get: |a| a.existing_iam_role_arn.as_str(),
                set: |a, v| a.existing_iam_role_arn = v,
            },
            check: None,
        },
        Step {
            id: "existing-iam-role-external-id",
            when: |a| a.use_existing_iam_role,
            question: Question::Input {
                message: "Specify the external ID to be used with the existing IAM role:",
                required: true,
                get: |a| a.existing_iam_role_external_id.as_str(),
                set: |a, v| a.existing_iam_role_external_id = v,
            },
            check: None,
        },
        Step {
            id: "force-destroy-s3-bucket",
            when: |a| {
                a.configure_cloudtrail && !a.use_existing_cloudtrail && a.existing_bucket_arn.is_empty()
            },
            question: Question::Confirm {
                message: "Should the new S3 bucket have force destroy enabled?",
                get: |a| a.force_destroy_s3_bucket,
                set: |a, v| a.force_destroy_s3_bucket = v,
            },
            check: None,
        },
        Step {
            id: "more-accounts",
            when: |a| a.use_consolidated_cloudtrail,
            question: Question::Confirm {
                message: "Are there additional AWS accounts to integrate for Configuration?",
                get: |a| a.configure_more_accounts,
                set: |a, v| a.configure_more_accounts = v,
            },
            check: None,
        },
        Step {
            id: "sub-accounts",
            when: |a| a.configure_more_accounts,
            question: Question::SubAccounts,
            check: Some(sub_accounts_valid),
        },
    ]
}

fn integration_enabled(args: &GenerateAwsArgs) -> CheckResult {
    if args.any_integration() {
        Ok(())
    } else {
        Err(ValidationError::NothingEnabled)
    }
}

fn region_supplied(args: &GenerateAwsArgs) -> CheckResult {
    if args.any_integration() && args.aws_region.is_empty() {
        return Err(ValidationError::RegionRequired);
    }
    Ok(())
}

fn bucket_supplied(args: &GenerateAwsArgs) -> CheckResult {
    if args.use_existing_cloudtrail && args.existing_bucket_arn.is_empty() {
        return Err(ValidationError::BucketArnRequired);
    }
    Ok(())
}

fn iam_role_complete(args: &GenerateAwsArgs) -> CheckResult {
    if !args.use_existing_iam_role {
        return Ok(());
    }
    let missing = args.missing_iam_role_fields();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::IncompleteIamRole { missing })
    }
}

/// Sub-account profiles become provider aliases and `aws.<profile>`
/// references, so each one must be an HCL identifier.
fn sub_accounts_valid(args: &GenerateAwsArgs) -> CheckResult {
    if !args.configure_more_accounts {
        return Ok(());
    }
    if args.aws_profile.is_empty() {
        return Err(ValidationError::MainProfileRequired);
    }
    match args
        .profiles
        .keys()
        .find(|profile| Identifier::new(profile.as_str()).is_err())
    {
        Some(profile) => Err(ValidationError::InvalidProfile {
            profile: profile.clone(),
        }),
        None => Ok(()),
    }
}
