//! Configuration collection engine.
//!
//! Collection walks a fixed table of steps (see [`steps`]). Each step has a
//! visibility predicate, a question that reads its default from the record
//! and writes the answer back, and an optional check that runs once every
//! step has been walked. In non-interactive mode questions are skipped but
//! derived steps still run, so flags supplied up front are treated the same
//! way as answers.
//!
//! # Example
//!
//! ```rust
//! use iacgen::collect::collect;
//! use iacgen::prompt::ScriptedPrompter;
//! use iacgen::{CollectMode, GenerateAwsArgs};
//!
//! let mut args = GenerateAwsArgs {
//!     configure_config: true,
//!     aws_region: "us-east-2".to_string(),
//!     ..GenerateAwsArgs::default()
//! };
//! let mut prompter = ScriptedPrompter::default();
//! collect(&mut args, &mut prompter, CollectMode::NonInteractive).unwrap();
//! ```

mod steps;

use crate::error::{Result, ValidationError};
use crate::prompt::Prompter;
use crate::types::{CollectMode, GenerateAwsArgs};

/// Visibility predicate for a step.
type When = fn(&GenerateAwsArgs) -> bool;

/// Deferred check for a step.
type Check = fn(&GenerateAwsArgs) -> std::result::Result<(), ValidationError>;

/// One entry of the collection table.
pub(crate) struct Step {
    pub(crate) id: &'static str,
    pub(crate) when: When,
    pub(crate) question: Question,
    pub(crate) check: Option<Check>,
}

/// What a step does when it is visible.
#[derive(Clone, Copy)]
pub(crate) enum Question {
    /// Yes/no question
    Confirm {
        message: &'static str,
        get: fn(&GenerateAwsArgs) -> bool,
        set: fn(&mut GenerateAwsArgs, bool),
    },
    /// Free-text question
    Input {
        message: &'static str,
        required: bool,
        get: fn(&GenerateAwsArgs) -> &str,
        set: fn(&mut GenerateAwsArgs, String),
    },
    /// No question; derive fields from ones already set
    Derive(fn(&mut GenerateAwsArgs)),
    /// Main account profile, then sub-account profile/region pairs
    SubAccounts,
}

pub(crate) const MAIN_PROFILE_MESSAGE: &str = "What is the AWS profile name for the main account?";
pub(crate) const SUB_ACCOUNT_PROFILE_MESSAGE: &str = "Supply the profile name for the AWS account";
pub(crate) const SUB_ACCOUNT_REGION_MESSAGE: &str = "What region should be used for this account?";
pub(crate) const ADD_ANOTHER_MESSAGE: &str = "Add another AWS account?";

/// Fill in `args`, asking the operator when `mode` is interactive, then run
/// the deferred checks.
///
/// # Errors
///
/// Returns a `Prompt` error as soon as a question fails, and a `Validation`
/// error for the first deferred check that does not pass.
pub fn collect<P>(args: &mut GenerateAwsArgs, prompter: &mut P, mode: CollectMode) -> Result<()>
where
    P: Prompter + ?Sized,
{
    let steps = steps::aws_steps();
    tracing::debug!(steps = steps.len(), ?mode, "Collecting AWS generation settings");

    for step in &steps {
        if !(step.when)(args) {
            tracing::trace!(step = step.id, "Step not applicable");
            continue;
        }
        run_step(step, args, prompter, mode)?;
    }

    check(&steps, args)
}

/// Run only the deferred checks.
///
/// # Errors
///
/// Returns the first failing check.
pub fn validate(args: &GenerateAwsArgs) -> Result<()> {
    check(&steps::aws_steps(), args)
}

fn check(steps: &[Step], args: &GenerateAwsArgs) -> Result<()> {
    for step in steps {
        if let Some(validator) = step.check {
            validator(args).map_err(|e| {
                tracing::debug!(step = step.id, error = %e, "Validation failed");
                e
            })?;
        }
    }
    Ok(())
}

fn run_step<P>(step: &Step, args: &mut GenerateAwsArgs, prompter: &mut P, mode: CollectMode) -> Result<()>
where
    P: Prompter + ?Sized,
{
    match step.question {
        Question::Derive(apply) => {
            tracing::trace!(step = step.id, "Deriving");
            apply(args);
        }
        _ if !mode.is_interactive() => {
            tracing::trace!(step = step.id, "Non-interactive, keeping supplied value");
        }
        Question::Confirm { message, get, set } => {
            let answer = prompter.confirm(message, get(args))?;
            set(args, answer);
        }
        Question::Input {
            message,
            required,
            get,
            set,
        } => {
            let default = get(args).to_string();
            let answer = prompter.input(message, &default, required)?;
            set(args, answer.trim().to_string());
        }
        Question::SubAccounts => collect_sub_accounts(args, prompter)?,
    }
    Ok(())
}

/// Ask for the main profile once, then profile/region pairs until the
/// operator stops. A repeated profile name replaces the earlier region.
///
/// Sub-accounts already supplied count as a first pass, so the operator is
/// asked whether to add another before any new pair is requested.
fn collect_sub_accounts<P>(args: &mut GenerateAwsArgs, prompter: &mut P) -> Result<()>
where
    P: Prompter + ?Sized,
{
    let main_profile = prompter.input(MAIN_PROFILE_MESSAGE, &args.aws_profile, true)?;
    args.aws_profile = main_profile.trim().to_string();

    if !args.profiles.is_empty() && !prompter.confirm(ADD_ANOTHER_MESSAGE, false)? {
        tracing::debug!(accounts = args.profiles.len(), "Keeping supplied sub-accounts");
        return Ok(());
    }

    loop {
        let profile = prompter.input(SUB_ACCOUNT_PROFILE_MESSAGE, "", true)?;
        let region = prompter.input(SUB_ACCOUNT_REGION_MESSAGE, "", true)?;
        let profile = profile.trim().to_string();
        if let Some(previous) = args.profiles.insert(profile.clone(), region.trim().to_string()) {
            tracing::debug!(profile = %profile, previous = %previous, "Sub-account replaced");
        }

        if !prompter.confirm(ADD_ANOTHER_MESSAGE, false)? {
            break;
        }
    }

    tracing::debug!(accounts = args.profiles.len(), "Sub-accounts collected");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IacGenError;
    use crate::prompt::{Answer, MockPrompter, ScriptedPrompter};
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn non_interactive(mut args: GenerateAwsArgs) -> (GenerateAwsArgs, Result<()>) {
        // Any prompt call fails the test: the mock has no expectations.
        let mut prompter = MockPrompter::new();
        let result = collect(&mut args, &mut prompter, CollectMode::NonInteractive);
        (args, result)
    }

    #[test]
    fn test_most_basic_args() {
        let (_, result) = non_interactive(GenerateAwsArgs {
            configure_cloudtrail: true,
            configure_config: true,
            aws_region: "us-east-2".to_string(),
            ..GenerateAwsArgs::default()
        });
        assert!(result.is_ok());
    }

    #[test]
    fn test_missing_existing_iam_role_params() {
        let (args, result) = non_interactive(GenerateAwsArgs {
            configure_cloudtrail: true,
            existing_iam_role_arn: "blue".to_string(),
            ..GenerateAwsArgs::default()
        });

        // Inferred from a single non-empty field
        assert!(args.use_existing_iam_role);
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_iam_role_fails_after_region() {
        let (_, result) = non_interactive(GenerateAwsArgs {
            configure_cloudtrail: true,
            aws_region: "us-east-2".to_string(),
            existing_iam_role_name: "role".to_string(),
            ..GenerateAwsArgs::default()
        });

        assert!(matches!(
            result,
            Err(IacGenError::Validation(ValidationError::IncompleteIamRole { ref missing }))
                if missing == &["ARN", "external ID"]
        ));
    }

    #[test]
    fn test_missing_existing_cloudtrail_params() {
        let (_, result) = non_interactive(GenerateAwsArgs {
            configure_cloudtrail: true,
            use_existing_cloudtrail: true,
            aws_region: "us-east-2".to_string(),
            ..GenerateAwsArgs::default()
        });

        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Must supply bucket ARN when using an existing cloudtrail!");
    }

    #[test]
    fn test_missing_valid_entity_to_configure() {
        let (_, result) = non_interactive(GenerateAwsArgs::default());
        assert_eq!(result.unwrap_err().to_string(), "Must enable cloudtrail or config!");
    }

    #[test_case(GenerateAwsArgs::default(), ValidationError::NothingEnabled; "nothing enabled")]
    #[test_case(
        GenerateAwsArgs { configure_config: true, ..GenerateAwsArgs::default() },
        ValidationError::RegionRequired;
        "config without region"
    )]
    #[test_case(
        GenerateAwsArgs {
            configure_cloudtrail: true,
            aws_region: "us-east-1".to_string(),
            use_existing_cloudtrail: true,
            ..GenerateAwsArgs::default()
        },
        ValidationError::BucketArnRequired;
        "existing trail without bucket"
    )]
    #[test_case(
        GenerateAwsArgs {
            configure_cloudtrail: true,
            aws_region: "us-east-1".to_string(),
            use_consolidated_cloudtrail: true,
            configure_more_accounts: true,
            ..GenerateAwsArgs::default()
        },
        ValidationError::MainProfileRequired;
        "sub-accounts without main profile"
    )]
    #[test_case(
        GenerateAwsArgs {
            configure_config: true,
            aws_region: "us-east-1".to_string(),
            aws_profile: "main".to_string(),
            configure_more_accounts: true,
            profiles: [("acme prod".to_string(), "us-east-1".to_string())].into_iter().collect(),
            ..GenerateAwsArgs::default()
        },
        ValidationError::InvalidProfile { profile: "acme prod".to_string() };
        "sub-account profile with a space"
    )]
    fn test_first_failing_check(args: GenerateAwsArgs, expected: ValidationError) {
        match validate(&args) {
            Err(IacGenError::Validation(actual)) => assert_eq!(actual, expected),
            other => panic!("expected {expected:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_toggles_skip_questions() {
        let mut args = GenerateAwsArgs {
            configure_config_cli: true,
            configure_cloudtrail_cli: true,
            ..GenerateAwsArgs::default()
        };
        let mut prompter = ScriptedPrompter::new([
            Answer::from("us-east-2"), // region
            Answer::from(false),       // consolidated
            Answer::from(false),       // existing trail
            Answer::from(""),          // sns topic
            Answer::from(false),       // existing role
            Answer::from(true),        // force destroy
        ]);

        collect(&mut args, &mut prompter, CollectMode::Interactive).unwrap();

        assert!(args.configure_config);
        assert!(args.configure_cloudtrail);
        assert!(args.force_destroy_s3_bucket);
        assert_eq!(args.aws_region, "us-east-2");
        assert!(!prompter.asked().iter().any(|q| q.starts_with("Enable")));
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn test_config_only_interactive() {
        let mut args = GenerateAwsArgs::default();
        let mut prompter = ScriptedPrompter::new([
            Answer::from(true),  // config
            Answer::from(false), // cloudtrail
            Answer::from("us-west-2"),
        ]);

        collect(&mut args, &mut prompter, CollectMode::Interactive).unwrap();

        assert!(args.configure_config);
        assert!(!args.configure_cloudtrail);
        assert_eq!(args.aws_region, "us-west-2");
        assert_eq!(
            prompter.asked(),
            [
                "Enable Config Integration?",
                "Enable Cloudtrail Integration?",
                "Specify the AWS region Cloudtrail, SNS, and S3 resources should use:",
            ]
        );
    }

    #[test]
    fn test_existing_role_questions() {
        let mut args = GenerateAwsArgs::default();
        let mut prompter = ScriptedPrompter::new([
            Answer::from(false), // config
            Answer::from(true),  // cloudtrail
            Answer::from("us-east-2"),
            Answer::from(false), // consolidated
            Answer::from(true),  // existing trail
            Answer::from("arn:aws:s3:::bucket"),
            Answer::from("arn:aws:sns:::topic"),
            Answer::from(true), // existing role
            Answer::from("test-role"),
            Answer::from("arn:aws:iam::123456789012:role/test-role"),
            Answer::from("1234567890123456"),
        ]);

        collect(&mut args, &mut prompter, CollectMode::Interactive).unwrap();

        assert!(args.use_existing_cloudtrail);
        assert_eq!(args.existing_bucket_arn, "arn:aws:s3:::bucket");
        assert_eq!(args.existing_sns_topic_arn, "arn:aws:sns:::topic");
        assert!(args.use_existing_iam_role);
        assert_eq!(args.existing_iam_role_name, "test-role");
        assert_eq!(args.existing_iam_role_external_id, "1234567890123456");
        // existing bucket: no force-destroy question
        assert!(!prompter.asked().iter().any(|q| q.contains("force destroy")));
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn test_sub_account_loop_last_write_wins() {
        let mut args = GenerateAwsArgs {
            configure_config_cli: true,
            configure_cloudtrail_cli: true,
            aws_region: "us-east-2".to_string(),
            ..GenerateAwsArgs::default()
        };
        let mut prompter = ScriptedPrompter::new([
            Answer::from("us-east-2"), // region (default kept)
            Answer::from(true),        // consolidated
            Answer::from(false),       // existing trail
            Answer::from(""),          // sns topic
            Answer::from(false),       // existing role
            Answer::from(false),       // force destroy
            Answer::from(true),        // more accounts
            Answer::from("main"),
            Answer::from("subaccount1"),
            Answer::from("us-east-1"),
            Answer::from(true),
            Answer::from("subaccount1"),
            Answer::from("us-west-1"),
            Answer::from(true),
            Answer::from("subaccount2"),
            Answer::from("us-east-2"),
            Answer::from(false),
        ]);

        collect(&mut args, &mut prompter, CollectMode::Interactive).unwrap();

        assert!(args.configure_more_accounts);
        assert_eq!(args.aws_profile, "main");
        assert_eq!(args.profiles.len(), 2);
        assert_eq!(args.profiles["subaccount1"], "us-west-1");
        assert_eq!(args.profiles["subaccount2"], "us-east-2");
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn test_supplied_sub_accounts_can_be_kept() {
        let mut profiles = std::collections::BTreeMap::new();
        profiles.insert("dev".to_string(), "us-east-1".to_string());
        let mut args = GenerateAwsArgs {
            configure_cloudtrail_cli: true,
            aws_region: "us-east-2".to_string(),
            aws_profile: "main".to_string(),
            configure_more_accounts: true,
            profiles,
            ..GenerateAwsArgs::default()
        };
        let mut prompter = ScriptedPrompter::new([
            Answer::from(false), // config
            Answer::from(""),    // region (default kept)
            Answer::from(false), // consolidated
            Answer::from(false), // existing trail
            Answer::from(""),    // sns topic
            Answer::from(false), // existing role
            Answer::from(false), // force destroy
            Answer::from(""),    // main profile (default kept)
            Answer::from(false), // add another
        ]);

        collect(&mut args, &mut prompter, CollectMode::Interactive).unwrap();

        assert_eq!(args.aws_profile, "main");
        assert_eq!(args.profiles.len(), 1);
        assert_eq!(args.profiles["dev"], "us-east-1");
        assert!(!prompter.asked().iter().any(|q| q == SUB_ACCOUNT_PROFILE_MESSAGE));
        assert_eq!(prompter.asked().last().map(String::as_str), Some(ADD_ANOTHER_MESSAGE));
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn test_supplied_sub_accounts_can_be_extended() {
        let mut profiles = std::collections::BTreeMap::new();
        profiles.insert("dev".to_string(), "us-east-1".to_string());
        let mut args = GenerateAwsArgs {
            configure_config_cli: true,
            aws_region: "us-east-2".to_string(),
            configure_more_accounts: true,
            profiles,
            ..GenerateAwsArgs::default()
        };
        let mut prompter = ScriptedPrompter::new([
            Answer::from(false), // cloudtrail
            Answer::from(""),    // region (default kept)
            Answer::from("main"),
            Answer::from(true), // add another
            Answer::from("prod"),
            Answer::from("us-west-2"),
            Answer::from(false),
        ]);

        collect(&mut args, &mut prompter, CollectMode::Interactive).unwrap();

        assert_eq!(args.profiles.len(), 2);
        assert_eq!(args.profiles["prod"], "us-west-2");
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn test_prompt_failure_aborts_immediately() {
        let mut args = GenerateAwsArgs::default();
        let mut prompter = MockPrompter::new();
        prompter.expect_confirm().times(1).returning(|message, _| {
            Err(crate::err!(Prompt {
                question: message.to_string(),
                message: "interrupted".to_string(),
            }))
        });

        let err = collect(&mut args, &mut prompter, CollectMode::Interactive).unwrap_err();
        assert!(matches!(err, IacGenError::Prompt { .. }));
        assert!(!args.any_integration());
    }

    #[test]
    fn test_non_interactive_sub_accounts_from_flags() {
        let mut profiles = std::collections::BTreeMap::new();
        profiles.insert("subaccount1".to_string(), "us-east-1".to_string());
        let (args, result) = non_interactive(GenerateAwsArgs {
            configure_cloudtrail: true,
            configure_config: true,
            aws_region: "us-east-2".to_string(),
            aws_profile: "main".to_string(),
            use_consolidated_cloudtrail: true,
            configure_more_accounts: true,
            profiles,
            ..GenerateAwsArgs::default()
        });

        assert!(result.is_ok());
        assert_eq!(args.profiles.len(), 1);
    }
}
