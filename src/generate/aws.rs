//! Terraform code for the Lacework AWS integrations.

use super::blocks::{required_providers, Module, Provider, RequiredProvider};
use super::document::{BlockSet, Document};
use super::hcl::{Block, ProviderDetails, Reference};
use crate::config::ModulesOptions;
use crate::error::Result;
use crate::types::GenerateAwsArgs;

/// Label of the Config integration module.
pub const CONFIG_MODULE: &str = "aws_config";

/// Label of the Cloudtrail integration module.
pub const CLOUDTRAIL_MODULE: &str = "main_cloudtrail";

const MAIN_ALIAS: &str = "main";

/// Builds the AWS document from a collected [`GenerateAwsArgs`].
#[derive(Debug, Clone)]
pub struct AwsTerraform<'a> {
    args: &'a GenerateAwsArgs,
    modules: ModulesOptions,
}

impl<'a> AwsTerraform<'a> {
    /// Generate from `args` with the default module pins.
    #[must_use]
    pub fn new(args: &'a GenerateAwsArgs) -> Self {
        Self {
            args,
            modules: ModulesOptions::default(),
        }
    }

    /// Use different module and provider pins.
    #[must_use]
    pub fn with_modules(mut self, modules: ModulesOptions) -> Self {
        self.modules = modules;
        self
    }

    /// The `terraform { required_providers { ... } }` block.
    #[must_use]
    pub fn required_providers(&self) -> Block {
        let pin = &self.modules.lacework_provider;
        required_providers(&[RequiredProvider::new("lacework")
            .source(&pin.source)
            .version(&pin.version)])
    }

    /// The primary `aws` provider followed by one aliased provider per
    /// sub-account, sorted by profile.
    #[must_use]
    pub fn aws_providers(&self) -> Vec<Block> {
        let args = self.args;
        let mut blocks = Vec::new();

        if !args.aws_region.is_empty() || args.configure_more_accounts {
            let mut provider = Provider::new("aws");
            if !args.aws_region.is_empty() {
                provider = provider.attribute("region", &args.aws_region);
            }
            if args.configure_more_accounts {
                provider = provider
                    .attribute("alias", MAIN_ALIAS)
                    .attribute("profile", &args.aws_profile);
            }
            blocks.push(provider.into_block());
        }

        if args.configure_more_accounts {
            for (profile, region) in &args.profiles {
                blocks.push(
                    Provider::new("aws")
                        .attribute("alias", profile)
                        .attribute("profile", profile)
                        .attribute("region", region)
                        .into_block(),
                );
            }
        }

        blocks
    }

    /// `provider "lacework"` when a Lacework CLI profile was supplied.
    #[must_use]
    pub fn lacework_provider(&self) -> Option<Block> {
        if self.args.lacework_profile.is_empty() {
            return None;
        }
        Some(
            Provider::new("lacework")
                .attribute("profile", &self.args.lacework_profile)
                .into_block(),
        )
    }

    /// The Config module for the main account and one per sub-account.
    #[must_use]
    pub fn config_modules(&self) -> Vec<Block> {
        let args = self.args;
        if !args.configure_config {
            return Vec::new();
        }

        let pin = &self.modules.aws_config;
        let mut main = Module::new(CONFIG_MODULE, &pin.source, &pin.version);
        if args.configure_more_accounts {
            main = main.providers(aws_alias(MAIN_ALIAS));
        }
        let mut blocks = vec![main.into_block()];

        if args.configure_more_accounts {
            blocks.extend(args.profiles.keys().map(|profile| {
                Module::new(format!("{CONFIG_MODULE}_{profile}"), &pin.source, &pin.version)
                    .providers(aws_alias(profile))
                    .into_block()
            }));
        }

        blocks
    }

    /// The Cloudtrail module, if that integration is enabled.
    ///
    /// The IAM role either comes from the Config module outputs or from the
    /// supplied literals, never both.
    #[must_use]
    pub fn cloudtrail_module(&self) -> Option<Block> {
        let args = self.args;
        if !args.configure_cloudtrail {
            return None;
        }

        let pin = &self.modules.aws_cloudtrail;
        let mut module = Module::new(CLOUDTRAIL_MODULE, &pin.source, &pin.version);

        if args.force_destroy_s3_bucket && !args.use_existing_cloudtrail {
            module = module.attribute("bucket_force_destroy", true);
        }

        if args.use_consolidated_cloudtrail {
            module = module.attribute("consolidated_trail", true);
        }

        if !args.existing_sns_topic_arn.is_empty() {
            module = module
                .attribute("use_existing_sns_topic", true)
                .attribute("sns_topic_arn", &args.existing_sns_topic_arn);
        }

        if args.use_existing_iam_role {
            module = module
                .attribute("use_existing_iam_role", true)
                .attribute("iam_role_name", &args.existing_iam_role_name)
                .attribute("iam_role_arn", &args.existing_iam_role_arn)
                .attribute("iam_role_external_id", &args.existing_iam_role_external_id);
        } else if args.configure_config {
            module = module
                .attribute("use_existing_iam_role", true)
                .attribute("iam_role_name", config_output("iam_role_name"))
                .attribute("iam_role_arn", config_output("iam_role_arn"))
                .attribute("iam_role_external_id", config_output("external_id"));
        }

        if args.use_existing_cloudtrail {
            module = module
                .attribute("use_existing_cloudtrail", true)
                .attribute("bucket_arn", &args.existing_bucket_arn);
        }

        if args.configure_more_accounts {
            module = module.providers(aws_alias(MAIN_ALIAS));
        }

        Some(module.into_block())
    }

    /// All blocks, in document order.
    #[must_use]
    pub fn document(&self) -> Document {
        Document::combine([
            BlockSet::from(self.required_providers()),
            BlockSet::from(self.aws_providers()),
            BlockSet::from(self.lacework_provider()),
            BlockSet::from(self.config_modules()),
            BlockSet::from(self.cloudtrail_module()),
        ])
    }

    /// Render the document text.
    ///
    /// # Errors
    ///
    /// Returns an error if a block cannot be encoded.
    pub fn generate(&self) -> Result<String> {
        let document = self.document();
        tracing::debug!(blocks = document.blocks().len(), "Rendering AWS document");
        document.render()
    }
}

fn aws_alias(alias: &str) -> ProviderDetails {
    ProviderDetails::new().with("aws", format!("aws.{alias}"))
}

fn config_output(name: &str) -> Reference {
    Reference::new(["module", CONFIG_MODULE, name])
}
