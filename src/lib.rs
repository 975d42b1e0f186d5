//! # iacgen
//!
//! Generates Terraform code for the Lacework AWS integrations.
//!
//! iacgen collects what to integrate (Config, Cloudtrail, existing trails,
//! IAM roles, sub-accounts) either interactively or from flags, validates
//! the answers, and writes a ready-to-apply `main.tf`.
//!
//! ## Features
//!
//! - **Declarative collection**: one table of questions drives both the
//!   interactive and the non-interactive flow
//! - **Deterministic output**: attributes and sub-accounts are sorted, so the
//!   same answers always produce the same file
//! - **Cross-module wiring**: the Cloudtrail module reads its IAM role from the
//!   Config module outputs unless an existing role is supplied
//!
//! ## Example
//!
//! ```rust,no_run
//! use iacgen::{CollectMode, Config, GenerateAwsArgs, Generator};
//! use iacgen::prompt::ScriptedPrompter;
//!
//! fn main() -> anyhow::Result<()> {
//!     let generator = Generator::new(Config::default());
//!     let mut args = GenerateAwsArgs {
//!         configure_config: true,
//!         aws_region: "us-east-2".to_string(),
//!         ..GenerateAwsArgs::default()
//!     };
//!
//!     let mut prompter = ScriptedPrompter::default();
//!     let report = generator.generate_aws(&mut args, &mut prompter, CollectMode::NonInteractive)?;
//!     println!("{}", report.location.display());
//!     Ok(())
//! }
//! ```

#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod cli;
pub mod collect;
pub mod config;
pub mod error;
pub mod generate;
pub mod prompt;
pub mod types;

// Re-export commonly used types at crate root
pub use config::Config;
pub use error::{IacGenError, Result, ValidationError};
pub use generate::{AwsTerraform, Document};
pub use prompt::Prompter;
pub use types::{CollectMode, GenerateAwsArgs, GenerateReport};

use error::ResultExt;
use std::path::{Path, PathBuf};

/// Runs collection, rendering and the final write.
///
/// Nothing touches the filesystem until the whole document has rendered
/// and parsed back.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: Config,
}

impl Generator {
    /// Create a generator with the given configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// The configuration this generator writes with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fill in and validate `args`.
    ///
    /// # Errors
    ///
    /// Returns the first prompt failure or failing check.
    pub fn collect_aws<P>(&self, args: &mut GenerateAwsArgs, prompter: &mut P, mode: CollectMode) -> Result<()>
    where
        P: Prompter + ?Sized,
    {
        collect::collect(args, prompter, mode)
    }

    /// Render the AWS document and make sure it parses.
    ///
    /// # Errors
    ///
    /// Returns a non-recoverable error if a block cannot be encoded or the
    /// result is not valid HCL.
    pub fn render_aws(&self, args: &GenerateAwsArgs) -> Result<(String, usize)> {
        let terraform = AwsTerraform::new(args).with_modules(self.config.modules.clone());
        let document = terraform.document();
        let text = document.render()?;
        Document::verify(&text)?;
        Ok((text, document.blocks().len()))
    }

    /// Write rendered text to the configured output location.
    ///
    /// # Errors
    ///
    /// Returns an `Io` error if the directory cannot be created or the file
    /// cannot be written.
    pub fn write(&self, text: &str, blocks: usize) -> Result<GenerateReport> {
        let directory = self.config.output_directory()?;
        let location = write_document(&directory, &self.config.output.file_name, text)?;
        tracing::info!(path = %location.display(), blocks, "Terraform code written");
        Ok(GenerateReport { location, blocks })
    }

    /// Validate `args` as they are, then render and write.
    ///
    /// # Errors
    ///
    /// Returns the first failing check, a render error, or an `Io` error.
    pub fn emit_aws(&self, args: &GenerateAwsArgs) -> Result<GenerateReport> {
        collect::validate(args)?;
        let (text, blocks) = self.render_aws(args)?;
        self.write(&text, blocks)
    }

    /// Collect, validate, render and write in one go.
    ///
    /// # Errors
    ///
    /// Returns the first error of any stage; no file is written unless
    /// every earlier stage succeeded.
    pub fn generate_aws<P>(&self, args: &mut GenerateAwsArgs, prompter: &mut P, mode: CollectMode) -> Result<GenerateReport>
    where
        P: Prompter + ?Sized,
    {
        self.collect_aws(args, prompter, mode)?;
        let (text, blocks) = self.render_aws(args)?;
        self.write(&text, blocks)
    }
}

fn write_document(directory: &Path, file_name: &str, text: &str) -> Result<PathBuf> {
    if !directory.exists() {
        tracing::debug!(path = %directory.display(), "Creating output directory");
        std::fs::create_dir_all(directory).with_path(directory)?;
    }
    let location = directory.join(file_name);
    std::fs::write(&location, text).with_path(&location)?;
    Ok(location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use tempfile::TempDir;

    fn generator(dir: &TempDir) -> Generator {
        let mut config = Config::default();
        config.output.directory = Some(dir.path().join("lacework"));
        Generator::new(config)
    }

    #[test]
    fn test_generator_creation() {
        let generator = Generator::default();
        assert_eq!(generator.config().output.file_name, "main.tf");
    }

    #[test]
    fn test_generate_writes_main_tf() {
        let dir = TempDir::new().unwrap();
        let mut args = GenerateAwsArgs {
            configure_config: true,
            aws_region: "us-east-2".to_string(),
            ..GenerateAwsArgs::default()
        };

        let report = generator(&dir)
            .generate_aws(&mut args, &mut ScriptedPrompter::default(), CollectMode::NonInteractive)
            .unwrap();

        assert_eq!(report.location, dir.path().join("lacework").join("main.tf"));
        assert_eq!(report.blocks, 3);
        let written = std::fs::read_to_string(&report.location).unwrap();
        assert!(written.starts_with("terraform {\n"));
        assert!(written.ends_with("}\n\n"));
    }

    #[test]
    fn test_validation_failure_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut args = GenerateAwsArgs::default();

        let err = generator(&dir)
            .generate_aws(&mut args, &mut ScriptedPrompter::default(), CollectMode::NonInteractive)
            .unwrap_err();

        assert!(matches!(err, IacGenError::Validation(ValidationError::NothingEnabled)));
        assert!(!dir.path().join("lacework").exists());
    }

    #[test]
    fn test_emit_checks_before_writing() {
        let dir = TempDir::new().unwrap();
        let args = GenerateAwsArgs {
            configure_cloudtrail: true,
            aws_region: "us-east-2".to_string(),
            use_existing_cloudtrail: true,
            ..GenerateAwsArgs::default()
        };

        let err = generator(&dir).emit_aws(&args).unwrap_err();
        assert_eq!(err.to_string(), "Must supply bucket ARN when using an existing cloudtrail!");
        assert!(!dir.path().join("lacework").exists());
    }
}
