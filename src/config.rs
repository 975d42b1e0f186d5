//! Configuration module for iacgen.
//!
//! This module handles loading and validating configuration from:
//! - YAML configuration files (`iacgen.yaml`)
//! - Environment variables
//! - CLI arguments
//!
//! # Configuration File Format
//!
//! ```yaml
//! # iacgen.yaml
//!
//! output:
//!   directory: ${HOME}/lacework   # default: ~/lacework
//!   file_name: main.tf
//!   colored: true
//!
//! generate:
//!   non_interactive: false
//!
//! modules:
//!   lacework_provider:
//!     source: lacework/lacework
//!     version: "~> 0.3"
//!   aws_config:
//!     source: lacework/config/aws
//!     version: "~> 0.1"
//!   aws_cloudtrail:
//!     source: lacework/cloudtrail/aws
//!     version: "~> 0.1"
//! ```

use crate::error::{IacGenError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    /// Directory the document is written to (default: `~/lacework`).
    pub directory: Option<PathBuf>,

    /// File name of the generated document.
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// Use colored output.
    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            directory: None,
            file_name: default_file_name(),
            colored: true,
        }
    }
}

/// Generation options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GenerateOptions {
    /// Never prompt; use only values supplied on the command line.
    pub non_interactive: bool,
}

/// A registry source pinned to a version constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedSource {
    /// Registry source address
    pub source: String,
    /// Version constraint
    pub version: String,
}

impl PinnedSource {
    fn new(source: &str, version: &str) -> Self {
        Self {
            source: source.to_string(),
            version: version.to_string(),
        }
    }
}

/// Sources and versions written into the generated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModulesOptions {
    /// The `lacework` provider plugin
    pub lacework_provider: PinnedSource,

    /// The Config integration module
    pub aws_config: PinnedSource,

    /// The Cloudtrail integration module
    pub aws_cloudtrail: PinnedSource,
}

impl Default for ModulesOptions {
    fn default() -> Self {
        Self {
            lacework_provider: PinnedSource::new("lacework/lacework", "~> 0.3"),
            aws_config: PinnedSource::new("lacework/config/aws", "~> 0.1"),
            aws_cloudtrail: PinnedSource::new("lacework/cloudtrail/aws", "~> 0.1"),
        }
    }
}

/// Main configuration structure with nested sections.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Output options
    pub output: OutputOptions,

    /// Generation options
    pub generate: GenerateOptions,

    /// Module and provider pins
    pub modules: ModulesOptions,
}

fn default_file_name() -> String {
    "main.tf".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or a value fails validation.
    pub fn from_yaml(content: &str) -> Result<Self> {
        tracing::debug!("Parsing configuration from YAML");
        let expanded = expand_env_vars(content);

        let config: Config = serde_yaml::from_str(&expanded).map_err(|e| {
            crate::err!(ConfigParse {
                message: e.to_string(),
                source: None,
            })
        })?;
        config.validate()?;

        tracing::debug!(
            directory = ?config.output.directory,
            file_name = %config.output.file_name,
            non_interactive = config.generate.non_interactive,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Check values serde cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns `ConfigValue` for an empty or path-like file name and
    /// `ConfigMissing` for an empty module source or version.
    pub fn validate(&self) -> Result<()> {
        let file_name = &self.output.file_name;
        if file_name.is_empty() || file_name.contains(['/', '\\']) {
            return Err(crate::err!(ConfigValue {
                key: "output.file_name".to_string(),
                message: format!("'{file_name}' must be a plain file name"),
            }));
        }

        for (key, pin) in [
            ("modules.lacework_provider", &self.modules.lacework_provider),
            ("modules.aws_config", &self.modules.aws_config),
            ("modules.aws_cloudtrail", &self.modules.aws_cloudtrail),
        ] {
            if pin.source.is_empty() {
                return Err(crate::err!(ConfigMissing {
                    key: format!("{key}.source"),
                }));
            }
            if pin.version.is_empty() {
                return Err(crate::err!(ConfigMissing {
                    key: format!("{key}.version"),
                }));
            }
        }

        Ok(())
    }

    /// Directory the document is written to.
    ///
    /// # Errors
    ///
    /// Returns `HomeDirectory` if no directory is configured and the home
    /// directory cannot be resolved.
    pub fn output_directory(&self) -> Result<PathBuf> {
        if let Some(directory) = &self.output.directory {
            return Ok(directory.clone());
        }
        dirs::home_dir()
            .map(|home| home.join("lacework"))
            .ok_or_else(|| IacGenError::HomeDirectory {
                src_path: file!(),
                src_line: line!(),
            })
    }

    /// Generate an example YAML configuration.
    #[must_use]
    pub fn example_yaml() -> String {
        r#"# iacgen Configuration File

# Output options
output:
  # Directory the Terraform code is written to (default: ~/lacework)
  # directory: ${HOME}/lacework

  # Name of the generated file
  file_name: main.tf

  # Use colored output in terminal
  colored: true

# Generation options
generate:
  # Never prompt; only use values passed as flags
  non_interactive: false

# Sources and version constraints written into the generated code
modules:
  lacework_provider:
    source: lacework/lacework
    version: "~> 0.3"
  aws_config:
    source: lacework/config/aws
    version: "~> 0.1"
  aws_cloudtrail:
    source: lacework/cloudtrail/aws
    version: "~> 0.1"
"#
        .to_string()
    }

    /// Merge CLI arguments into the configuration.
    pub fn merge_cli_args(&mut self, non_interactive: bool, output: Option<&PathBuf>) {
        if non_interactive {
            self.generate.non_interactive = true;
        }
        if let Some(directory) = output {
            self.output.directory = Some(directory.clone());
        }
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. Unknown variables are left as-is.
fn expand_env_vars(content: &str) -> String {
    let mut result = content.to_string();

    let braced = regex::Regex::new(r"\$\{([^}]+)\}").expect("valid regex");
    for cap in braced.captures_iter(content) {
        if let Ok(value) = std::env::var(&cap[1]) {
            result = result.replace(&cap[0], &value);
        }
    }

    let bare = regex::Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)").expect("valid regex");
    for cap in bare.captures_iter(content) {
        if let Ok(value) = std::env::var(&cap[1]) {
            result = result.replace(&cap[0], &value);
        }
    }

    result
}
