//! Terraform block generation.
//!
//! - [`hcl`]: attribute values, references and the block writer
//! - [`blocks`]: module, provider and required-providers builders
//! - [`document`]: assembling factory results into one document
//! - [`aws`]: the Lacework AWS integration factories

pub mod aws;
pub mod blocks;
pub mod document;
pub mod hcl;

pub use aws::AwsTerraform;
pub use blocks::{required_providers, Module, Provider, RequiredProvider};
pub use document::{BlockSet, Document};
pub use self::hcl::{AttributeValue, Attributes, Block, ProviderDetails, Reference};
