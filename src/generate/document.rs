//! Document assembly.
//!
//! Factories return a single block, a list of blocks, or nothing. The
//! assembler flattens them in call order and writes each block followed by
//! one blank line, the last one included.

use super::hcl::Block;
use crate::error::Result;

/// The result of one block factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockSet {
    /// Exactly one block
    Single(Block),
    /// Zero or more blocks
    Many(Vec<Block>),
    /// The factory had nothing to emit
    Absent,
}

impl From<Block> for BlockSet {
    fn from(block: Block) -> Self {
        Self::Single(block)
    }
}

impl From<Vec<Block>> for BlockSet {
    fn from(blocks: Vec<Block>) -> Self {
        Self::Many(blocks)
    }
}

impl From<Option<Block>> for BlockSet {
    fn from(block: Option<Block>) -> Self {
        block.map_or(Self::Absent, Self::Single)
    }
}

/// An ordered list of top-level blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    /// Flatten factory results into one document, dropping absent results.
    pub fn combine<I>(results: I) -> Self
    where
        I: IntoIterator<Item = BlockSet>,
    {
        let mut blocks = Vec::new();
        for result in results {
            match result {
                BlockSet::Single(block) => blocks.push(block),
                BlockSet::Many(many) => blocks.extend(many),
                BlockSet::Absent => {}
            }
        }
        Self { blocks }
    }

    /// Blocks in output order.
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Whether no factory produced a block.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Serialize the document.
    ///
    /// # Errors
    ///
    /// Returns an error if any block fails to render.
    pub fn render(&self) -> Result<String> {
        let mut out = String::new();
        for block in &self.blocks {
            out.push_str(&block.render()?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Parse rendered text back to make sure it is valid HCL.
    ///
    /// # Errors
    ///
    /// Returns an `HclParse` error if the text does not parse.
    pub fn verify(text: &str) -> Result<hcl::Body> {
        hcl::from_str(text).map_err(|e| {
            crate::err!(HclParse {
                message: e.to_string(),
            })
        })
    }
}

impl FromIterator<BlockSet> for Document {
    fn from_iter<T: IntoIterator<Item = BlockSet>>(iter: T) -> Self {
        Self::combine(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::hcl::{Attributes, Reference};
    use pretty_assertions::assert_eq;

    fn block(label: &str) -> Block {
        let mut attributes = Attributes::new();
        attributes.insert("source".to_string(), "a/b".into());
        Block::generic("module", [label], attributes)
    }

    #[test]
    fn test_combine_flattens_in_order_and_drops_absent() {
        let document = Document::combine([
            BlockSet::from(block("one")),
            BlockSet::Absent,
            BlockSet::from(vec![block("two"), block("three")]),
            BlockSet::from(None::<Block>),
            BlockSet::Many(Vec::new()),
        ]);

        let labels: Vec<&str> = document
            .blocks()
            .iter()
            .map(|b| b.labels()[0].as_str())
            .collect();
        assert_eq!(labels, ["one", "two", "three"]);
    }

    #[test]
    fn test_render_separates_blocks_with_blank_line() {
        let document: Document = [BlockSet::from(block("one")), BlockSet::from(block("two"))]
            .into_iter()
            .collect();

        assert_eq!(
            document.render().unwrap(),
            "module \"one\" {\n  source = \"a/b\"\n}\n\nmodule \"two\" {\n  source = \"a/b\"\n}\n\n"
        );
    }

    #[test]
    fn test_empty_document_renders_empty() {
        let document = Document::combine(Vec::<BlockSet>::new());
        assert!(document.is_empty());
        assert_eq!(document.render().unwrap(), "");
    }

    #[test]
    fn test_verify_parses_rendered_output() {
        let mut attributes = Attributes::new();
        attributes.insert(
            "iam_role_name".to_string(),
            Reference::new(["module", "aws_config", "iam_role_name"]).into(),
        );
        let document = Document::combine([BlockSet::from(Block::generic(
            "module",
            ["main_cloudtrail"],
            attributes,
        ))]);

        let body = Document::verify(&document.render().unwrap()).unwrap();
        assert_eq!(body.blocks().count(), 1);
    }

    #[test]
    fn test_verify_rejects_garbage() {
        assert!(Document::verify("this is not valid { hcl").is_err());
    }
}
