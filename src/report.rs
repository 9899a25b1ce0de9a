//! Declarative report definitions.
//!
//! A report is a JSON document listing the document options, an optional
//! footer and the blocks to lay out in order:
//!
//! ```json
//! {
//!   "document": { "title": "Stock levels", "format": "a4" },
//!   "footer": { "content": "Page {pageNumber} of {totalPages}" },
//!   "blocks": [
//!     { "type": "header", "content": "Warehouse A", "level": 1 },
//!     { "type": "table", "headers": ["SKU", "Qty"], "records": [["B-100", 12]] }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::composer::Composer;
use crate::error::Result;
use crate::model::{
    Alignment, DocumentOptions, FooterOptions, Record, SectionOptions, TableOptions, TextOptions,
};
use crate::pdf::Canvas;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Report {
    pub document: DocumentOptions,
    pub footer: Option<FooterBlock>,
    pub blocks: Vec<Block>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FooterBlock {
    pub content: String,
    #[serde(default)]
    pub options: FooterOptions,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header {
        content: String,
        #[serde(default = "default_header_level")]
        level: u8,
        #[serde(default)]
        align: Option<Alignment>,
    },
    Text {
        content: String,
        #[serde(default)]
        options: TextOptions,
    },
    Spacing {
        height: f32,
    },
    Section(SectionOptions),
    PageBreak,
    Table {
        headers: Vec<String>,
        #[serde(default)]
        records: Vec<serde_json::Value>,
        #[serde(default)]
        options: TableOptions,
    },
}

fn default_header_level() -> u8 {
    1
}

impl Report {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Lay out `report` onto `composer`, replacing whatever document it held.
pub fn compose<C: Canvas>(composer: &mut Composer<C>, report: &Report) -> Result<()> {
    composer.create_document(report.document.clone());

    for block in &report.blocks {
        match block {
            Block::Header {
                content,
                level,
                align,
            } => composer.add_header(content, *level, *align)?,
            Block::Text { content, options } => composer.add_text(content, *options)?,
            Block::Spacing { height } => composer.add_spacing(*height)?,
            Block::Section(options) => composer.add_section_with(options)?,
            Block::PageBreak => composer.add_page_break()?,
            Block::Table {
                headers,
                records,
                options,
            } => {
                let records: Vec<Record> = records.iter().cloned().map(Record::from).collect();
                composer.generate_table(headers, &records, options)?;
            }
        }
    }

    // Stamped last so every page, including ones added by the blocks, is
    // covered from the start.
    if let Some(footer) = &report.footer {
        composer.add_footer_with(&footer.content, footer.options)?;
    }
    Ok(())
}
