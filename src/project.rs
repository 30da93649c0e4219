//! Project settings: page and resolution defaults loaded from a TOML
//! file and applied to a grammar tree before a document is parsed.
//!
//! Settings seed the default slots only; directives in the document
//! still override them the normal way.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::parser::meta::Meta;
use crate::parser::types::PageSizeData;
use crate::parser::values::Leaf;

/// Errors that can occur when loading or parsing a settings file
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Resolved project settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSettings {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Rendering resolution in dots per inch.
    pub resolution_dpi: f32,
    /// Page size in document units (inches).
    pub page_size: [f32; 2],
    pub page_size_id: String,
    /// Default page margins in document units.
    pub page_margins: [f32; 2],
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            resolution_dpi: 150.0,
            page_size: [8.5, 11.0],
            page_size_id: "Letter".to_string(),
            page_margins: [0.05, 0.05],
        }
    }
}

/// TOML structure for deserializing settings files
#[derive(Deserialize)]
struct TomlSettings {
    metadata: Option<TomlMetadata>,
    page: Option<TomlPage>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct TomlPage {
    width: Option<f32>,
    height: Option<f32>,
    size_id: Option<String>,
    margins: Option<[f32; 2]>,
    dpi: Option<f32>,
}

impl ProjectSettings {
    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load settings from a TOML string
    pub fn from_str(content: &str) -> Result<Self, SettingsError> {
        let parsed: TomlSettings = toml::from_str(content)?;
        let mut settings = Self::default();

        if let Some(metadata) = parsed.metadata {
            settings.name = metadata.name;
            settings.description = metadata.description;
        }
        if let Some(page) = parsed.page {
            if let Some(width) = page.width {
                settings.page_size[0] = width;
                settings.page_size_id = "Custom".to_string();
            }
            if let Some(height) = page.height {
                settings.page_size[1] = height;
                settings.page_size_id = "Custom".to_string();
            }
            if let Some(size_id) = page.size_id {
                settings.page_size_id = size_id;
            }
            if let Some(margins) = page.margins {
                settings.page_margins = margins;
            }
            if let Some(dpi) = page.dpi {
                settings.resolution_dpi = dpi;
            }
        }

        Ok(settings)
    }

    /// Seed a grammar tree's default slots from these settings.
    pub fn apply(&self, meta: &mut Meta) {
        if let Some(node) = meta.leaf_mut(&["!LPUB", "PAGE", "SIZE"]) {
            if let Leaf::PageSize(leaf) = &mut node.leaf {
                leaf.value.set_default(PageSizeData {
                    size: self.page_size,
                    size_id: self.page_size_id.clone(),
                });
            }
        }
        if let Some(node) = meta.leaf_mut(&["!LPUB", "PAGE", "MARGINS"]) {
            if let Leaf::FloatPair(leaf) = &mut node.leaf {
                leaf.value.set_default(self.page_margins);
            }
        }
        if let Some(node) = meta.leaf_mut(&["!LPUB", "RESOLUTION"]) {
            if let Leaf::Float(leaf) = &mut node.leaf {
                leaf.value.set_default(self.resolution_dpi);
            }
        }
    }
}
