//! Quick-prompt catalog
//!
//! Predefined questions a user can pick instead of typing. The visible title
//! and the prompt sent to the endpoint are separate on purpose.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A selectable question template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickPrompt {
    /// Shown in the transcript as the user's turn
    pub title: String,
    /// Sent to the endpoint
    pub prompt: String,
}

impl QuickPrompt {
    pub fn new(title: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            prompt: prompt.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read quick prompts from {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid quick prompt catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("quick prompt {index} has a blank title or prompt")]
    Blank { index: usize },
}

const BUILTIN: &[(&str, &str)] = &[
    (
        "Drug Interactions with Warfarin",
        "What are the most important drug interactions with warfarin that pharmacists should monitor?",
    ),
    (
        "Metformin Side Effects",
        "What are the common and serious side effects of metformin that patients should be aware of?",
    ),
    (
        "Hypertension First-Line Therapy",
        "What are the current first-line medication options for treating hypertension according to guidelines?",
    ),
    (
        "Antibiotic Stewardship",
        "What are key principles of antibiotic stewardship that clinical pharmacists should follow?",
    ),
    (
        "Diabetes Medication Classes",
        "Compare the different classes of diabetes medications and their mechanisms of action.",
    ),
    (
        "Medication Reconciliation",
        "What are best practices for medication reconciliation in hospital settings?",
    ),
];

/// Read-only list of quick prompts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickPromptCatalog {
    prompts: Vec<QuickPrompt>,
}

impl QuickPromptCatalog {
    pub fn builtin() -> Self {
        Self {
            prompts: BUILTIN
                .iter()
                .map(|(title, prompt)| QuickPrompt::new(*title, *prompt))
                .collect(),
        }
    }

    pub fn new(prompts: Vec<QuickPrompt>) -> Result<Self, CatalogError> {
        if let Some(index) = prompts
            .iter()
            .position(|p| p.title.trim().is_empty() || p.prompt.trim().is_empty())
        {
            return Err(CatalogError::Blank { index });
        }
        Ok(Self { prompts })
    }

    /// Parse a JSON array of `{"title", "prompt"}` objects
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        Self::new(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn get(&self, index: usize) -> Option<&QuickPrompt> {
        self.prompts.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuickPrompt> {
        self.prompts.iter()
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}

impl Default for QuickPromptCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
