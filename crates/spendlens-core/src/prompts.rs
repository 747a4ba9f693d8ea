//! Prompt Library for the advice backends
//!
//! Prompts are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/spendlens/prompts/overrides/)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Users can reword prompts without rebuilding and still pick up new default
//! prompts on upgrade.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default prompts (compiled into binary)
mod defaults {
    pub const FINANCIAL_ADVICE: &str = include_str!("../../../prompts/financial_advice.md");
}

/// Known prompt IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// Personalized advice from a financial summary
    FinancialAdvice,
}

impl PromptId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FinancialAdvice => "financial_advice",
        }
    }

    pub fn all() -> &'static [PromptId] {
        &[Self::FinancialAdvice]
    }

    fn default_content(&self) -> &'static str {
        match self {
            Self::FinancialAdvice => defaults::FINANCIAL_ADVICE,
        }
    }

    fn file_name(&self) -> String {
        format!("{}.md", self.as_str())
    }
}

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PromptId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PromptId::all()
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| Error::NotFound(format!("Unknown prompt: {}", s)))
    }
}

/// Prompt frontmatter metadata
#[derive(Debug, Clone, Deserialize)]
pub struct PromptMetadata {
    pub id: String,
    /// Bumped whenever the default wording changes
    pub version: u32,
    /// Completion length cap passed to the backend
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// A loaded prompt with metadata and content
#[derive(Debug, Clone)]
pub struct Prompt {
    pub metadata: PromptMetadata,
    /// Body after the frontmatter (system + user sections)
    pub content: String,
    pub is_override: bool,
    pub override_path: Option<PathBuf>,
}

impl Prompt {
    pub fn system_section(&self) -> Option<&str> {
        extract_section(&self.content, "# System")
    }

    pub fn user_section(&self) -> Option<&str> {
        extract_section(&self.content, "# User")
    }

    /// Render the whole body with template variables replaced
    pub fn render(&self, vars: &HashMap<&str, String>) -> String {
        render_template(&self.content, vars)
    }

    /// Render just the user section, or the whole body if it has none
    pub fn render_user(&self, vars: &HashMap<&str, String>) -> String {
        match self.user_section() {
            Some(user) => render_template(user, vars),
            None => self.render(vars),
        }
    }
}

/// Prompt library for loading and caching prompts
pub struct PromptLibrary {
    override_dir: Option<PathBuf>,
    cache: HashMap<PromptId, Prompt>,
}

impl PromptLibrary {
    /// Create a prompt library with the default override directory
    pub fn new() -> Self {
        Self {
            override_dir: default_prompts_dir(),
            cache: HashMap::new(),
        }
    }

    pub fn with_override_dir(path: PathBuf) -> Self {
        Self {
            override_dir: Some(path),
            cache: HashMap::new(),
        }
    }

    /// Embedded prompts only, overrides ignored
    pub fn embedded_only() -> Self {
        Self {
            override_dir: None,
            cache: HashMap::new(),
        }
    }

    /// Get a prompt by ID, loading from override or default
    pub fn get(&mut self, id: PromptId) -> Result<&Prompt> {
        let override_dir = self.override_dir.as_deref();
        match self.cache.entry(id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(load(override_dir, id)?)),
        }
    }

    /// List all prompts with their override status
    pub fn list(&mut self) -> Vec<PromptInfo> {
        PromptId::all()
            .iter()
            .map(|&id| {
                let override_path = self.override_path(id);
                let version = self.get(id).map(|p| p.metadata.version).unwrap_or(0);
                PromptInfo {
                    id,
                    version,
                    has_override: override_path.is_some(),
                    override_path,
                }
            })
            .collect()
    }

    pub fn has_override(&self, id: PromptId) -> bool {
        self.override_path(id).is_some()
    }

    fn override_path(&self, id: PromptId) -> Option<PathBuf> {
        self.override_dir
            .as_ref()
            .map(|d| d.join(id.file_name()))
            .filter(|p| p.exists())
    }

    pub fn override_dir(&self) -> Option<&PathBuf> {
        self.override_dir.as_ref()
    }

    /// Drop cached prompts so edited overrides are re-read
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Information about a prompt for listing
#[derive(Debug, Clone)]
pub struct PromptInfo {
    pub id: PromptId,
    pub version: u32,
    pub has_override: bool,
    pub override_path: Option<PathBuf>,
}

/// Default prompts override directory
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendlens").join("prompts").join("overrides"))
}

/// Load a prompt (checking override first, then default)
fn load(override_dir: Option<&Path>, id: PromptId) -> Result<Prompt> {
    if let Some(dir) = override_dir {
        let override_path = dir.join(id.file_name());
        if override_path.exists() {
            let content = fs::read_to_string(&override_path)
                .map_err(|e| Error::Config(format!("Failed to read prompt override: {}", e)))?;
            let (metadata, body) = parse_prompt(&content)?;
            tracing::debug!(prompt = id.as_str(), path = %override_path.display(), "Using prompt override");
            return Ok(Prompt {
                metadata,
                content: body,
                is_override: true,
                override_path: Some(override_path),
            });
        }
    }

    let (metadata, body) = parse_prompt(id.default_content())?;
    Ok(Prompt {
        metadata,
        content: body,
        is_override: false,
        override_path: None,
    })
}

/// Parse a prompt file into metadata and body
fn parse_prompt(content: &str) -> Result<(PromptMetadata, String)> {
    let content = content.trim();

    let rest = content.strip_prefix("---").ok_or_else(|| {
        Error::Config("Prompt must start with YAML frontmatter (---)".into())
    })?;

    let end = rest.find("---").ok_or_else(|| {
        Error::Config("Prompt frontmatter not closed (missing second ---)".into())
    })?;

    let frontmatter = rest[..end].trim();
    let body = rest[end + 3..].trim();

    let metadata: PromptMetadata = serde_yaml::from_str(frontmatter)
        .map_err(|e| Error::Config(format!("Invalid prompt frontmatter: {}", e)))?;

    Ok((metadata, body.to_string()))
}

/// Extract a section from the prompt content
fn extract_section<'a>(content: &'a str, header: &str) -> Option<&'a str> {
    let start = content.find(header)?;
    let after_header = &content[start + header.len()..];

    let end = after_header.find("\n# ").unwrap_or(after_header.len());

    Some(after_header[..end].trim())
}

/// `{{#if var}}` blocks first, then `{{var}}` substitution
fn render_template(template: &str, vars: &HashMap<&str, String>) -> String {
    let mut result = resolve_conditionals(template, vars);
    for (key, value) in vars {
        let pattern = format!("{{{{{}}}}}", key);
        result = result.replace(&pattern, value);
    }
    result
}

/// Keep `{{#if var}}...{{/if}}` bodies whose variable is set and non-empty
fn resolve_conditionals(content: &str, vars: &HashMap<&str, String>) -> String {
    let mut result = content.to_string();

    while let Some(if_start) = result.find("{{#if ") {
        let var_start = if_start + 6;
        let Some(var_len) = result[var_start..].find("}}") else {
            break;
        };
        let var_name = result[var_start..var_start + var_len].trim();
        let block_start = var_start + var_len + 2;

        let Some(block_len) = result[block_start..].find("{{/if}}") else {
            break;
        };
        let block_end = block_start + block_len;

        let keep = vars.get(var_name).is_some_and(|v| !v.is_empty());
        let replacement = if keep {
            result[block_start..block_end].to_string()
        } else {
            String::new()
        };

        result = format!(
            "{}{}{}",
            &result[..if_start],
            replacement,
            &result[block_end + 7..]
        );
    }

    result
}
