use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use uuid::Uuid;

use crate::utils::Result;

/// Generate a fresh opaque rule identifier (a v4 UUID without hyphens)
pub fn new_rule_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// One alternative of a rule, as written by the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PatternRepr")]
pub struct PatternConfig {
    pub pattern: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
}

impl PatternConfig {
    /// An unweighted pattern
    pub fn new(pattern: &str) -> Self {
        PatternConfig {
            pattern: pattern.to_string(),
            weight: None,
        }
    }

    /// A pattern with an explicit weight
    pub fn weighted(pattern: &str, weight: u32) -> Self {
        PatternConfig {
            pattern: pattern.to_string(),
            weight: Some(weight),
        }
    }
}

// Patterns may be written as a bare string or as an object with a weight.
#[derive(Deserialize)]
#[serde(untagged)]
enum PatternRepr {
    Text(String),
    Full {
        pattern: String,
        #[serde(default)]
        weight: Option<u32>,
    },
}

impl From<PatternRepr> for PatternConfig {
    fn from(repr: PatternRepr) -> Self {
        match repr {
            PatternRepr::Text(pattern) => PatternConfig { pattern, weight: None },
            PatternRepr::Full { pattern, weight } => PatternConfig { pattern, weight },
        }
    }
}

/// A regex find/replace applied after expansion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteConfig {
    pub pattern: String,
    #[serde(default)]
    pub replacement: String,
}

impl RewriteConfig {
    pub fn new(pattern: &str, replacement: &str) -> Self {
        RewriteConfig {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        }
    }
}

/// A regex that rejects any candidate it matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ExclusionRepr")]
pub struct ExclusionConfig {
    pub pattern: String,
}

impl ExclusionConfig {
    pub fn new(pattern: &str) -> Self {
        ExclusionConfig {
            pattern: pattern.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExclusionRepr {
    Text(String),
    Full { pattern: String },
}

impl From<ExclusionRepr> for ExclusionConfig {
    fn from(repr: ExclusionRepr) -> Self {
        match repr {
            ExclusionRepr::Text(pattern) | ExclusionRepr::Full { pattern } => {
                ExclusionConfig { pattern }
            }
        }
    }
}

/// A rule as edited by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfig {
    #[serde(default = "new_rule_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub patterns: Vec<PatternConfig>,
    #[serde(default)]
    pub rewrites: Vec<RewriteConfig>,
    #[serde(default)]
    pub exclusions: Vec<ExclusionConfig>,
    #[serde(default)]
    pub terminal_only: bool,
}

impl RuleConfig {
    /// A non-terminal rule with a fresh id
    pub fn new(name: &str) -> Self {
        RuleConfig {
            id: new_rule_id(),
            name: name.to_string(),
            patterns: Vec::new(),
            rewrites: Vec::new(),
            exclusions: Vec::new(),
            terminal_only: false,
        }
    }

    /// A terminal rule whose patterns are the given literals
    pub fn terminal(name: &str, literals: &[&str]) -> Self {
        let mut rule = RuleConfig::new(name);
        rule.terminal_only = true;
        rule.patterns = literals.iter().map(|l| PatternConfig::new(l)).collect();
        rule
    }

    /// Append an unweighted pattern
    pub fn pattern(mut self, pattern: &str) -> Self {
        self.patterns.push(PatternConfig::new(pattern));
        self
    }

    pub fn weighted_pattern(mut self, pattern: &str, weight: u32) -> Self {
        self.patterns.push(PatternConfig::weighted(pattern, weight));
        self
    }

    /// Append a rewrite; rewrites run in the order they are added
    pub fn rewrite(mut self, pattern: &str, replacement: &str) -> Self {
        self.rewrites.push(RewriteConfig::new(pattern, replacement));
        self
    }

    pub fn exclusion(mut self, pattern: &str) -> Self {
        self.exclusions.push(ExclusionConfig::new(pattern));
        self
    }
}

/// The serialized grammar the editor produces and the engine consumes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
    #[serde(default)]
    pub enable_weights: bool,
}

impl Config {
    /// An empty config rooted at `root`, with weights disabled
    pub fn new(root: &str) -> Self {
        Config {
            root: Some(root.to_string()),
            rules: Vec::new(),
            enable_weights: false,
        }
    }

    /// Parse the editor's JSON; unknown fields are ignored
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Pretty-printed JSON in the shape `from_json_str` reads
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Builder-style helper used by presets and tests
    pub fn with_rule(mut self, rule: RuleConfig) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_weights(mut self, enable: bool) -> Self {
        self.enable_weights = enable;
        self
    }

    /// The first rule with this name
    pub fn rule(&self, name: &str) -> Option<&RuleConfig> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Append an empty rule and return it for editing
    pub fn add_rule(&mut self, terminal_only: bool) -> &mut RuleConfig {
        let mut rule = RuleConfig::new("");
        rule.terminal_only = terminal_only;
        self.rules.push(rule);
        let last = self.rules.len() - 1;
        &mut self.rules[last]
    }

    /// Remove the rule at `index`; deleting the root rule unsets the root
    pub fn remove_rule(&mut self, index: usize) -> Option<RuleConfig> {
        if index >= self.rules.len() {
            return None;
        }
        let removed = self.rules.remove(index);
        if self.root.as_deref() == Some(removed.name.as_str()) {
            self.root = None;
        }
        Some(removed)
    }

    /// Swap in an edited rule at `index`, returning the old one
    pub fn replace_rule(&mut self, index: usize, rule: RuleConfig) -> Option<RuleConfig> {
        self.rules
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, rule))
    }

    /// Move the rule with id `active` to the position held by `over`
    pub fn move_rule(&mut self, active: &str, over: &str) {
        if active == over {
            return;
        }
        let from = self.rules.iter().position(|r| r.id == active);
        let to = self.rules.iter().position(|r| r.id == over);
        if let (Some(from), Some(to)) = (from, to) {
            let rule = self.rules.remove(from);
            self.rules.insert(to, rule);
        }
    }

    /// Select the root rule by name; it is not checked until load
    pub fn set_root(&mut self, name: &str) {
        self.root = Some(name.to_string());
    }

    pub fn set_weights(&mut self, enable: bool) {
        self.enable_weights = enable;
    }

    /// Remove every rule and unset the root
    pub fn clear(&mut self) {
        self.root = None;
        self.rules.clear();
    }
}
