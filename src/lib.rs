//! Wordgen is a rule-driven word generator.
//!
//! A grammar is a set of named rules. Terminal rules list literal
//! alternatives; non-terminal rules list patterns such as `{onset}{vowel}n`
//! that reference other rules by name, plus regex rewrites applied to the
//! expanded text and regex exclusions that reject a candidate and draw again.
//! Patterns may carry weights that are honoured when the grammar enables them.
//!
//! # Example
//!
//! ```rust
//! use wordgen::{Config, RuleConfig};
//!
//! let config = Config::new("word")
//!     .with_rule(RuleConfig::new("word").pattern("{syllable}"))
//!     .with_rule(RuleConfig::terminal("syllable", &["pa", "ki", "to"]));
//!
//! let grammar = wordgen::load_grammar(&config).unwrap();
//! let word = wordgen::generate(&grammar, Some(7)).unwrap();
//! assert!(["pa", "ki", "to"].contains(&word.as_str()));
//! ```

pub mod config;
pub mod expand;
pub mod generator;
pub mod grammar;
pub mod pattern;
pub mod presets;
pub mod rewrite;
pub mod select;
pub mod utils;

pub use config::{Config, ExclusionConfig, PatternConfig, RewriteConfig, RuleConfig};
pub use generator::{GrammarHandle, generate, generate_batch};
pub use grammar::{Grammar, Limits, Rule};
pub use pattern::{Element, Production};
pub use utils::{GenerationError, GrammarError, Problem, ProblemKind, Problems, Result};

/// Validate a config and build an immutable grammar from it
pub fn load_grammar(config: &Config) -> Result<Grammar> {
    Grammar::load(config)
}

/// Every problem with a config, without building a grammar
pub fn validate(config: &Config) -> Vec<Problem> {
    Grammar::validate(config)
}
