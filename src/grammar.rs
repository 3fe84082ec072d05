use std::collections::{HashMap, HashSet};

use rand::Rng;
use tracing::{debug, warn};

use crate::config::{Config, RuleConfig};
use crate::expand::Expander;
use crate::pattern::Production;
use crate::rewrite::{Exclusion, Rewrite};
use crate::utils::{GenerationError, GrammarError, Problem, ProblemKind, Problems, Result};

/// Bounds that keep every generation call finite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum nesting of rule references (to prevent infinite recursion)
    pub max_recursion_depth: usize,
    /// Candidates a non-terminal rule may try before giving up on exclusions
    pub max_attempts: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_recursion_depth: 64,
            max_attempts: 100,
        }
    }
}

/// A compiled rule
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub productions: Vec<Production>,
    /// Empty for terminal rules
    pub rewrites: Vec<Rewrite>,
    /// Empty for terminal rules
    pub exclusions: Vec<Exclusion>,
    pub terminal: bool,
}

/// An immutable, validated grammar snapshot.
///
/// Built wholesale from a [`Config`]; editing the config and loading it again
/// yields a new snapshot, so generations running against this one never see
/// partial edits.
#[derive(Debug, Clone)]
pub struct Grammar {
    rules: HashMap<String, Rule>,
    /// Rule names in config order
    order: Vec<String>,
    root: String,
    weighted: bool,
    limits: Limits,
}

impl Grammar {
    /// Validate and compile a config with default limits
    pub fn load(config: &Config) -> Result<Self> {
        Self::load_with_limits(config, Limits::default())
    }

    /// Validate and compile a config, bounding generation by `limits`.
    ///
    /// Fails with [`GrammarError::Invalid`] carrying every problem found.
    pub fn load_with_limits(config: &Config, limits: Limits) -> Result<Self> {
        let (rules, problems) = compile(config);
        if !problems.is_empty() {
            debug!(problems = problems.len(), "grammar rejected");
            return Err(GrammarError::Invalid(Problems(problems)));
        }

        let order: Vec<String> = rules.iter().map(|r| r.name.clone()).collect();
        let rules: HashMap<String, Rule> = rules.into_iter().map(|r| (r.name.clone(), r)).collect();
        // compile() reports a missing root, so it is present here
        let root = config.root.clone().unwrap_or_default();

        debug!(rules = rules.len(), root = %root, weighted = config.enable_weights, "grammar loaded");

        Ok(Grammar {
            rules,
            order,
            root,
            weighted: config.enable_weights,
            limits,
        })
    }

    /// Every problem with a config, in a stable order; empty when it loads
    pub fn validate(config: &Config) -> Vec<Problem> {
        compile(config).1
    }

    /// Look up a rule by name
    pub fn resolve(&self, name: &str) -> std::result::Result<&Rule, GenerationError> {
        self.rules
            .get(name)
            .ok_or_else(|| GenerationError::NotFound(name.to_string()))
    }

    /// Name of the rule generation starts from
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Whether pattern weights bias the draw
    pub fn weighted(&self) -> bool {
        self.weighted
    }

    /// Bounds applied to every generation call
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// True when a rule with this name exists
    pub fn has_rule(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Rules in config order
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.order.iter().filter_map(|name| self.rules.get(name))
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Generate one word from the root rule
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> std::result::Result<String, GenerationError> {
        self.generate_from(&self.root, rng)
    }

    /// Generate one word starting at an arbitrary rule
    pub fn generate_from<R: Rng + ?Sized>(
        &self,
        rule: &str,
        rng: &mut R,
    ) -> std::result::Result<String, GenerationError> {
        Expander::new(self, rng).expand(rule, 0)
    }
}

fn compile(config: &Config) -> (Vec<Rule>, Vec<Problem>) {
    let mut problems = Vec::new();
    let names: HashSet<&str> = config.rules.iter().map(|r| r.name.as_str()).collect();

    match config.root.as_deref() {
        None | Some("") => problems.push(Problem::new("", ProblemKind::MissingRoot)),
        Some(root) if !names.contains(root) => problems.push(Problem::new(root, ProblemKind::UnknownRoot)),
        Some(_) => {}
    }

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut rules = Vec::with_capacity(config.rules.len());

    for rule in &config.rules {
        if rule.name.is_empty() {
            problems.push(Problem::new(&rule.id, ProblemKind::EmptyName));
        } else if !seen.insert(rule.name.as_str()) && reported.insert(rule.name.as_str()) {
            problems.push(Problem::new(&rule.name, ProblemKind::DuplicateName));
        }

        rules.push(compile_rule(rule, &names, &mut problems));
    }

    (rules, problems)
}

fn compile_rule(rule: &RuleConfig, names: &HashSet<&str>, problems: &mut Vec<Problem>) -> Rule {
    let name = rule.name.as_str();

    if rule.patterns.is_empty() {
        problems.push(Problem::new(name, ProblemKind::NoPatterns));
    }

    let mut productions = Vec::with_capacity(rule.patterns.len());
    for pattern in &rule.patterns {
        match Production::parse(&pattern.pattern, pattern.weight.unwrap_or(0)) {
            Ok(production) => {
                for reference in production.references() {
                    let kind = if rule.terminal_only {
                        ProblemKind::TerminalReference {
                            reference: reference.to_string(),
                        }
                    } else if !names.contains(reference) {
                        ProblemKind::UnresolvedReference {
                            reference: reference.to_string(),
                        }
                    } else {
                        continue;
                    };
                    problems.push(Problem::new(name, kind));
                }
                productions.push(production);
            }
            Err(reason) => problems.push(Problem::new(
                name,
                ProblemKind::MalformedPattern {
                    pattern: pattern.pattern.clone(),
                    reason,
                },
            )),
        }
    }

    let mut rewrites = Vec::new();
    let mut exclusions = Vec::new();

    if rule.terminal_only {
        if !rule.rewrites.is_empty() || !rule.exclusions.is_empty() {
            warn!(rule = name, "rewrites and exclusions on a terminal rule are ignored");
        }
    } else {
        for rewrite in &rule.rewrites {
            match Rewrite::new(&rewrite.pattern, &rewrite.replacement) {
                Ok(compiled) => rewrites.push(compiled),
                Err(e) => problems.push(Problem::new(
                    name,
                    ProblemKind::InvalidRewrite {
                        pattern: rewrite.pattern.clone(),
                        reason: e,
                    },
                )),
            }
        }
        for exclusion in &rule.exclusions {
            match Exclusion::new(&exclusion.pattern) {
                Ok(compiled) => exclusions.push(compiled),
                Err(e) => problems.push(Problem::new(
                    name,
                    ProblemKind::InvalidExclusion {
                        pattern: exclusion.pattern.clone(),
                        reason: e.to_string(),
                    },
                )),
            }
        }
    }

    Rule {
        name: rule.name.clone(),
        productions,
        rewrites,
        exclusions,
        terminal: rule.terminal_only,
    }
}

#[cfg(test)]
impl Grammar {
    /// Drop a rule's patterns, which `load` would otherwise reject
    pub(crate) fn clear_patterns(&mut self, name: &str) {
        if let Some(rule) = self.rules.get_mut(name) {
            rule.productions.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PatternConfig, RuleConfig};
    use pretty_assertions::assert_eq;

    fn kinds(problems: &[Problem]) -> Vec<(&str, &ProblemKind)> {
        problems.iter().map(|p| (p.rule.as_str(), &p.kind)).collect()
    }

    fn word_config() -> Config {
        Config::new("word")
            .with_rule(RuleConfig::new("word").pattern("{syllable}{syllable}"))
            .with_rule(RuleConfig::terminal("syllable", &["pa", "ki", "to"]))
    }

    #[test]
    fn test_load_valid_grammar() {
        let grammar = Grammar::load(&word_config()).unwrap();

        assert_eq!(grammar.root(), "word");
        assert_eq!(grammar.len(), 2);
        assert!(!grammar.weighted());
        assert!(grammar.has_rule("syllable"));
        assert_eq!(
            grammar.rules().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            vec!["word", "syllable"]
        );
        assert!(grammar.resolve("syllable").unwrap().terminal);
        assert_eq!(
            grammar.resolve("missing").unwrap_err(),
            GenerationError::NotFound("missing".to_string())
        );
    }

    #[test]
    fn test_missing_and_unknown_root() {
        let mut config = word_config();
        config.root = None;
        assert_eq!(
            kinds(&Grammar::validate(&config)),
            vec![("", &ProblemKind::MissingRoot)]
        );

        config.set_root("sentence");
        assert_eq!(
            kinds(&Grammar::validate(&config)),
            vec![("sentence", &ProblemKind::UnknownRoot)]
        );
    }

    #[test]
    fn test_collects_every_problem() {
        let config = Config::new("word")
            .with_rule(RuleConfig::new("word").pattern("{onset}{nucleus}").pattern("{coda"))
            .with_rule(RuleConfig::terminal("nucleus", &["a"]).pattern("{word}"))
            .with_rule(RuleConfig::new("nucleus").pattern("e"))
            .with_rule(RuleConfig::new("empty"));

        let problems = Grammar::validate(&config);
        assert_eq!(
            kinds(&problems),
            vec![
                (
                    "word",
                    &ProblemKind::UnresolvedReference {
                        reference: "onset".to_string()
                    }
                ),
                (
                    "word",
                    &ProblemKind::MalformedPattern {
                        pattern: "{coda".to_string(),
                        reason: "unclosed brace".to_string()
                    }
                ),
                (
                    "nucleus",
                    &ProblemKind::TerminalReference {
                        reference: "word".to_string()
                    }
                ),
                ("nucleus", &ProblemKind::DuplicateName),
                ("empty", &ProblemKind::NoPatterns),
            ]
        );

        match Grammar::load(&config) {
            Err(GrammarError::Invalid(Problems(reported))) => assert_eq!(reported, problems),
            other => panic!("expected invalid grammar, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_name_reported_by_id() {
        let mut config = word_config();
        let id = config.add_rule(false).id.clone();
        config
            .rules
            .last_mut()
            .unwrap()
            .patterns
            .push(PatternConfig::new("x"));

        assert_eq!(
            kinds(&Grammar::validate(&config)),
            vec![(id.as_str(), &ProblemKind::EmptyName)]
        );
    }

    #[test]
    fn test_invalid_regexes() {
        let config = Config::new("word").with_rule(
            RuleConfig::new("word")
                .pattern("a")
                .rewrite("(", "")
                .exclusion("["),
        );

        let problems = Grammar::validate(&config);
        assert_eq!(problems.len(), 2);
        assert!(matches!(problems[0].kind, ProblemKind::InvalidRewrite { .. }));
        assert!(matches!(problems[1].kind, ProblemKind::InvalidExclusion { .. }));
    }

    #[test]
    fn test_rewrite_with_unknown_group() {
        let config = Config::new("word").with_rule(
            RuleConfig::new("word")
                .pattern("ax")
                .rewrite("(a)x", "$1b")
                .rewrite("(a)x", "${1}b"),
        );

        let problems = Grammar::validate(&config);
        assert_eq!(problems.len(), 1);
        match &problems[0].kind {
            ProblemKind::InvalidRewrite { pattern, reason } => {
                assert_eq!(pattern, "(a)x");
                assert!(reason.contains("'1b'"), "{}", reason);
            }
            other => panic!("expected invalid rewrite, got {:?}", other),
        }
    }

    #[test]
    fn test_terminal_rewrites_ignored() {
        let config = Config::new("letter")
            .with_rule(RuleConfig::terminal("letter", &["a"]).rewrite("(", "").exclusion("a"));

        let grammar = Grammar::load(&config).unwrap();
        let rule = grammar.resolve("letter").unwrap();
        assert!(rule.rewrites.is_empty());
        assert!(rule.exclusions.is_empty());
    }

    #[test]
    fn test_validate_is_idempotent() {
        let config = Config::new("nope").with_rule(RuleConfig::new("a").pattern("{b}"));
        assert_eq!(Grammar::validate(&config), Grammar::validate(&config));
    }
}
