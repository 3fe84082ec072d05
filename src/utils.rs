use std::fmt;
use std::io;
use thiserror::Error;

/// Errors raised while loading or validating a grammar
#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid grammar: {0}")]
    Invalid(Problems),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
}

impl GrammarError {
    /// The offending problems, if this is a validation failure
    pub fn problems(&self) -> &[Problem] {
        match self {
            GrammarError::Invalid(problems) => &problems.0,
            _ => &[],
        }
    }
}

/// Errors raised by a single generation call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Recursion limit of {depth} exceeded while expanding '{rule}'")]
    RecursionLimitExceeded { rule: String, depth: usize },

    #[error("All {attempts} candidates for '{rule}' were excluded")]
    AllCandidatesExcluded { rule: String, attempts: usize },

    #[error("Rule not found: {0}")]
    NotFound(String),

    /// Only reachable for grammars that bypassed validation
    #[error("Rule has no patterns: {0}")]
    NoPatterns(String),
}

/// Result type for grammar operations
pub type Result<T> = std::result::Result<T, GrammarError>;

/// What is wrong with a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProblemKind {
    /// No root rule was selected
    MissingRoot,
    /// The root names a rule that does not exist
    UnknownRoot,
    EmptyName,
    DuplicateName,
    NoPatterns,
    /// A pattern could not be parsed
    MalformedPattern { pattern: String, reason: String },
    /// A pattern references a rule that does not exist
    UnresolvedReference { reference: String },
    /// A terminal rule's pattern references another rule
    TerminalReference { reference: String },
    InvalidRewrite { pattern: String, reason: String },
    InvalidExclusion { pattern: String, reason: String },
}

/// A single validation finding, attributed to the rule it concerns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub rule: String,
    pub kind: ProblemKind,
}

impl Problem {
    /// A problem with `rule`, which is the rule id for [`ProblemKind::EmptyName`]
    pub fn new(rule: &str, kind: ProblemKind) -> Self {
        Problem {
            rule: rule.to_string(),
            kind,
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ProblemKind::MissingRoot => write!(f, "no root rule selected"),
            ProblemKind::UnknownRoot => write!(f, "root '{}' does not name a rule", self.rule),
            ProblemKind::EmptyName => write!(f, "rule with id '{}' has an empty name", self.rule),
            ProblemKind::DuplicateName => write!(f, "rule '{}' is defined more than once", self.rule),
            ProblemKind::NoPatterns => write!(f, "rule '{}' has no patterns", self.rule),
            ProblemKind::MalformedPattern { pattern, reason } => {
                write!(f, "rule '{}': pattern '{}' is malformed: {}", self.rule, pattern, reason)
            }
            ProblemKind::UnresolvedReference { reference } => {
                write!(f, "rule '{}' references unknown rule '{}'", self.rule, reference)
            }
            ProblemKind::TerminalReference { reference } => write!(
                f,
                "terminal rule '{}' references rule '{}'",
                self.rule, reference
            ),
            ProblemKind::InvalidRewrite { pattern, reason } => {
                write!(f, "rule '{}': rewrite '{}' is invalid: {}", self.rule, pattern, reason)
            }
            ProblemKind::InvalidExclusion { pattern, reason } => {
                write!(f, "rule '{}': exclusion '{}' is invalid: {}", self.rule, pattern, reason)
            }
        }
    }
}

/// Every problem found in a configuration, in discovery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problems(pub Vec<Problem>);

impl fmt::Display for Problems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for problem in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}", problem)?;
            first = false;
        }
        Ok(())
    }
}
