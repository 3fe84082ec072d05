use rand::Rng;
use tracing::{debug, trace};

use crate::grammar::{Grammar, Rule};
use crate::pattern::{Element, Production};
use crate::rewrite;
use crate::select;
use crate::utils::GenerationError;

/// Expansion of rule references against one grammar snapshot.
///
/// Nested references are tracked on an explicit stack of frames rather than
/// the call stack, so a deep recursion limit can never overflow the thread.
pub struct Expander<'g, 'r, R: Rng + ?Sized> {
    grammar: &'g Grammar,
    rng: &'r mut R,
}

/// A non-terminal rule part-way through expanding one of its patterns
struct Frame<'g> {
    rule: &'g Rule,
    production: &'g Production,
    /// Index of the next element to expand
    next: usize,
    text: String,
    attempt: usize,
    depth: usize,
}

enum Entered<'g> {
    /// A terminal rule, finished immediately
    Done(String),
    Frame(Frame<'g>),
}

impl<'g, 'r, R: Rng + ?Sized> Expander<'g, 'r, R> {
    /// Create an expander drawing from `rng`
    pub fn new(grammar: &'g Grammar, rng: &'r mut R) -> Self {
        Expander { grammar, rng }
    }

    /// Expand `name` into a finished string.
    ///
    /// Terminal rules yield one literal alternative as-is. Non-terminal rules
    /// expand a chosen pattern left to right, run the rewrite pipeline over the
    /// result, and draw again while an exclusion matches, up to the grammar's
    /// attempt limit. Errors from nested rules are returned immediately.
    pub fn expand(&mut self, name: &str, depth: usize) -> Result<String, GenerationError> {
        let grammar = self.grammar;
        let weighted = grammar.weighted();
        let attempts = grammar.limits().max_attempts.max(1);

        let mut stack: Vec<Frame<'g>> = match self.enter(name, depth)? {
            Entered::Done(text) => return Ok(text),
            Entered::Frame(frame) => vec![frame],
        };
        // Output of the most recently finished child, owed to the frame on top
        let mut finished: Option<String> = None;

        loop {
            let Some(frame) = stack.last_mut() else {
                return Err(GenerationError::NotFound(name.to_string()));
            };
            if let Some(text) = finished.take() {
                frame.text.push_str(&text);
            }

            let production: &'g Production = frame.production;
            let mut descend = None;
            while let Some(element) = production.elements.get(frame.next) {
                frame.next += 1;
                match element {
                    Element::Terminal(text) => frame.text.push_str(text),
                    Element::NonTerminal(reference) => {
                        descend = Some((reference.as_str(), frame.depth + 1));
                        break;
                    }
                }
            }

            if let Some((reference, child_depth)) = descend {
                match self.enter(reference, child_depth)? {
                    Entered::Done(text) => finished = Some(text),
                    Entered::Frame(child) => stack.push(child),
                }
                continue;
            }

            let rule: &'g Rule = frame.rule;
            let candidate = rewrite::apply(&rule.rewrites, &frame.text);
            if !rewrite::is_excluded(&rule.exclusions, &candidate) {
                trace!(rule = %rule.name, depth = frame.depth, %candidate, "expanded");
                stack.pop();
                if stack.is_empty() {
                    return Ok(candidate);
                }
                finished = Some(candidate);
                continue;
            }

            debug!(rule = %rule.name, attempt = frame.attempt, %candidate, "candidate excluded");
            if frame.attempt >= attempts {
                return Err(GenerationError::AllCandidatesExcluded {
                    rule: rule.name.clone(),
                    attempts,
                });
            }

            frame.attempt += 1;
            frame.production = select::choose(&rule.productions, weighted, self.rng)
                .ok_or_else(|| GenerationError::NoPatterns(rule.name.clone()))?;
            frame.next = 0;
            frame.text.clear();
        }
    }

    /// Resolve a rule at `depth` and draw its first pattern
    fn enter(&mut self, name: &str, depth: usize) -> Result<Entered<'g>, GenerationError> {
        let grammar = self.grammar;
        let limits = grammar.limits();

        if depth > limits.max_recursion_depth {
            return Err(GenerationError::RecursionLimitExceeded {
                rule: name.to_string(),
                depth: limits.max_recursion_depth,
            });
        }

        let rule = grammar.resolve(name)?;
        let production = select::choose(&rule.productions, grammar.weighted(), self.rng)
            .ok_or_else(|| GenerationError::NoPatterns(name.to_string()))?;

        if rule.terminal {
            return Ok(Entered::Done(production.literal_text()));
        }

        Ok(Entered::Frame(Frame {
            rule,
            production,
            next: 0,
            text: String::new(),
            attempt: 1,
            depth,
        }))
    }
}
