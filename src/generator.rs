use std::sync::{Arc, RwLock};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::config::Config;
use crate::grammar::{Grammar, Limits};
use crate::utils::{GenerationError, Result};

/// Generate one word; a seed makes the result reproducible
pub fn generate(grammar: &Grammar, seed: Option<u64>) -> std::result::Result<String, GenerationError> {
    match seed {
        Some(seed) => grammar.generate(&mut StdRng::seed_from_u64(seed)),
        None => grammar.generate(&mut rand::thread_rng()),
    }
}

/// Run `count` independent generations drawing from one random source.
///
/// Every attempt's outcome is returned in order; failures are not retried.
pub fn generate_batch(
    grammar: &Grammar,
    count: usize,
    seed: Option<u64>,
) -> Vec<std::result::Result<String, GenerationError>> {
    let results: Vec<_> = match seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..count).map(|_| grammar.generate(&mut rng)).collect()
        }
        None => {
            let mut rng = rand::thread_rng();
            (0..count).map(|_| grammar.generate(&mut rng)).collect()
        }
    };

    let failed = results.iter().filter(|r| r.is_err()).count();
    debug!(count, failed, "batch generated");
    results
}

/// Holds the current grammar snapshot for an editor that keeps changing it.
///
/// Readers take an `Arc` to the snapshot and generate from it without
/// holding any lock; `reload` swaps in a freshly validated snapshot and
/// leaves the old one alive for whoever still holds it.
#[derive(Debug)]
pub struct GrammarHandle {
    current: RwLock<Arc<Grammar>>,
    limits: Limits,
}

impl GrammarHandle {
    /// Wrap an already loaded grammar; reloads reuse its limits
    pub fn new(grammar: Grammar) -> Self {
        let limits = grammar.limits();
        GrammarHandle {
            current: RwLock::new(Arc::new(grammar)),
            limits,
        }
    }

    /// Load a config with default limits
    pub fn load(config: &Config) -> Result<Self> {
        Ok(Self::new(Grammar::load(config)?))
    }

    /// The current grammar; later reloads do not affect the returned value
    pub fn snapshot(&self) -> Arc<Grammar> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    /// Replace the snapshot; on a validation error the current one is kept
    pub fn reload(&self, config: &Config) -> Result<Arc<Grammar>> {
        let grammar = Arc::new(Grammar::load_with_limits(config, self.limits)?);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Arc::clone(&grammar);
        debug!(rules = grammar.len(), "grammar snapshot replaced");
        Ok(grammar)
    }
}
