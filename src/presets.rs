//! Ready-made grammars.
//!
//! The Toki Pona presets build words from (C)V(n) syllables where only the
//! first syllable may drop its consonant, `ti` is pronounced `si`, and the
//! sequences `ji`, `wu`, `wo`, `nn` and `nm` never occur.

use crate::config::{Config, RuleConfig};
use crate::utils::{GrammarError, Result};

pub const TOKI_PONA: &str = "Toki Pona";
pub const WEIGHTED_TOKI_PONA: &str = "Weighted Toki Pona";

/// Every available preset name
pub const PRESETS: &[&str] = &[TOKI_PONA, WEIGHTED_TOKI_PONA];

pub const TOKI_PONA_ROOT: &str = "word";

const CONSONANTS: &[(&str, u32)] = &[
    ("p", 3),
    ("t", 3),
    ("k", 3),
    ("s", 3),
    ("m", 3),
    ("n", 3),
    ("l", 4),
    ("j", 1),
    ("w", 1),
];

const VOWELS: &[(&str, u32)] = &[("a", 5), ("e", 4), ("i", 4), ("o", 3), ("u", 2)];

/// Look a preset up by name, ignoring case
pub fn preset(name: &str) -> Result<Config> {
    if name.eq_ignore_ascii_case(TOKI_PONA) {
        Ok(toki_pona())
    } else if name.eq_ignore_ascii_case(WEIGHTED_TOKI_PONA) {
        Ok(weighted_toki_pona())
    } else {
        Err(GrammarError::UnknownPreset(name.to_string()))
    }
}

pub fn toki_pona() -> Config {
    toki_pona_rules(false)
}

pub fn weighted_toki_pona() -> Config {
    toki_pona_rules(true)
}

fn toki_pona_rules(weighted: bool) -> Config {
    let pick = |rule: RuleConfig, pattern: &str, weight: u32| {
        if weighted {
            rule.weighted_pattern(pattern, weight)
        } else {
            rule.pattern(pattern)
        }
    };

    let mut word = RuleConfig::new(TOKI_PONA_ROOT);
    for (pattern, weight) in [
        ("{initial}", 3),
        ("{initial}{syllable}", 5),
        ("{initial}{syllable}{syllable}", 2),
    ] {
        word = pick(word, pattern, weight);
    }
    word = word
        .rewrite("ti", "si")
        .exclusion("ji")
        .exclusion("w[uo]")
        .exclusion("n[nm]");

    let mut initial = RuleConfig::new("initial");
    for (pattern, weight) in [
        ("{vowel}", 1),
        ("{vowel}{final}", 1),
        ("{consonant}{vowel}", 6),
        ("{consonant}{vowel}{final}", 2),
    ] {
        initial = pick(initial, pattern, weight);
    }

    let mut syllable = RuleConfig::new("syllable");
    for (pattern, weight) in [("{consonant}{vowel}", 4), ("{consonant}{vowel}{final}", 1)] {
        syllable = pick(syllable, pattern, weight);
    }

    Config::new(TOKI_PONA_ROOT)
        .with_weights(weighted)
        .with_rule(word)
        .with_rule(initial)
        .with_rule(syllable)
        .with_rule(letters("consonant", CONSONANTS, weighted))
        .with_rule(letters("vowel", VOWELS, weighted))
        .with_rule(RuleConfig::terminal("final", &["n"]))
}

fn letters(name: &str, letters: &[(&str, u32)], weighted: bool) -> RuleConfig {
    let mut rule = RuleConfig::terminal(name, &[]);
    for (letter, weight) in letters {
        rule = if weighted {
            rule.weighted_pattern(letter, *weight)
        } else {
            rule.pattern(letter)
        };
    }
    rule
}
