use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::fs;
use wordgen::{
    Config, GenerationError, Grammar, GrammarError, GrammarHandle, Limits, ProblemKind, RuleConfig,
    presets,
};

fn tally(grammar: &Grammar, trials: usize) -> HashMap<String, usize> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut counts = HashMap::new();
    for _ in 0..trials {
        *counts.entry(grammar.generate(&mut rng).unwrap()).or_insert(0) += 1;
    }
    counts
}

#[test]
fn test_word_from_syllables() {
    let config = Config::new("word")
        .with_rule(RuleConfig::new("word").pattern("{syllable}"))
        .with_rule(RuleConfig::terminal("syllable", &["pa", "ki", "to"]));
    let grammar = wordgen::load_grammar(&config).unwrap();

    for seed in 0..100 {
        let word = wordgen::generate(&grammar, Some(seed)).unwrap();
        assert!(["pa", "ki", "to"].contains(&word.as_str()), "unexpected {}", word);
    }
    for _ in 0..20 {
        let word = wordgen::generate(&grammar, None).unwrap();
        assert!(["pa", "ki", "to"].contains(&word.as_str()));
    }
}

#[test]
fn test_uniform_split_without_weights() {
    let config = Config::new("letter").with_rule(
        RuleConfig::terminal("letter", &[])
            .weighted_pattern("a", 9)
            .weighted_pattern("b", 1),
    );
    let counts = tally(&Grammar::load(&config).unwrap(), 10_000);

    let share = counts["a"] as f64 / 10_000.0;
    assert!((share - 0.5).abs() < 0.03, "a share was {}", share);
}

#[test]
fn test_weighted_split() {
    let config = Config::new("letter")
        .with_weights(true)
        .with_rule(
            RuleConfig::terminal("letter", &[])
                .weighted_pattern("a", 3)
                .weighted_pattern("b", 1),
        );
    let counts = tally(&Grammar::load(&config).unwrap(), 10_000);

    let ratio = counts["a"] as f64 / counts["b"] as f64;
    assert!((ratio - 3.0).abs() < 0.3, "ratio was {}", ratio);
}

#[test]
fn test_rewrite_order_matters() {
    let config = Config::new("word").with_rule(
        RuleConfig::new("word")
            .pattern("a")
            .rewrite("a", "b")
            .rewrite("b", "c"),
    );
    let grammar = Grammar::load(&config).unwrap();
    assert_eq!(wordgen::generate(&grammar, Some(1)).unwrap(), "c");
}

#[test]
fn test_exclusion_exhausts_retries() {
    let config = Config::new("word").with_rule(RuleConfig::new("word").pattern("x").exclusion("x"));
    let grammar = Grammar::load(&config).unwrap();

    assert_eq!(
        wordgen::generate(&grammar, Some(1)),
        Err(GenerationError::AllCandidatesExcluded {
            rule: "word".to_string(),
            attempts: Limits::default().max_attempts,
        })
    );
}

#[test]
fn test_cyclic_grammar_is_bounded() {
    let config = Config::new("a")
        .with_rule(RuleConfig::new("a").pattern("{b}"))
        .with_rule(RuleConfig::new("b").pattern("{a}"));
    let grammar = Grammar::load_with_limits(
        &config,
        Limits {
            max_recursion_depth: 10,
            max_attempts: 3,
        },
    )
    .unwrap();

    assert!(matches!(
        wordgen::generate(&grammar, Some(5)),
        Err(GenerationError::RecursionLimitExceeded { depth: 10, .. })
    ));
}

#[test]
fn test_huge_recursion_limit_does_not_overflow() {
    let config = Config::new("a")
        .with_rule(RuleConfig::new("a").pattern("{b}"))
        .with_rule(RuleConfig::new("b").pattern("{a}"));
    let grammar = Grammar::load_with_limits(
        &config,
        Limits {
            max_recursion_depth: 1_000_000,
            max_attempts: 1,
        },
    )
    .unwrap();

    assert!(matches!(
        wordgen::generate(&grammar, Some(5)),
        Err(GenerationError::RecursionLimitExceeded { depth: 1_000_000, .. })
    ));
}

#[test]
fn test_unresolved_reference_is_invalid() {
    let config = Config::new("word").with_rule(RuleConfig::new("word").pattern("{syllable}"));

    let err = wordgen::load_grammar(&config).unwrap_err();
    assert!(matches!(err, GrammarError::Invalid(_)));
    assert_eq!(err.problems().len(), 1);
    assert_eq!(err.problems()[0].rule, "word");
    assert_eq!(
        err.problems()[0].kind,
        ProblemKind::UnresolvedReference {
            reference: "syllable".to_string()
        }
    );

    let config = Config::new("missing").with_rule(RuleConfig::terminal("v", &["a"]));
    let problems = wordgen::validate(&config);
    assert_eq!(problems[0].rule, "missing");
    assert_eq!(problems[0].kind, ProblemKind::UnknownRoot);
}

#[test]
fn test_validate_twice_is_stable() {
    let config = Config::new("word")
        .with_rule(RuleConfig::new("word").pattern("{a}{b").rewrite("[", ""))
        .with_rule(RuleConfig::terminal("word", &["{x}"]));
    let first = wordgen::validate(&config);
    assert_eq!(first.len(), 4);
    assert_eq!(first, wordgen::validate(&config));
}

#[test]
fn test_no_unexpanded_markers() {
    let grammar = Grammar::load(&presets::weighted_toki_pona()).unwrap();
    for result in wordgen::generate_batch(&grammar, 200, Some(77)) {
        let word = result.unwrap();
        assert!(!word.contains('{') && !word.contains('}'), "{}", word);
    }
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grammar.json");
    fs::write(
        &path,
        r#"{
            "root": "word",
            "enableWeights": false,
            "rules": [
                {"id": "r1", "name": "word", "patterns": ["{c}{v}"],
                 "rewrites": [{"pattern": "ti", "replacement": "si"}],
                 "exclusions": [], "terminalOnly": false,
                 "showRewrites": true, "showExclusions": false},
                {"id": "r2", "name": "c", "patterns": ["t"], "terminalOnly": true},
                {"id": "r3", "name": "v", "patterns": ["i"], "terminalOnly": true}
            ]
        }"#,
    )
    .unwrap();

    let config = Config::from_json_file(&path).unwrap();
    let grammar = Grammar::load(&config).unwrap();
    assert_eq!(wordgen::generate(&grammar, None).unwrap(), "si");
}

#[test]
fn test_editor_edits_produce_new_snapshot() {
    let mut config = presets::toki_pona();
    let handle = GrammarHandle::load(&config).unwrap();
    let before = handle.snapshot();

    let index = config.rules.iter().position(|r| r.name == "word").unwrap();
    config.remove_rule(index);
    assert_eq!(config.root, None);
    assert!(handle.reload(&config).is_err());

    config.set_root("vowel");
    let after = handle.reload(&config).unwrap();

    assert_eq!(before.root(), "word");
    assert_eq!(after.root(), "vowel");
    assert_eq!(handle.snapshot().root(), "vowel");
    assert!("aeiou".contains(wordgen::generate(&after, Some(3)).unwrap().as_str()));
}

#[test]
fn test_sample_grammar() {
    let config = Config::from_json_file("grammars/cv.json").unwrap();
    let grammar = Grammar::load(&config).unwrap();

    for result in wordgen::generate_batch(&grammar, 300, Some(11)) {
        let word = result.unwrap();
        for banned in ["nn", "nm", "np"] {
            assert!(!word.contains(banned), "{} contains {}", word, banned);
        }
    }
}
