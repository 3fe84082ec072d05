use regex::Regex;

/// A compiled find/replace step
#[derive(Debug, Clone)]
pub struct Rewrite {
    pattern: Regex,
    replacement: String,
}

impl Rewrite {
    /// Compile a rewrite.
    ///
    /// Fails when the pattern is not a valid regex, or when the replacement
    /// names a capture group the pattern does not have. `$1b` names the group
    /// "1b", not group 1 followed by "b"; write `${1}b` for that.
    pub fn new(pattern: &str, replacement: &str) -> std::result::Result<Self, String> {
        let pattern = Regex::new(pattern).map_err(|e| e.to_string())?;
        check_replacement(&pattern, replacement)?;
        Ok(Rewrite {
            pattern,
            replacement: replacement.to_string(),
        })
    }

    /// Replace every match; the replacement may refer to capture groups
    pub fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, self.replacement.as_str())
            .into_owned()
    }

    /// The source regex
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Check every `$group` in a replacement against the pattern's groups.
///
/// Follows the regex crate's expansion rules: `$$` is a literal dollar,
/// `${name}` is braced, and an unbraced name is the longest run of
/// `[A-Za-z0-9_]`. A `$` that starts no name is kept literally.
fn check_replacement(pattern: &Regex, replacement: &str) -> std::result::Result<(), String> {
    let mut rest = replacement;
    while let Some(pos) = rest.find('$') {
        rest = &rest[pos + 1..];
        if let Some(after) = rest.strip_prefix('$') {
            rest = after;
            continue;
        }

        let name = if let Some(braced) = rest.strip_prefix('{') {
            let Some(close) = braced.find('}') else {
                continue;
            };
            rest = &braced[close + 1..];
            &braced[..close]
        } else {
            let end = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            let name = &rest[..end];
            rest = &rest[end..];
            name
        };
        if name.is_empty() {
            continue;
        }

        let known = match name.parse::<usize>() {
            Ok(index) => index < pattern.captures_len(),
            Err(_) => pattern.capture_names().flatten().any(|group| group == name),
        };
        if !known {
            return Err(format!(
                "replacement refers to unknown group '{}' (use ${{N}} to follow a group number with text)",
                name
            ));
        }
    }
    Ok(())
}

/// A compiled exclusion
#[derive(Debug, Clone)]
pub struct Exclusion {
    pattern: Regex,
}

impl Exclusion {
    /// Compile an exclusion regex
    pub fn new(pattern: &str) -> std::result::Result<Self, regex::Error> {
        Ok(Exclusion {
            pattern: Regex::new(pattern)?,
        })
    }

    /// True when the regex matches anywhere in `text`
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }
}

/// Apply rewrites in order, each one seeing the previous one's output
pub fn apply(rewrites: &[Rewrite], input: &str) -> String {
    let mut result = input.to_string();
    for rewrite in rewrites {
        result = rewrite.apply(&result);
    }
    result
}

/// True when any exclusion matches the candidate
pub fn is_excluded(exclusions: &[Exclusion], candidate: &str) -> bool {
    exclusions.iter().any(|exclusion| exclusion.matches(candidate))
}
