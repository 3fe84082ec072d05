/// Represents an element of a pattern, either literal text or a rule reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// A terminal symbol (literal text)
    Terminal(String),
    /// A non-terminal symbol (reference to another rule)
    NonTerminal(String),
}

/// A parsed pattern: the sequence of elements one alternative expands to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Production {
    pub elements: Vec<Element>,
    /// Selection weight, only honoured when the grammar enables weights
    pub weight: u32,
}

impl Production {
    /// Parse pattern text into a production.
    ///
    /// Syntax:
    /// - `{rule}` references another rule by name
    /// - `{{` and `}}` are literal braces
    /// - everything else is literal text, kept verbatim
    pub fn parse(input: &str, weight: u32) -> std::result::Result<Production, String> {
        let mut elements = Vec::new();
        let mut literal = String::new();
        let chars: Vec<char> = input.chars().collect();
        let mut pos = 0;

        while pos < chars.len() {
            match chars[pos] {
                '{' if chars.get(pos + 1) == Some(&'{') => {
                    literal.push('{');
                    pos += 2;
                }
                '}' if chars.get(pos + 1) == Some(&'}') => {
                    literal.push('}');
                    pos += 2;
                }
                '{' => {
                    let start = pos + 1;
                    let mut end = start;
                    while end < chars.len() && chars[end] != '}' {
                        if chars[end] == '{' {
                            return Err("nested braces are not allowed".to_string());
                        }
                        end += 1;
                    }
                    if end >= chars.len() {
                        return Err("unclosed brace".to_string());
                    }

                    let name: String = chars[start..end].iter().collect();
                    let name = name.trim();
                    if name.is_empty() {
                        return Err("empty braces".to_string());
                    }

                    if !literal.is_empty() {
                        elements.push(Element::Terminal(std::mem::take(&mut literal)));
                    }
                    elements.push(Element::NonTerminal(name.to_string()));
                    pos = end + 1;
                }
                '}' => return Err("unmatched closing brace".to_string()),
                c => {
                    literal.push(c);
                    pos += 1;
                }
            }
        }

        if !literal.is_empty() {
            elements.push(Element::Terminal(literal));
        }

        Ok(Production { elements, weight })
    }

    /// Names of every rule this production references, in order
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|element| match element {
            Element::NonTerminal(name) => Some(name.as_str()),
            Element::Terminal(_) => None,
        })
    }

    /// The literal text of a production, ignoring any references
    pub fn literal_text(&self) -> String {
        self.elements
            .iter()
            .filter_map(|element| match element {
                Element::Terminal(text) => Some(text.as_str()),
                Element::NonTerminal(_) => None,
            })
            .collect()
    }
}
