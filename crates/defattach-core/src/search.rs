/// A non-blank free-text query, pre-parsed into the typed matches it can
/// take part in.
///
/// Substring matching always applies. The boolean and integer matches are
/// added on top when the text parses as such, so the resulting filter is the
/// union of all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    text: String,
    as_bool: Option<bool>,
    as_int: Option<i32>,
}

impl SearchTerm {
    /// Returns `None` for an empty or whitespace-only query.
    pub fn parse(query: &str) -> Option<Self> {
        if query.trim().is_empty() {
            return None;
        }
        Some(Self {
            text: query.to_string(),
            as_bool: parse_bool(query),
            as_int: query.trim().parse::<i32>().ok(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_bool
    }

    pub fn as_int(&self) -> Option<i32> {
        self.as_int
    }

    /// `%text%` with LIKE metacharacters escaped by `\`.
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.text.len() + 2);
        pattern.push('%');
        for c in self.text.chars() {
            if matches!(c, '%' | '_' | '\\') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
