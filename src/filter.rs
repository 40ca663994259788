// PocketBase filter expressions.
//
// Renders equality clauses into the `filter` query parameter, e.g.
// `provider = "github" && providerAccountId = "gh-42"`. Values are
// double-quoted with backslash escaping.

use std::fmt;

/// A conjunction of field equality clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

#[derive(Debug, Clone, PartialEq)]
struct Clause {
    field: String,
    value: String,
}

impl Filter {
    /// Single equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::default().and_eq(field, value)
    }

    /// Add another equality clause, joined with `&&`.
    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.clauses.push(Clause {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// The clauses as (field, value) pairs, for in-process evaluation.
    pub fn clauses(&self) -> impl Iterator<Item = (&str, &str)> {
        self.clauses
            .iter()
            .map(|c| (c.field.as_str(), c.value.as_str()))
    }

    /// Render into PocketBase filter syntax.
    pub fn render(&self) -> String {
        self.clauses
            .iter()
            .map(|c| format!("{} = \"{}\"", c.field, escape(&c.value)))
            .collect::<Vec<_>>()
            .join(" && ")
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Escape a string literal for a double-quoted filter value.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}
