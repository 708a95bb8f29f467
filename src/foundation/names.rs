use std::fmt;

use crate::foundation::error::{PimgError, PimgResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Group key of a compose-mode layer: the first character of its display name.
pub struct GroupKey(char);

impl GroupKey {
    /// Access the key character.
    pub fn as_char(self) -> char {
        self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Validated layer display name.
///
/// In compose mode the name is exactly two letters folded to lowercase and carries a
/// [`GroupKey`]. In raw mode any manifest name is accepted verbatim and has no group.
pub struct DisplayName {
    name: String,
    group: Option<GroupKey>,
}

impl DisplayName {
    /// Validate and case-fold a compose-mode layer name.
    pub fn compose(layer_id: i64, raw: &str) -> PimgResult<Self> {
        let malformed = |reason: &str| PimgError::MalformedName {
            layer_id,
            name: raw.to_string(),
            reason: reason.to_string(),
        };

        let mut chars = raw.chars();
        let (Some(first), Some(second), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(malformed("expected exactly two characters"));
        };
        if !first.is_alphabetic() || !second.is_alphabetic() {
            return Err(malformed("expected alphabetic characters"));
        }

        let (Some(first), Some(second)) = (fold_case(first), fold_case(second)) else {
            return Err(malformed("letter lowercases to more than one character"));
        };
        Ok(Self {
            name: [first, second].iter().collect(),
            group: Some(GroupKey(first)),
        })
    }

    /// Wrap a raw-mode layer name without validation or case folding.
    pub fn raw(raw: &str) -> Self {
        Self {
            name: raw.to_string(),
            group: None,
        }
    }

    /// Name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Group key, present only for compose-mode names.
    pub fn group(&self) -> Option<GroupKey> {
        self.group
    }
}

// Single-char lowercase mapping; `None` when the letter expands (e.g. 'İ').
fn fold_case(c: char) -> Option<char> {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => Some(l),
        _ => None,
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/names.rs"]
mod tests;
