//! Values captured by a template match.

use smallvec::SmallVec;

/// Routes rarely have more than this many placeholders.
const INLINE_CAPTURES: usize = 4;

/// Placeholder values in template order, already percent-decoded.
///
/// A placeholder captured twice keeps its first value.
///
/// ```
/// use magnum_router::Params;
///
/// let mut params = Params::new();
/// params.push("cellar", "north");
/// params.push("cellar", "south");
///
/// assert_eq!(params.get("cellar"), Some("north"));
/// assert_eq!(params.get("bottle"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    captures: SmallVec<[(String, String); INLINE_CAPTURES]>,
}

impl Params {
    /// No captures.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the value captured for placeholder `name`.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.captures.push((name.into(), value.into()));
    }

    /// Value captured for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.captures
            .iter()
            .find_map(|(placeholder, value)| (placeholder == name).then_some(value.as_str()))
    }

    /// `(placeholder, value)` pairs in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.captures
            .iter()
            .map(|(placeholder, value)| (placeholder.as_str(), value.as_str()))
    }
}
