//! Declared constraints and their checks.

use magnum_core::{kinds, RegistrationError, ValidationError};
use regex::Regex;
use serde_json::Value;

/// A pattern constraint.
///
/// Compilation happens when the constraint is declared; an invalid pattern
/// is kept so that registration can report it.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Successfully compiled pattern.
    Compiled(Regex),
    /// Pattern the regex compiler rejected.
    Invalid {
        /// The pattern as declared.
        source: String,
        /// Compiler message.
        reason: String,
    },
}

impl Pattern {
    /// Compiles a pattern.
    #[must_use]
    pub fn new(source: &str) -> Self {
        match Regex::new(source) {
            Ok(regex) => Self::Compiled(regex),
            Err(err) => Self::Invalid {
                source: source.to_string(),
                reason: err.to_string(),
            },
        }
    }

    /// Returns the pattern as declared.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Compiled(regex) => regex.as_str(),
            Self::Invalid { source, .. } => source,
        }
    }

    /// Returns `true` if the pattern matches at the start of `value`.
    fn matches(&self, value: &str) -> bool {
        match self {
            Self::Compiled(regex) => regex.find(value).is_some_and(|m| m.start() == 0),
            Self::Invalid { .. } => true,
        }
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// Constraints applied after coercion.
///
/// Numeric bounds apply to numbers, length bounds and the pattern to
/// strings, item bounds to sequences. Scalar constraints on a sequence
/// apply to each item.
///
/// # Example
///
/// ```
/// use magnum_schema::Constraints;
/// use serde_json::json;
///
/// let constraints = Constraints::new().lt(3.0);
/// assert!(constraints.check(&json!(2.0)).is_empty());
/// assert_eq!(constraints.check(&json!(5.0))[0].kind, "value_error.number.not_lt");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    /// Exclusive lower bound.
    pub gt: Option<f64>,
    /// Inclusive lower bound.
    pub ge: Option<f64>,
    /// Exclusive upper bound.
    pub lt: Option<f64>,
    /// Inclusive upper bound.
    pub le: Option<f64>,
    /// Minimum string length in characters.
    pub min_length: Option<usize>,
    /// Maximum string length in characters.
    pub max_length: Option<usize>,
    /// Pattern the string must match at its start.
    pub pattern: Option<Pattern>,
    /// Minimum sequence length.
    pub min_items: Option<usize>,
    /// Maximum sequence length.
    pub max_items: Option<usize>,
    /// Closed set of permitted values.
    pub allowed: Option<Vec<Value>>,
}

impl Constraints {
    /// Creates an empty constraint set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an exclusive lower bound.
    #[must_use]
    pub fn gt(mut self, limit: f64) -> Self {
        self.gt = Some(limit);
        self
    }

    /// Sets an inclusive lower bound.
    #[must_use]
    pub fn ge(mut self, limit: f64) -> Self {
        self.ge = Some(limit);
        self
    }

    /// Sets an exclusive upper bound.
    #[must_use]
    pub fn lt(mut self, limit: f64) -> Self {
        self.lt = Some(limit);
        self
    }

    /// Sets an inclusive upper bound.
    #[must_use]
    pub fn le(mut self, limit: f64) -> Self {
        self.le = Some(limit);
        self
    }

    /// Sets the minimum string length.
    #[must_use]
    pub fn min_length(mut self, limit: usize) -> Self {
        self.min_length = Some(limit);
        self
    }

    /// Sets the maximum string length.
    #[must_use]
    pub fn max_length(mut self, limit: usize) -> Self {
        self.max_length = Some(limit);
        self
    }

    /// Sets the pattern.
    #[must_use]
    pub fn pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(Pattern::new(pattern));
        self
    }

    /// Sets the minimum number of items.
    #[must_use]
    pub fn min_items(mut self, limit: usize) -> Self {
        self.min_items = Some(limit);
        self
    }

    /// Sets the maximum number of items.
    #[must_use]
    pub fn max_items(mut self, limit: usize) -> Self {
        self.max_items = Some(limit);
        self
    }

    /// Restricts the value to a closed set.
    #[must_use]
    pub fn one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Returns `true` if no constraint is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Reports an invalid pattern on the field or parameter named `owner`.
    pub fn verify(&self, owner: &str) -> Result<(), RegistrationError> {
        match &self.pattern {
            Some(Pattern::Invalid { source, reason }) => Err(RegistrationError::InvalidPattern {
                name: owner.to_string(),
                pattern: source.clone(),
                reason: reason.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Checks a coerced value. Locations are relative to the value.
    #[must_use]
    pub fn check(&self, value: &Value) -> Vec<ValidationError> {
        match value {
            Value::Array(items) => {
                let mut errors = Vec::new();
                if let Some(limit) = self.min_items {
                    if items.len() < limit {
                        errors.push(kinds::too_few_items(limit));
                    }
                }
                if let Some(limit) = self.max_items {
                    if items.len() > limit {
                        errors.push(kinds::too_many_items(limit));
                    }
                }
                for (index, item) in items.iter().enumerate() {
                    errors.extend(self.check_scalar(item).into_iter().map(|e| e.at(index)));
                }
                errors
            }
            other => self.check_scalar(other).into_iter().collect(),
        }
    }

    fn check_scalar(&self, value: &Value) -> Option<ValidationError> {
        if value.is_null() {
            return None;
        }
        if let Some(allowed) = &self.allowed {
            if !allowed.iter().any(|candidate| loosely_equal(candidate, value)) {
                return Some(kinds::not_enum_member(allowed));
            }
        }
        match value {
            Value::Number(number) => number.as_f64().and_then(|n| self.check_number(n)),
            Value::String(text) => self.check_text(text),
            _ => None,
        }
    }

    fn check_number(&self, n: f64) -> Option<ValidationError> {
        if let Some(limit) = self.gt {
            if n <= limit {
                return Some(kinds::not_gt(limit));
            }
        }
        if let Some(limit) = self.ge {
            if n < limit {
                return Some(kinds::not_ge(limit));
            }
        }
        if let Some(limit) = self.lt {
            if n >= limit {
                return Some(kinds::not_lt(limit));
            }
        }
        if let Some(limit) = self.le {
            if n > limit {
                return Some(kinds::not_le(limit));
            }
        }
        None
    }

    fn check_text(&self, text: &str) -> Option<ValidationError> {
        let length = text.chars().count();
        if let Some(limit) = self.min_length {
            if length < limit {
                return Some(kinds::str_too_short(limit));
            }
        }
        if let Some(limit) = self.max_length {
            if length > limit {
                return Some(kinds::str_too_long(limit));
            }
        }
        match &self.pattern {
            Some(pattern) if !pattern.matches(text) => Some(kinds::pattern_mismatch(pattern.as_str())),
            _ => None,
        }
    }
}

// `1` and `1.0` name the same member.
fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_bounds() {
        let constraints = Constraints::new().gt(1.0).le(10.0);
        assert!(constraints.check(&json!(5)).is_empty());
        assert_eq!(constraints.check(&json!(1))[0].kind, "value_error.number.not_gt");
        assert_eq!(constraints.check(&json!(11))[0].msg, "ensure this value is less than or equal to 10");
    }

    #[test]
    fn test_fractional_limit_in_message() {
        let constraints = Constraints::new().ge(2.5);
        assert_eq!(
            constraints.check(&json!(1))[0].msg,
            "ensure this value is greater than or equal to 2.5"
        );
    }

    #[test]
    fn test_string_length_counts_chars() {
        let constraints = Constraints::new().min_length(2).max_length(3);
        assert!(constraints.check(&json!("éé")).is_empty());
        assert_eq!(constraints.check(&json!("a"))[0].kind, "value_error.any_str.min_length");
        assert_eq!(constraints.check(&json!("abcd"))[0].kind, "value_error.any_str.max_length");
    }

    #[test]
    fn test_pattern_anchors_at_start() {
        let constraints = Constraints::new().pattern("^fixed|[0-9]+");
        assert!(constraints.check(&json!("123abc")).is_empty());
        assert!(constraints.check(&json!("fixedquery")).is_empty());
        let errors = constraints.check(&json!("abc123"));
        assert_eq!(errors[0].kind, "value_error.str.regex");
    }

    #[test]
    fn test_item_bounds_and_per_item_checks() {
        let constraints = Constraints::new().max_items(2).lt(10.0);
        let errors = constraints.check(&json!([1, 20, 3]));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].kind, "value_error.list.max_items");
        assert_eq!(errors[1].dotted_loc(), "1");
    }

    #[test]
    fn test_allowed_values() {
        let constraints = Constraints::new().one_of(["asc", "desc"]);
        assert!(constraints.check(&json!("asc")).is_empty());
        assert_eq!(constraints.check(&json!("up"))[0].kind, "type_error.enum");

        let numeric = Constraints::new().one_of([1, 2]);
        assert!(numeric.check(&json!(2.0)).is_empty());
    }

    #[test]
    fn test_null_is_never_constrained() {
        let constraints = Constraints::new().min_length(3).gt(0.0);
        assert!(constraints.check(&Value::Null).is_empty());
    }

    #[test]
    fn test_invalid_pattern_is_reported_at_declaration() {
        let constraints = Constraints::new().pattern("([a-z");
        assert!(matches!(
            constraints.verify("slug"),
            Err(RegistrationError::InvalidPattern { .. })
        ));
        assert!(Constraints::new().pattern("[a-z]+").verify("slug").is_ok());
    }

    #[test]
    fn test_is_empty() {
        assert!(Constraints::new().is_empty());
        assert!(!Constraints::new().min_items(1).is_empty());
    }
}
