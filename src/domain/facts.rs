//! Typed input facts that rule predicates are matched against.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

/// A single fact value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FactValue {
    Text(String),
    Number(Decimal),
    Flags(BTreeSet<String>),
}

/// Named facts for one evaluation.
///
/// Backed by an ordered map so debug output and hashing are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Facts {
    values: BTreeMap<String, FactValue>,
}

impl Facts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_text(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, FactValue::Text(value.into()));
        self
    }

    #[must_use]
    pub fn with_number(mut self, field: impl Into<String>, value: Decimal) -> Self {
        self.insert(field, FactValue::Number(value));
        self
    }

    #[must_use]
    pub fn with_flags<I, S>(mut self, field: impl Into<String>, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let flags = flags.into_iter().map(Into::into).collect();
        self.insert(field, FactValue::Flags(flags));
        self
    }

    /// Insert or replace a fact.
    pub fn insert(&mut self, field: impl Into<String>, value: FactValue) {
        self.values.insert(field.into(), value);
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FactValue> {
        self.values.get(field)
    }

    /// Text value of `field`, or `None` if absent or not text.
    #[must_use]
    pub fn text(&self, field: &str) -> Option<&str> {
        match self.values.get(field)? {
            FactValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric value of `field`, or `None` if absent or not a number.
    #[must_use]
    pub fn number(&self, field: &str) -> Option<Decimal> {
        match self.values.get(field)? {
            FactValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Flag set of `field`, or `None` if absent or not a flag set.
    #[must_use]
    pub fn flags(&self, field: &str) -> Option<&BTreeSet<String>> {
        match self.values.get(field)? {
            FactValue::Flags(f) => Some(f),
            _ => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn typed_accessors_reject_wrong_kind() {
        let facts = Facts::new()
            .with_text("region", "mumbai")
            .with_number("demand_level", dec!(0.4))
            .with_flags("utility", ["revenue_share"]);

        assert_eq!(facts.text("region"), Some("mumbai"));
        assert_eq!(facts.number("region"), None);
        assert_eq!(facts.number("demand_level"), Some(dec!(0.4)));
        assert!(facts.flags("utility").unwrap().contains("revenue_share"));
        assert_eq!(facts.text("missing"), None);
        assert_eq!(facts.len(), 3);
    }
}
