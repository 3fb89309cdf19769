//! Symbolic rules: tagged-variant predicates and effects.
//!
//! A [`RuleSet`] is an immutable, versioned table of [`Rule`]s. Evaluation is
//! plain ordered pattern dispatch: filter by rule name, keep rules whose
//! predicate holds, order by descending priority and ascending id.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Facts, RuleId};
use crate::error::ConfigurationError;

/// Condition over [`Facts`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// Always matches.
    Always,
    /// Text field equals `value`.
    Equals { field: String, value: String },
    /// Text field is one of `values`.
    OneOf { field: String, values: Vec<String> },
    /// Number field `>= value`.
    AtLeast { field: String, value: Decimal },
    /// Number field `> value`.
    Above { field: String, value: Decimal },
    /// Number field `< value`.
    Below { field: String, value: Decimal },
    /// Number field within `min..=max`.
    Between {
        field: String,
        min: Decimal,
        max: Decimal,
    },
    /// Flag-set field contains `flag`.
    HasFlag { field: String, flag: String },
    All { of: Vec<Predicate> },
    Any { of: Vec<Predicate> },
    Not { predicate: Box<Predicate> },
}

impl Predicate {
    /// Evaluate against `facts`.
    ///
    /// Returns `None` when a referenced field is missing or has the wrong
    /// kind; the owning rule is then skipped.
    #[must_use]
    pub fn evaluate(&self, facts: &Facts) -> Option<bool> {
        match self {
            Predicate::Always => Some(true),
            Predicate::Equals { field, value } => Some(facts.text(field)? == value),
            Predicate::OneOf { field, values } => {
                let actual = facts.text(field)?;
                Some(values.iter().any(|v| v == actual))
            }
            Predicate::AtLeast { field, value } => Some(facts.number(field)? >= *value),
            Predicate::Above { field, value } => Some(facts.number(field)? > *value),
            Predicate::Below { field, value } => Some(facts.number(field)? < *value),
            Predicate::Between { field, min, max } => {
                let n = facts.number(field)?;
                Some(*min <= n && n <= *max)
            }
            Predicate::HasFlag { field, flag } => Some(facts.flags(field)?.contains(flag)),
            Predicate::All { of } => {
                let mut result = true;
                for p in of {
                    result &= p.evaluate(facts)?;
                }
                Some(result)
            }
            Predicate::Any { of } => {
                let mut result = false;
                for p in of {
                    result |= p.evaluate(facts)?;
                }
                Some(result)
            }
            Predicate::Not { predicate } => predicate.evaluate(facts).map(|b| !b),
        }
    }
}

/// Output of a matching rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Multiply a running product by this factor.
    Multiplier(Decimal),
    /// Supply an annual rate.
    Rate(Decimal),
}

impl Effect {
    #[must_use]
    pub fn multiplier(&self) -> Option<Decimal> {
        match self {
            Effect::Multiplier(f) => Some(*f),
            Effect::Rate(_) => None,
        }
    }

    #[must_use]
    pub fn rate(&self) -> Option<Decimal> {
        match self {
            Effect::Rate(r) => Some(*r),
            Effect::Multiplier(_) => None,
        }
    }
}

/// One symbolic rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    /// Rule name (category) this rule answers, e.g. `region_multiplier`.
    pub name: String,
    pub predicate: Predicate,
    pub effect: Effect,
    #[serde(default)]
    pub priority: i32,
    /// Rule-set version this rule was last changed in. `0` means "the
    /// version of the set that loads it".
    #[serde(default)]
    pub version: u64,
}

impl Rule {
    pub fn new(
        id: impl Into<RuleId>,
        name: impl Into<String>,
        predicate: Predicate,
        effect: Effect,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            predicate,
            effect,
            priority: 0,
            version: 0,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }
}

/// A matched rule, in evaluation order.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch {
    pub rule_id: RuleId,
    pub effect: Effect,
}

/// Immutable, versioned collection of rules.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    version: u64,
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Build a rule set, validating ids and versions.
    ///
    /// Rules are stored grouped by name, then by descending priority, then by
    /// ascending id, which is the evaluation order.
    pub fn new(version: u64, rules: Vec<Rule>) -> Result<Self, ConfigurationError> {
        let mut rules = rules;
        for rule in &mut rules {
            if rule.version == 0 {
                rule.version = version;
            } else if rule.version > version {
                return Err(ConfigurationError::RuleVersionAhead {
                    id: rule.id.clone(),
                    rule_version: rule.version,
                    set_version: version,
                });
            }
        }

        rules.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then(b.priority.cmp(&a.priority))
                .then(a.id.cmp(&b.id))
        });

        let mut ids: Vec<&RuleId> = rules.iter().map(|r| &r.id).collect();
        ids.sort();
        if let Some(dup) = ids.windows(2).find(|w| w[0] == w[1]) {
            return Err(ConfigurationError::DuplicateRuleId { id: dup[0].clone() });
        }

        Ok(Self { version, rules })
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Matching rules named `rule_name`, in deterministic order.
    #[must_use]
    pub fn evaluate(&self, rule_name: &str, facts: &Facts) -> Vec<RuleMatch> {
        self.rules
            .iter()
            .filter(|rule| rule.name == rule_name)
            .filter_map(|rule| match rule.predicate.evaluate(facts) {
                Some(true) => Some(RuleMatch {
                    rule_id: rule.id.clone(),
                    effect: rule.effect,
                }),
                Some(false) => None,
                None => {
                    debug!(rule_id = %rule.id, rule_name, "Rule skipped: predicate not evaluable");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn eq(field: &str, value: &str) -> Predicate {
        Predicate::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    #[test]
    fn missing_field_is_not_evaluable() {
        let facts = Facts::new().with_text("region", "delhi");
        assert_eq!(eq("asset_type", "nft").evaluate(&facts), None);
        assert_eq!(eq("region", "delhi").evaluate(&facts), Some(true));
    }

    #[test]
    fn wrong_kind_is_not_evaluable() {
        let facts = Facts::new().with_text("demand_level", "high");
        let p = Predicate::AtLeast {
            field: "demand_level".into(),
            value: dec!(0.5),
        };
        assert_eq!(p.evaluate(&facts), None);
    }

    #[test]
    fn combinators_propagate_unevaluable_children() {
        let facts = Facts::new().with_number("lock_days", dec!(90));
        let all = Predicate::All {
            of: vec![
                Predicate::AtLeast {
                    field: "lock_days".into(),
                    value: dec!(30),
                },
                eq("asset_type", "nft"),
            ],
        };
        assert_eq!(all.evaluate(&facts), None);

        let not = Predicate::Not {
            predicate: Box::new(Predicate::Below {
                field: "lock_days".into(),
                value: dec!(365),
            }),
        };
        assert_eq!(not.evaluate(&facts), Some(false));
    }

    #[test]
    fn between_is_inclusive() {
        let p = Predicate::Between {
            field: "x".into(),
            min: dec!(1),
            max: dec!(2),
        };
        assert_eq!(p.evaluate(&Facts::new().with_number("x", dec!(1))), Some(true));
        assert_eq!(p.evaluate(&Facts::new().with_number("x", dec!(2))), Some(true));
        assert_eq!(p.evaluate(&Facts::new().with_number("x", dec!(2.1))), Some(false));
    }

    #[test]
    fn evaluate_orders_by_priority_then_id() {
        let set = RuleSet::new(
            1,
            vec![
                Rule::new("b", "cat", Predicate::Always, Effect::Multiplier(dec!(2)))
                    .with_priority(5),
                Rule::new("a", "cat", Predicate::Always, Effect::Multiplier(dec!(3)))
                    .with_priority(5),
                Rule::new("z", "cat", Predicate::Always, Effect::Multiplier(dec!(4)))
                    .with_priority(9),
                Rule::new("c", "other", Predicate::Always, Effect::Multiplier(dec!(5))),
            ],
        )
        .unwrap();

        let ids: Vec<_> = set
            .evaluate("cat", &Facts::new())
            .into_iter()
            .map(|m| m.rule_id.to_string())
            .collect();
        assert_eq!(ids, ["z", "a", "b"]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = RuleSet::new(
            1,
            vec![
                Rule::new("r", "a", Predicate::Always, Effect::Rate(dec!(0.1))),
                Rule::new("r", "b", Predicate::Always, Effect::Rate(dec!(0.2))),
            ],
        );
        assert!(matches!(result, Err(ConfigurationError::DuplicateRuleId { .. })));
    }

    #[test]
    fn rule_versions_are_stamped_and_checked() {
        let set = RuleSet::new(
            3,
            vec![Rule::new("r", "a", Predicate::Always, Effect::Rate(dec!(0.1)))],
        )
        .unwrap();
        assert_eq!(set.rules()[0].version, 3);

        let ahead = RuleSet::new(
            3,
            vec![Rule::new("r", "a", Predicate::Always, Effect::Rate(dec!(0.1))).with_version(4)],
        );
        assert!(matches!(ahead, Err(ConfigurationError::RuleVersionAhead { .. })));
    }

    #[test]
    fn predicates_deserialize_from_toml() {
        let rule: Rule = toml::from_str(
            r#"
id = "demand.high"
name = "demand_multiplier"
priority = 2
predicate = { kind = "at_least", field = "demand_level", value = 0.7 }
effect = { multiplier = 1.3 }
"#,
        )
        .unwrap();

        assert_eq!(rule.effect, Effect::Multiplier(dec!(1.3)));
        assert_eq!(
            rule.predicate.evaluate(&Facts::new().with_number("demand_level", dec!(0.8))),
            Some(true)
        );
    }
}
