//! Rule-source adapters.

pub mod builtin;
pub mod file;

pub use builtin::{builtin_rule_set, BuiltinRuleSource, BUILTIN_VERSION};
pub use file::{parse_rule_set, TomlRuleSource};
