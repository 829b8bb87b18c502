use crate::{
    model::Record,
    validate::{Predicate, ValidatorRegistry},
    value::Value,
};

///
/// Attr
///

#[derive(Clone, Debug, PartialEq)]
pub struct Attr {
    pub name: String,
    pub type_name: String,
    pub default: Option<Value>,
    pub checks: Vec<(String, Value)>,
    pub aliases: Vec<String>,
    pub primary_key: bool,
}

impl Attr {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: "string".to_string(),
            default: None,
            checks: Vec::new(),
            aliases: Vec::new(),
            primary_key: false,
        }
    }

    #[must_use]
    pub fn type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Add a check resolved through the `attr.` validator namespace.
    #[must_use]
    pub fn validate(mut self, validator: impl Into<String>, arg: impl Into<Value>) -> Self {
        self.checks.push((validator.into(), arg.into()));
        self
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Declared name or one of its aliases.
    #[must_use]
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }

    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Declared primary key, or named `id`/`_id`.
    #[must_use]
    pub fn is_primary_key(&self) -> bool {
        self.primary_key || self.name == "id" || self.name == "_id"
    }

    /// Value a fresh record starts with.
    #[must_use]
    pub fn initial_value(&self) -> Value {
        self.default.clone().unwrap_or_default()
    }

    pub(crate) fn compile(&self, registry: &ValidatorRegistry) -> AttrChecks {
        let checks = self
            .checks
            .iter()
            .map(|(name, arg)| (registry.lookup_in("attr", name), arg.clone()))
            .collect();

        AttrChecks {
            name: self.name.clone(),
            checks,
        }
    }
}

///
/// AttrChecks
///

#[derive(Clone)]
pub(crate) struct AttrChecks {
    name: String,
    checks: Vec<(Option<Predicate>, Value)>,
}

impl AttrChecks {
    /// One message per failing check.
    pub(crate) fn issues(&self, record: &Record) -> Vec<String> {
        let actual = record.get(&self.name);

        self.checks
            .iter()
            .filter(|(predicate, arg)| !predicate.as_ref().is_some_and(|p| p(actual, arg)))
            .map(|_| format!("Invalid attribute: {}", self.name))
            .collect()
    }
}
