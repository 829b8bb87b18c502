use crate::{validate::Validatable, value::Value};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

static NULL: Value = Value::Null;

///
/// Record
///
/// Attribute values for one instance of a model. Only declared attributes
/// are stored; setting anything else is ignored.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    model: String,
    primary_key: Option<String>,
    defaults: Arc<BTreeMap<String, Value>>,
    aliases: Arc<BTreeMap<String, String>>,
    attrs: BTreeMap<String, Value>,
    dirty: BTreeSet<String>,
    pub(crate) errors: Vec<String>,
}

impl Record {
    pub(crate) fn new(
        model: &str,
        primary_key: Option<String>,
        defaults: BTreeMap<String, Value>,
        aliases: BTreeMap<String, String>,
    ) -> Self {
        Self {
            model: model.to_string(),
            primary_key,
            attrs: defaults.clone(),
            defaults: Arc::new(defaults),
            aliases: Arc::new(aliases),
            dirty: BTreeSet::new(),
            errors: Vec::new(),
        }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Declared name for `name`, following attribute aliases.
    #[must_use]
    pub fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map_or(name, String::as_str)
    }

    /// Current value, `Null` for undeclared attributes.
    #[must_use]
    pub fn get(&self, name: &str) -> &Value {
        self.attrs.get(self.canonical(name)).unwrap_or(&NULL)
    }

    /// Set a declared attribute or one of its aliases. `Null` restores the
    /// attribute's default. Returns false when `name` is not declared.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> bool {
        let name = self.canonical(name).to_string();
        let Some(default) = self.defaults.get(&name) else {
            return false;
        };

        let value = match value.into() {
            Value::Null => default.clone(),
            other => other,
        };

        if self.attrs.get(&name) != Some(&value) {
            self.dirty.insert(name.clone());
        }
        self.attrs.insert(name, value);

        true
    }

    /// Declared and not `Null`.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        !self.get(name).is_null()
    }

    #[must_use]
    pub fn is_declared(&self, name: &str) -> bool {
        self.defaults.contains_key(self.canonical(name))
    }

    /// No primary key value yet.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.primary_key.as_deref().is_none_or(|pk| !self.has(pk))
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn dirty(&self) -> impl Iterator<Item = &str> {
        self.dirty.iter().map(String::as_str)
    }

    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    #[must_use]
    pub const fn attrs(&self) -> &BTreeMap<String, Value> {
        &self.attrs
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Map(self.attrs.clone())
    }
}

impl Validatable for Record {
    fn errors(&self) -> &[String] {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut Vec<String> {
        &mut self.errors
    }
}
