mod attr;
mod param;
mod record;
mod registry;


use crate::{
    context::Context,
    query::{ExecError, Query, QueryError},
    validate::{PipelineError, Validatable, Validator, run},
    value::Value,
};
use std::collections::BTreeMap;

// re-exports
pub use attr::Attr;
pub use param::{Param, ParamChecks};
pub use record::Record;
pub use registry::ModelRegistry;

///
/// Model
///
/// Named set of attributes plus record-level validators.
///

#[derive(Clone, Debug)]
pub struct Model {
    name: String,
    attrs: Vec<Attr>,
    validators: Vec<Validator<Record>>,
    primary_key: Option<String>,
}

impl Model {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            validators: Vec::new(),
            primary_key: None,
        }
    }

    /// Declare an attribute; a later attribute with the same name replaces it.
    #[must_use]
    pub fn attr(mut self, attr: Attr) -> Self {
        match self.attrs.iter_mut().find(|a| a.name == attr.name) {
            Some(existing) => *existing = attr,
            None => self.attrs.push(attr),
        }
        self
    }

    /// Declare the primary key, adding the attribute if it is missing.
    #[must_use]
    pub fn id(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.attrs.iter().any(|a| a.name == name) {
            self.attrs.push(Attr::new(name.clone()).primary_key());
        }
        self.primary_key = Some(name);
        self
    }

    #[must_use]
    pub fn validator(mut self, validator: Validator<Record>) -> Self {
        self.validators.push(validator);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    /// Attribute declared as `name`, else the first one aliased as `name`.
    #[must_use]
    pub fn get_attr(&self, name: &str) -> Option<&Attr> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .or_else(|| self.attrs.iter().find(|a| a.answers_to(name)))
    }

    /// Explicit primary key, else the first attribute that implies one.
    #[must_use]
    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref().or_else(|| {
            self.attrs
                .iter()
                .find(|a| a.is_primary_key())
                .map(|a| a.name.as_str())
        })
    }

    /// Build a record. Aliased keys land on their attribute, undeclared keys
    /// are dropped and missing attributes get their defaults.
    pub fn init<K, V>(&self, values: impl IntoIterator<Item = (K, V)>) -> Record
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        let defaults: BTreeMap<String, Value> = self
            .attrs
            .iter()
            .map(|a| (a.name.clone(), a.initial_value()))
            .collect();

        let mut aliases = BTreeMap::new();
        for attr in &self.attrs {
            for alias in attr.aliases.iter().filter(|a| !defaults.contains_key(*a)) {
                aliases.entry(alias.clone()).or_insert_with(|| attr.name.clone());
            }
        }

        let primary_key = self.primary_key().map(str::to_string);
        let mut record = Record::new(&self.name, primary_key, defaults, aliases);
        for (key, value) in values {
            record.set(key.as_ref(), value);
        }
        record.clear_dirty();

        record
    }

    /// Record holding only defaults.
    #[must_use]
    pub fn blank(&self) -> Record {
        self.init(std::iter::empty::<(&str, Value)>())
    }

    /// Clear `record`'s messages and run attribute checks, then model
    /// validators. `Ok(false)` means messages were reported.
    pub async fn validate(
        &self,
        ctx: &Context,
        record: &mut Record,
    ) -> Result<bool, PipelineError> {
        record.errors.clear();

        let mut validators = Vec::with_capacity(self.validators.len() + 1);
        if self.attrs.iter().any(|a| !a.checks.is_empty()) {
            let compiled: Vec<_> = self
                .attrs
                .iter()
                .filter(|a| !a.checks.is_empty())
                .map(|a| a.compile(ctx.validators()))
                .collect();

            validators.push(Validator::check(move |record: &mut Record| {
                for checks in &compiled {
                    for message in checks.issues(record) {
                        record.report(message);
                    }
                }
            }));
        }
        validators.extend(self.validators.iter().cloned());

        run(&validators, record).await?;

        Ok(record.is_valid())
    }

    /// Query scoped to this model.
    pub fn query(&self, ctx: &Context) -> Result<Query, QueryError> {
        ctx.new_query().start(&self.name)
    }

    pub async fn find(&self, ctx: &Context) -> Result<Vec<Value>, ExecError> {
        self.query(ctx)?.find(ctx).await
    }

    /// Validate, then create the record through the query layer. The dirty
    /// set is cleared on success.
    pub async fn save(
        &self,
        ctx: &Context,
        record: &mut Record,
    ) -> Result<Vec<Value>, ExecError> {
        if !self.validate(ctx, record).await? {
            return Err(ExecError::Validation(record.errors.clone()));
        }

        let result = self.query(ctx)?.create(record.to_value(), ctx).await?;
        record.clear_dirty();

        Ok(result)
    }
}
