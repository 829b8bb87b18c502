use crate::model::Model;
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, warn};

///
/// ModelRegistry
///
/// Define-once model store: the first definition under a name wins.
///

#[derive(Debug, Default)]
pub struct ModelRegistry {
    by_name: HashMap<String, Arc<Model>>,
    order: Vec<Arc<Model>>,
}

impl ModelRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `model`, or return the existing definition under its name.
    pub fn define(&mut self, model: Model) -> Arc<Model> {
        if let Some(existing) = self.by_name.get(model.name()) {
            warn!(model = model.name(), "model already defined; redefinition ignored");
            return Arc::clone(existing);
        }

        debug!(model = model.name(), attrs = model.attrs().len(), "define model");
        let model = Arc::new(model);
        self.by_name.insert(model.name().to_string(), Arc::clone(&model));
        self.order.push(Arc::clone(&model));

        model
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Model>> {
        self.by_name.get(name).cloned()
    }

    /// Models in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Model>> {
        self.order.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_name.clear();
        self.order.clear();
    }
}
