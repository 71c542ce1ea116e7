//! Component template catalog.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::info;

use coex_store::{Component, ComponentFilter, ComponentSpec, ExecutionStore};

use crate::error::{DomainError, Result};

/// CRUD over component templates.
///
/// A component that has executions is immutable; change it by saving a
/// new version instead.
#[derive(Clone)]
pub struct ComponentCatalog {
    store: Arc<ExecutionStore>,
}

impl ComponentCatalog {
    pub fn new(store: Arc<ExecutionStore>) -> Self {
        Self { store }
    }

    pub fn create(&self, mut spec: ComponentSpec) -> Result<Component> {
        normalize(&mut spec)?;
        let component = self.store.create_component(&spec)?;
        info!(
            component_id = component.id,
            name = %component.spec.name,
            version = %component.spec.version,
            "Component created"
        );
        Ok(component)
    }

    pub fn get(&self, id: i64) -> Result<Component> {
        check_id(id)?;
        Ok(self.store.get_component(id)?)
    }

    pub fn list(&self, filter: &ComponentFilter) -> Result<Vec<Component>> {
        Ok(self.store.list_components(filter)?)
    }

    /// Replace the template of an unused component. Name and version are
    /// fixed.
    pub fn update(&self, id: i64, mut spec: ComponentSpec) -> Result<Component> {
        let current = self.get(id)?;
        if spec.name.is_empty() {
            spec.name = current.spec.name.clone();
        }
        if spec.version.is_empty() {
            spec.version = current.spec.version.clone();
        }
        if spec.name != current.spec.name || spec.version != current.spec.version {
            return Err(DomainError::Validation(
                "name and version cannot be changed, save as a new version instead".into(),
            ));
        }
        self.ensure_unused(id)?;
        normalize(&mut spec)?;
        let component = self.store.update_component(id, &spec)?;
        info!(component_id = id, "Component updated");
        Ok(component)
    }

    /// Copy component `id` under a new version, applying `changes` if given.
    pub fn save_as_new_version(
        &self,
        id: i64,
        version: &str,
        changes: Option<ComponentSpec>,
    ) -> Result<Component> {
        let current = self.get(id)?;
        let version = version.trim();
        if version.is_empty() {
            return Err(DomainError::Validation("version is required".into()));
        }
        let mut spec = changes.unwrap_or(current.spec.clone());
        spec.name = current.spec.name;
        spec.version = version.to_string();
        self.create(spec)
    }

    pub fn delete(&self, id: i64) -> Result<()> {
        check_id(id)?;
        self.store.delete_component(id)?;
        info!(component_id = id, "Component deleted");
        Ok(())
    }

    fn ensure_unused(&self, id: i64) -> Result<()> {
        let used = self.store.count_executions_for_component(id)?;
        if used > 0 {
            return Err(DomainError::Conflict(format!(
                "component {id} has {used} executions and cannot be modified"
            )));
        }
        Ok(())
    }
}

fn check_id(id: i64) -> Result<()> {
    if id <= 0 {
        return Err(DomainError::Validation(format!("invalid component id {id}")));
    }
    Ok(())
}

fn normalize(spec: &mut ComponentSpec) -> Result<()> {
    spec.name = spec.name.trim().to_string();
    spec.version = spec.version.trim().to_string();
    spec.image_name = spec.image_name.trim().to_string();
    spec.image_tag = spec.image_tag.trim().to_string();

    for (field, value) in [
        ("name", &spec.name),
        ("version", &spec.version),
        ("image_name", &spec.image_name),
    ] {
        if value.is_empty() {
            return Err(DomainError::Validation(format!("{field} is required")));
        }
    }
    for (field, template) in [
        ("kube_setting.pod", &spec.kube_setting.pod),
        ("kube_setting.service", &spec.kube_setting.service),
    ] {
        if let Some(value) = template
            && !value.is_object()
        {
            return Err(DomainError::Validation(format!("{field} must be an object")));
        }
    }

    // Every execution runs a pod; an absent template means the defaults.
    if spec.kube_setting.pod.is_none() {
        spec.kube_setting.pod = Some(json!({}));
    }
    if spec.input.is_null() {
        spec.input = Value::Object(Default::default());
    }
    Ok(())
}
