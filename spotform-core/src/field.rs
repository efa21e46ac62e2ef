//! Field - Registry of per-attribute mapping behaviors
//!
//! Every configurable attribute of a resource is registered once as a
//! [`GenericField`]: its schema plus the functions that move its value
//! between [`ResourceData`] and the resource's API object. A [`FieldMap`]
//! collects the fields of one resource type and drives them for each
//! CRUD operation.

use std::collections::BTreeMap;
use std::fmt;

use log::debug;

use crate::resource::ResourceData;
use crate::schema::{AttributeSchema, ResourceSchema, TypeError};

/// Errors raised by field mapping functions
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
    /// An element of a nested collection lacks a companion attribute
    #[error("invalid {block} attributes: {attribute} missing")]
    MissingAttribute {
        block: &'static str,
        attribute: &'static str,
    },

    /// Writing a flattened value back into state failed
    #[error("failed to set field '{field}': {source}")]
    WriteBack {
        field: String,
        #[source]
        source: TypeError,
    },

    /// Two fields were registered under the same name
    #[error("field '{0}' is already registered")]
    DuplicateField(String),
}

impl FieldError {
    pub fn missing(block: &'static str, attribute: &'static str) -> Self {
        Self::MissingAttribute { block, attribute }
    }

    pub fn write_back(field: impl Into<String>, source: TypeError) -> Self {
        Self::WriteBack {
            field: field.into(),
            source,
        }
    }
}

pub type FieldResult<T> = Result<T, FieldError>;

/// Mapping function of one field for one operation
pub type FieldFn<R> = Box<dyn Fn(&mut R, &mut ResourceData) -> FieldResult<()> + Send + Sync>;

/// Resource section a field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldCategory {
    Elastigroup,
    ElastigroupIntegrations,
    ElastigroupLaunchConfiguration,
    Ocean,
    OceanAutoScaler,
}

impl fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldCategory::Elastigroup => "elastigroup_aws",
            FieldCategory::ElastigroupIntegrations => "elastigroup_aws_integrations",
            FieldCategory::ElastigroupLaunchConfiguration => "elastigroup_aws_launch_configuration",
            FieldCategory::Ocean => "ocean_aws",
            FieldCategory::OceanAutoScaler => "ocean_aws_auto_scaler",
        };
        write!(f, "{}", name)
    }
}

/// One registered field: schema plus optional read/create/update/delete functions
pub struct GenericField<R> {
    category: FieldCategory,
    schema: AttributeSchema,
    on_read: Option<FieldFn<R>>,
    on_create: Option<FieldFn<R>>,
    on_update: Option<FieldFn<R>>,
    on_delete: Option<FieldFn<R>>,
}

impl<R> GenericField<R> {
    /// The field is named after its schema
    pub fn new(category: FieldCategory, schema: AttributeSchema) -> Self {
        Self {
            category,
            schema,
            on_read: None,
            on_create: None,
            on_update: None,
            on_delete: None,
        }
    }

    pub fn on_read(
        mut self,
        f: impl Fn(&mut R, &mut ResourceData) -> FieldResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.on_read = Some(Box::new(f));
        self
    }

    pub fn on_create(
        mut self,
        f: impl Fn(&mut R, &mut ResourceData) -> FieldResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.on_create = Some(Box::new(f));
        self
    }

    pub fn on_update(
        mut self,
        f: impl Fn(&mut R, &mut ResourceData) -> FieldResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }

    pub fn on_delete(
        mut self,
        f: impl Fn(&mut R, &mut ResourceData) -> FieldResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.on_delete = Some(Box::new(f));
        self
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn category(&self) -> FieldCategory {
        self.category
    }

    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    pub fn read(&self, resource: &mut R, data: &mut ResourceData) -> FieldResult<()> {
        invoke(self.on_read.as_ref(), resource, data)
    }

    pub fn create(&self, resource: &mut R, data: &mut ResourceData) -> FieldResult<()> {
        invoke(self.on_create.as_ref(), resource, data)
    }

    pub fn update(&self, resource: &mut R, data: &mut ResourceData) -> FieldResult<()> {
        invoke(self.on_update.as_ref(), resource, data)
    }

    pub fn delete(&self, resource: &mut R, data: &mut ResourceData) -> FieldResult<()> {
        invoke(self.on_delete.as_ref(), resource, data)
    }
}

fn invoke<R>(f: Option<&FieldFn<R>>, resource: &mut R, data: &mut ResourceData) -> FieldResult<()> {
    match f {
        Some(f) => f(resource, data),
        None => Ok(()),
    }
}

impl<R> fmt::Debug for GenericField<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericField")
            .field("category", &self.category)
            .field("name", &self.schema.name)
            .field("read", &self.on_read.is_some())
            .field("create", &self.on_create.is_some())
            .field("update", &self.on_update.is_some())
            .field("delete", &self.on_delete.is_some())
            .finish()
    }
}

/// Fields of one resource type, keyed by name
///
/// Built once by the resource's setup function and only read afterwards.
pub struct FieldMap<R> {
    resource_type: String,
    fields: BTreeMap<String, GenericField<R>>,
}

impl<R> FieldMap<R> {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Add a field; names must be unique within the map
    pub fn register(&mut self, field: GenericField<R>) -> FieldResult<()> {
        let name = field.name().to_string();
        if self.fields.contains_key(&name) {
            return Err(FieldError::DuplicateField(name));
        }
        self.fields.insert(name, field);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&GenericField<R>> {
        self.fields.get(name)
    }

    /// Fields in name order
    pub fn iter(&self) -> impl Iterator<Item = &GenericField<R>> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Schema of the resource assembled from every field
    pub fn resource_schema(&self) -> ResourceSchema {
        self.iter().fold(
            ResourceSchema::new(self.resource_type.clone()),
            |schema, field| schema.attribute(field.schema().clone()),
        )
    }

    /// Flatten the current object into state
    pub fn on_read(&self, resource: &mut R, data: &mut ResourceData) -> FieldResult<()> {
        for field in self.iter() {
            debug!("{}: read {}", self.resource_type, field.name());
            field.read(resource, data)?;
        }
        Ok(())
    }

    /// Expand the configuration into a new object
    pub fn on_create(&self, resource: &mut R, data: &mut ResourceData) -> FieldResult<()> {
        for field in self.iter() {
            debug!("{}: create {}", self.resource_type, field.name());
            field.create(resource, data)?;
        }
        Ok(())
    }

    /// Expand changed attributes into an update object.
    ///
    /// Returns whether any field changed.
    pub fn on_update(&self, resource: &mut R, data: &mut ResourceData) -> FieldResult<bool> {
        let mut changed = false;
        for field in self.iter() {
            if !data.has_change(field.name()) {
                continue;
            }
            debug!("{}: update {}", self.resource_type, field.name());
            field.update(resource, data)?;
            changed = true;
        }
        Ok(changed)
    }

    pub fn on_delete(&self, resource: &mut R, data: &mut ResourceData) -> FieldResult<()> {
        for field in self.iter() {
            field.delete(resource, data)?;
        }
        Ok(())
    }
}

impl<R> fmt::Debug for FieldMap<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldMap")
            .field("resource_type", &self.resource_type)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;
    use crate::resource::Value;
    use crate::schema::AttributeType;

    #[derive(Default)]
    struct Wrapper {
        name: Option<String>,
        calls: Vec<String>,
    }

    fn name_field() -> GenericField<Wrapper> {
        GenericField::new(
            FieldCategory::Elastigroup,
            AttributeSchema::new("name", AttributeType::String).required(),
        )
        .on_read(|w: &mut Wrapper, d| {
            let name = w.name.clone().unwrap_or_default();
            d.set("name", Value::String(name))
                .map_err(|e| FieldError::write_back("name", e))
        })
        .on_create(|w: &mut Wrapper, d| {
            w.name = d.get_ok("name").and_then(Value::try_as);
            w.calls.push("create name".to_string());
            Ok(())
        })
        .on_update(|w: &mut Wrapper, d| {
            w.name = d.get_ok("name").and_then(Value::try_as);
            w.calls.push("update name".to_string());
            Ok(())
        })
    }

    fn description_field() -> GenericField<Wrapper> {
        GenericField::new(
            FieldCategory::Elastigroup,
            AttributeSchema::new("description", AttributeType::String),
        )
        .on_update(|w: &mut Wrapper, _| {
            w.calls.push("update description".to_string());
            Ok(())
        })
    }

    fn failing_field() -> GenericField<Wrapper> {
        GenericField::new(
            FieldCategory::ElastigroupIntegrations,
            AttributeSchema::new("integration_codedeploy", AttributeType::String),
        )
        .on_create(|_: &mut Wrapper, _| {
            Err(FieldError::missing("deployment group", "application_name"))
        })
    }

    fn fields() -> FieldMap<Wrapper> {
        let mut map = FieldMap::new("test_group");
        map.register(name_field()).unwrap();
        map.register(description_field()).unwrap();
        map
    }

    #[test]
    fn register_rejects_duplicates() {
        let mut map = fields();
        let err = map.register(name_field()).unwrap_err();
        assert!(matches!(err, FieldError::DuplicateField(ref n) if n == "name"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn resource_schema_contains_every_field() {
        let schema = fields().resource_schema();
        assert_eq!(schema.resource_type, "test_group");
        assert!(schema.attributes.contains_key("name"));
        assert!(schema.attributes.contains_key("description"));
    }

    #[test]
    fn create_skips_missing_functions() {
        let map = fields();
        let mut config = HashMap::new();
        config.insert("name".to_string(), Value::from("web"));
        let mut data = ResourceData::new(Arc::new(map.resource_schema())).with_config(config);

        let mut wrapper = Wrapper::default();
        map.on_create(&mut wrapper, &mut data).unwrap();
        assert_eq!(wrapper.name.as_deref(), Some("web"));
        assert_eq!(wrapper.calls, vec!["create name"]);
    }

    #[test]
    fn update_visits_only_changed_fields() {
        let map = fields();
        let mut state = HashMap::new();
        state.insert("name".to_string(), Value::from("web"));
        state.insert("description".to_string(), Value::from("same"));
        let mut config = state.clone();
        config.insert("name".to_string(), Value::from("api"));

        let mut data = ResourceData::new(Arc::new(map.resource_schema()))
            .with_id("sig-1")
            .with_state(state.clone())
            .with_config(config);

        let mut wrapper = Wrapper::default();
        assert!(map.on_update(&mut wrapper, &mut data).unwrap());
        assert_eq!(wrapper.calls, vec!["update name"]);

        let mut unchanged = ResourceData::new(Arc::new(map.resource_schema()))
            .with_state(state.clone())
            .with_config(state);
        let mut wrapper = Wrapper::default();
        assert!(!map.on_update(&mut wrapper, &mut unchanged).unwrap());
        assert!(wrapper.calls.is_empty());
    }

    #[test]
    fn first_error_aborts_iteration() {
        let mut map = fields();
        map.register(failing_field()).unwrap();

        let mut config = HashMap::new();
        config.insert("name".to_string(), Value::from("web"));
        let mut data = ResourceData::new(Arc::new(map.resource_schema())).with_config(config);

        let mut wrapper = Wrapper::default();
        let err = map.on_create(&mut wrapper, &mut data).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid deployment group attributes: application_name missing"
        );
        // "integration_codedeploy" sorts before "name"
        assert!(wrapper.calls.is_empty());
    }

    #[test]
    fn read_writes_state() {
        let map = fields();
        let mut data = ResourceData::new(Arc::new(map.resource_schema())).with_id("sig-1");
        let mut wrapper = Wrapper {
            name: Some("web".to_string()),
            ..Default::default()
        };
        map.on_read(&mut wrapper, &mut data).unwrap();
        assert_eq!(data.state().get("name"), Some(&Value::from("web")));
    }
}
