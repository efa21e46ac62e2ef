//! Generic CRUD handler
//!
//! Every resource type follows the same flow: iterate the field map to
//! build (or flatten) the API object, then exchange it with the API client.

use std::sync::Arc;

use log::{debug, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use spotform_core::field::{FieldError, FieldMap};
use spotform_core::plan::Plan;
use spotform_core::provider::{ProviderError, ProviderResult};
use spotform_core::resource::{ResourceData, ResourceId};
use spotform_core::schema::ResourceSchema;
use spotform_sdk::client::ApiClient;
use spotform_sdk::jsonutil::marshal_json;

/// Envelope around the API object a resource's fields read and write
pub trait ResourceWrapper: Default + Send {
    type Object: Serialize + DeserializeOwned + Send;

    /// Resource type name (e.g. "spotinst_elastigroup_aws")
    const RESOURCE_TYPE: &'static str;

    /// API collection path
    const PATH: &'static str;

    fn object(&self) -> Option<&Self::Object>;

    fn set_object(&mut self, object: Self::Object);

    /// Remote id carried by an object
    fn object_id(object: &Self::Object) -> Option<String>;
}

/// Drives one resource type's field map against the API
pub struct ResourceHandler<W: ResourceWrapper> {
    fields: FieldMap<W>,
    schema: Arc<ResourceSchema>,
}

impl<W: ResourceWrapper> ResourceHandler<W> {
    pub fn new(fields: FieldMap<W>) -> Self {
        let schema = Arc::new(fields.resource_schema());
        Self { fields, schema }
    }

    pub fn fields(&self) -> &FieldMap<W> {
        &self.fields
    }

    pub fn schema(&self) -> Arc<ResourceSchema> {
        self.schema.clone()
    }

    fn resource_id(data: &ResourceData) -> ResourceId {
        ResourceId::new(W::RESOURCE_TYPE, data.id().unwrap_or("(new)"))
    }

    fn field_error(data: &ResourceData, e: FieldError) -> ProviderError {
        ProviderError::new(e.to_string())
            .for_resource(Self::resource_id(data))
            .with_cause(e)
    }

    fn body(data: &ResourceData, wrapper: &W) -> ProviderResult<serde_json::Value> {
        match wrapper.object() {
            Some(object) => marshal_json(object).map_err(|e| {
                ProviderError::new("failed to encode request")
                    .for_resource(Self::resource_id(data))
                    .with_cause(e)
            }),
            None => Ok(serde_json::Value::Object(serde_json::Map::new())),
        }
    }

    /// Request body a create would send
    pub fn plan_create(&self, data: &mut ResourceData) -> ProviderResult<serde_json::Value> {
        let mut wrapper = W::default();
        self.fields
            .on_create(&mut wrapper, data)
            .map_err(|e| Self::field_error(data, e))?;
        Self::body(data, &wrapper)
    }

    /// Request body an update would send; `None` when no field changed
    pub fn plan_update(
        &self,
        data: &mut ResourceData,
    ) -> ProviderResult<Option<serde_json::Value>> {
        let mut wrapper = W::default();
        let changed = self
            .fields
            .on_update(&mut wrapper, data)
            .map_err(|e| Self::field_error(data, e))?;
        if !changed {
            return Ok(None);
        }
        Self::body(data, &wrapper).map(Some)
    }

    /// Create when the resource has no id yet, otherwise update
    pub fn plan(&self, data: &mut ResourceData) -> ProviderResult<Plan> {
        let Some(id) = data.id().map(str::to_string) else {
            return self
                .plan_create(data)
                .map(|body| Plan::create(W::RESOURCE_TYPE, body));
        };
        Ok(match self.plan_update(data)? {
            Some(body) => Plan::update(W::RESOURCE_TYPE, id, body),
            None => Plan::no_change(W::RESOURCE_TYPE, id),
        })
    }

    /// Write an API object into state through every field's read function
    pub fn flatten(&self, object: serde_json::Value, data: &mut ResourceData) -> ProviderResult<()> {
        let object: W::Object = serde_json::from_value(object).map_err(|e| {
            ProviderError::new("failed to decode object")
                .for_resource(Self::resource_id(data))
                .with_cause(e)
        })?;
        if let Some(id) = W::object_id(&object) {
            data.set_id(Some(id));
        }

        let mut wrapper = W::default();
        wrapper.set_object(object);
        self.fields
            .on_read(&mut wrapper, data)
            .map_err(|e| Self::field_error(data, e))
    }

    pub async fn read(&self, client: &dyn ApiClient, data: &mut ResourceData) -> ProviderResult<()> {
        let Some(id) = data.id().map(str::to_string) else {
            return Err(ProviderError::new("cannot read a resource without an id")
                .for_resource(Self::resource_id(data)));
        };

        let object = client.read(W::PATH, &id).await.map_err(|e| {
            ProviderError::new("failed to read resource")
                .for_resource(Self::resource_id(data))
                .with_cause(e)
        })?;

        match object {
            Some(object) => {
                debug!("{}: read {}", W::RESOURCE_TYPE, id);
                self.flatten(object, data)
            }
            None => {
                warn!("{} {} no longer exists, removing from state", W::RESOURCE_TYPE, id);
                data.set_id(None);
                Ok(())
            }
        }
    }

    pub async fn create(
        &self,
        client: &dyn ApiClient,
        data: &mut ResourceData,
    ) -> ProviderResult<()> {
        let body = self.plan_create(data)?;

        let created = client.create(W::PATH, body).await.map_err(|e| {
            ProviderError::new("failed to create resource")
                .for_resource(Self::resource_id(data))
                .with_cause(e)
        })?;

        let id = created
            .get("id")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| {
                ProviderError::new("create response carries no id")
                    .for_resource(Self::resource_id(data))
            })?
            .to_string();
        info!("{}: created {}", W::RESOURCE_TYPE, id);
        data.set_id(Some(id));

        self.read(client, data).await
    }

    pub async fn update(
        &self,
        client: &dyn ApiClient,
        data: &mut ResourceData,
    ) -> ProviderResult<()> {
        let Some(id) = data.id().map(str::to_string) else {
            return Err(ProviderError::new("cannot update a resource without an id")
                .for_resource(Self::resource_id(data)));
        };

        let Some(body) = self.plan_update(data)? else {
            debug!("{}: no changes for {}", W::RESOURCE_TYPE, id);
            return Ok(());
        };

        client.update(W::PATH, &id, body).await.map_err(|e| {
            ProviderError::new("failed to update resource")
                .for_resource(Self::resource_id(data))
                .with_cause(e)
        })?;
        info!("{}: updated {}", W::RESOURCE_TYPE, id);

        self.read(client, data).await
    }

    pub async fn delete(
        &self,
        client: &dyn ApiClient,
        data: &mut ResourceData,
    ) -> ProviderResult<()> {
        let Some(id) = data.id().map(str::to_string) else {
            return Ok(());
        };

        let mut wrapper = W::default();
        self.fields
            .on_delete(&mut wrapper, data)
            .map_err(|e| Self::field_error(data, e))?;

        client.delete(W::PATH, &id).await.map_err(|e| {
            ProviderError::new("failed to delete resource")
                .for_resource(Self::resource_id(data))
                .with_cause(e)
        })?;
        info!("{}: deleted {}", W::RESOURCE_TYPE, id);

        data.set_id(None);
        Ok(())
    }
}

impl<W: ResourceWrapper> std::fmt::Debug for ResourceHandler<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceHandler")
            .field("resource_type", &W::RESOURCE_TYPE)
            .field("fields", &self.fields)
            .finish()
    }
}
