//! spotinst_elastigroup_aws resource

pub mod base;
pub mod integration_codedeploy;
pub mod integration_ecs;
pub mod integration_nomad;
pub mod integration_route53;
pub mod launch_configuration;

use spotform_core::field::{FieldMap, FieldResult, GenericField};
use spotform_sdk::service::elastigroup::aws::{GROUP_PATH, Group, Integration};

use crate::crud::ResourceWrapper;

pub const RESOURCE_TYPE: &str = "spotinst_elastigroup_aws";

type Field = GenericField<ElastigroupWrapper>;

/// Envelope around the group being built or read
#[derive(Debug, Default)]
pub struct ElastigroupWrapper {
    group: Option<Group>,
}

impl ElastigroupWrapper {
    pub fn group(&self) -> Option<&Group> {
        self.group.as_ref()
    }

    pub fn group_mut(&mut self) -> &mut Group {
        self.group.get_or_insert_with(Group::default)
    }

    fn integration(&self) -> Option<&Integration> {
        self.group()?.integration.value()
    }

    fn integration_mut(&mut self) -> &mut Integration {
        self.group_mut().integration.get_or_insert_default()
    }
}

impl ResourceWrapper for ElastigroupWrapper {
    type Object = Group;
    const RESOURCE_TYPE: &'static str = RESOURCE_TYPE;
    const PATH: &'static str = GROUP_PATH;

    fn object(&self) -> Option<&Group> {
        self.group()
    }

    fn set_object(&mut self, object: Group) {
        self.group = Some(object);
    }

    fn object_id(object: &Group) -> Option<String> {
        object.id.value().cloned()
    }
}

/// Field map with every Elastigroup field group registered
pub fn setup() -> FieldResult<FieldMap<ElastigroupWrapper>> {
    let mut fields = FieldMap::new(RESOURCE_TYPE);
    base::setup(&mut fields)?;
    integration_codedeploy::setup(&mut fields)?;
    integration_ecs::setup(&mut fields)?;
    integration_nomad::setup(&mut fields)?;
    integration_route53::setup(&mut fields)?;
    launch_configuration::setup(&mut fields)?;
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;
    use spotform_core::field::FieldCategory;
    use spotform_core::resource::{ResourceData, Value};
    use spotform_sdk::client::{ApiClient, MemoryClient};

    use super::*;
    use crate::crud::ResourceHandler;

    fn handler() -> ResourceHandler<ElastigroupWrapper> {
        ResourceHandler::new(setup().unwrap())
    }

    fn config(json: serde_json::Value) -> HashMap<String, Value> {
        handler().schema().attributes_from_json(&json).unwrap()
    }

    #[test]
    fn setup_registers_every_group() {
        let fields = setup().unwrap();
        let names: Vec<&str> = fields.iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            vec![
                "description",
                "desired_capacity",
                "integration_codedeploy",
                "integration_ecs",
                "integration_nomad",
                "integration_route53",
                "metadata_options",
                "name",
            ]
        );
        assert_eq!(
            fields.get("integration_nomad").map(|f| f.category()),
            Some(FieldCategory::ElastigroupIntegrations)
        );
    }

    #[test]
    fn plan_create_is_sparse() {
        let handler = handler();
        let mut data = ResourceData::new(handler.schema()).with_config(config(json!({
            "name": "web",
            "integration_nomad": [{"master_host": "nomad.local", "master_port": 4646}]
        })));

        let body = handler.plan_create(&mut data).unwrap();
        assert_eq!(
            body,
            json!({
                "name": "web",
                "thirdPartiesIntegration": {
                    "nomad": {
                        "masterHost": "nomad.local",
                        "masterPort": 4646,
                        "autoScale": {"isEnabled": false}
                    }
                }
            })
        );
    }

    #[test]
    fn plan_update_skips_unchanged_fields() {
        let handler = handler();
        let state = config(json!({"name": "web", "description": "frontend"}));
        let mut data = ResourceData::new(handler.schema())
            .with_id("sig-1")
            .with_state(state.clone())
            .with_config(state);

        assert_eq!(handler.plan_update(&mut data).unwrap(), None);
    }

    #[test]
    fn create_with_zero_capacity_sends_target() {
        let handler = handler();
        let mut data = ResourceData::new(handler.schema())
            .with_config(config(json!({"name": "web", "desired_capacity": 0})));

        let body = handler.plan_create(&mut data).unwrap();
        assert_eq!(body, json!({"name": "web", "capacity": {"target": 0}}));
    }

    #[test]
    fn scale_to_zero_sets_target() {
        let handler = handler();
        let mut data = ResourceData::new(handler.schema())
            .with_id("sig-1")
            .with_state(config(json!({"name": "web", "desired_capacity": 3})))
            .with_config(config(json!({"name": "web", "desired_capacity": 0})));

        assert_eq!(
            handler.plan_update(&mut data).unwrap(),
            Some(json!({"capacity": {"target": 0}}))
        );
    }

    #[test]
    fn removed_capacity_is_cleared() {
        let handler = handler();
        let mut data = ResourceData::new(handler.schema())
            .with_id("sig-1")
            .with_state(config(json!({"name": "web", "desired_capacity": 3})))
            .with_config(config(json!({"name": "web"})));

        assert_eq!(
            handler.plan_update(&mut data).unwrap(),
            Some(json!({"capacity": {"target": null}}))
        );
    }

    #[test]
    fn plan_update_clears_removed_integration() {
        let handler = handler();
        let state = config(json!({
            "name": "web",
            "integration_codedeploy": [{
                "cleanup_on_failure": true,
                "terminate_instance_on_failure": false,
                "deployment_groups": [{"application_name": "app1", "deployment_group_name": "grp1"}]
            }]
        }));
        let mut data = ResourceData::new(handler.schema())
            .with_id("sig-1")
            .with_state(state)
            .with_config(config(json!({"name": "web"})));

        let body = handler.plan_update(&mut data).unwrap().unwrap();
        assert_eq!(body, json!({"thirdPartiesIntegration": {"codeDeploy": null}}));
    }

    #[tokio::test]
    async fn create_then_read_back() {
        let handler = handler();
        let client = MemoryClient::new();
        let mut data = ResourceData::new(handler.schema()).with_config(config(json!({
            "name": "web",
            "desired_capacity": 2,
            "metadata_options": [{"http_tokens": "required"}]
        })));

        handler.create(&client, &mut data).await.unwrap();

        let id = data.id().unwrap().to_string();
        assert!(id.starts_with("sig-"));
        assert_eq!(data.state().get("name"), Some(&Value::from("web")));
        assert_eq!(data.state().get("desired_capacity"), Some(&Value::Int(2)));
        assert_eq!(
            data.state().get("integration_nomad"),
            Some(&Value::List(vec![]))
        );

        let stored = client.read(GROUP_PATH, &id).await.unwrap().unwrap();
        assert_eq!(
            stored["compute"],
            json!({"launchSpecification": {"metadataOptions": {"httpTokens": "required"}}})
        );
    }

    #[tokio::test]
    async fn update_removes_acl_token_remotely() {
        let handler = handler();
        let client = MemoryClient::new();
        let prior = json!({
            "name": "web",
            "integration_nomad": [{
                "master_host": "nomad.local",
                "master_port": 4646,
                "acl_token": "abc"
            }]
        });

        let mut data = ResourceData::new(handler.schema()).with_config(config(prior));
        handler.create(&client, &mut data).await.unwrap();
        let id = data.id().unwrap().to_string();

        let mut data = ResourceData::new(handler.schema())
            .with_id(id.clone())
            .with_state(data.into_state())
            .with_config(config(json!({
                "name": "web",
                "integration_nomad": [{"master_host": "nomad.local", "master_port": 4646}]
            })));

        let body = handler.plan_update(&mut data).unwrap().unwrap();
        assert_eq!(body.get("name"), None);
        assert_eq!(
            body["thirdPartiesIntegration"]["nomad"].get("aclToken"),
            Some(&serde_json::Value::Null)
        );

        handler.update(&client, &mut data).await.unwrap();
        let stored = client.read(GROUP_PATH, &id).await.unwrap().unwrap();
        let nomad = &stored["thirdPartiesIntegration"]["nomad"];
        assert_eq!(nomad.get("aclToken"), None);
        assert_eq!(nomad["masterHost"], json!("nomad.local"));
        let nomad = data.state()["integration_nomad"].first_block().unwrap();
        assert_eq!(nomad["acl_token"], Value::from(""));
    }

    #[tokio::test]
    async fn read_clears_id_of_missing_group() {
        let handler = handler();
        let client = MemoryClient::new();
        let mut data = ResourceData::new(handler.schema()).with_id("sig-gone");

        handler.read(&client, &mut data).await.unwrap();
        assert_eq!(data.id(), None);
    }

    #[tokio::test]
    async fn delete_removes_group() {
        let handler = handler();
        let client = MemoryClient::new();
        let mut data =
            ResourceData::new(handler.schema()).with_config(config(json!({"name": "web"})));
        handler.create(&client, &mut data).await.unwrap();

        handler.delete(&client, &mut data).await.unwrap();
        assert_eq!(data.id(), None);
        assert!(client.is_empty().await);
    }

    #[test]
    fn companion_error_aborts_plan() {
        let handler = handler();
        let mut data = ResourceData::new(handler.schema()).with_config(config(json!({
            "name": "web",
            "integration_codedeploy": [{
                "cleanup_on_failure": true,
                "terminate_instance_on_failure": true,
                "deployment_groups": [{"application_name": "app1"}]
            }]
        })));

        let err = handler.plan_create(&mut data).unwrap_err();
        assert!(
            err.to_string()
                .contains("invalid deployment group attributes: deployment_group_name missing")
        );
    }
}
