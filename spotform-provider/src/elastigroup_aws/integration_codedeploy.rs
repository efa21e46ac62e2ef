//! AWS CodeDeploy integration

use spotform_core::field::{FieldCategory, FieldError, FieldMap, FieldResult};
use spotform_core::resource::Value;
use spotform_core::schema::{AttributeSchema, AttributeType};
use spotform_sdk::service::elastigroup::aws::{CodeDeployIntegration, DeploymentGroup};

use super::{ElastigroupWrapper, Field};
use crate::utils::{self, Attributes};

pub const INTEGRATION_CODEDEPLOY: &str = "integration_codedeploy";
pub const CLEANUP_ON_FAILURE: &str = "cleanup_on_failure";
pub const TERMINATE_INSTANCE_ON_FAILURE: &str = "terminate_instance_on_failure";
pub const DEPLOYMENT_GROUPS: &str = "deployment_groups";
pub const APPLICATION_NAME: &str = "application_name";
pub const DEPLOYMENT_GROUP_NAME: &str = "deployment_group_name";

fn schema() -> AttributeSchema {
    AttributeSchema::new(
        INTEGRATION_CODEDEPLOY,
        AttributeType::block(vec![
            AttributeSchema::new(CLEANUP_ON_FAILURE, AttributeType::Bool).required(),
            AttributeSchema::new(TERMINATE_INSTANCE_ON_FAILURE, AttributeType::Bool).required(),
            AttributeSchema::new(
                DEPLOYMENT_GROUPS,
                AttributeType::block_set(vec![
                    AttributeSchema::new(APPLICATION_NAME, AttributeType::String).required(),
                    AttributeSchema::new(DEPLOYMENT_GROUP_NAME, AttributeType::String).required(),
                ]),
            )
            .required(),
        ]),
    )
    .with_max_items(1)
}

pub fn setup(fields: &mut FieldMap<ElastigroupWrapper>) -> FieldResult<()> {
    fields.register(
        Field::new(FieldCategory::ElastigroupIntegrations, schema())
            .on_read(|w, d| {
                let value = w
                    .integration()
                    .and_then(|i| i.code_deploy.value())
                    .map(flatten)
                    .unwrap_or_else(|| Value::List(Vec::new()));
                d.set(INTEGRATION_CODEDEPLOY, value)
                    .map_err(|e| FieldError::write_back(INTEGRATION_CODEDEPLOY, e))
            })
            .on_create(|w, d| {
                if let Some(m) = d.get_ok(INTEGRATION_CODEDEPLOY).and_then(Value::first_block) {
                    let integration = expand(m)?;
                    w.integration_mut().set_code_deploy(Some(integration));
                }
                Ok(())
            })
            .on_update(|w, d| {
                let integration = d
                    .get_ok(INTEGRATION_CODEDEPLOY)
                    .and_then(Value::first_block)
                    .map(expand)
                    .transpose()?;
                w.integration_mut().set_code_deploy(integration);
                Ok(())
            }),
    )
}

pub fn expand(m: &Attributes) -> FieldResult<CodeDeployIntegration> {
    let mut integration = CodeDeployIntegration::default();

    if let Some(v) = utils::bool(m, CLEANUP_ON_FAILURE) {
        integration.set_clean_up_on_failure(Some(v));
    }
    if let Some(v) = utils::bool(m, TERMINATE_INSTANCE_ON_FAILURE) {
        integration.set_terminate_instance_on_failure(Some(v));
    }

    let groups = utils::blocks(m, DEPLOYMENT_GROUPS)
        .map(expand_deployment_group)
        .collect::<FieldResult<Vec<_>>>()?;
    if !groups.is_empty() {
        integration.set_deployment_groups(Some(groups));
    }

    Ok(integration)
}

fn expand_deployment_group(m: &Attributes) -> FieldResult<DeploymentGroup> {
    let application_name = utils::string(m, APPLICATION_NAME)
        .ok_or_else(|| FieldError::missing("deployment group", APPLICATION_NAME))?;
    let deployment_group_name = utils::string(m, DEPLOYMENT_GROUP_NAME)
        .ok_or_else(|| FieldError::missing("deployment group", DEPLOYMENT_GROUP_NAME))?;

    let mut group = DeploymentGroup::default();
    group
        .set_application_name(Some(application_name))
        .set_deployment_group_name(Some(deployment_group_name));
    Ok(group)
}

pub fn flatten(integration: &CodeDeployIntegration) -> Value {
    let groups = integration
        .deployment_groups
        .value()
        .map(|groups| {
            groups
                .iter()
                .map(|g| {
                    Value::Map(utils::block([
                        (APPLICATION_NAME, utils::string_value(&g.application_name)),
                        (
                            DEPLOYMENT_GROUP_NAME,
                            utils::string_value(&g.deployment_group_name),
                        ),
                    ]))
                })
                .collect()
        })
        .unwrap_or_default();

    Value::block(utils::block([
        (
            CLEANUP_ON_FAILURE,
            utils::bool_value(&integration.clean_up_on_failure),
        ),
        (
            TERMINATE_INSTANCE_ON_FAILURE,
            utils::bool_value(&integration.terminate_instance_on_failure),
        ),
        (DEPLOYMENT_GROUPS, Value::Set(groups)),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotform_sdk::Optional;
    use spotform_sdk::jsonutil::marshal_json;

    fn deployment_group(entries: &[(&str, &str)]) -> Value {
        Value::Map(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), Value::from(*v)))
                .collect(),
        )
    }

    fn input() -> Attributes {
        utils::block([
            (CLEANUP_ON_FAILURE, Value::Bool(true)),
            (TERMINATE_INSTANCE_ON_FAILURE, Value::Bool(false)),
            (
                DEPLOYMENT_GROUPS,
                Value::Set(vec![deployment_group(&[
                    (APPLICATION_NAME, "app1"),
                    (DEPLOYMENT_GROUP_NAME, "grp1"),
                ])]),
            ),
        ])
    }

    #[test]
    fn expand_full_block() {
        let integration = expand(&input()).unwrap();

        assert_eq!(integration.clean_up_on_failure, Optional::Value(true));
        assert_eq!(
            integration.terminate_instance_on_failure,
            Optional::Value(false)
        );
        let groups = integration.deployment_groups.value().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].application_name.value_or_default(), "app1");
        assert_eq!(groups[0].deployment_group_name.value_or_default(), "grp1");
    }

    #[test]
    fn flatten_reproduces_input() {
        let integration = expand(&input()).unwrap();
        assert_eq!(flatten(&integration), Value::block(input()));
    }

    #[test]
    fn encodes_false_flag() {
        let integration = expand(&input()).unwrap();
        assert_eq!(
            marshal_json(&integration).unwrap(),
            serde_json::json!({
                "deploymentGroups": [{"applicationName": "app1", "deploymentGroupName": "grp1"}],
                "cleanUpOnFailure": true,
                "terminateInstanceOnFailure": false
            })
        );
    }

    #[test]
    fn missing_group_name_is_rejected() {
        let mut m = input();
        m.insert(
            DEPLOYMENT_GROUPS.to_string(),
            Value::Set(vec![deployment_group(&[(APPLICATION_NAME, "app1")])]),
        );

        let err = expand(&m).unwrap_err();
        assert!(matches!(
            err,
            FieldError::MissingAttribute {
                attribute: DEPLOYMENT_GROUP_NAME,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "invalid deployment group attributes: deployment_group_name missing"
        );
    }

    #[test]
    fn missing_application_name_is_rejected() {
        let mut m = input();
        m.insert(
            DEPLOYMENT_GROUPS.to_string(),
            Value::Set(vec![deployment_group(&[(DEPLOYMENT_GROUP_NAME, "grp1")])]),
        );

        let err = expand(&m).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid deployment group attributes: application_name missing"
        );
    }

    #[test]
    fn mismatched_leaf_is_absent() {
        let mut m = input();
        m.insert(CLEANUP_ON_FAILURE.to_string(), Value::from("yes"));

        let integration = expand(&m).unwrap();
        assert!(integration.clean_up_on_failure.is_unset());
    }
}
