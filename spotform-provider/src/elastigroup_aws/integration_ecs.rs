//! ECS integration

use spotform_core::field::{FieldCategory, FieldError, FieldMap, FieldResult};
use spotform_core::resource::Value;
use spotform_core::schema::{AttributeSchema, AttributeType};
use spotform_sdk::service::elastigroup::aws::{
    AutoScaleAttribute, AutoScaleEcs, Batch, EcsIntegration,
};

use crate::autoscale::{
    self, AUTOSCALE_COOLDOWN, AUTOSCALE_DOWN, AUTOSCALE_HEADROOM, AUTOSCALE_IS_AUTO_CONFIG,
    AUTOSCALE_IS_ENABLED, UNSET,
};
use crate::utils::{self, Attributes};

use super::{ElastigroupWrapper, Field};

pub const INTEGRATION_ECS: &str = "integration_ecs";
pub const CLUSTER_NAME: &str = "cluster_name";
pub const AUTOSCALE_ATTRIBUTES: &str = "autoscale_attributes";
pub const AUTOSCALE_SCALE_DOWN_NON_SERVICE_TASKS: &str = "autoscale_scale_down_non_service_tasks";
pub const BATCH: &str = "batch";
pub const JOB_QUEUE_NAMES: &str = "job_queue_names";

fn schema() -> AttributeSchema {
    AttributeSchema::new(
        INTEGRATION_ECS,
        AttributeType::block(vec![
            AttributeSchema::new(CLUSTER_NAME, AttributeType::String).required(),
            AttributeSchema::new(AUTOSCALE_IS_ENABLED, AttributeType::Bool),
            AttributeSchema::new(AUTOSCALE_IS_AUTO_CONFIG, AttributeType::Bool),
            autoscale::cooldown_schema(),
            autoscale::headroom_schema(false),
            autoscale::down_schema(true),
            autoscale::key_value_schema(AUTOSCALE_ATTRIBUTES),
            AttributeSchema::new(AUTOSCALE_SCALE_DOWN_NON_SERVICE_TASKS, AttributeType::Bool),
            AttributeSchema::new(
                BATCH,
                AttributeType::block(vec![
                    AttributeSchema::new(
                        JOB_QUEUE_NAMES,
                        AttributeType::List(Box::new(AttributeType::String)),
                    )
                    .required(),
                ]),
            )
            .with_max_items(1),
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
                    .and_then(|i| i.ecs.value())
                    .map(flatten)
                    .unwrap_or_else(|| Value::List(Vec::new()));
                d.set(INTEGRATION_ECS, value)
                    .map_err(|e| FieldError::write_back(INTEGRATION_ECS, e))
            })
            .on_create(|w, d| {
                if let Some(m) = d.get_ok(INTEGRATION_ECS).and_then(Value::first_block) {
                    let ecs = expand(m, false)?;
                    w.integration_mut().set_ecs(Some(ecs));
                }
                Ok(())
            })
            .on_update(|w, d| {
                let ecs = d
                    .get_ok(INTEGRATION_ECS)
                    .and_then(Value::first_block)
                    .map(|m| expand(m, true))
                    .transpose()?;
                w.integration_mut().set_ecs(ecs);
                Ok(())
            }),
    )
}

pub fn expand(m: &Attributes, nullify: bool) -> FieldResult<EcsIntegration> {
    let mut ecs = EcsIntegration::default();

    if let Some(v) = utils::string(m, CLUSTER_NAME) {
        ecs.set_cluster_name(Some(v));
    }

    let auto_scale = expand_auto_scale(m, nullify)?;
    if auto_scale != AutoScaleEcs::default() {
        ecs.set_auto_scale(Some(auto_scale));
    }

    let batch = utils::first_block(m, BATCH)
        .map(|b| utils::strings(b, JOB_QUEUE_NAMES))
        .filter(|names| !names.is_empty())
        .map(|names| {
            let mut batch = Batch::default();
            batch.set_job_queue_names(Some(names));
            batch
        });
    utils::assign(&mut ecs.batch, batch, nullify);

    Ok(ecs)
}

fn expand_auto_scale(m: &Attributes, nullify: bool) -> FieldResult<AutoScaleEcs> {
    let mut auto_scale = AutoScaleEcs::default();

    if let Some(v) = utils::bool(m, AUTOSCALE_IS_ENABLED) {
        auto_scale.set_is_enabled(Some(v));
    }
    if let Some(v) = utils::bool(m, AUTOSCALE_IS_AUTO_CONFIG) {
        auto_scale.set_is_auto_config(Some(v));
    }
    if let Some(v) = utils::bool(m, AUTOSCALE_SCALE_DOWN_NON_SERVICE_TASKS) {
        auto_scale.set_should_scale_down_non_service_tasks(Some(v));
    }
    utils::assign(
        &mut auto_scale.cooldown,
        utils::int_or_sentinel(m, AUTOSCALE_COOLDOWN, UNSET),
        nullify,
    );
    utils::assign(
        &mut auto_scale.headroom,
        utils::first_block(m, AUTOSCALE_HEADROOM).map(|h| autoscale::expand_headroom(h, nullify)),
        nullify,
    );
    utils::assign(
        &mut auto_scale.down,
        utils::first_block(m, AUTOSCALE_DOWN).map(|d| autoscale::expand_down(d, nullify)),
        nullify,
    );

    let attributes =
        autoscale::expand_key_values(m, AUTOSCALE_ATTRIBUTES, "attribute", |key, value| {
            let mut attribute = AutoScaleAttribute::default();
            attribute.set_key(Some(key)).set_value(Some(value));
            attribute
        })?;
    utils::assign(
        &mut auto_scale.attributes,
        (!attributes.is_empty()).then_some(attributes),
        nullify,
    );

    Ok(auto_scale)
}

pub fn flatten(ecs: &EcsIntegration) -> Value {
    let auto_scale = ecs.auto_scale.value().cloned().unwrap_or_default();

    let m = utils::block([
        (CLUSTER_NAME, utils::string_value(&ecs.cluster_name)),
        (AUTOSCALE_IS_ENABLED, utils::bool_value(&auto_scale.is_enabled)),
        (
            AUTOSCALE_IS_AUTO_CONFIG,
            utils::bool_value(&auto_scale.is_auto_config),
        ),
        (
            AUTOSCALE_SCALE_DOWN_NON_SERVICE_TASKS,
            utils::bool_value(&auto_scale.should_scale_down_non_service_tasks),
        ),
        (AUTOSCALE_COOLDOWN, utils::int_value(&auto_scale.cooldown, UNSET)),
        (
            AUTOSCALE_HEADROOM,
            auto_scale
                .headroom
                .value()
                .map(autoscale::flatten_headroom)
                .unwrap_or_else(|| Value::List(Vec::new())),
        ),
        (
            AUTOSCALE_DOWN,
            auto_scale
                .down
                .value()
                .map(|d| autoscale::flatten_down(d, true))
                .unwrap_or_else(|| Value::List(Vec::new())),
        ),
        (
            AUTOSCALE_ATTRIBUTES,
            autoscale::flatten_key_values(
                auto_scale
                    .attributes
                    .value()
                    .into_iter()
                    .flatten()
                    .map(|a| (a.key.value_or_default(), a.value.value_or_default())),
            ),
        ),
        (
            BATCH,
            ecs.batch
                .value()
                .map(|b| {
                    Value::block(utils::block([(
                        JOB_QUEUE_NAMES,
                        Value::from(b.job_queue_names.value_or_default()),
                    )]))
                })
                .unwrap_or_else(|| Value::List(Vec::new())),
        ),
    ]);

    Value::block(m)
}
