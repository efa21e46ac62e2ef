//! Ocean cluster autoscaler

use spotform_core::field::{FieldCategory, FieldError, FieldMap, FieldResult};
use spotform_core::resource::Value;
use spotform_core::schema::{AttributeSchema, AttributeType};
use spotform_sdk::service::ocean::aws::{AutoScaler, AutoScalerHeadroom, AutoScalerResourceLimits};

use crate::autoscale::{
    self, AUTOSCALE_COOLDOWN, AUTOSCALE_DOWN, AUTOSCALE_HEADROOM, AUTOSCALE_IS_AUTO_CONFIG,
    AUTOSCALE_IS_ENABLED, CPU_PER_UNIT, GPU_PER_UNIT, MEMORY_PER_UNIT, NUM_OF_UNITS, UNSET,
};
use crate::utils::{self, Attributes};

use super::{Field, OceanWrapper};

pub const AUTOSCALER: &str = "autoscaler";
pub const RESOURCE_LIMITS: &str = "resource_limits";
pub const MAX_VCPU: &str = "max_vcpu";
pub const MAX_MEMORY_GIB: &str = "max_memory_gib";

fn schema() -> AttributeSchema {
    AttributeSchema::new(
        AUTOSCALER,
        AttributeType::block(vec![
            AttributeSchema::new(AUTOSCALE_IS_ENABLED, AttributeType::Bool),
            AttributeSchema::new(AUTOSCALE_IS_AUTO_CONFIG, AttributeType::Bool),
            autoscale::cooldown_schema(),
            autoscale::headroom_schema(true),
            autoscale::down_schema(true),
            AttributeSchema::new(
                RESOURCE_LIMITS,
                AttributeType::block(vec![
                    AttributeSchema::new(MAX_VCPU, AttributeType::Int),
                    AttributeSchema::new(MAX_MEMORY_GIB, AttributeType::Int),
                ]),
            )
            .with_max_items(1),
        ]),
    )
    .with_max_items(1)
    .with_description("Kubernetes cluster autoscaler settings")
}

pub fn setup(fields: &mut FieldMap<OceanWrapper>) -> FieldResult<()> {
    fields.register(
        Field::new(FieldCategory::OceanAutoScaler, schema())
            .on_read(|w, d| {
                let value = w
                    .cluster()
                    .and_then(|c| c.auto_scaler.value())
                    .map(flatten)
                    .unwrap_or_else(|| Value::List(Vec::new()));
                d.set(AUTOSCALER, value)
                    .map_err(|e| FieldError::write_back(AUTOSCALER, e))
            })
            .on_create(|w, d| {
                if let Some(m) = d.get_ok(AUTOSCALER).and_then(Value::first_block) {
                    w.cluster_mut().set_auto_scaler(Some(expand(m, false)));
                }
                Ok(())
            })
            .on_update(|w, d| {
                let auto_scaler = d
                    .get_ok(AUTOSCALER)
                    .and_then(Value::first_block)
                    .map(|m| expand(m, true));
                w.cluster_mut().set_auto_scaler(auto_scaler);
                Ok(())
            }),
    )
}

pub fn expand(m: &Attributes, nullify: bool) -> AutoScaler {
    let mut auto_scaler = AutoScaler::default();

    if let Some(v) = utils::bool(m, AUTOSCALE_IS_ENABLED) {
        auto_scaler.set_is_enabled(Some(v));
    }
    if let Some(v) = utils::bool(m, AUTOSCALE_IS_AUTO_CONFIG) {
        auto_scaler.set_is_auto_config(Some(v));
    }
    utils::assign(
        &mut auto_scaler.cooldown,
        utils::int_or_sentinel(m, AUTOSCALE_COOLDOWN, UNSET),
        nullify,
    );
    utils::assign(
        &mut auto_scaler.headroom,
        utils::first_block(m, AUTOSCALE_HEADROOM).map(|h| expand_headroom(h, nullify)),
        nullify,
    );
    utils::assign(
        &mut auto_scaler.down,
        utils::first_block(m, AUTOSCALE_DOWN).map(|d| autoscale::expand_down(d, nullify)),
        nullify,
    );
    utils::assign(
        &mut auto_scaler.resource_limits,
        utils::first_block(m, RESOURCE_LIMITS).map(|r| expand_resource_limits(r, nullify)),
        nullify,
    );

    auto_scaler
}

fn expand_headroom(m: &Attributes, nullify: bool) -> AutoScalerHeadroom {
    let mut headroom = AutoScalerHeadroom::default();
    for (key, field) in [
        (CPU_PER_UNIT, &mut headroom.cpu_per_unit),
        (GPU_PER_UNIT, &mut headroom.gpu_per_unit),
        (MEMORY_PER_UNIT, &mut headroom.memory_per_unit),
        (NUM_OF_UNITS, &mut headroom.num_of_units),
    ] {
        utils::assign(field, utils::int_or_sentinel(m, key, UNSET), nullify);
    }
    headroom
}

// Limits have no sentinel: zero is not a usable limit.
fn expand_resource_limits(m: &Attributes, nullify: bool) -> AutoScalerResourceLimits {
    let mut limits = AutoScalerResourceLimits::default();
    utils::assign(
        &mut limits.max_vcpu,
        utils::positive_int(m, MAX_VCPU),
        nullify,
    );
    utils::assign(
        &mut limits.max_memory_gib,
        utils::positive_int(m, MAX_MEMORY_GIB),
        nullify,
    );
    limits
}

pub fn flatten(auto_scaler: &AutoScaler) -> Value {
    let headroom = auto_scaler
        .headroom
        .value()
        .map(|h| {
            Value::block(utils::block([
                (CPU_PER_UNIT, utils::int_value(&h.cpu_per_unit, UNSET)),
                (GPU_PER_UNIT, utils::int_value(&h.gpu_per_unit, UNSET)),
                (MEMORY_PER_UNIT, utils::int_value(&h.memory_per_unit, UNSET)),
                (NUM_OF_UNITS, utils::int_value(&h.num_of_units, UNSET)),
            ]))
        })
        .unwrap_or_else(|| Value::List(Vec::new()));

    let down = auto_scaler
        .down
        .value()
        .map(|d| autoscale::flatten_down(d, true))
        .unwrap_or_else(|| Value::List(Vec::new()));

    let resource_limits = auto_scaler
        .resource_limits
        .value()
        .map(|r| {
            Value::block(utils::block([
                (MAX_VCPU, Value::Int(r.max_vcpu.value_or_default())),
                (MAX_MEMORY_GIB, Value::Int(r.max_memory_gib.value_or_default())),
            ]))
        })
        .unwrap_or_else(|| Value::List(Vec::new()));

    Value::block(utils::block([
        (
            AUTOSCALE_IS_ENABLED,
            utils::bool_value(&auto_scaler.is_enabled),
        ),
        (
            AUTOSCALE_IS_AUTO_CONFIG,
            utils::bool_value(&auto_scaler.is_auto_config),
        ),
        (
            AUTOSCALE_COOLDOWN,
            utils::int_value(&auto_scaler.cooldown, UNSET),
        ),
        (AUTOSCALE_HEADROOM, headroom),
        (AUTOSCALE_DOWN, down),
        (RESOURCE_LIMITS, resource_limits),
    ]))
}
