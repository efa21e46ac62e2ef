//! Nomad integration

use spotform_core::field::{FieldCategory, FieldError, FieldMap, FieldResult};
use spotform_core::resource::Value;
use spotform_core::schema::{AttributeSchema, AttributeType, types};
use spotform_sdk::service::elastigroup::aws::{
    AutoScaleConstraint, AutoScaleNomad, NomadIntegration,
};

use crate::autoscale::{
    self, AUTOSCALE_COOLDOWN, AUTOSCALE_DOWN, AUTOSCALE_HEADROOM, AUTOSCALE_IS_ENABLED, UNSET,
};
use crate::utils::{self, Attributes};

use super::{ElastigroupWrapper, Field};

pub const INTEGRATION_NOMAD: &str = "integration_nomad";
pub const MASTER_HOST: &str = "master_host";
pub const MASTER_PORT: &str = "master_port";
pub const ACL_TOKEN: &str = "acl_token";
pub const AUTOSCALE_CONSTRAINTS: &str = "autoscale_constraints";

fn schema() -> AttributeSchema {
    AttributeSchema::new(
        INTEGRATION_NOMAD,
        AttributeType::block(vec![
            AttributeSchema::new(MASTER_HOST, AttributeType::String).required(),
            AttributeSchema::new(MASTER_PORT, types::port()).required(),
            AttributeSchema::new(ACL_TOKEN, AttributeType::String),
            AttributeSchema::new(AUTOSCALE_IS_ENABLED, AttributeType::Bool),
            autoscale::cooldown_schema(),
            autoscale::headroom_schema(false),
            autoscale::down_schema(false),
            autoscale::key_value_schema(AUTOSCALE_CONSTRAINTS),
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
                    .and_then(|i| i.nomad.value())
                    .map(flatten)
                    .unwrap_or_else(|| Value::List(Vec::new()));
                d.set(INTEGRATION_NOMAD, value)
                    .map_err(|e| FieldError::write_back(INTEGRATION_NOMAD, e))
            })
            .on_create(|w, d| {
                if let Some(m) = d.get_ok(INTEGRATION_NOMAD).and_then(Value::first_block) {
                    let nomad = expand(m, false)?;
                    w.integration_mut().set_nomad(Some(nomad));
                }
                Ok(())
            })
            .on_update(|w, d| {
                let nomad = d
                    .get_ok(INTEGRATION_NOMAD)
                    .and_then(Value::first_block)
                    .map(|m| expand(m, true))
                    .transpose()?;
                w.integration_mut().set_nomad(nomad);
                Ok(())
            }),
    )
}

/// Constraint keys are sent as node attribute references: `${key}`
fn wrap_key(key: String) -> String {
    format!("${{{}}}", key)
}

fn unwrap_key(key: &str) -> String {
    key.strip_prefix("${")
        .and_then(|k| k.strip_suffix('}'))
        .unwrap_or(key)
        .to_string()
}

pub fn expand(m: &Attributes, nullify: bool) -> FieldResult<NomadIntegration> {
    let mut nomad = NomadIntegration::default();

    if let Some(v) = utils::string(m, MASTER_HOST) {
        nomad.set_master_host(Some(v));
    }
    if let Some(v) = utils::positive_int(m, MASTER_PORT) {
        nomad.set_master_port(Some(v));
    }
    utils::assign(&mut nomad.acl_token, utils::string(m, ACL_TOKEN), nullify);

    let auto_scale = expand_auto_scale(m, nullify)?;
    if auto_scale != AutoScaleNomad::default() {
        nomad.set_auto_scale(Some(auto_scale));
    }

    Ok(nomad)
}

fn expand_auto_scale(m: &Attributes, nullify: bool) -> FieldResult<AutoScaleNomad> {
    let mut auto_scale = AutoScaleNomad::default();

    if let Some(v) = utils::bool(m, AUTOSCALE_IS_ENABLED) {
        auto_scale.set_is_enabled(Some(v));
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

    let constraints =
        autoscale::expand_key_values(m, AUTOSCALE_CONSTRAINTS, "constraint", |key, value| {
            let mut constraint = AutoScaleConstraint::default();
            constraint.set_key(Some(wrap_key(key))).set_value(Some(value));
            constraint
        })?;
    utils::assign(
        &mut auto_scale.constraints,
        (!constraints.is_empty()).then_some(constraints),
        nullify,
    );

    Ok(auto_scale)
}

pub fn flatten(nomad: &NomadIntegration) -> Value {
    let mut m = utils::block([
        (MASTER_HOST, utils::string_value(&nomad.master_host)),
        (MASTER_PORT, Value::Int(nomad.master_port.value_or_default())),
        (ACL_TOKEN, utils::string_value(&nomad.acl_token)),
    ]);

    let auto_scale = nomad.auto_scale.value();
    m.insert(
        AUTOSCALE_IS_ENABLED.to_string(),
        Value::Bool(auto_scale.and_then(|a| a.is_enabled.value().copied()).unwrap_or_default()),
    );
    m.insert(
        AUTOSCALE_COOLDOWN.to_string(),
        Value::Int(auto_scale.and_then(|a| a.cooldown.value().copied()).unwrap_or(UNSET)),
    );
    m.insert(
        AUTOSCALE_HEADROOM.to_string(),
        auto_scale
            .and_then(|a| a.headroom.value())
            .map(autoscale::flatten_headroom)
            .unwrap_or_else(|| Value::List(Vec::new())),
    );
    m.insert(
        AUTOSCALE_DOWN.to_string(),
        auto_scale
            .and_then(|a| a.down.value())
            .map(|d| autoscale::flatten_down(d, false))
            .unwrap_or_else(|| Value::List(Vec::new())),
    );
    m.insert(
        AUTOSCALE_CONSTRAINTS.to_string(),
        autoscale::flatten_key_values(
            auto_scale
                .and_then(|a| a.constraints.value())
                .into_iter()
                .flatten()
                .map(|c| (unwrap_key(&c.key.value_or_default()), c.value.value_or_default())),
        ),
    );

    Value::block(m)
}
