//! Route53 integration

use spotform_core::field::{FieldCategory, FieldError, FieldMap, FieldResult};
use spotform_core::resource::Value;
use spotform_core::schema::{AttributeSchema, AttributeType};
use spotform_sdk::service::elastigroup::aws::{Domain, RecordSet, Route53Integration};

use super::{ElastigroupWrapper, Field};
use crate::utils::{self, Attributes};

pub const INTEGRATION_ROUTE53: &str = "integration_route53";
pub const DOMAINS: &str = "domains";
pub const HOSTED_ZONE_ID: &str = "hosted_zone_id";
pub const SPOTINST_ACCT_ID: &str = "spotinst_acct_id";
pub const RECORD_SET_TYPE: &str = "record_set_type";
pub const RECORD_SETS: &str = "record_sets";
pub const NAME: &str = "name";
pub const USE_PUBLIC_IP: &str = "use_public_ip";
pub const USE_PUBLIC_DNS: &str = "use_public_dns";

const DEFAULT_RECORD_SET_TYPE: &str = "a";

fn schema() -> AttributeSchema {
    let record_sets = AttributeType::block_set(vec![
        AttributeSchema::new(NAME, AttributeType::String).required(),
        AttributeSchema::new(USE_PUBLIC_IP, AttributeType::Bool),
        AttributeSchema::new(USE_PUBLIC_DNS, AttributeType::Bool),
    ]);
    let domains = AttributeType::block_set(vec![
        AttributeSchema::new(HOSTED_ZONE_ID, AttributeType::String).required(),
        AttributeSchema::new(SPOTINST_ACCT_ID, AttributeType::String),
        AttributeSchema::new(
            RECORD_SET_TYPE,
            AttributeType::Enum(vec!["a".to_string(), "cname".to_string()]),
        )
        .with_default(Value::from(DEFAULT_RECORD_SET_TYPE)),
        AttributeSchema::new(RECORD_SETS, record_sets).required(),
    ]);

    AttributeSchema::new(
        INTEGRATION_ROUTE53,
        AttributeType::block(vec![AttributeSchema::new(DOMAINS, domains).required()]),
    )
    .with_max_items(1)
}

pub fn setup(fields: &mut FieldMap<ElastigroupWrapper>) -> FieldResult<()> {
    fields.register(
        Field::new(FieldCategory::ElastigroupIntegrations, schema())
            .on_read(|w, d| {
                let value = w
                    .integration()
                    .and_then(|i| i.route53.value())
                    .map(flatten)
                    .unwrap_or_else(|| Value::List(Vec::new()));
                d.set(INTEGRATION_ROUTE53, value)
                    .map_err(|e| FieldError::write_back(INTEGRATION_ROUTE53, e))
            })
            .on_create(|w, d| {
                if let Some(m) = d.get_ok(INTEGRATION_ROUTE53).and_then(Value::first_block) {
                    let route53 = expand(m)?;
                    w.integration_mut().set_route53(Some(route53));
                }
                Ok(())
            })
            .on_update(|w, d| {
                let route53 = d
                    .get_ok(INTEGRATION_ROUTE53)
                    .and_then(Value::first_block)
                    .map(expand)
                    .transpose()?;
                w.integration_mut().set_route53(route53);
                Ok(())
            }),
    )
}

pub fn expand(m: &Attributes) -> FieldResult<Route53Integration> {
    let domains = utils::blocks(m, DOMAINS)
        .map(expand_domain)
        .collect::<FieldResult<Vec<_>>>()?;

    let mut route53 = Route53Integration::default();
    if !domains.is_empty() {
        route53.set_domains(Some(domains));
    }
    Ok(route53)
}

fn expand_domain(m: &Attributes) -> FieldResult<Domain> {
    let hosted_zone_id = utils::string(m, HOSTED_ZONE_ID)
        .ok_or_else(|| FieldError::missing("domain", HOSTED_ZONE_ID))?;
    let record_sets = utils::blocks(m, RECORD_SETS)
        .map(expand_record_set)
        .collect::<FieldResult<Vec<_>>>()?;
    if record_sets.is_empty() {
        return Err(FieldError::missing("domain", RECORD_SETS));
    }

    let mut domain = Domain::default();
    domain
        .set_hosted_zone_id(Some(hosted_zone_id))
        .set_record_sets(Some(record_sets));
    if let Some(v) = utils::string(m, SPOTINST_ACCT_ID) {
        domain.set_spotinst_account_id(Some(v));
    }
    if let Some(v) = utils::string(m, RECORD_SET_TYPE) {
        domain.set_record_set_type(Some(v));
    }
    Ok(domain)
}

fn expand_record_set(m: &Attributes) -> FieldResult<RecordSet> {
    let name = utils::string(m, NAME).ok_or_else(|| FieldError::missing("record set", NAME))?;

    let mut record_set = RecordSet::default();
    record_set.set_name(Some(name));
    if let Some(v) = utils::bool(m, USE_PUBLIC_IP) {
        record_set.set_use_public_ip(Some(v));
    }
    if let Some(v) = utils::bool(m, USE_PUBLIC_DNS) {
        record_set.set_use_public_dns(Some(v));
    }
    Ok(record_set)
}

pub fn flatten(route53: &Route53Integration) -> Value {
    let domains = route53
        .domains
        .value()
        .into_iter()
        .flatten()
        .map(|domain| {
            let record_sets = domain
                .record_sets
                .value()
                .into_iter()
                .flatten()
                .map(|r| {
                    Value::Map(utils::block([
                        (NAME, utils::string_value(&r.name)),
                        (USE_PUBLIC_IP, utils::bool_value(&r.use_public_ip)),
                        (USE_PUBLIC_DNS, utils::bool_value(&r.use_public_dns)),
                    ]))
                })
                .collect();

            Value::Map(utils::block([
                (HOSTED_ZONE_ID, utils::string_value(&domain.hosted_zone_id)),
                (
                    SPOTINST_ACCT_ID,
                    utils::string_value(&domain.spotinst_account_id),
                ),
                (
                    RECORD_SET_TYPE,
                    Value::String(
                        domain
                            .record_set_type
                            .value_or(DEFAULT_RECORD_SET_TYPE.to_string()),
                    ),
                ),
                (RECORD_SETS, Value::Set(record_sets)),
            ]))
        })
        .collect();

    Value::block(utils::block([(DOMAINS, Value::Set(domains))]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use spotform_sdk::jsonutil::marshal_json;

    fn record_set(name: Option<&str>) -> Value {
        let mut m = utils::block([
            (USE_PUBLIC_IP, Value::Bool(true)),
            (USE_PUBLIC_DNS, Value::Bool(false)),
        ]);
        if let Some(name) = name {
            m.insert(NAME.to_string(), Value::from(name));
        }
        Value::Map(m)
    }

    fn domain(hosted_zone_id: Option<&str>, record_sets: Vec<Value>) -> Value {
        let mut m = utils::block([
            (SPOTINST_ACCT_ID, Value::from("act-1")),
            (RECORD_SET_TYPE, Value::from("cname")),
            (RECORD_SETS, Value::Set(record_sets)),
        ]);
        if let Some(id) = hosted_zone_id {
            m.insert(HOSTED_ZONE_ID.to_string(), Value::from(id));
        }
        Value::Map(m)
    }

    fn input(domains: Vec<Value>) -> Attributes {
        utils::block([(DOMAINS, Value::Set(domains))])
    }

    #[test]
    fn round_trip() {
        let m = input(vec![domain(
            Some("Z123"),
            vec![record_set(Some("www.example.com"))],
        )]);
        let route53 = expand(&m).unwrap();
        assert_eq!(flatten(&route53), Value::block(m));
    }

    #[test]
    fn encodes_wire_names() {
        let m = input(vec![domain(
            Some("Z123"),
            vec![record_set(Some("www.example.com"))],
        )]);
        let route53 = expand(&m).unwrap();
        assert_eq!(
            marshal_json(&route53).unwrap(),
            json!({
                "domains": [{
                    "hostedZoneId": "Z123",
                    "spotinstAccountId": "act-1",
                    "recordSetType": "cname",
                    "recordSets": [{
                        "name": "www.example.com",
                        "usePublicIp": true,
                        "usePublicDns": false
                    }]
                }]
            })
        );
    }

    #[test]
    fn domain_requires_hosted_zone() {
        let m = input(vec![domain(None, vec![record_set(Some("www"))])]);
        assert_eq!(
            expand(&m).unwrap_err().to_string(),
            "invalid domain attributes: hosted_zone_id missing"
        );
    }

    #[test]
    fn domain_requires_record_sets() {
        let m = input(vec![domain(Some("Z123"), vec![])]);
        assert_eq!(
            expand(&m).unwrap_err().to_string(),
            "invalid domain attributes: record_sets missing"
        );
    }

    #[test]
    fn record_set_requires_name() {
        let m = input(vec![domain(Some("Z123"), vec![record_set(None)])]);
        assert_eq!(
            expand(&m).unwrap_err().to_string(),
            "invalid record set attributes: name missing"
        );
    }

    #[test]
    fn empty_domains_expand_to_nothing() {
        let route53 = expand(&input(vec![])).unwrap();
        assert!(route53.domains.is_unset());
    }
}
