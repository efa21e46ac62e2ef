//! Elastigroup (AWS) API objects

/// API path of AWS Elastigroups
pub const GROUP_PATH: &str = "/aws/ec2/group";

api_object! {
    /// An Elastigroup
    pub struct Group {
        id / set_id: String = "id",
        name / set_name: String = "name",
        description / set_description: String = "description",
        capacity / set_capacity: Capacity = "capacity",
        compute / set_compute: Compute = "compute",
        integration / set_integration: Integration = "thirdPartiesIntegration",
    }
}

api_object! {
    pub struct Capacity {
        minimum / set_minimum: i64 = "minimum",
        maximum / set_maximum: i64 = "maximum",
        target / set_target: i64 = "target",
    }
}

api_object! {
    pub struct Compute {
        launch_specification / set_launch_specification: LaunchSpecification = "launchSpecification",
    }
}

api_object! {
    pub struct LaunchSpecification {
        metadata_options / set_metadata_options: MetadataOptions = "metadataOptions",
    }
}

api_object! {
    /// Instance metadata service settings
    pub struct MetadataOptions {
        http_tokens / set_http_tokens: String = "httpTokens",
        http_put_response_hop_limit / set_http_put_response_hop_limit: i64 = "httpPutResponseHopLimit",
        instance_metadata_tags / set_instance_metadata_tags: String = "instanceMetadataTags",
    }
}

api_object! {
    /// Third-party integrations of a group
    pub struct Integration {
        code_deploy / set_code_deploy: CodeDeployIntegration = "codeDeploy",
        nomad / set_nomad: NomadIntegration = "nomad",
        route53 / set_route53: Route53Integration = "route53",
        ecs / set_ecs: EcsIntegration = "ecs",
    }
}

// CodeDeploy

api_object! {
    pub struct CodeDeployIntegration {
        deployment_groups / set_deployment_groups: Vec<DeploymentGroup> = "deploymentGroups",
        clean_up_on_failure / set_clean_up_on_failure: bool = "cleanUpOnFailure",
        terminate_instance_on_failure / set_terminate_instance_on_failure: bool = "terminateInstanceOnFailure",
    }
}

api_object! {
    pub struct DeploymentGroup {
        application_name / set_application_name: String = "applicationName",
        deployment_group_name / set_deployment_group_name: String = "deploymentGroupName",
    }
}

// Nomad

api_object! {
    pub struct NomadIntegration {
        master_host / set_master_host: String = "masterHost",
        master_port / set_master_port: i64 = "masterPort",
        acl_token / set_acl_token: String = "aclToken",
        auto_scale / set_auto_scale: AutoScaleNomad = "autoScale",
    }
}

api_object! {
    pub struct AutoScaleNomad {
        is_enabled / set_is_enabled: bool = "isEnabled",
        cooldown / set_cooldown: i64 = "cooldown",
        headroom / set_headroom: AutoScaleHeadroom = "headroom",
        down / set_down: AutoScaleDown = "down",
        constraints / set_constraints: Vec<AutoScaleConstraint> = "constraints",
    }
}

api_object! {
    pub struct AutoScaleHeadroom {
        cpu_per_unit / set_cpu_per_unit: i64 = "cpuPerUnit",
        memory_per_unit / set_memory_per_unit: i64 = "memoryPerUnit",
        num_of_units / set_num_of_units: i64 = "numOfUnits",
    }
}

api_object! {
    pub struct AutoScaleDown {
        evaluation_periods / set_evaluation_periods: i64 = "evaluationPeriods",
        max_scale_down_percentage / set_max_scale_down_percentage: f64 = "maxScaleDownPercentage",
    }
}

api_object! {
    pub struct AutoScaleConstraint {
        key / set_key: String = "key",
        value / set_value: String = "value",
    }
}

// Route53

api_object! {
    pub struct Route53Integration {
        domains / set_domains: Vec<Domain> = "domains",
    }
}

api_object! {
    pub struct Domain {
        hosted_zone_id / set_hosted_zone_id: String = "hostedZoneId",
        spotinst_account_id / set_spotinst_account_id: String = "spotinstAccountId",
        record_set_type / set_record_set_type: String = "recordSetType",
        record_sets / set_record_sets: Vec<RecordSet> = "recordSets",
    }
}

api_object! {
    pub struct RecordSet {
        name / set_name: String = "name",
        use_public_ip / set_use_public_ip: bool = "usePublicIp",
        use_public_dns / set_use_public_dns: bool = "usePublicDns",
    }
}

// ECS

api_object! {
    pub struct EcsIntegration {
        cluster_name / set_cluster_name: String = "clusterName",
        auto_scale / set_auto_scale: AutoScaleEcs = "autoScale",
        batch / set_batch: Batch = "batch",
    }
}

api_object! {
    pub struct AutoScaleEcs {
        is_enabled / set_is_enabled: bool = "isEnabled",
        is_auto_config / set_is_auto_config: bool = "isAutoConfig",
        cooldown / set_cooldown: i64 = "cooldown",
        headroom / set_headroom: AutoScaleHeadroom = "headroom",
        down / set_down: AutoScaleDown = "down",
        attributes / set_attributes: Vec<AutoScaleAttribute> = "attributes",
        should_scale_down_non_service_tasks / set_should_scale_down_non_service_tasks: bool = "shouldScaleDownNonServiceTasks",
    }
}

api_object! {
    pub struct AutoScaleAttribute {
        key / set_key: String = "key",
        value / set_value: String = "value",
    }
}

api_object! {
    pub struct Batch {
        job_queue_names / set_job_queue_names: Vec<String> = "jobQueueNames",
    }
}
