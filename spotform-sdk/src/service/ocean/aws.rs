//! Ocean (AWS) API objects

pub use crate::service::elastigroup::aws::AutoScaleDown;

/// API path of AWS Ocean clusters
pub const CLUSTER_PATH: &str = "/ocean/aws/k8s/cluster";

api_object! {
    /// An Ocean cluster
    pub struct Cluster {
        id / set_id: String = "id",
        name / set_name: String = "name",
        controller_cluster_id / set_controller_cluster_id: String = "controllerClusterId",
        region / set_region: String = "region",
        auto_scaler / set_auto_scaler: AutoScaler = "autoScaler",
    }
}

api_object! {
    pub struct AutoScaler {
        is_enabled / set_is_enabled: bool = "isEnabled",
        is_auto_config / set_is_auto_config: bool = "isAutoConfig",
        cooldown / set_cooldown: i64 = "cooldown",
        headroom / set_headroom: AutoScalerHeadroom = "headroom",
        down / set_down: AutoScaleDown = "down",
        resource_limits / set_resource_limits: AutoScalerResourceLimits = "resourceLimits",
    }
}

api_object! {
    pub struct AutoScalerHeadroom {
        cpu_per_unit / set_cpu_per_unit: i64 = "cpuPerUnit",
        gpu_per_unit / set_gpu_per_unit: i64 = "gpuPerUnit",
        memory_per_unit / set_memory_per_unit: i64 = "memoryPerUnit",
        num_of_units / set_num_of_units: i64 = "numOfUnits",
    }
}

api_object! {
    pub struct AutoScalerResourceLimits {
        max_vcpu / set_max_vcpu: i64 = "maxVCpu",
        max_memory_gib / set_max_memory_gib: i64 = "maxMemoryGib",
    }
}
