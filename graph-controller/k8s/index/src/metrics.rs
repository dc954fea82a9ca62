use crate::{SharedIndex, WorkloadKind};
use prometheus_client::{
    collector::Collector,
    encoding::{DescriptorEncoder, EncodeMetric},
    metrics::{gauge::ConstGauge, MetricType},
    registry::Registry,
};
use std::collections::BTreeMap;

#[derive(Debug)]
struct Instrumented(SharedIndex);

pub fn register(reg: &mut Registry, index: SharedIndex) {
    reg.register_collector(Box::new(Instrumented(index)));
}

impl Collector for Instrumented {
    fn encode(&self, mut encoder: DescriptorEncoder<'_>) -> Result<(), std::fmt::Error> {
        let this = self.0.read();

        let mut workloads = BTreeMap::<(&str, WorkloadKind), i64>::new();
        for (kind, workload) in this.workloads() {
            *workloads
                .entry((workload.namespace.as_str(), kind))
                .or_default() += 1;
        }
        let mut workloads_encoder = encoder.encode_descriptor(
            "workload_index_size",
            "The number of workloads in index",
            None,
            MetricType::Gauge,
        )?;
        for ((ns, kind), count) in workloads {
            let labels = [("namespace", ns), ("kind", kind.as_str())];
            let workloads_encoder = workloads_encoder.encode_family(&labels)?;
            ConstGauge::new(count).encode(workloads_encoder)?;
        }

        let mut policies = BTreeMap::<&str, i64>::new();
        for policy in this.network_policies() {
            *policies.entry(policy.namespace.as_str()).or_default() += 1;
        }
        let mut policies_encoder = encoder.encode_descriptor(
            "network_policy_index_size",
            "The number of network policies in index",
            None,
            MetricType::Gauge,
        )?;
        for (ns, count) in policies {
            let labels = [("namespace", ns)];
            let policies_encoder = policies_encoder.encode_family(&labels)?;
            ConstGauge::new(count).encode(policies_encoder)?;
        }

        let namespaces = ConstGauge::new(this.namespaces().count() as i64);
        let namespaces_encoder = encoder.encode_descriptor(
            "namespace_index_size",
            "The number of namespaces in index",
            None,
            MetricType::Gauge,
        )?;
        namespaces.encode(namespaces_encoder)?;

        let epoch = ConstGauge::new(i64::try_from(this.epoch()).unwrap_or(i64::MAX));
        let epoch_encoder = encoder.encode_descriptor(
            "epoch",
            "The number of changes observed to cluster state",
            None,
            MetricType::Gauge,
        )?;
        epoch.encode(epoch_encoder)?;

        Ok(())
    }
}
