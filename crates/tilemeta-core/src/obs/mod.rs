//! Observability: in-process counters behind a sink boundary.
//!
//! Table and entity code never touches the counter state directly; every
//! event flows through [`MetricsEvent`] and the active [`MetricsSink`].

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{ClassCounters, EventOps, EventReport, EventState};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all};
