//! Metrics sink boundary.
//!
//! This module is the only bridge between table/entity logic and the
//! process-wide metrics state.

use crate::obs::metrics::{self, EventReport};

///
/// MetricsEvent
///
/// `class` is the id of the class the entity or table conforms to, when it
/// has one.
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent<'a> {
    PropertyRead { class: Option<&'a str> },
    PropertyWrite { class: Option<&'a str> },
    WriteRejected { class: Option<&'a str> },
    SemanticMiss { class: Option<&'a str>, write: bool },
    ImplicitView { class: Option<&'a str> },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent<'_>);
}

///
/// GlobalMetricsSink
/// Default sink that writes into the process-wide metrics state.
///

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent<'_>) {
        metrics::with_state_mut(|m| match event {
            MetricsEvent::PropertyRead { class } => {
                m.ops.property_reads = m.ops.property_reads.saturating_add(1);
                if let Some(class) = class {
                    let entry = metrics::class_entry(m, class);
                    entry.property_reads = entry.property_reads.saturating_add(1);
                }
            }

            MetricsEvent::PropertyWrite { class } => {
                m.ops.property_writes = m.ops.property_writes.saturating_add(1);
                if let Some(class) = class {
                    let entry = metrics::class_entry(m, class);
                    entry.property_writes = entry.property_writes.saturating_add(1);
                }
            }

            MetricsEvent::WriteRejected { class } => {
                m.ops.rejected_writes = m.ops.rejected_writes.saturating_add(1);
                if let Some(class) = class {
                    let entry = metrics::class_entry(m, class);
                    entry.rejected_writes = entry.rejected_writes.saturating_add(1);
                }
            }

            MetricsEvent::SemanticMiss { class, write } => {
                if write {
                    m.ops.semantic_write_misses = m.ops.semantic_write_misses.saturating_add(1);
                } else {
                    m.ops.semantic_read_misses = m.ops.semantic_read_misses.saturating_add(1);
                }
                if let Some(class) = class {
                    let entry = metrics::class_entry(m, class);
                    entry.semantic_misses = entry.semantic_misses.saturating_add(1);
                }
            }

            MetricsEvent::ImplicitView { class } => {
                m.ops.implicit_views = m.ops.implicit_views.saturating_add(1);
                if let Some(class) = class {
                    let entry = metrics::class_entry(m, class);
                    entry.implicit_views = entry.implicit_views.saturating_add(1);
                }
            }
        });
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent<'_>) {
    GLOBAL_METRICS_SINK.record(event);
}

/// Snapshot the current metrics state.
#[must_use]
pub fn metrics_report() -> EventReport {
    metrics::report()
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}
