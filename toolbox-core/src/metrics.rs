//! A minimal in-process counter registry for invocation outcomes.
//!
//! The core depends on telemetry exporters only through this narrow interface (§1);
//! wiring an OTLP or Prometheus exporter on top is left to the binary crate.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::ErrorCategory;

/// Counts successful and failed tool invocations, tagged by tool name and, for
/// failures, by §7 error category.
#[derive(Default)]
pub struct InvocationCounters {
    successes: RwLock<HashMap<String, u64>>,
    failures: RwLock<HashMap<(String, &'static str), u64>>,
}

impl InvocationCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, tool_name: &str) {
        let mut successes = self.successes.write().expect("counters lock poisoned");
        *successes.entry(tool_name.to_string()).or_insert(0) += 1;
    }

    pub fn record_failure(&self, tool_name: &str, category: ErrorCategory) {
        let mut failures = self.failures.write().expect("counters lock poisoned");
        *failures
            .entry((tool_name.to_string(), category.as_str()))
            .or_insert(0) += 1;
    }

    pub fn success_count(&self, tool_name: &str) -> u64 {
        self.successes
            .read()
            .expect("counters lock poisoned")
            .get(tool_name)
            .copied()
            .unwrap_or(0)
    }

    pub fn failure_count(&self, tool_name: &str, category: ErrorCategory) -> u64 {
        self.failures
            .read()
            .expect("counters lock poisoned")
            .get(&(tool_name.to_string(), category.as_str()))
            .copied()
            .unwrap_or(0)
    }

    /// Snapshot every counter as `(tool_name, category_or_"success", count)` tuples,
    /// for the optional debug endpoint.
    pub fn snapshot(&self) -> Vec<(String, String, u64)> {
        let mut out = Vec::new();
        for (tool, count) in self.successes.read().expect("counters lock poisoned").iter() {
            out.push((tool.clone(), "success".to_string(), *count));
        }
        for ((tool, category), count) in self.failures.read().expect("counters lock poisoned").iter() {
            out.push((tool.clone(), category.to_string(), *count));
        }
        out
    }
}
