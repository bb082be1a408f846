use prometheus_client::{
    encoding::{EncodeLabelSet, EncodeLabelValue, LabelValueEncoder},
    metrics::{counter::Counter, family::Family},
    registry::Registry,
};
use strum::Display as StrumDisplay;

use crate::resilience::ErrorKind;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct AttemptLabels {
    pub outcome: Outcome,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, StrumDisplay)]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
    Success,
    Transient,
    Permanent,
    RateLimited,
}

impl From<ErrorKind> for Outcome {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Transient => Self::Transient,
            ErrorKind::Permanent => Self::Permanent,
            ErrorKind::RateLimited => Self::RateLimited,
        }
    }
}

impl EncodeLabelValue for Outcome {
    fn encode(&self, encoder: &mut LabelValueEncoder) -> Result<(), std::fmt::Error> {
        self.to_string().encode(encoder)
    }
}

/// Counters for calls made against the chat completion API.
#[derive(Clone, Debug, Default)]
pub struct RemoteCallMetrics {
    attempts: Family<AttemptLabels, Counter>,
    failed_calls: Counter,
}

impl RemoteCallMetrics {
    pub fn register(registry: &mut Registry) -> Self {
        let metrics = Self::default();
        registry.register(
            "cybershield_remote_attempts",
            "Attempts made against the chat completion API by outcome",
            metrics.attempts.clone(),
        );
        registry.register(
            "cybershield_remote_calls_failed",
            "Chat completion calls that failed after all attempts",
            metrics.failed_calls.clone(),
        );

        metrics
    }

    pub fn record_attempt(&self, outcome: Outcome) {
        self.attempts.get_or_create(&AttemptLabels { outcome }).inc();
    }

    pub fn record_failed_call(&self) {
        self.failed_calls.inc();
    }

    pub fn attempts(&self, outcome: Outcome) -> u64 {
        self.attempts.get_or_create(&AttemptLabels { outcome }).get()
    }

    pub fn failed_calls(&self) -> u64 {
        self.failed_calls.get()
    }
}
