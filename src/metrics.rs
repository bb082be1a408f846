use std::sync::{Arc, Mutex};

use prometheus_client::{encoding::text, registry::Registry};

pub mod remote_call;

#[derive(Clone, Debug)]
pub struct MetricsHandler {
    registry: Arc<Mutex<Registry>>,
}

impl MetricsHandler {
    pub fn new(registry: Arc<Mutex<Registry>>) -> Self {
        Self {
            registry,
        }
    }

    #[tracing::instrument(skip_all)]
    pub fn encode(&self) -> anyhow::Result<String> {
        let mut buffer = String::new();
        {
            tracing::debug!("encoding metrics");
            let registry = self.registry.lock().map_err(|_| anyhow::anyhow!("metrics registry mutex poisoned"))?;
            text::encode(&mut buffer, &registry)?;
        }

        Ok(buffer)
    }
}
