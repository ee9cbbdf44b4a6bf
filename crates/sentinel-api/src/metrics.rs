//! Prometheus counters for the API surface.
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

pub struct ApiMetrics {
    registry: Registry,
    pub asks_total: IntCounter,
    pub searches_total: IntCounter,
    pub ingests_total: IntCounter,
    pub tool_calls_total: IntCounter,
    pub human_reviews_total: IntCounter,
}

impl ApiMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let asks_total = IntCounter::new("sentinel_asks_total", "Questions processed")?;
        let searches_total = IntCounter::new("sentinel_searches_total", "Direct searches served")?;
        let ingests_total = IntCounter::new("sentinel_ingests_total", "Ingestion requests")?;
        let tool_calls_total = IntCounter::new("sentinel_tool_calls_total", "Direct tool calls")?;
        let human_reviews_total = IntCounter::new(
            "sentinel_human_reviews_total",
            "Runs halted for human review",
        )?;
        registry.register(Box::new(asks_total.clone()))?;
        registry.register(Box::new(searches_total.clone()))?;
        registry.register(Box::new(ingests_total.clone()))?;
        registry.register(Box::new(tool_calls_total.clone()))?;
        registry.register(Box::new(human_reviews_total.clone()))?;
        Ok(Self {
            registry,
            asks_total,
            searches_total,
            ingests_total,
            tool_calls_total,
            human_reviews_total,
        })
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}
