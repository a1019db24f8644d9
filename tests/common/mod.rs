#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use medical_sources::Config;
use medical_sources::utils::{RetryConfig, Sleeper};

/// Config pointing every JSON/XML source at `base`, with fast retries
pub fn config_for(base: &str) -> Config {
    let mut config = Config::default();
    config.endpoints.openfda = base.to_string();
    config.endpoints.pubmed = base.to_string();
    config.endpoints.who = base.to_string();
    config.endpoints.rxnav = base.to_string();
    config.retry = RetryConfig {
        max_retries: 3,
        base_delay_ms: 10,
    };
    config
}

/// Sleeper that records requested durations and returns immediately
#[derive(Default)]
pub struct RecordingSleeper {
    calls: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn recorded(&self) -> Vec<Duration> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.calls.lock().unwrap().push(duration);
    }
}
