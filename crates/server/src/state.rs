use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use index::Index;
use matcher::MatchConfig;

use crate::config::ServerConfig;
use crate::store::OrderStore;

/// Shared state handed to every axum handler.
pub struct ServerState {
    pub config: Arc<ServerConfig>,
    pub match_config: MatchConfig,
    pub index: Arc<Index>,
    pub store: Arc<OrderStore>,
    /// API key -> (requests seen this window, window start).
    rate_limiter: DashMap<String, (u32, Instant)>,
}

impl ServerState {
    pub fn new(config: ServerConfig, index: Index, store: OrderStore) -> Self {
        Self {
            config: Arc::new(config),
            match_config: MatchConfig::default(),
            index: Arc::new(index),
            store: Arc::new(store),
            rate_limiter: DashMap::new(),
        }
    }

    pub fn is_valid_api_key(&self, key: &str) -> bool {
        self.config.api_keys.iter().any(|k| k == key)
    }

    /// Sliding 60-second window, tracked per API key. Returns `false` once
    /// `config.rate_limit_per_minute` requests have been seen within the
    /// current window.
    pub fn check_rate_limit(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut entry = self.rate_limiter.entry(key.to_string()).or_insert((0, now));

        if now.duration_since(entry.1).as_secs() >= 60 {
            *entry = (0, now);
        }

        if entry.0 >= self.config.rate_limit_per_minute {
            return false;
        }
        entry.0 += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use index::BackendConfig;

    fn state() -> ServerState {
        ServerState::new(
            ServerConfig::default(),
            Index::open(&BackendConfig::in_memory()).unwrap(),
            OrderStore::new(),
        )
    }

    #[test]
    fn valid_and_invalid_api_keys_are_distinguished() {
        let state = state();
        assert!(state.is_valid_api_key("demo-api-key"));
        assert!(!state.is_valid_api_key("wrong-key"));
    }

    #[test]
    fn rate_limit_blocks_after_the_configured_threshold() {
        let mut config = ServerConfig::default();
        config.rate_limit_per_minute = 2;
        let state = ServerState::new(config, Index::open(&BackendConfig::in_memory()).unwrap(), OrderStore::new());

        assert!(state.check_rate_limit("k"));
        assert!(state.check_rate_limit("k"));
        assert!(!state.check_rate_limit("k"));
    }

    #[test]
    fn rate_limits_are_tracked_independently_per_key() {
        let mut config = ServerConfig::default();
        config.rate_limit_per_minute = 1;
        let state = ServerState::new(config, Index::open(&BackendConfig::in_memory()).unwrap(), OrderStore::new());

        assert!(state.check_rate_limit("a"));
        assert!(state.check_rate_limit("b"));
        assert!(!state.check_rate_limit("a"));
    }
}
