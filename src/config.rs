use serde::{Deserialize, Serialize};

/// Per-environment engine configuration.
///
/// The deposit address is a single per-environment value; per-user address
/// allocation is an external collaborator and out of scope here.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    pub deposit_address: String,
    pub deposit_network: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            deposit_address: "TJYxNdv3T1QQHrWYPTQJYNqPJqGJLQxnVZ".into(),
            deposit_network: "TRC20".into(),
        }
    }
}
