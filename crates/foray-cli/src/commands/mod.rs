//! CLI command implementations.

pub mod init;
pub mod play;
pub mod replay;

use foray_runtime::config::EngineConfig;

/// Engine config with a command-line seed applied.
pub fn engine_config(mut engine: EngineConfig, seed: Option<u64>) -> EngineConfig {
    if seed.is_some() {
        engine.seed = seed;
    }
    engine
}
