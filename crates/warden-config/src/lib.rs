//! Configuration layer: the raw file/CLI-merged shape, validation into
//! an immutable per-run value object, and the TOML-backed store that
//! persists the `since` watermark between runs.

pub mod settings;
pub mod store;

pub use settings::{BotConfig, CommandKind, ConfigError, RunConfig, DEFAULT_GRACE_PERIOD_DAYS};
pub use store::{load, persist_watermark, save_watermark};
