// src/config/mod.rs
//! Configuration for a vault instance
//!
//! Explicit values passed to `Vault::open`: TOML file plus env overrides, no
//! global state.

pub use app::{VaultConfig, ENV_KEY_PATH, ENV_UPGRADE_LEGACY_KEY_FILE, ENV_USE_CREDENTIAL_STORE};

mod app;
mod defaults;
