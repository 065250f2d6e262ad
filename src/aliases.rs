// src/aliases.rs
//! Re-exports secure-gate's ergonomic secret types
//!
//! These are the canonical secret containers used throughout vaulted-core.

pub use secure_gate::fixed_alias;

// Fixed-size secrets
fixed_alias!(MasterKey32, 32); // 256-bit AES-GCM master key
