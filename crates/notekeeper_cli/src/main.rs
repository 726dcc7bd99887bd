//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `notekeeper_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    // The interactive menu lives outside this workspace; this probe only
    // validates core crate wiring.
    println!("notekeeper_core ping={}", notekeeper_core::ping());
    println!("notekeeper_core version={}", notekeeper_core::core_version());
}
