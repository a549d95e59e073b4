//! Repokey - keep shared GitHub Actions secrets in sync across repositories.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── list          # Presence listing per repository
//! │   ├── sync          # Fan-out sync (apply / dry-run)
//! │   ├── completions   # Shell completions
//! │   └── output        # Terminal output helpers
//! ├── config            # repokey.toml loading and validation
//! └── core/             # Core library components
//!     ├── plan          # Deterministic (secret, repository) work items
//!     ├── source        # Credential source (macOS Keychain)
//!     ├── prompt        # Interactive fallback for missing values
//!     ├── sink          # Remote sink (GitHub Actions secrets via gh)
//!     ├── executor      # Resolve-once, fan-out execution
//!     └── report        # Per-item outcomes and exit policy
//! ```
//!
//! # Features
//!
//! - One declarative config for many repositories
//! - Secret values resolved once per run, straight from the Keychain
//! - Interactive fallback when the Keychain has no value
//! - Diffable dry-run preview, complete per-item reporting
//! - Values live only in memory and are zeroized on drop

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
