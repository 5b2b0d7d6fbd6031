//! # Helio Clearance Engine
//!
//! Deterministic, side-effect-free authorization decisions over the
//! organization hierarchy.
//!
//! ## Features
//!
//! - **Trust lattice** with clearance levels 0-10 and organizational-distance
//!   discounting (same corporation < same alliance < same coalition)
//! - **Scope registry** mapping named permissions to closed policy variants
//!   (absolute, distanced, clearance-edit)
//! - **Read-through decision cache** keyed on (subject, scope, target) with
//!   TTL expiration; strictly an optimization layer, never an authority
//! - **Injected organization graph** so the engine is unit-testable without
//!   a real store
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use helio_clearance::{ClearanceEngine, EngineConfig, InMemoryDirectory, ScopeRegistry};
//! use helio_core::{CharacterId, User};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let directory = Arc::new(InMemoryDirectory::new());
//!     let registry = Arc::new(ScopeRegistry::builtin());
//!     let engine = ClearanceEngine::new(EngineConfig::default(), directory, registry);
//!
//!     let admin = User::new(CharacterId(93000001), "Fleet Admin", 9, None);
//!     if engine.has_clearance(&admin, "helio.write_group", None).await? {
//!         println!("Access granted");
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod directory;
pub mod engine;
pub mod error;
pub mod policy;
pub mod registry;

// Re-export commonly used types
pub use cache::{CacheConfig, CacheStats, DecisionCache};
pub use directory::{InMemoryDirectory, OrgDirectory};
pub use engine::{ClearanceEngine, EngineConfig};
pub use error::{ClearanceError, Result};
pub use policy::Policy;
pub use registry::{scopes, ScopeRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
