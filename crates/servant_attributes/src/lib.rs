//! # Servant Attributes
//!
//! Moves gameplay stats of live host entities onto an external, pluggable
//! attribute backend.
//!
//! ## Design Principles
//!
//! 1. **Optional backend** - the backend may be missing or failing at any
//!    time; reads degrade to `0.0` and writes to a no-op, never a crash
//! 2. **No local cache** - every read and write goes to the backend
//! 3. **External configuration** - the key mapping lives in `stats.toml`
//! 4. **Injected collaborators** - the backend client is passed in, so a
//!    test double can stand in for the real plugin
//!
//! ## Example
//!
//! ```rust
//! use servant_attributes::{
//!     AttributeMapping, AttributePlusProvider, AttributeProvider, MockAttributeBackend,
//! };
//! use servant_core::EntityId;
//!
//! let backend = MockAttributeBackend::new();
//! let entity = EntityId::new(7);
//! backend.register_entity(entity);
//!
//! let mut mapping = AttributeMapping::new("attributeplus");
//! mapping.insert("max_health", "生命力");
//!
//! let provider = AttributePlusProvider::with_mapping(backend, mapping);
//! provider.set_value(entity, "max_health", 40.0);
//! assert_eq!(provider.get_value(entity, "max_health"), 40.0);
//! assert_eq!(provider.get_value(entity, "unmapped"), 0.0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod attribute_plus;
pub mod backend;
pub mod config;
pub mod error;
pub mod mapping;
pub mod provider;
pub mod registry;

pub use attribute_plus::{
    AttributePlusProvider, BridgeConfig, ExpiryPolicy, ModifierExpiry, ATTRIBUTE_PLUS,
};
pub use backend::{
    AttributeBackend, BackendError, BackendState, MockAttributeBackend, MockBackendState,
    SourceOperation, StaticSource,
};
pub use config::{StatEntry, StatsConfig, DEFAULT_STATS_TOML};
pub use error::{AttributeError, AttributeResult};
pub use mapping::AttributeMapping;
pub use provider::AttributeProvider;
pub use registry::ProviderRegistry;
