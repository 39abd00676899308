//! ZeroPass client core
//!
//! Client-side data layer for the ZeroPass firewall simulator: an anonymous
//! per-client identity, an identity-partitioned cache, ownership filtering of
//! everything the shared backend returns, and a gateway that ties them to
//! the backend's REST API.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod ownership;
pub mod recovery;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use cache::{CacheConfig, CacheStatistics, CacheStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{LogFormat, LoggingConfig, ZeroPassConfig};
pub use error::{ResultExt, UnifiedError, ZeroPassError, ZeroPassResult};
pub use gateway::{ApiGateway, ProbeReport, RuleSetPoller};
pub use identity::{Identity, IdentityProvider, Session};
pub use recovery::{RecoveryReport, RecoveryService};
pub use storage::{FileStore, KeyValueStore, MemoryStore, UnavailableStore};
pub use types::*;
