//! pl-core: stable foundation for the pipeline port-binding layer.
//!
//! Contains:
//! - ids (compact node ids, unique port ids)
//! - data (payload base type, reader/writer guard, value wrapper)
//! - error (port lookup error taxonomy shared by every node)

pub mod data;
pub mod error;
pub mod ids;

// Re-exports: nice ergonomics for downstream crates
pub use data::{Data, DataGuard, SharedData, Wrap, downcast_shared};
pub use error::{PlError, PlResult, PortKind};
pub use ids::*;
