//! `bureau-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the workflow and
//! session crates (no network or storage concerns).

pub mod error;
pub mod id;
pub mod role;

pub use error::{DomainError, DomainResult};
pub use id::{
    AgentId, ClientId, EntrepriseId, GerantId, MutationId, PendingChangeId, ServiceId,
};
pub use role::Role;
