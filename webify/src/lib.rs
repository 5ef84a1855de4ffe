//! Webify core library.
//!
//! Role policy, content engagement, the social graph, messaging, reviews and
//! admin rollups over a pluggable document store. Every operation takes the
//! acting user's id explicitly and returns a [`WebifyResult`].

pub mod client;
pub mod config;
pub mod errors;
pub mod id;
pub mod keys;
pub mod models;
pub mod policy;
pub mod services;
pub mod stats;
pub mod store;
pub mod validators;

pub use client::Webify;
pub use config::WebifyConfig;
pub use errors::*;
pub use models::*;
pub use policy::{Action, Role, can_perform, ensure, ensure_owner_or};
pub use services::*;
pub use stats::{Counter, StatsUpdater};
pub use store::{
    Collection, DocumentStore, Entity, LinkedCounter, MemoryStore, Membership, MembershipOp, RedisStore, Roster,
    RosterChange, RosterOutcome,
};
