//! Flock Environment Abstraction Layer
//!
//! This crate holds the pieces every other Flock crate builds on:
//! - Opaque identifiers (`TagId`, `SheepId`, `ShepherdId`, `ItemId`, `EpochId`)
//! - Inclusive `Bounds` used by every configuration surface
//! - The `FlockContext` trait through which all randomness flows
//!
//! By routing every draw through an injected context, any run becomes
//! reproducible from its seed.
//!
//! # Example
//!
//! ```ignore
//! use shepherd_env::{Bounds, FlockContext, TagId};
//!
//! fn mint_tags<C: FlockContext>(ctx: &mut C, bounds: Bounds<usize>) -> Vec<TagId> {
//!     let n = bounds.sample(ctx.growth_rng());
//!     (0..n).map(|_| TagId::generate(ctx.growth_rng())).collect()
//! }
//! ```

mod context;
mod types;
mod error;
mod entropy_impl;

pub use context::FlockContext;
pub use types::{Bounds, EpochId, ItemId, SheepId, ShepherdId, TagId};
pub use error::EnvError;
pub use entropy_impl::EntropyContext;
