//! Flock Simulation Engine
//!
//! This crate runs the flock: shepherds building feeds for sheep over a
//! relevance graph that grows every epoch.
//!
//! # Core Principle: One Seed, One Run
//!
//! Every draw goes through a [`SeededContext`], which splits a single 64-bit
//! seed into independent streams:
//! - **Growth**: tags, items, group sizes, edge weights
//! - **Feed**: shepherd item selection
//! - **Reaction**: sheep coin-flips
//!
//! # Usage
//!
//! ```ignore
//! use shepherd_sim::{Flock, SeededContext, Settings};
//! use shepherd_core::{DummyShepherd, GraphSheep};
//! use shepherd_env::ShepherdId;
//!
//! let shepherd = DummyShepherd::new(ShepherdId::from_seed(1));
//! let mut flock: Flock<_, GraphSheep, _> =
//!     Flock::new(Settings::default(), [shepherd], SeededContext::new(42))?;
//! flock.simulate(20);
//! ```
//!
//! Attach a [`FlockObserver`] (for example a shared [`FeedLog`]) to see
//! every feed and its responses as the epochs run.

mod config;
mod context;
mod flock;
mod observer;
pub mod registry;
mod runner;

pub use config::Settings;
pub use context::SeededContext;
pub use flock::{Flock, FlockParts, FlockStats, Pasture};
pub use observer::{FeedLog, FlockObserver, RatedFeed};
pub use registry::ShepherdKind;
pub use runner::{FlockRunner, RunSummary, ShepherdSummary};
