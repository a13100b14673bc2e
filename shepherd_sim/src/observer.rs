//! Observer seam for the epoch loop.
//!
//! A [`FlockObserver`] sees every epoch as it begins, every feed a shepherd
//! builds and the responses that feed earns. Persisting a run is left to
//! observers; the engine itself keeps only counts and histories.

use shepherd_core::{Epoch, Feed, Responses};
use shepherd_env::{EpochId, SheepId, ShepherdId};
use std::cell::RefCell;
use std::rc::Rc;

/// Callbacks fired from [`crate::Flock::simulate_epoch`].
///
/// Every method defaults to doing nothing.
pub trait FlockObserver {
    /// A new epoch has been recorded, before any agent hears of it.
    fn epoch_begun(&mut self, _epoch: &Epoch) {}

    /// `shepherd` built `feed` for `sheep`.
    fn feed_built(&mut self, _shepherd: ShepherdId, _sheep: SheepId, _feed: &Feed) {}

    /// `sheep` rated `feed`; `responses` are aligned with its items.
    fn feed_rated(
        &mut self,
        _shepherd: ShepherdId,
        _sheep: SheepId,
        _feed: &Feed,
        _responses: &Responses,
    ) {
    }
}

/// Shared handle, so the caller can read an observer back after a run.
impl<O: FlockObserver + ?Sized> FlockObserver for Rc<RefCell<O>> {
    fn epoch_begun(&mut self, epoch: &Epoch) {
        self.borrow_mut().epoch_begun(epoch);
    }

    fn feed_built(&mut self, shepherd: ShepherdId, sheep: SheepId, feed: &Feed) {
        self.borrow_mut().feed_built(shepherd, sheep, feed);
    }

    fn feed_rated(
        &mut self,
        shepherd: ShepherdId,
        sheep: SheepId,
        feed: &Feed,
        responses: &Responses,
    ) {
        self.borrow_mut().feed_rated(shepherd, sheep, feed, responses);
    }
}

/// One rated feed.
#[derive(Debug, Clone, PartialEq)]
pub struct RatedFeed {
    pub epoch: Option<EpochId>,
    pub shepherd: ShepherdId,
    pub sheep: SheepId,
    pub feed: Feed,
    pub responses: Responses,
}

/// In-memory log of everything a flock did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedLog {
    epochs: Vec<EpochId>,
    built: usize,
    rated: Vec<RatedFeed>,
}

impl FeedLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Epochs seen, in order.
    pub fn epochs(&self) -> &[EpochId] {
        &self.epochs
    }

    /// Number of feeds built, rated or not.
    pub fn built(&self) -> usize {
        self.built
    }

    pub fn rated(&self) -> &[RatedFeed] {
        &self.rated
    }
}

impl FlockObserver for FeedLog {
    fn epoch_begun(&mut self, epoch: &Epoch) {
        self.epochs.push(epoch.id());
    }

    fn feed_built(&mut self, _shepherd: ShepherdId, _sheep: SheepId, _feed: &Feed) {
        self.built += 1;
    }

    fn feed_rated(
        &mut self,
        shepherd: ShepherdId,
        sheep: SheepId,
        feed: &Feed,
        responses: &Responses,
    ) {
        self.rated.push(RatedFeed {
            epoch: self.epochs.last().copied(),
            shepherd,
            sheep,
            feed: feed.clone(),
            responses: responses.clone(),
        });
    }
}
