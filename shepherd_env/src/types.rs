//! Common types for the Flock environment abstraction.

use crate::error::EnvError;
use rand::distributions::uniform::SampleUniform;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Declares an opaque identifier backed by a UUID.
///
/// Identifiers carry no structure beyond equality, ordering and hashing.
/// They are minted from an injected random source so that a seeded run
/// produces the same identifiers every time.
macro_rules! flock_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Mints a new identifier from the given random source.
            pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
                Self(uuid::Builder::from_random_bytes(rng.gen()).into_uuid())
            }

            /// Creates an identifier from a UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Creates a deterministic identifier from a seed (for tests and fixtures).
            pub fn from_seed(seed: u64) -> Self {
                let mut bytes = [0u8; 16];
                bytes[0..8].copy_from_slice(&seed.to_le_bytes());
                bytes[8..16].copy_from_slice(&seed.wrapping_mul(0x517cc1b727220a95).to_le_bytes());
                Self(Uuid::from_bytes(bytes))
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                // First 8 chars are enough to tell nodes apart in logs
                write!(f, "{}", &self.0.to_string()[..8])
            }
        }

        impl FromStr for $name {
            type Err = EnvError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|_| EnvError::invalid_identifier(s))
            }
        }
    };
}

flock_id! {
    /// A topic label, also a node in the relevance graph.
    TagId
}

flock_id! {
    /// A consumer ("sheep").
    SheepId
}

flock_id! {
    /// A content distributor ("shepherd").
    ShepherdId
}

flock_id! {
    /// A unit of content, also a node in the relevance graph.
    ItemId
}

flock_id! {
    /// One discrete simulation tick.
    EpochId
}

/// An inclusive numeric range `lower..=upper`.
///
/// Both ends are required. Only `new` checks `lower <= upper`: `ordered`
/// keeps a NaN endpoint and deserialization accepts any pair, and sampling
/// such bounds panics. Check [`Bounds::is_valid`] before sampling bounds
/// that did not come from `new`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds<T> {
    lower: T,
    upper: T,
}

impl<T> Bounds<T>
where
    T: PartialOrd + Copy + fmt::Debug,
{
    /// Creates new bounds, rejecting `lower > upper`.
    pub fn new(lower: T, upper: T) -> Result<Self, EnvError> {
        // Written as a negation so NaN endpoints are rejected too
        if !(lower <= upper) {
            return Err(EnvError::invalid_bounds(lower, upper));
        }
        Ok(Self { lower, upper })
    }

    /// Creates bounds from two endpoints given in either order.
    pub fn ordered(a: T, b: T) -> Self {
        if b < a {
            Self { lower: b, upper: a }
        } else {
            Self { lower: a, upper: b }
        }
    }

    /// Bounds containing exactly one value.
    pub fn exactly(value: T) -> Self {
        Self {
            lower: value,
            upper: value,
        }
    }

    /// Returns the lower end.
    pub fn lower(&self) -> T {
        self.lower
    }

    /// Returns the upper end.
    pub fn upper(&self) -> T {
        self.upper
    }

    /// Returns true if `value` lies within the bounds (ends included).
    pub fn contains(&self, value: T) -> bool {
        self.lower <= value && value <= self.upper
    }

    /// Re-checks the ordering invariant.
    ///
    /// Deserialized bounds bypass `new`, so configuration layers call this.
    pub fn is_valid(&self) -> bool {
        self.lower <= self.upper
    }
}

impl<T> Bounds<T>
where
    T: SampleUniform + PartialOrd + Copy,
{
    /// Draws a value uniformly from the bounds.
    ///
    /// # Panics
    ///
    /// Panics if the bounds are not [valid](Bounds::is_valid).
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        rng.gen_range(self.lower..=self.upper)
    }
}
