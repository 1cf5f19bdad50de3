//! Dealer module - random hand generation
//!
//! Templates are drawn uniformly with replacement from the catalog, so the same
//! template may show up more than once in a hand. Each dealt shape gets a fresh
//! [`InstanceId`].
//!
//! Randomness is always injected: pass a seeded `SmallRng` for reproducible
//! games, or any other [`rand::Rng`].

use std::fmt;

use arrayvec::ArrayVec;
use rand::Rng;

use crate::shapes::{catalog, ShapeInstance};
use crate::types::HAND_SIZE;

/// Shapes currently available to the player
pub type Hand = ArrayVec<ShapeInstance, HAND_SIZE>;

/// Unique identifier of a dealt shape instance
///
/// Minted as 128 random bits in the canonical UUID v4 text layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(String);

impl InstanceId {
    /// Wrap an id received from a client
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh random id
    pub fn mint<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut bytes: [u8; 16] = rng.gen();
        // version 4, RFC 4122 variant
        bytes[6] = (bytes[6] & 0x0f) | 0x40;
        bytes[8] = (bytes[8] & 0x3f) | 0x80;

        let mut s = String::with_capacity(36);
        for (i, b) in bytes.iter().enumerate() {
            if matches!(i, 4 | 6 | 8 | 10) {
                s.push('-');
            }
            s.push_str(&format!("{b:02x}"));
        }
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Deal `count` shapes
///
/// Instance ids within the dealt batch are pairwise distinct.
pub fn deal<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<ShapeInstance> {
    let templates = catalog();
    let mut shapes: Vec<ShapeInstance> = Vec::with_capacity(count);

    while shapes.len() < count {
        let template = &templates[rng.gen_range(0..templates.len())];
        let mut id = InstanceId::mint(rng);
        while shapes.iter().any(|s| s.instance_id == id) {
            id = InstanceId::mint(rng);
        }
        shapes.push(template.instantiate(id));
    }

    shapes
}

/// Deal a full hand of [`HAND_SIZE`] shapes
pub fn deal_hand<R: Rng + ?Sized>(rng: &mut R) -> Hand {
    deal(rng, HAND_SIZE).into_iter().collect()
}
