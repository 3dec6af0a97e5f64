use tracing::warn;

use crate::{
    config::PadRingConfig,
    descriptor::{Orientation, PadList, NB_SIDES},
};

/// IO position left free on a side of the pad ring
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnusedSlot {
    /// Side number (1 to 4)
    pub side: u8,
    /// Index of the free position on its side
    pub index: u32,
}

impl UnusedSlot {
    pub fn name(&self) -> String {
        format!("PAD_UNUSED_{}_{}", self.side, self.index)
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::from_side(self.side)
    }
}

/// Occupancy of the pad ring sides
#[derive(Clone, Debug, PartialEq)]
pub struct PadRing {
    pub used: [u32; NB_SIDES],
    pub unused: [u32; NB_SIDES],
}

impl PadRing {

    /// Count free positions from the number of pads placed on each side.
    /// Reserved positions (e.g. retention pad) are not available for fillers.
    pub fn from_counts(used: [u32; NB_SIDES], cfg: &PadRingConfig) -> PadRing {
        let mut unused = [0; NB_SIDES];
        for side in 0..NB_SIDES {
            let taken = used[side] + cfg.reserved[side];
            if taken > cfg.capacity {
                warn!(
                    "Side {} over capacity: {} pads and {} reserved for {} positions",
                    side + 1, used[side], cfg.reserved[side], cfg.capacity
                );
            }
            unused[side] = cfg.capacity.saturating_sub(taken);
        }
        PadRing { used, unused }
    }

    /// Every pad with an assigned side takes a position, power/ground included
    pub fn new(pads: &PadList, cfg: &PadRingConfig) -> PadRing {
        let mut used = [0; NB_SIDES];
        for side in pads.pads.iter().filter_map(|p| p.side) {
            used[(side - 1) as usize] += 1;
        }
        PadRing::from_counts(used, cfg)
    }

    /// Free positions, side by side, in a deterministic order
    pub fn unused_slots(&self) -> impl Iterator<Item=UnusedSlot> + '_ {
        self.unused.iter().enumerate().flat_map(|(s, &n)| {
            (0..n).map(move |index| UnusedSlot { side: s as u8 + 1, index })
        })
    }

    pub fn nb_unused(&self) -> u32 {
        self.unused.iter().sum()
    }
}
