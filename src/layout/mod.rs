pub mod address;
pub mod pad_ring;

pub use {address::*, pad_ring::*};
