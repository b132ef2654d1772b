//! Bit-level and batching utilities shared by the proof algorithms.

pub mod bits;
pub mod parallel;

pub use bits::{bit_count32, encode_count, round_up_pow2, BitField};
pub use parallel::{parallelism_enabled, set_parallelism, ParallelismGuard};
