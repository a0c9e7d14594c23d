//! Common utilities for Tyria.
//!
//! This crate provides foundational types and utilities used across all Tyria crates:
//!
//! - [`BinaryReader`] - Zero-copy binary reading from byte slices
//! - [`Half`] - 16-bit half-precision floats used by binary asset decoders
//! - [`crc`] - CRC32C hashing utilities
//! - [`CancelFlag`] - Cooperative cancellation shared between threads

mod cancel;
mod error;
mod reader;

pub mod crc;
pub mod half;

pub use cancel::CancelFlag;
pub use error::{Error, Result};
pub use half::Half;
pub use reader::BinaryReader;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
