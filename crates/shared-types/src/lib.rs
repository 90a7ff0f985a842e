//! # Shared Types Crate
//!
//! Leaf crate of the federated consensus core. Everything that crosses a
//! crate boundary at the byte level is defined here.
//!
//! ## Contents
//!
//! - **Entities**: `Hash`, `ChainId`, `Timestamp` and the raw key/signature
//!   aliases.
//! - **Codec**: `ByteWriter` / `ByteReader`, the big-endian primitives that
//!   every message layout is composed from. Readers never panic; a short or
//!   malformed buffer always surfaces as a `DecodeError`.
//! - **Errors**: `DecodeError` and the node-wide `NodeState`.

pub mod codec;
pub mod entities;
pub mod errors;

pub use codec::{ByteReader, ByteWriter};
pub use entities::*;
pub use errors::*;
