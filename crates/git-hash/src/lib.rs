//! Hash computation and object identity for the PureGit engine.
//!
//! This crate provides the core `ObjectId` type (a raw 20-byte SHA-1
//! digest), hex encoding/decoding, and OID collections used throughout
//! the object database, pack format, and reference store.

mod error;
pub mod hex;
mod oid;
pub mod hasher;
pub mod collections;
pub mod fanout;

pub use error::HashError;
pub use oid::ObjectId;

/// Length of a raw SHA-1 digest, in bytes.
pub const OID_LEN: usize = 20;
/// Length of a SHA-1 digest in hex, in bytes.
pub const OID_HEX_LEN: usize = OID_LEN * 2;
