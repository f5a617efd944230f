#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Wire format of derived rank profiles.
//!
//! A rank profile reaches the serving node as an ordered list of string
//! properties. This crate owns the key vocabulary, the compressed encoding
//! used to keep those lists resident, and [`RawRankProfile`], the immutable
//! per-profile output of a derivation.

pub mod codec;
mod error;
pub mod keys;
mod property;
mod raw_profile;


pub use codec::{compress, decompress};
pub use error::CodecError;
pub use property::{Property, render};
pub use raw_profile::RawRankProfile;
