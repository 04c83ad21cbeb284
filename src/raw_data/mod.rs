// src/raw_data/mod.rs
//! Raw sample decoding.
//!
//! - [`RawDataReader`] reads typed scalars/arrays from any `Read` stream
//!   with explicit endianness, used for property values and bulk decode.
//! - [`decode`] turns a byte window plus a [`crate::types::DataType`] into a
//!   [`crate::data::ChannelData`], including the interleaved strided gather.

pub mod decode;
mod reader;

pub use decode::{decode_chunk, decode_strided};
pub use reader::RawDataReader;
