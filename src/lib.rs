// src/lib.rs
//! # tdms-reader
//!
//! A reader for TDMS (Technical Data Management Streaming), the binary
//! format National Instruments LabVIEW and DAQmx tools use for
//! instrumentation and measurement data.
//!
//! A TDMS file is a concatenation of self-describing segments, each with an
//! object hierarchy (root, groups, channels), properties, and an optional
//! raw-data block. Channels can be written across many segments with
//! evolving contiguous or interleaved layouts, and carry optional
//! linear/polynomial/table/RTD/thermistor/thermocouple scaling metadata.
//!
//! This crate builds an index over every segment mapping each channel's
//! sample ranges to precise byte extents, then serves data either eagerly
//! ([`read`]/[`read_path`], materializing every channel up front) or lazily
//! ([`open`]/[`open_path`], decoding only the window that's asked for).
//!
//! ## Reading a whole file
//!
//! ```rust,no_run
//! use tdms_reader::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let file = tdms_reader::read_path("input.tdms")?;
//!     for group in file.groups() {
//!         for channel in group.channels() {
//!             println!("{}/{}: {} samples", group.name(), channel.name(), channel.len());
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Lazy, windowed reads
//!
//! ```rust,no_run
//! use tdms_reader::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let file = tdms_reader::open_path("input.tdms", None)?;
//!     let channel = file.group("Group1")?.channel("Voltage")?;
//!     let window = channel.read_data(100, 50, true)?;
//!     println!("read {} samples", window.len());
//!     file.close();
//!     Ok(())
//! }
//! ```

pub mod byte_source;
pub mod data;
pub mod error;
pub mod index;
pub mod metadata;
pub mod model;
pub mod raw_data;
pub mod reader;
pub mod scaling;
pub mod segment;
pub mod types;

pub use byte_source::ByteSource;
pub use data::ChannelData;
pub use error::{Result, TdmsError};
pub use metadata::ObjectPath;
pub use model::{open, open_path, read, read_path, Channel, File, Group};
pub use types::{DataType, Property, PropertyValue, Timestamp, TocFlags};

/// Convenient glob import for common use cases.
///
/// ```rust
/// use tdms_reader::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Result, TdmsError};
    pub use crate::model::{open, open_path, read, read_path, Channel, File, Group};
    pub use crate::types::{DataType, PropertyValue, Timestamp};
    pub use crate::ChannelData;
}

/// The TDMS specification version this reader targets.
pub const TDMS_VERSION: u32 = 4713;

/// This crate's own version.
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");
