// src/segment/descriptor.rs
use crate::metadata::ObjectPath;
use crate::reader::daqmx::DaqMxMetadata;
use crate::types::{DataType, Property, TocFlags};

/// A channel or group/root object's raw-data declaration within one segment,
/// as it appears on the wire (before `ObjectTable` resolves "matches
/// previous" references).
#[derive(Debug, Clone)]
pub struct Layout {
    pub data_type: DataType,
    pub num_values: u64,
    pub total_bytes: u64,
    pub is_daqmx: bool,
}

#[derive(Debug, Clone)]
pub enum RawIndex {
    /// Raw-data index header `0xFFFFFFFF`: no raw data for this object here.
    None,
    /// Raw-data index header `0x00000000`: reuse the previous layout.
    MatchesPrevious,
    /// `0x00001269` / `0x0000126A`: DAQmx raw data. Parsed enough to compute
    /// byte widths for chunk math; not decoded into scaled values.
    DaqMx(DaqMxMetadata, DataType),
    /// A full layout block followed this header.
    Fresh(Layout),
}

/// One object entry inside a segment's metadata block.
#[derive(Debug, Clone)]
pub struct ObjectEntry {
    pub path: ObjectPath,
    pub raw_index: RawIndex,
    pub properties: Vec<Property>,
}

/// The parsed lead-in and metadata block of one segment. Immutable once
/// built; `Index` construction consumes a stream of these in file order.
#[derive(Debug, Clone)]
pub struct SegmentDescriptor {
    pub index: usize,
    pub offset: u64,
    pub toc: TocFlags,
    pub version: u32,
    /// Raw `next_segment_offset` lead-in field, relative to end-of-lead-in.
    /// May equal `SegmentHeader::INCOMPLETE_MARKER`.
    pub next_segment_offset_field: u64,
    /// Raw `raw_data_offset` lead-in field == metadata block size in bytes.
    pub metadata_size: u64,
    /// Size in bytes of the raw-data block following the metadata, resolved
    /// for unfinished (EOF-truncated) segments.
    pub raw_byte_length: u64,
    pub objects: Vec<ObjectEntry>,
}

impl SegmentDescriptor {
    pub fn lead_in_end(&self) -> u64 {
        self.offset + crate::segment::header::SegmentHeader::LEAD_IN_SIZE as u64
    }

    pub fn raw_data_start(&self) -> u64 {
        self.lead_in_end() + self.metadata_size
    }

    pub fn is_unfinished(&self) -> bool {
        self.next_segment_offset_field
            == crate::segment::header::SegmentHeader::INCOMPLETE_MARKER
    }
}
