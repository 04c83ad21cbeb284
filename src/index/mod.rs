// src/index/mod.rs
//! Walks a TDMS file's segments into random-access position: which byte
//! ranges belong to which channel, in which chunks, at which offset.
//!
//! [`Index::discover_from_data_file`] / [`Index::discover_from_index_file`]
//! parse segment lead-ins and metadata in file order; [`Index::build`]
//! resolves the object-list inheritance rule (a non-`NewObjList` segment
//! carries forward the previous segment's channel list minus anything this
//! segment explicitly marks absent) into one flat [`ChannelIndexEntry`] per
//! channel, plus enough per-segment chunk geometry to seek straight to any
//! sample range without re-reading metadata.

mod object_table;

pub use object_table::{ObjectState, ObjectTable};

use crate::byte_source::ByteSource;
use crate::data::ChannelData;
use crate::error::{Result, TdmsError};
use crate::metadata::ObjectPath;
use crate::raw_data::{decode_chunk, decode_strided};
use crate::scaling::Scaling;
use crate::segment::{parse_metadata_block, parse_segment, Layout, RawIndex, SegmentDescriptor, SegmentHeader};
use crate::types::DataType;
use byteorder::{LittleEndian, ReadBytesExt};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::io::{Read, Seek, SeekFrom};

/// One chunk-bearing segment's raw-data geometry.
#[derive(Debug, Clone)]
pub struct Segment {
    pub file_offset_of_raw: u64,
    pub raw_byte_length: u64,
    pub interleaved: bool,
    pub big_endian: bool,
    pub chunk_size_bytes: u64,
    pub num_full_chunks: u64,
    pub partial_chunk: Option<PartialChunk>,
    pub channels: Vec<ChannelInSegment>,
}

/// The truncated trailing chunk of an unfinished segment, admitted rather
/// than rejected: each channel gets however many complete samples its share
/// of the leftover bytes can form.
#[derive(Debug, Clone)]
pub struct PartialChunk {
    pub byte_length: u64,
    pub per_channel_samples: IndexMap<String, u64>,
}

#[derive(Debug, Clone)]
pub struct ChannelInSegment {
    pub path: String,
    pub dtype: DataType,
    pub samples_per_chunk: u64,
    pub byte_offset_within_chunk: u64,
    pub bytes_per_sample: u64,
    /// Bytes this channel occupies in one full chunk. For fixed-width
    /// channels this equals `samples_per_chunk * bytes_per_sample`; for
    /// strings it also covers the offset table, so it is carried separately
    /// rather than derived.
    pub total_bytes_per_chunk: u64,
    pub is_string: bool,
    pub is_daqmx: bool,
}

/// One channel's position within one segment, as a prefix sum over samples
/// so a global sample index can binary-search straight to its segment.
#[derive(Debug, Clone)]
pub struct SegmentRef {
    pub segment_index: usize,
    pub cumulative_before: u64,
    pub samples_in_segment: u64,
}

#[derive(Debug, Clone)]
pub struct ChannelIndexEntry {
    pub group: String,
    pub name: String,
    pub dtype: DataType,
    pub is_string: bool,
    pub is_daqmx: bool,
    pub segments: Vec<SegmentRef>,
    pub total_samples: u64,
    pub scaling: Scaling,
    pub scaled_by_default: bool,
}

#[derive(Debug)]
pub struct Index {
    pub segments: Vec<Segment>,
    pub channels: IndexMap<String, ChannelIndexEntry>,
    pub object_table: ObjectTable,
    pub group_order: Vec<String>,
    pub channel_order: IndexMap<String, Vec<String>>,
}

impl Index {
    pub fn channel(&self, group: &str, channel: &str) -> Option<&ChannelIndexEntry> {
        self.channels.get(&ObjectPath::channel(group, channel).to_string())
    }

    pub fn groups(&self) -> &[String] {
        &self.group_order
    }

    pub fn channels_in_group(&self, group: &str) -> &[String] {
        self.channel_order.get(group).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn properties(&self, path: &str) -> IndexMap<String, crate::types::PropertyValue> {
        self.object_table.properties(path)
    }

    /// Walks a data file's segments from byte 0 to EOF.
    pub fn discover_from_data_file(source: &mut ByteSource) -> Result<Self> {
        let file_len = source.len()?;
        let mut descriptors = Vec::new();
        let mut offset = 0u64;
        let mut segment_index = 0usize;
        while offset < file_len {
            let descriptor = parse_segment(source, offset, file_len, segment_index)?;
            let raw_offset = descriptor.raw_data_start();
            offset = if descriptor.is_unfinished() {
                file_len
            } else {
                descriptor.lead_in_end() + descriptor.metadata_size + descriptor.raw_byte_length
            };
            descriptors.push((descriptor, raw_offset));
            segment_index += 1;
        }
        Self::build(descriptors)
    }

    /// Walks a `.tdms_index` file's segments. The index file's lead-in
    /// fields (`next_segment_offset`, `metadata_size`) are copies of the
    /// real data file's values even though the index file itself carries no
    /// raw-data bytes, so the real file's raw-data offsets are simulated
    /// with a running accumulator rather than read from this stream.
    pub fn discover_from_index_file(source: &mut ByteSource) -> Result<Self> {
        let file_len = source.len()?;
        let mut descriptors = Vec::new();
        let mut index_offset = 0u64;
        let mut simulated_main_offset = 0u64;
        let mut segment_index = 0usize;
        while index_offset < file_len {
            let (descriptor, bytes_in_index_file, real_next_main_offset, raw_offset) =
                parse_index_only_segment(source, index_offset, simulated_main_offset, file_len, segment_index)?;
            index_offset += bytes_in_index_file;
            simulated_main_offset = real_next_main_offset;
            descriptors.push((descriptor, raw_offset));
            segment_index += 1;
        }
        Self::build(descriptors)
    }

    /// Resolves a stream of segment descriptors (each paired with the real
    /// data file's byte offset of its raw-data block) into the flat
    /// per-channel index.
    pub fn build(descriptors: Vec<(SegmentDescriptor, u64)>) -> Result<Self> {
        let mut object_table = ObjectTable::new();
        let mut segments: Vec<Segment> = Vec::new();
        let mut channels: IndexMap<String, ChannelIndexEntry> = IndexMap::new();
        let mut group_order: Vec<String> = Vec::new();
        let mut channel_order: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut active_channels: Vec<String> = Vec::new();

        for (descriptor, raw_offset) in descriptors {
            let mut declared_none: HashSet<String> = HashSet::new();
            let mut declared_present: Vec<String> = Vec::new();
            let mut fresh_layout: IndexMap<String, Layout> = IndexMap::new();

            for obj in &descriptor.objects {
                let path_str = obj.path.to_string();
                object_table.merge_properties(&path_str, &obj.properties);
                record_hierarchy(&obj.path, &mut group_order, &mut channel_order);

                match &obj.raw_index {
                    RawIndex::None => {
                        declared_none.insert(path_str);
                    }
                    RawIndex::MatchesPrevious => {
                        let layout = object_table.layout(&path_str).cloned().ok_or_else(|| {
                            TdmsError::malformed(
                                descriptor.index,
                                descriptor.offset,
                                format!("{path_str} reuses a previous layout it never had"),
                            )
                        })?;
                        fresh_layout.insert(path_str.clone(), layout);
                        declared_present.push(path_str);
                    }
                    RawIndex::Fresh(layout) => {
                        object_table.set_layout(&path_str, layout.clone());
                        fresh_layout.insert(path_str.clone(), layout.clone());
                        declared_present.push(path_str);
                    }
                    RawIndex::DaqMx(meta, dtype) => {
                        let layout = Layout {
                            data_type: *dtype,
                            num_values: meta.chunk_size,
                            total_bytes: meta.total_bytes(),
                            is_daqmx: true,
                        };
                        object_table.set_layout(&path_str, layout.clone());
                        fresh_layout.insert(path_str.clone(), layout);
                        declared_present.push(path_str);
                    }
                }
            }

            let channels_for_segment: Vec<String> = if descriptor.toc.has_new_obj_list() {
                declared_present.into_iter().filter(|p| is_channel_path(p)).collect()
            } else {
                let mut next: Vec<String> = active_channels
                    .iter()
                    .filter(|p| !declared_none.contains(p))
                    .cloned()
                    .collect();
                for p in declared_present {
                    if is_channel_path(&p) && !next.contains(&p) {
                        next.push(p);
                    }
                }
                next
            };
            active_channels = channels_for_segment.clone();

            if !descriptor.toc.has_raw_data() || channels_for_segment.is_empty() {
                continue;
            }

            let interleaved = descriptor.toc.is_interleaved();
            let big_endian = descriptor.toc.is_big_endian();

            let mut effective: Vec<(String, Layout)> = Vec::with_capacity(channels_for_segment.len());
            for path in &channels_for_segment {
                let layout = fresh_layout
                    .get(path)
                    .cloned()
                    .or_else(|| object_table.layout(path).cloned())
                    .ok_or_else(|| {
                        TdmsError::malformed(
                            descriptor.index,
                            descriptor.offset,
                            format!("{path} carries raw data with no resolvable layout"),
                        )
                    })?;
                effective.push((path.clone(), layout));
            }

            if interleaved && effective.iter().any(|(_, l)| l.data_type == DataType::String) {
                return Err(TdmsError::malformed(
                    descriptor.index,
                    descriptor.offset,
                    "interleaved raw data cannot mix in a string channel",
                ));
            }

            let chunk_size_bytes: u64 = effective.iter().map(|(_, l)| l.total_bytes).sum();
            if chunk_size_bytes == 0 {
                continue;
            }

            let num_full_chunks = descriptor.raw_byte_length / chunk_size_bytes;
            let remainder = descriptor.raw_byte_length % chunk_size_bytes;
            let partial_chunk = if remainder == 0 {
                None
            } else if !descriptor.is_unfinished() {
                return Err(TdmsError::malformed(
                    descriptor.index,
                    descriptor.offset,
                    format!(
                        "raw data length {} is not a multiple of chunk size {chunk_size_bytes}",
                        descriptor.raw_byte_length
                    ),
                ));
            } else {
                Some(compute_partial_chunk(&effective, interleaved, remainder))
            };

            let mut channel_in_segment = Vec::with_capacity(effective.len());
            let mut contiguous_offset = 0u64;
            let mut interleaved_offset = 0u64;
            for (path, layout) in &effective {
                let is_string = layout.data_type == DataType::String;
                let bytes_per_sample = if is_string || layout.is_daqmx {
                    0
                } else {
                    layout.data_type.fixed_size().unwrap_or(0) as u64
                };
                let byte_offset_within_chunk = if interleaved {
                    let offset = interleaved_offset;
                    interleaved_offset += bytes_per_sample;
                    offset
                } else {
                    let offset = contiguous_offset;
                    contiguous_offset += layout.total_bytes;
                    offset
                };

                channel_in_segment.push(ChannelInSegment {
                    path: path.clone(),
                    dtype: layout.data_type,
                    samples_per_chunk: layout.num_values,
                    byte_offset_within_chunk,
                    bytes_per_sample,
                    total_bytes_per_chunk: layout.total_bytes,
                    is_string,
                    is_daqmx: layout.is_daqmx,
                });
            }

            let segment_index = segments.len();
            for cis in &channel_in_segment {
                let partial_samples = partial_chunk
                    .as_ref()
                    .and_then(|p| p.per_channel_samples.get(&cis.path).copied())
                    .unwrap_or(0);
                let samples_in_segment = cis.samples_per_chunk * num_full_chunks + partial_samples;

                let entry = channels.entry(cis.path.clone()).or_insert_with(|| {
                    let (group, name) = split_channel_path(&cis.path);
                    ChannelIndexEntry {
                        group,
                        name,
                        dtype: cis.dtype,
                        is_string: cis.is_string,
                        is_daqmx: cis.is_daqmx,
                        segments: Vec::new(),
                        total_samples: 0,
                        scaling: Scaling::default(),
                        scaled_by_default: false,
                    }
                });
                let cumulative_before = entry.total_samples;
                entry.segments.push(SegmentRef {
                    segment_index,
                    cumulative_before,
                    samples_in_segment,
                });
                entry.total_samples += samples_in_segment;
                entry.dtype = cis.dtype;
                entry.is_string = cis.is_string;
                entry.is_daqmx = cis.is_daqmx;
            }

            segments.push(Segment {
                file_offset_of_raw: raw_offset,
                raw_byte_length: descriptor.raw_byte_length,
                interleaved,
                big_endian,
                chunk_size_bytes,
                num_full_chunks,
                partial_chunk,
                channels: channel_in_segment,
            });
        }

        for entry in channels.values_mut() {
            let channel_path = ObjectPath::channel(entry.group.clone(), entry.name.clone()).to_string();
            let channel_props = object_table.properties(&channel_path);
            let group_props = object_table.properties(&ObjectPath::group(entry.group.clone()).to_string());

            let effective_props = if channel_props.contains_key("NI_Scale[0]_Scale_Type") {
                channel_props
            } else {
                group_props
            };
            entry.scaling = Scaling::from_properties(&effective_props)?;
            entry.scaled_by_default = !entry.scaling.is_empty() && Scaling::status_is_scaled(&effective_props);
        }

        Ok(Index {
            segments,
            channels,
            object_table,
            group_order,
            channel_order,
        })
    }
}

/// Decodes samples `[want_lo, want_hi)` of one channel's chunk, starting the
/// chunk at `chunk_byte_offset`. Shared by the eager reader (`want_lo == 0`,
/// `want_hi == ` full chunk) and the lazy reader's windowed reads.
///
/// String chunks are read in full and sliced in memory — the offset table
/// makes precise byte skipping impractical, matching the format's own
/// layout.
pub(crate) fn decode_window(
    source: &mut ByteSource,
    segment: &Segment,
    channel: &ChannelInSegment,
    chunk_byte_offset: u64,
    want_lo: u64,
    want_hi: u64,
) -> Result<ChannelData> {
    if channel.is_daqmx {
        return Err(TdmsError::UnsupportedFeature(format!(
            "reading DAQmx-scaled data for channel {}",
            channel.path
        )));
    }

    if channel.is_string {
        let start = chunk_byte_offset + channel.byte_offset_within_chunk;
        let mut buf = vec![0u8; channel.total_bytes_per_chunk as usize];
        source.read_exact_at(start, &mut buf)?;
        let full = decode_chunk(channel.dtype, &buf, channel.samples_per_chunk, segment.big_endian)?;
        Ok(full.slice_range(want_lo as usize, want_hi as usize))
    } else if segment.interleaved {
        let row_stride: u64 = segment.channels.iter().map(|c| c.bytes_per_sample).sum();
        let start = chunk_byte_offset + channel.byte_offset_within_chunk + want_lo * row_stride;
        let count = want_hi - want_lo;
        let mut buf = vec![0u8; (count * row_stride) as usize];
        source.read_exact_at(start, &mut buf)?;
        decode_strided(channel.dtype, &buf, 0, row_stride as usize, count, segment.big_endian)
    } else {
        let width = channel.bytes_per_sample;
        let start = chunk_byte_offset + channel.byte_offset_within_chunk + want_lo * width;
        let count = want_hi - want_lo;
        let mut buf = vec![0u8; (count * width) as usize];
        source.read_exact_at(start, &mut buf)?;
        decode_chunk(channel.dtype, &buf, count, segment.big_endian)
    }
}

fn is_channel_path(path: &str) -> bool {
    matches!(ObjectPath::from_string(path), Ok(ObjectPath::Channel { .. }))
}

fn split_channel_path(path: &str) -> (String, String) {
    match ObjectPath::from_string(path) {
        Ok(ObjectPath::Channel { group, channel }) => (group, channel),
        _ => (String::new(), String::new()),
    }
}

fn record_hierarchy(path: &ObjectPath, group_order: &mut Vec<String>, channel_order: &mut IndexMap<String, Vec<String>>) {
    match path {
        ObjectPath::Root => {}
        ObjectPath::Group(name) => {
            if !group_order.contains(name) {
                group_order.push(name.clone());
            }
            channel_order.entry(name.clone()).or_default();
        }
        ObjectPath::Channel { group, channel } => {
            if !group_order.contains(group) {
                group_order.push(group.clone());
            }
            let list = channel_order.entry(group.clone()).or_default();
            if !list.contains(channel) {
                list.push(channel.clone());
            }
        }
    }
}

/// Builds the truncated trailing chunk's per-channel sample counts from
/// `remainder_bytes` left over after removing all complete chunks.
///
/// Contiguous layout: walk channels in on-disk order, giving each one its
/// full per-chunk sample count until the remaining bytes can't cover the
/// next channel, then as many whole samples of that channel as fit; every
/// channel after that gets zero. A string channel that doesn't fit whole
/// also gets zero — its sample count can't be recovered from a byte count
/// alone once offset-table bytes are involved.
///
/// Interleaved layout: every channel shares one row, so the byte count only
/// ever yields whole rows; the same sample count applies to every channel.
fn compute_partial_chunk(effective: &[(String, Layout)], interleaved: bool, remainder_bytes: u64) -> PartialChunk {
    let mut per_channel_samples = IndexMap::new();

    if interleaved {
        let row_stride: u64 = effective
            .iter()
            .map(|(_, l)| l.data_type.fixed_size().unwrap_or(0) as u64)
            .sum();
        let full_rows = if row_stride == 0 { 0 } else { remainder_bytes / row_stride };
        for (path, _) in effective {
            per_channel_samples.insert(path.clone(), full_rows);
        }
        return PartialChunk {
            byte_length: full_rows * row_stride,
            per_channel_samples,
        };
    }

    let mut remaining = remainder_bytes;
    let mut used_bytes = 0u64;
    for (path, layout) in effective {
        if remaining == 0 {
            per_channel_samples.insert(path.clone(), 0);
            continue;
        }
        if remaining >= layout.total_bytes {
            per_channel_samples.insert(path.clone(), layout.num_values);
            remaining -= layout.total_bytes;
            used_bytes += layout.total_bytes;
        } else if layout.data_type == DataType::String || layout.is_daqmx {
            per_channel_samples.insert(path.clone(), 0);
            remaining = 0;
        } else {
            let width = layout.data_type.fixed_size().unwrap_or(1).max(1) as u64;
            let samples = remaining / width;
            per_channel_samples.insert(path.clone(), samples);
            used_bytes += samples * width;
            remaining = 0;
        }
    }
    PartialChunk {
        byte_length: used_bytes,
        per_channel_samples,
    }
}

/// Reads one segment's lead-in and metadata out of a `.tdms_index` stream.
/// Returns the descriptor (with `offset` set to its position in the *real*
/// data file), how many bytes it consumed in the index stream, the real
/// file's offset its next segment would start at, and the real file's
/// raw-data start offset for this segment.
fn parse_index_only_segment(
    source: &mut ByteSource,
    physical_index_offset: u64,
    simulated_main_offset: u64,
    index_file_len: u64,
    segment_index: usize,
) -> Result<(SegmentDescriptor, u64, u64, u64)> {
    if index_file_len.saturating_sub(physical_index_offset) < SegmentHeader::LEAD_IN_SIZE as u64 {
        return Err(TdmsError::malformed(segment_index, simulated_main_offset, "truncated index lead-in"));
    }

    source.seek(SeekFrom::Start(physical_index_offset))?;
    let mut tag = [0u8; 4];
    source.read_exact(&mut tag)?;
    if &tag != SegmentHeader::TDMS_TAG && &tag != SegmentHeader::INDEX_TAG {
        return Err(TdmsError::malformed(
            segment_index,
            simulated_main_offset,
            format!("expected TDSm/TDSh tag in index file, found {:?}", String::from_utf8_lossy(&tag)),
        ));
    }

    let toc = crate::types::TocFlags::new(source.read_u32::<LittleEndian>()?);
    let version = source.read_u32::<LittleEndian>()?;
    let next_segment_offset_field = source.read_u64::<LittleEndian>()?;
    let metadata_size = source.read_u64::<LittleEndian>()?;

    if next_segment_offset_field == SegmentHeader::INCOMPLETE_MARKER {
        return Err(TdmsError::UnsupportedFeature(
            "unfinished segment recorded in .tdms_index file".into(),
        ));
    }

    let objects = if toc.has_metadata() {
        parse_metadata_block(source, segment_index, simulated_main_offset)?
    } else {
        Vec::new()
    };

    let raw_byte_length = next_segment_offset_field.saturating_sub(metadata_size);
    let bytes_consumed_in_index_file = SegmentHeader::LEAD_IN_SIZE as u64 + metadata_size;
    let real_lead_in_end = simulated_main_offset + SegmentHeader::LEAD_IN_SIZE as u64;
    let raw_offset = real_lead_in_end + metadata_size;
    let real_next_main_offset = real_lead_in_end + next_segment_offset_field;

    let descriptor = SegmentDescriptor {
        index: segment_index,
        offset: simulated_main_offset,
        toc,
        version,
        next_segment_offset_field,
        metadata_size,
        raw_byte_length,
        objects,
    };

    Ok((descriptor, bytes_consumed_in_index_file, real_next_main_offset, raw_offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ObjectPath;
    use crate::segment::ObjectEntry;
    use crate::types::TocFlags;

    fn channel_entry(group: &str, channel: &str, data_type: DataType, num_values: u64) -> ObjectEntry {
        let total_bytes = num_values * data_type.fixed_size().unwrap_or(0) as u64;
        ObjectEntry {
            path: ObjectPath::channel(group, channel),
            raw_index: RawIndex::Fresh(Layout {
                data_type,
                num_values,
                total_bytes,
                is_daqmx: false,
            }),
            properties: Vec::new(),
        }
    }

    fn descriptor(index: usize, toc_bits: u32, raw_byte_length: u64, objects: Vec<ObjectEntry>) -> SegmentDescriptor {
        let metadata_size = 100; // arbitrary, unused by build()
        SegmentDescriptor {
            index,
            offset: index as u64 * 1000,
            toc: TocFlags::new(toc_bits | TocFlags::METADATA | TocFlags::RAW_DATA),
            version: 4713,
            next_segment_offset_field: metadata_size + raw_byte_length,
            metadata_size,
            raw_byte_length,
            objects,
        }
    }

    #[test]
    fn single_segment_single_channel() {
        let objects = vec![channel_entry("Group1", "Channel1", DataType::I32, 4)];
        let d = descriptor(0, TocFlags::NEW_OBJ_LIST, 16, objects);
        let index = Index::build(vec![(d, 1000)]).unwrap();
        let entry = index.channel("Group1", "Channel1").unwrap();
        assert_eq!(entry.total_samples, 4);
        assert_eq!(entry.segments.len(), 1);
        assert_eq!(entry.segments[0].samples_in_segment, 4);
    }

    #[test]
    fn second_segment_without_new_obj_list_inherits_channel() {
        let d0 = descriptor(0, TocFlags::NEW_OBJ_LIST, 16, vec![channel_entry("G", "C", DataType::I32, 4)]);
        // segment 1 declares no objects at all but still carries raw data matching the same layout
        let d1 = descriptor(1, 0, 16, vec![]);
        let index = Index::build(vec![(d0, 1000), (d1, 2000)]).unwrap();
        let entry = index.channel("G", "C").unwrap();
        assert_eq!(entry.total_samples, 8);
        assert_eq!(entry.segments.len(), 2);
        assert_eq!(entry.segments[1].cumulative_before, 4);
    }

    #[test]
    fn new_obj_list_drops_previous_channels() {
        let d0 = descriptor(0, TocFlags::NEW_OBJ_LIST, 16, vec![channel_entry("G", "C1", DataType::I32, 4)]);
        let d1 = descriptor(1, TocFlags::NEW_OBJ_LIST, 16, vec![channel_entry("G", "C2", DataType::I32, 4)]);
        let index = Index::build(vec![(d0, 1000), (d1, 2000)]).unwrap();
        assert!(index.channel("G", "C1").is_some());
        assert_eq!(index.channel("G", "C1").unwrap().total_samples, 4);
        assert_eq!(index.channel("G", "C2").unwrap().total_samples, 4);
        // C1 got no raw data in segment 1 since NewObjList restarted the list
        assert_eq!(index.channel("G", "C1").unwrap().segments.len(), 1);
    }

    #[test]
    fn interleaved_with_string_channel_is_malformed() {
        let mut objects = vec![channel_entry("G", "C1", DataType::I32, 2)];
        objects.push(ObjectEntry {
            path: ObjectPath::channel("G", "C2"),
            raw_index: RawIndex::Fresh(Layout {
                data_type: DataType::String,
                num_values: 2,
                total_bytes: 20,
                is_daqmx: false,
            }),
            properties: Vec::new(),
        });
        let d = descriptor(0, TocFlags::NEW_OBJ_LIST | TocFlags::INTERLEAVED, 28, objects);
        let err = Index::build(vec![(d, 1000)]).unwrap_err();
        assert!(matches!(err, TdmsError::MalformedFile { .. }));
    }

    #[test]
    fn unfinished_segment_admits_truncated_partial_chunk() {
        // chunk is 2 channels of i32 (4 bytes) * 2 samples = 16 bytes/chunk.
        // 24 raw bytes = 1 full chunk (16) + 8 leftover bytes.
        let objects = vec![
            channel_entry("G", "C1", DataType::I32, 2),
            channel_entry("G", "C2", DataType::I32, 2),
        ];
        let mut d = descriptor(0, TocFlags::NEW_OBJ_LIST, 24, objects);
        d.next_segment_offset_field = SegmentHeader::INCOMPLETE_MARKER;

        let index = Index::build(vec![(d, 1000)]).unwrap();
        // 8 leftover bytes: C1 takes its full 8 bytes (2 samples), C2 gets none.
        let c1 = index.channel("G", "C1").unwrap();
        let c2 = index.channel("G", "C2").unwrap();
        assert_eq!(c1.total_samples, 4); // 2 full-chunk + 2 partial
        assert_eq!(c2.total_samples, 2); // 2 full-chunk + 0 partial
    }

    #[test]
    fn object_removed_via_raw_index_none_stops_inheriting() {
        let d0 = descriptor(0, TocFlags::NEW_OBJ_LIST, 16, vec![channel_entry("G", "C", DataType::I32, 4)]);
        let mut d1 = descriptor(1, 0, 0, vec![]);
        d1.toc = TocFlags::new(TocFlags::METADATA); // no raw data this segment
        d1.objects.push(ObjectEntry {
            path: ObjectPath::channel("G", "C"),
            raw_index: RawIndex::None,
            properties: Vec::new(),
        });
        let d2 = descriptor(2, 0, 16, vec![]);

        let index = Index::build(vec![(d0, 1000), (d1, 2000), (d2, 3000)]).unwrap();
        let entry = index.channel("G", "C").unwrap();
        // segment 1 contributed nothing (no raw data at all); segment 2 tried
        // to carry the channel forward but it was removed in segment 1, so it
        // never reappears on its own (non-NewObjList segments only add
        // objects they explicitly declare) -- total stays at the first
        // segment's 4 samples.
        assert_eq!(entry.total_samples, 4);
    }
}
