// src/reader/lazy.rs
use crate::byte_source::ByteSource;
use crate::data::ChannelData;
use crate::error::{Result, TdmsError};
use crate::index::{decode_window, ChannelIndexEntry, ChannelInSegment, Index, Segment};
use indexmap::IndexMap;
use std::cell::RefCell;

/// Owns the file's `ByteSource` for the lifetime of an open lazy `File`,
/// plus a one-entry cache of the last decoded chunk.
///
/// Interior mutability lets `DataChunks` and `read_data` hold only shared
/// references to this (and to the `Index` alongside it) instead of juggling
/// a `&mut ByteSource` across loop iterations and cached state.
pub struct LazySource {
    source: RefCell<Option<ByteSource>>,
    cache: RefCell<Option<ChunkCache>>,
}

struct ChunkCache {
    path: String,
    chunk_lo: u64,
    chunk_hi: u64,
    data: ChannelData,
}

impl LazySource {
    pub fn new(source: ByteSource) -> Self {
        LazySource {
            source: RefCell::new(Some(source)),
            cache: RefCell::new(None),
        }
    }

    pub fn with_source<T>(&self, f: impl FnOnce(&mut ByteSource) -> Result<T>) -> Result<T> {
        let mut guard = self.source.borrow_mut();
        match guard.as_mut() {
            Some(src) => f(src),
            None => Err(TdmsError::StateError(
                "Cannot read data after the underlying TDMS reader is closed".into(),
            )),
        }
    }

    pub fn close(&self) {
        self.source.borrow_mut().take();
        self.cache.borrow_mut().take();
    }

    pub fn is_closed(&self) -> bool {
        self.source.borrow().is_none()
    }

    fn try_cache(&self, path: &str, lo: u64, hi: u64) -> Option<ChannelData> {
        let cache = self.cache.borrow();
        let entry = cache.as_ref()?;
        if entry.path == path && lo >= entry.chunk_lo && hi <= entry.chunk_hi {
            let start = (lo - entry.chunk_lo) as usize;
            let end = (hi - entry.chunk_lo) as usize;
            Some(entry.data.slice_range(start, end))
        } else {
            None
        }
    }

    fn cache_chunk(&self, path: String, chunk_lo: u64, chunk_hi: u64, data: ChannelData) {
        *self.cache.borrow_mut() = Some(ChunkCache {
            path,
            chunk_lo,
            chunk_hi,
            data,
        });
    }
}

fn empty_result(entry: &ChannelIndexEntry, scaled: bool) -> ChannelData {
    if scaled && !entry.is_daqmx && !entry.scaling.is_empty() {
        ChannelData::F64(Vec::new())
    } else {
        ChannelData::empty_like(entry.dtype)
    }
}

fn finish(data: ChannelData, entry: &ChannelIndexEntry, scaled: bool) -> Result<ChannelData> {
    if scaled && !entry.is_daqmx && !entry.scaling.is_empty() {
        data.scaled(&entry.scaling)
    } else {
        Ok(data)
    }
}

/// Decodes `[want_lo, want_hi)` of one channel's chunks within a single
/// segment, spanning as many full chunks and the trailing partial chunk as
/// the window touches.
fn decode_range_in_segment(
    source: &mut ByteSource,
    segment: &Segment,
    channel: &ChannelInSegment,
    local_lo: u64,
    local_hi: u64,
) -> Result<ChannelData> {
    let mut out = ChannelData::empty_like(channel.dtype);
    let spc = channel.samples_per_chunk;

    if spc > 0 && segment.num_full_chunks > 0 {
        let full_end = spc * segment.num_full_chunks;
        let first_chunk = local_lo / spc;
        let last_chunk = (local_hi.min(full_end).saturating_sub(1)) / spc;
        for chunk_idx in first_chunk..segment.num_full_chunks.min(last_chunk + 1) {
            let chunk_start = chunk_idx * spc;
            let chunk_end = chunk_start + spc;
            if chunk_start >= local_hi {
                break;
            }
            let lo = local_lo.max(chunk_start) - chunk_start;
            let hi = local_hi.min(chunk_end) - chunk_start;
            if lo >= hi {
                continue;
            }
            let byte_offset = chunk_idx * segment.chunk_size_bytes;
            out.extend_from(decode_window(source, segment, channel, byte_offset, lo, hi)?);
        }
    }

    if let Some(partial) = &segment.partial_chunk {
        let psamples = partial.per_channel_samples.get(&channel.path).copied().unwrap_or(0);
        if psamples > 0 {
            let chunk_start = spc * segment.num_full_chunks;
            let chunk_end = chunk_start + psamples;
            if local_hi > chunk_start && local_lo < chunk_end {
                let lo = local_lo.max(chunk_start) - chunk_start;
                let hi = local_hi.min(chunk_end) - chunk_start;
                if lo < hi {
                    let byte_offset = segment.num_full_chunks * segment.chunk_size_bytes;
                    out.extend_from(decode_window(source, segment, channel, byte_offset, lo, hi)?);
                }
            }
        }
    }

    Ok(out)
}

/// Serves spec's `read_data(offset, length)`: validates arguments, truncates
/// to channel length, and satisfies the request either from the one-chunk
/// cache, a single fresh chunk decode (cached for the next call), or a
/// general multi-segment assembly for windows spanning chunk boundaries.
pub fn read_data(
    lazy: &LazySource,
    index: &Index,
    path: &str,
    offset: i64,
    length: i64,
    scaled: bool,
) -> Result<ChannelData> {
    if offset < 0 {
        return Err(TdmsError::InvalidArgument("offset must be non-negative".into()));
    }
    if length < 0 {
        return Err(TdmsError::InvalidArgument("length must be non-negative".into()));
    }

    let entry = index
        .channels
        .get(path)
        .ok_or_else(|| TdmsError::NotFound(format!("channel '{path}'")))?;

    let total = entry.total_samples;
    let want_lo = offset as u64;
    if want_lo >= total {
        return Ok(empty_result(entry, scaled));
    }
    let want_hi = want_lo.saturating_add(length as u64).min(total);
    if want_lo >= want_hi {
        return Ok(empty_result(entry, scaled));
    }

    if let Some(cached) = lazy.try_cache(path, want_lo, want_hi) {
        return finish(cached, entry, scaled);
    }

    let seg_pos = entry
        .segments
        .partition_point(|s| s.cumulative_before + s.samples_in_segment <= want_lo);

    if seg_pos < entry.segments.len() {
        let seg_ref = &entry.segments[seg_pos];
        let seg_end = seg_ref.cumulative_before + seg_ref.samples_in_segment;
        if want_hi <= seg_end {
            let segment = &index.segments[seg_ref.segment_index];
            let channel = segment
                .channels
                .iter()
                .find(|c| c.path == path)
                .ok_or_else(|| {
                    TdmsError::malformed(seg_ref.segment_index, segment.file_offset_of_raw, "channel missing from segment it was indexed under")
                })?;

            if channel.samples_per_chunk > 0 {
                let local_lo = want_lo - seg_ref.cumulative_before;
                let local_hi = want_hi - seg_ref.cumulative_before;
                let full_end = channel.samples_per_chunk * segment.num_full_chunks;
                if local_hi <= full_end && local_lo / channel.samples_per_chunk == (local_hi - 1) / channel.samples_per_chunk {
                    let chunk_idx = local_lo / channel.samples_per_chunk;
                    let chunk_byte_offset = chunk_idx * segment.chunk_size_bytes;
                    let chunk_lo_global = seg_ref.cumulative_before + chunk_idx * channel.samples_per_chunk;
                    let chunk_hi_global = chunk_lo_global + channel.samples_per_chunk;

                    let full = lazy.with_source(|src| {
                        decode_window(src, segment, channel, chunk_byte_offset, 0, channel.samples_per_chunk)
                    })?;
                    lazy.cache_chunk(path.to_string(), chunk_lo_global, chunk_hi_global, full.clone());

                    let start = (want_lo - chunk_lo_global) as usize;
                    let end = (want_hi - chunk_lo_global) as usize;
                    return finish(full.slice_range(start, end), entry, scaled);
                }
            }
        }
    }

    let mut result = ChannelData::empty_like(entry.dtype);
    for seg_ref in &entry.segments {
        let seg_start = seg_ref.cumulative_before;
        let seg_end = seg_start + seg_ref.samples_in_segment;
        if seg_end <= want_lo || seg_start >= want_hi {
            continue;
        }
        let local_lo = want_lo.max(seg_start) - seg_start;
        let local_hi = want_hi.min(seg_end) - seg_start;
        let segment = &index.segments[seg_ref.segment_index];
        let channel = segment
            .channels
            .iter()
            .find(|c| c.path == path)
            .ok_or_else(|| {
                TdmsError::malformed(seg_ref.segment_index, segment.file_offset_of_raw, "channel missing from segment it was indexed under")
            })?;
        let piece = lazy.with_source(|src| decode_range_in_segment(src, segment, channel, local_lo, local_hi))?;
        result.extend_from(piece);
    }

    finish(result, entry, scaled)
}

/// One (segment, chunk-within-segment) slice of decoded samples, carrying
/// each channel's cumulative-sample offset as of the start of this chunk.
pub struct DataChunk {
    pub channel_samples: IndexMap<String, ChannelData>,
    pub channel_offsets: IndexMap<String, u64>,
}

enum Stage {
    Full(u64),
    Partial,
}

/// Streams `DataChunk`s in file order, either across every channel (file
/// level) or filtered to one channel.
pub struct DataChunks<'a> {
    lazy: &'a LazySource,
    index: &'a Index,
    filter: Option<String>,
    segment_idx: usize,
    stage: Stage,
}

impl<'a> DataChunks<'a> {
    pub fn new(lazy: &'a LazySource, index: &'a Index) -> Self {
        DataChunks {
            lazy,
            index,
            filter: None,
            segment_idx: 0,
            stage: Stage::Full(0),
        }
    }

    pub fn for_channel(lazy: &'a LazySource, index: &'a Index, path: &str) -> Result<Self> {
        let entry = index
            .channels
            .get(path)
            .ok_or_else(|| TdmsError::NotFound(format!("channel '{path}'")))?;
        if entry.is_daqmx {
            return Err(TdmsError::UnsupportedFeature(format!(
                "reading DAQmx-scaled data for channel {path}"
            )));
        }
        Ok(DataChunks {
            lazy,
            index,
            filter: Some(path.to_string()),
            segment_idx: 0,
            stage: Stage::Full(0),
        })
    }

    fn channel_offset(&self, path: &str, segment_index: usize, samples_into_segment: u64) -> u64 {
        let entry = &self.index.channels[path];
        entry
            .segments
            .iter()
            .find(|s| s.segment_index == segment_index)
            .map(|s| s.cumulative_before + samples_into_segment)
            .unwrap_or(0)
    }

    /// Decodes one full chunk (`chunk_index` counting from 0) across every
    /// matching channel — each channel's own `samples_per_chunk` bounds its
    /// window, since string channels carry extra offset-table bytes the
    /// shared chunk byte size doesn't reflect per-sample.
    fn emit_full_chunk(&self, segment: &Segment, chunk_index: u64) -> Option<Result<DataChunk>> {
        let byte_offset = chunk_index * segment.chunk_size_bytes;
        let mut channel_samples = IndexMap::new();
        let mut channel_offsets = IndexMap::new();

        for channel in &segment.channels {
            if channel.is_daqmx {
                continue;
            }
            if let Some(filter) = &self.filter {
                if &channel.path != filter {
                    continue;
                }
            }
            let decoded = match self
                .lazy
                .with_source(|src| decode_window(src, segment, channel, byte_offset, 0, channel.samples_per_chunk))
            {
                Ok(d) => d,
                Err(e) => return Some(Err(e)),
            };
            let samples_into_segment = chunk_index * channel.samples_per_chunk;
            let offset = self.channel_offset(&channel.path, self.segment_idx, samples_into_segment);
            channel_offsets.insert(channel.path.clone(), offset);
            channel_samples.insert(channel.path.clone(), decoded);
        }

        if channel_samples.is_empty() {
            None
        } else {
            Some(Ok(DataChunk {
                channel_samples,
                channel_offsets,
            }))
        }
    }
}

impl<'a> Iterator for DataChunks<'a> {
    type Item = Result<DataChunk>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.segment_idx >= self.index.segments.len() {
                return None;
            }
            let segment = &self.index.segments[self.segment_idx];

            match self.stage {
                Stage::Full(i) if i < segment.num_full_chunks => {
                    self.stage = Stage::Full(i + 1);
                    if let Some(item) = self.emit_full_chunk(segment, i) {
                        return Some(item);
                    }
                    continue;
                }
                Stage::Full(_) => {
                    if segment.partial_chunk.is_some() {
                        self.stage = Stage::Partial;
                    } else {
                        self.segment_idx += 1;
                        self.stage = Stage::Full(0);
                    }
                    continue;
                }
                Stage::Partial => {
                    self.segment_idx += 1;
                    self.stage = Stage::Full(0);
                    let partial = segment.partial_chunk.as_ref().expect("checked above");
                    let byte_offset = segment.num_full_chunks * segment.chunk_size_bytes;
                    let item = self.emit_partial(segment, byte_offset, partial);
                    if item.is_some() {
                        return item;
                    }
                    continue;
                }
            }
        }
    }
}

impl<'a> DataChunks<'a> {
    fn emit_partial(
        &self,
        segment: &Segment,
        byte_offset: u64,
        partial: &crate::index::PartialChunk,
    ) -> Option<Result<DataChunk>> {
        let mut channel_samples = IndexMap::new();
        let mut channel_offsets = IndexMap::new();

        for channel in &segment.channels {
            if channel.is_daqmx {
                continue;
            }
            if let Some(filter) = &self.filter {
                if &channel.path != filter {
                    continue;
                }
            }
            let count = partial.per_channel_samples.get(&channel.path).copied().unwrap_or(0);
            if count == 0 {
                continue;
            }
            let decoded = match self
                .lazy
                .with_source(|src| decode_window(src, segment, channel, byte_offset, 0, count))
            {
                Ok(d) => d,
                Err(e) => return Some(Err(e)),
            };
            let offset = self.channel_offset(&channel.path, self.segment_idx, 0);
            channel_offsets.insert(channel.path.clone(), offset);
            channel_samples.insert(channel.path.clone(), decoded);
        }

        if channel_samples.is_empty() {
            None
        } else {
            Some(Ok(DataChunk {
                channel_samples,
                channel_offsets,
            }))
        }
    }
}

