// src/reader/eager.rs
use crate::byte_source::ByteSource;
use crate::data::ChannelData;
use crate::error::{Result, TdmsError};
use crate::index::{ChannelInSegment, Index, Segment};
use crate::raw_data::{decode_chunk, decode_strided};
use indexmap::IndexMap;
use std::io::{Read, Seek, SeekFrom};

/// Materializes every channel's full raw array in one pass over the file's
/// segments in order. Scaling is applied lazily by the caller (the public
/// `Channel` view) rather than baked in here, so `raw_data()` can still
/// recover the unscaled samples after an eager read.
pub fn read_all(source: &mut ByteSource, index: &Index) -> Result<IndexMap<String, ChannelData>> {
    let mut out: IndexMap<String, ChannelData> = index
        .channels
        .iter()
        .map(|(path, entry)| (path.clone(), ChannelData::empty_like(entry.dtype)))
        .collect();

    for segment in &index.segments {
        if segment.num_full_chunks == 0 && segment.partial_chunk.is_none() {
            continue;
        }
        let partial_bytes = segment.partial_chunk.as_ref().map(|p| p.byte_length).unwrap_or(0);
        let total_bytes = segment.num_full_chunks * segment.chunk_size_bytes + partial_bytes;
        let mut buf = vec![0u8; total_bytes as usize];
        source.seek(SeekFrom::Start(segment.file_offset_of_raw))?;
        source.read_exact(&mut buf)?;

        for channel in &segment.channels {
            if channel.is_daqmx {
                // Byte-accounted above but never decoded; surfaces lazily.
                continue;
            }
            let mut chunk_start = 0usize;
            for _ in 0..segment.num_full_chunks {
                let decoded = decode_one(channel, segment, &buf, chunk_start, channel.samples_per_chunk)?;
                out.get_mut(&channel.path).expect("channel present in output map").extend_from(decoded);
                chunk_start += segment.chunk_size_bytes as usize;
            }
            if let Some(partial) = &segment.partial_chunk {
                let samples = partial.per_channel_samples.get(&channel.path).copied().unwrap_or(0);
                if samples > 0 {
                    let decoded = decode_one(channel, segment, &buf, chunk_start, samples)?;
                    out.get_mut(&channel.path).expect("channel present in output map").extend_from(decoded);
                }
            }
        }
    }

    Ok(out)
}

/// Decodes `count` samples of one channel out of `buf`, where `chunk_start`
/// is the byte offset of the start of the current (full or partial) chunk
/// within `buf`.
fn decode_one(channel: &ChannelInSegment, segment: &Segment, buf: &[u8], chunk_start: usize, count: u64) -> Result<ChannelData> {
    if channel.is_daqmx {
        return Err(TdmsError::UnsupportedFeature(format!(
            "reading DAQmx-scaled data for channel {}",
            channel.path
        )));
    }

    if segment.interleaved {
        let row_stride = segment.channels.iter().map(|c| c.bytes_per_sample).sum::<u64>() as usize;
        let window = &buf[chunk_start..];
        decode_strided(
            channel.dtype,
            window,
            channel.byte_offset_within_chunk as usize,
            row_stride,
            count,
            segment.big_endian,
        )
    } else {
        let start = chunk_start + channel.byte_offset_within_chunk as usize;
        let end = if channel.is_string {
            start + channel.total_bytes_per_chunk as usize
        } else {
            start + count as usize * channel.bytes_per_sample as usize
        };
        decode_chunk(channel.dtype, &buf[start..end], count, segment.big_endian)
    }
}
