//! `data_chunks()` streaming and its offset invariant: concatenating every
//! chunk's samples in order reproduces the channel's full array, and each
//! chunk's reported offset matches the running sample count before it.
mod common;

use common::two_channel_fixture;
use tdms_reader::{open, model, ByteSource, TdmsError};

#[test]
fn channel_chunks_concatenate_to_the_full_array() {
    let file = open(ByteSource::from_bytes(two_channel_fixture(4, 16))).unwrap();
    let channel = file.group("Group").unwrap().channel("Channel1").unwrap();

    let mut collected = Vec::new();
    let mut seen_offset = 0u64;
    for chunk in channel.data_chunks().unwrap() {
        let chunk = chunk.unwrap();
        let samples = chunk.channel_samples.get("/'Group'/'Channel1'").unwrap();
        let offset = *chunk.channel_offsets.get("/'Group'/'Channel1'").unwrap();
        assert_eq!(offset, seen_offset, "chunk offset must equal samples emitted so far");
        seen_offset += samples.len() as u64;
        collected.extend(samples.as_f64_vec().unwrap());
    }

    let full = channel.iter().unwrap().as_f64_vec().unwrap();
    assert_eq!(collected, full);
    assert_eq!(seen_offset, full.len() as u64);
}

#[test]
fn file_level_chunks_cover_every_channel() {
    let file = open(ByteSource::from_bytes(two_channel_fixture(2, 8))).unwrap();
    let mut saw_channel1 = false;
    let mut saw_channel2 = false;
    for chunk in model::file_data_chunks(&file).unwrap() {
        let chunk = chunk.unwrap();
        saw_channel1 |= chunk.channel_samples.contains_key("/'Group'/'Channel1'");
        saw_channel2 |= chunk.channel_samples.contains_key("/'Group'/'Channel2'");
    }
    assert!(saw_channel1 && saw_channel2);
}

#[test]
fn data_chunks_require_lazy_mode() {
    let file = tdms_reader::read(ByteSource::from_bytes(two_channel_fixture(1, 8))).unwrap();
    let channel = file.group("Group").unwrap().channel("Channel1").unwrap();
    assert!(matches!(channel.data_chunks().unwrap_err(), TdmsError::StateError(_)));
}
