// benches/read_benchmark.rs
use byteorder::{LittleEndian, WriteBytesExt};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::io::Write;
use tempfile::NamedTempFile;
use tdms_reader::{open_path, read_path};

const NUM_SEGMENTS: usize = 64;
const SAMPLES_PER_CHUNK: u64 = 256;

/// Writes a minimal multi-segment TDMS file: one group, two `f64` channels,
/// `NUM_SEGMENTS` segments each holding one chunk of `SAMPLES_PER_CHUNK`
/// samples per channel. Only the first segment declares metadata; later
/// segments use `RawIndex::MatchesPrevious` (index header `0`), matching how
/// DAQ software avoids repeating unchanged layout metadata every segment.
fn build_fixture() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    let mut buf = Vec::new();

    for segment_index in 0..NUM_SEGMENTS {
        let is_first = segment_index == 0;
        let mut metadata = Vec::new();

        if is_first {
            write_string(&mut metadata, "/'Group'/'Channel1'");
            write_channel_index(&mut metadata, SAMPLES_PER_CHUNK);
            metadata.write_u32::<LittleEndian>(0).unwrap(); // no properties

            write_string(&mut metadata, "/'Group'/'Channel2'");
            write_channel_index(&mut metadata, SAMPLES_PER_CHUNK);
            metadata.write_u32::<LittleEndian>(0).unwrap();

            // object count prefix, written after since it needs to be first
            let mut with_count = Vec::new();
            with_count.write_u32::<LittleEndian>(2).unwrap();
            with_count.extend_from_slice(&metadata);
            metadata = with_count;
        } else {
            write_string(&mut metadata, "/'Group'/'Channel1'");
            metadata.write_u32::<LittleEndian>(0).unwrap(); // RawIndex::MatchesPrevious
            metadata.write_u32::<LittleEndian>(0).unwrap(); // no properties

            write_string(&mut metadata, "/'Group'/'Channel2'");
            metadata.write_u32::<LittleEndian>(0).unwrap();
            metadata.write_u32::<LittleEndian>(0).unwrap();

            let mut with_count = Vec::new();
            with_count.write_u32::<LittleEndian>(2).unwrap();
            with_count.extend_from_slice(&metadata);
            metadata = with_count;
        }

        let raw_byte_length = SAMPLES_PER_CHUNK * 8 * 2;
        let next_segment_offset = metadata.len() as u64 + raw_byte_length;

        buf.extend_from_slice(b"TDSm");
        let mut toc = 0x2u32 | 0x8; // MetaData | RawData
        if is_first {
            toc |= 0x4; // NewObjList
        }
        buf.write_u32::<LittleEndian>(toc).unwrap();
        buf.write_u32::<LittleEndian>(4713).unwrap();
        buf.write_u64::<LittleEndian>(next_segment_offset).unwrap();
        buf.write_u64::<LittleEndian>(metadata.len() as u64).unwrap();
        buf.extend_from_slice(&metadata);

        for i in 0..SAMPLES_PER_CHUNK {
            let v = segment_index as f64 * 1000.0 + i as f64;
            buf.write_f64::<LittleEndian>(v).unwrap();
        }
        for i in 0..SAMPLES_PER_CHUNK {
            let v = -(segment_index as f64 * 1000.0 + i as f64);
            buf.write_f64::<LittleEndian>(v).unwrap();
        }
    }

    file.write_all(&buf).expect("write fixture bytes");
    file.flush().expect("flush fixture");
    file
}

fn write_string(buf: &mut Vec<u8>, s: &str) {
    buf.write_u32::<LittleEndian>(s.len() as u32).unwrap();
    buf.extend_from_slice(s.as_bytes());
}

fn write_channel_index(buf: &mut Vec<u8>, num_values: u64) {
    buf.write_u32::<LittleEndian>(10).unwrap(); // DataType::DoubleFloat
    buf.write_u32::<LittleEndian>(1).unwrap(); // array dimension
    buf.write_u64::<LittleEndian>(num_values).unwrap();
}

fn bench_eager_read(c: &mut Criterion) {
    let fixture = build_fixture();
    let path = fixture.path();

    c.bench_with_input(BenchmarkId::new("eager_read", "64_segments"), path, |b, path| {
        b.iter(|| {
            let file = read_path(black_box(path)).expect("eager read");
            black_box(file.group("Group").unwrap().channel("Channel1").unwrap().len());
        });
    });
}

fn bench_lazy_random_access(c: &mut Criterion) {
    let fixture = build_fixture();
    let path = fixture.path();
    let total = NUM_SEGMENTS as i64 * SAMPLES_PER_CHUNK as i64;

    c.bench_with_input(
        BenchmarkId::new("lazy_random_access", "64_segments"),
        path,
        |b, path| {
            let file = open_path(path, None).expect("open lazy");
            let channel = file.group("Group").unwrap().channel("Channel1").unwrap();
            let mut i = 0i64;
            b.iter(|| {
                let idx = (i * 997) % total;
                i += 1;
                black_box(channel.index(idx).expect("indexed read"));
            });
            file.close();
        },
    );
}

fn bench_lazy_data_chunks(c: &mut Criterion) {
    let fixture = build_fixture();
    let path = fixture.path();

    c.bench_with_input(
        BenchmarkId::new("lazy_data_chunks", "64_segments"),
        path,
        |b, path| {
            b.iter(|| {
                let file = open_path(black_box(path), None).expect("open lazy");
                let channel = file.group("Group").unwrap().channel("Channel1").unwrap();
                let mut count = 0usize;
                for chunk in channel.data_chunks().expect("data_chunks") {
                    let chunk = chunk.expect("chunk");
                    count += chunk.channel_samples.len();
                }
                black_box(count);
                file.close();
            });
        },
    );
}

criterion_group!(benches, bench_eager_read, bench_lazy_random_access, bench_lazy_data_chunks);
criterion_main!(benches);
