//! Shared byte-level TDMS fixture builder used across the integration
//! tests. Builds raw segment bytes directly (lead-in + metadata block +
//! raw data) rather than going through a writer, since this crate is
//! read-only.
#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};

pub const TY_I32: u32 = 3;
pub const TY_F64: u32 = 10;
pub const TY_STRING: u32 = 0x20;

const TOC_METADATA: u32 = 1 << 1;
const TOC_NEW_OBJ_LIST: u32 = 1 << 2;
const TOC_RAW_DATA: u32 = 1 << 3;
const TOC_INTERLEAVED: u32 = 1 << 5;
const TOC_BIG_ENDIAN: u32 = 1 << 6;

const RAW_INDEX_NONE: u32 = 0xFFFF_FFFF;
const RAW_INDEX_MATCHES_PREVIOUS: u32 = 0x0000_0000;
const INCOMPLETE_MARKER: u64 = 0xFFFF_FFFF_FFFF_FFFF;

#[derive(Clone)]
pub enum PropVal {
    Str(&'static str),
    F64(f64),
    U32(u32),
    I32(i32),
    Bool(bool),
}

#[derive(Clone)]
pub enum RawIndexDecl {
    Fresh { dtype: u32, num_values: u64, total_bytes: Option<u64> },
    MatchesPrevious,
    None,
}

#[derive(Clone)]
pub struct ObjDecl {
    pub path: &'static str,
    pub raw_index: RawIndexDecl,
    pub properties: Vec<(&'static str, PropVal)>,
}

impl ObjDecl {
    pub fn fresh(path: &'static str, dtype: u32, num_values: u64) -> Self {
        ObjDecl {
            path,
            raw_index: RawIndexDecl::Fresh { dtype, num_values, total_bytes: None },
            properties: Vec::new(),
        }
    }

    pub fn matches_previous(path: &'static str) -> Self {
        ObjDecl { path, raw_index: RawIndexDecl::MatchesPrevious, properties: Vec::new() }
    }

    pub fn properties_only(path: &'static str) -> Self {
        ObjDecl { path, raw_index: RawIndexDecl::None, properties: Vec::new() }
    }

    pub fn removed(path: &'static str) -> Self {
        ObjDecl { path, raw_index: RawIndexDecl::None, properties: Vec::new() }
    }

    pub fn with_property(mut self, name: &'static str, value: PropVal) -> Self {
        self.properties.push((name, value));
        self
    }

    /// Sets the wire `total_size_bytes` field string channels carry after
    /// `num_values` (offsets table size plus concatenated UTF-8 bytes).
    pub fn with_total_bytes(mut self, total_bytes: u64) -> Self {
        if let RawIndexDecl::Fresh { total_bytes: slot, .. } = &mut self.raw_index {
            *slot = Some(total_bytes);
        }
        self
    }
}

fn write_string(buf: &mut Vec<u8>, s: &str) {
    buf.write_u32::<LittleEndian>(s.len() as u32).unwrap();
    buf.extend_from_slice(s.as_bytes());
}

fn write_property(buf: &mut Vec<u8>, name: &str, value: &PropVal) {
    write_string(buf, name);
    match value {
        PropVal::Str(s) => {
            buf.write_u32::<LittleEndian>(TY_STRING).unwrap();
            write_string(buf, s);
        }
        PropVal::F64(v) => {
            buf.write_u32::<LittleEndian>(TY_F64).unwrap();
            buf.write_f64::<LittleEndian>(*v).unwrap();
        }
        PropVal::U32(v) => {
            buf.write_u32::<LittleEndian>(7).unwrap(); // DataType::U32
            buf.write_u32::<LittleEndian>(*v).unwrap();
        }
        PropVal::I32(v) => {
            buf.write_u32::<LittleEndian>(TY_I32).unwrap();
            buf.write_i32::<LittleEndian>(*v).unwrap();
        }
        PropVal::Bool(v) => {
            buf.write_u32::<LittleEndian>(0x21).unwrap(); // DataType::Boolean
            buf.write_u8(if *v { 1 } else { 0 }).unwrap();
        }
    }
}

fn write_object(buf: &mut Vec<u8>, obj: &ObjDecl) {
    write_string(buf, obj.path);
    match &obj.raw_index {
        RawIndexDecl::None => {
            buf.write_u32::<LittleEndian>(RAW_INDEX_NONE).unwrap();
        }
        RawIndexDecl::MatchesPrevious => {
            buf.write_u32::<LittleEndian>(RAW_INDEX_MATCHES_PREVIOUS).unwrap();
        }
        RawIndexDecl::Fresh { dtype, num_values, total_bytes } => {
            buf.write_u32::<LittleEndian>(*dtype).unwrap();
            buf.write_u32::<LittleEndian>(1).unwrap(); // array dimension
            buf.write_u64::<LittleEndian>(*num_values).unwrap();
            if *dtype == TY_STRING {
                buf.write_u64::<LittleEndian>(total_bytes.unwrap_or(0)).unwrap();
            }
        }
    }
    buf.write_u32::<LittleEndian>(obj.properties.len() as u32).unwrap();
    for (name, value) in &obj.properties {
        write_property(buf, name, value);
    }
}

/// Builds one segment's bytes: lead-in + metadata block + raw data.
/// `raw_data` is the already-encoded chunk bytes (all full chunks plus any
/// trailing partial chunk); when `incomplete` is set, the lead-in's
/// next-segment-offset field is written as the "writer died" sentinel and
/// `raw_data`'s length is taken as-is (simulating a truncated write).
pub fn build_segment(
    objects: &[ObjDecl],
    new_obj_list: bool,
    interleaved: bool,
    big_endian: bool,
    raw_data: &[u8],
    incomplete: bool,
) -> Vec<u8> {
    let mut metadata = Vec::new();
    metadata.write_u32::<LittleEndian>(objects.len() as u32).unwrap();
    for obj in objects {
        write_object(&mut metadata, obj);
    }

    let mut toc = TOC_METADATA | TOC_RAW_DATA;
    if new_obj_list {
        toc |= TOC_NEW_OBJ_LIST;
    }
    if interleaved {
        toc |= TOC_INTERLEAVED;
    }
    if big_endian {
        toc |= TOC_BIG_ENDIAN;
    }

    let mut buf = Vec::new();
    buf.extend_from_slice(b"TDSm");
    buf.write_u32::<LittleEndian>(toc).unwrap();
    buf.write_u32::<LittleEndian>(4713).unwrap();
    let next_segment_offset = if incomplete {
        INCOMPLETE_MARKER
    } else {
        metadata.len() as u64 + raw_data.len() as u64
    };
    buf.write_u64::<LittleEndian>(next_segment_offset).unwrap();
    buf.write_u64::<LittleEndian>(metadata.len() as u64).unwrap();
    buf.extend_from_slice(&metadata);
    buf.extend_from_slice(raw_data);
    buf
}

pub fn build_file(segments: Vec<Vec<u8>>) -> Vec<u8> {
    segments.concat()
}

/// Builds one segment's bytes for a `.tdms_index` sibling file: lead-in +
/// metadata only, no raw-data bytes, but `next_segment_offset` still
/// reports `metadata.len() + raw_byte_length` as it would in the real data
/// file (an index file's lead-in fields are copies of the main file's).
pub fn build_index_segment(objects: &[ObjDecl], new_obj_list: bool, interleaved: bool, raw_byte_length: u64) -> Vec<u8> {
    let mut metadata = Vec::new();
    metadata.write_u32::<LittleEndian>(objects.len() as u32).unwrap();
    for obj in objects {
        write_object(&mut metadata, obj);
    }

    let mut toc = TOC_METADATA | TOC_RAW_DATA;
    if new_obj_list {
        toc |= TOC_NEW_OBJ_LIST;
    }
    if interleaved {
        toc |= TOC_INTERLEAVED;
    }

    let mut buf = Vec::new();
    buf.extend_from_slice(b"TDSh");
    buf.write_u32::<LittleEndian>(toc).unwrap();
    buf.write_u32::<LittleEndian>(4713).unwrap();
    buf.write_u64::<LittleEndian>(metadata.len() as u64 + raw_byte_length).unwrap();
    buf.write_u64::<LittleEndian>(metadata.len() as u64).unwrap();
    buf.extend_from_slice(&metadata);
    buf
}

pub fn f64_samples(values: &[f64]) -> Vec<u8> {
    let mut buf = Vec::new();
    for v in values {
        buf.write_f64::<LittleEndian>(*v).unwrap();
    }
    buf
}

pub fn i32_samples(values: &[i32]) -> Vec<u8> {
    let mut buf = Vec::new();
    for v in values {
        buf.write_i32::<LittleEndian>(*v).unwrap();
    }
    buf
}

pub fn i32_samples_be(values: &[i32]) -> Vec<u8> {
    use byteorder::BigEndian;
    let mut buf = Vec::new();
    for v in values {
        buf.write_i32::<BigEndian>(*v).unwrap();
    }
    buf
}

/// A two-channel (`Channel1`, `Channel2`), multi-segment `f64` fixture:
/// `num_segments` segments, each with `samples_per_chunk` samples per
/// channel, contiguous (non-interleaved) layout.
pub fn two_channel_fixture(num_segments: usize, samples_per_chunk: u64) -> Vec<u8> {
    let mut segments = Vec::with_capacity(num_segments);
    for s in 0..num_segments {
        let is_first = s == 0;
        let objects = if is_first {
            vec![
                ObjDecl::fresh("/'Group'/'Channel1'", TY_F64, samples_per_chunk),
                ObjDecl::fresh("/'Group'/'Channel2'", TY_F64, samples_per_chunk),
            ]
        } else {
            vec![ObjDecl::matches_previous("/'Group'/'Channel1'"), ObjDecl::matches_previous("/'Group'/'Channel2'")]
        };
        let c1: Vec<f64> = (0..samples_per_chunk).map(|i| s as f64 * 1000.0 + i as f64).collect();
        let c2: Vec<f64> = (0..samples_per_chunk).map(|i| -(s as f64 * 1000.0 + i as f64)).collect();
        let mut raw = f64_samples(&c1);
        raw.extend(f64_samples(&c2));
        segments.push(build_segment(&objects, is_first, false, false, &raw, false));
    }
    build_file(segments)
}
