// src/raw_data/decode.rs
use crate::data::ChannelData;
use crate::error::Result;
use crate::raw_data::reader::RawDataReader;
use crate::types::DataType;
use std::io::Cursor;

/// Decodes `count` samples of `data_type` out of `bytes`, honoring
/// `big_endian` for multi-byte raw values (metadata is always
/// little-endian; this flag is the ToC `BigEndian` bit, raw-data only).
pub fn decode_chunk(data_type: DataType, bytes: &[u8], count: u64, big_endian: bool) -> Result<ChannelData> {
    let count = count as usize;
    let mut cursor = Cursor::new(bytes);
    Ok(match data_type {
        DataType::I8 => ChannelData::I8(RawDataReader::read_values(&mut cursor, count, big_endian)?),
        DataType::I16 => ChannelData::I16(RawDataReader::read_values(&mut cursor, count, big_endian)?),
        DataType::I32 => ChannelData::I32(RawDataReader::read_values(&mut cursor, count, big_endian)?),
        DataType::I64 => ChannelData::I64(RawDataReader::read_values(&mut cursor, count, big_endian)?),
        DataType::U8 => ChannelData::U8(RawDataReader::read_values(&mut cursor, count, big_endian)?),
        DataType::U16 => ChannelData::U16(RawDataReader::read_values(&mut cursor, count, big_endian)?),
        DataType::U32 => ChannelData::U32(RawDataReader::read_values(&mut cursor, count, big_endian)?),
        DataType::U64 => ChannelData::U64(RawDataReader::read_values(&mut cursor, count, big_endian)?),
        DataType::SingleFloat | DataType::Float32WithUnit => {
            ChannelData::F32(RawDataReader::read_values(&mut cursor, count, big_endian)?)
        }
        DataType::DoubleFloat | DataType::Float64WithUnit => {
            ChannelData::F64(RawDataReader::read_values(&mut cursor, count, big_endian)?)
        }
        DataType::Boolean => {
            let raw: Vec<u8> = RawDataReader::read_values(&mut cursor, count, big_endian)?;
            ChannelData::Bool(raw.into_iter().map(|b| b != 0).collect())
        }
        DataType::TimeStamp => {
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(RawDataReader::read_timestamp(&mut cursor, big_endian)?);
            }
            ChannelData::Timestamp(values)
        }
        DataType::ComplexSingleFloat => {
            let flat: Vec<f32> = RawDataReader::read_values(&mut cursor, count * 2, big_endian)?;
            ChannelData::ComplexF32(flat.chunks_exact(2).map(|c| (c[0], c[1])).collect())
        }
        DataType::ComplexDoubleFloat => {
            let flat: Vec<f64> = RawDataReader::read_values(&mut cursor, count * 2, big_endian)?;
            ChannelData::ComplexF64(flat.chunks_exact(2).map(|c| (c[0], c[1])).collect())
        }
        DataType::String => ChannelData::String(RawDataReader::read_strings(&mut cursor, count, big_endian)?),
        other => {
            return Err(crate::error::TdmsError::UnsupportedFeature(format!(
                "decoding raw data type {other:?}"
            )))
        }
    })
}

/// Gathers `count` samples of a fixed-width `data_type` starting at
/// `byte_offset` with `stride` bytes between successive samples —
/// the interleaved-layout read path.
pub fn decode_strided(
    data_type: DataType,
    bytes: &[u8],
    byte_offset: usize,
    stride: usize,
    count: u64,
    big_endian: bool,
) -> Result<ChannelData> {
    let width = data_type
        .fixed_size()
        .expect("interleaved layout only supports fixed-width types");
    let mut gathered = Vec::with_capacity(width * count as usize);
    for i in 0..count as usize {
        let start = byte_offset + i * stride;
        gathered.extend_from_slice(&bytes[start..start + width]);
    }
    decode_chunk(data_type, &gathered, count, big_endian)
}
