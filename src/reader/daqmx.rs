// src/reader/daqmx.rs
use crate::error::{Result, TdmsError};
use crate::types::DataType;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Read;

pub const FORMAT_CHANGING_SCALER: u32 = 0x0000_1269;
pub const DIGITAL_LINE_SCALER: u32 = 0x0000_126A;

/// DAQmx raw-data metadata, parsed just far enough to compute the byte width
/// each DAQmx channel consumes per chunk. Full scaler decoding (the raw ->
/// engineering-units formula DAQmx scalers describe) is out of scope;
/// accessing a DAQmx channel's data surfaces `UnsupportedFeature` with its
/// path instead.
#[derive(Debug, Clone)]
pub struct DaqMxMetadata {
    pub chunk_size: u64,
    pub scalers: Vec<Scaler>,
    pub raw_data_widths: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct Scaler {
    pub scaler_type: u32,
    pub data_type: DataType,
    pub raw_buffer_index: u32,
    pub raw_byte_offset: u32,
    pub sample_format_bitmap: u32,
    pub scale_id: u32,
    pub raw_bit_offset: Option<u32>,
}

impl DaqMxMetadata {
    pub fn read<R: Read>(reader: &mut R, scaler_type: u32) -> Result<Self> {
        let dimension = reader.read_u32::<LittleEndian>()?;
        if dimension != 1 {
            return Err(TdmsError::UnsupportedFeature(format!(
                "DAQmx dimension {dimension} (expected 1)"
            )));
        }

        let chunk_size = reader.read_u64::<LittleEndian>()?;
        let scaler_count = reader.read_u32::<LittleEndian>()?;

        let mut scalers = Vec::with_capacity(scaler_count as usize);
        for _ in 0..scaler_count {
            scalers.push(Scaler::read(reader, scaler_type)?);
        }

        let width_count = reader.read_u32::<LittleEndian>()?;
        let mut raw_data_widths = Vec::with_capacity(width_count as usize);
        for _ in 0..width_count {
            raw_data_widths.push(reader.read_u32::<LittleEndian>()?);
        }

        Ok(DaqMxMetadata {
            chunk_size,
            scalers,
            raw_data_widths,
        })
    }

    /// Total bytes this object's raw data occupies in one chunk.
    pub fn total_bytes(&self) -> u64 {
        self.raw_data_widths.iter().map(|&w| w as u64).sum::<u64>() * self.chunk_size
    }
}

impl Scaler {
    fn read<R: Read>(reader: &mut R, scaler_type: u32) -> Result<Self> {
        let data_type_code = reader.read_u32::<LittleEndian>()?;
        let raw_buffer_index = reader.read_u32::<LittleEndian>()?;
        let raw_offset_val = reader.read_u32::<LittleEndian>()?;
        let sample_format_bitmap = reader.read_u32::<LittleEndian>()?;
        let scale_id = reader.read_u32::<LittleEndian>()?;

        let data_type = DataType::from_daqmx_type_code(data_type_code).ok_or_else(|| {
            TdmsError::UnsupportedFeature(format!("unknown DAQmx raw data type code {data_type_code}"))
        })?;

        let (raw_byte_offset, raw_bit_offset) = if scaler_type == DIGITAL_LINE_SCALER {
            (raw_offset_val / 8, Some(raw_offset_val))
        } else {
            (raw_offset_val, None)
        };

        Ok(Scaler {
            scaler_type,
            data_type,
            raw_buffer_index,
            raw_byte_offset,
            sample_format_bitmap,
            scale_id,
            raw_bit_offset,
        })
    }
}
