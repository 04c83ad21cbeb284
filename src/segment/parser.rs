// src/segment/parser.rs
use crate::byte_source::ByteSource;
use crate::error::{Result, TdmsError};
use crate::metadata::ObjectPath;
use crate::reader::daqmx::{self, DaqMxMetadata};
use crate::segment::descriptor::{Layout, ObjectEntry, RawIndex, SegmentDescriptor};
use crate::segment::header::SegmentHeader;
use crate::types::{DataType, Property, PropertyValue, TocFlags};
use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, trace};
use std::io::{Seek, SeekFrom};

const RAW_INDEX_NO_DATA: u32 = 0xFFFF_FFFF;
const RAW_INDEX_MATCHES_PREVIOUS: u32 = 0x0000_0000;

/// Parses one segment's lead-in and (if present) metadata block starting at
/// `offset`. All header and metadata integers are little-endian regardless
/// of the segment's ToC `BigEndian` flag — that flag governs the raw-data
/// block only.
pub fn parse_segment(
    source: &mut ByteSource,
    offset: u64,
    file_len: u64,
    segment_index: usize,
) -> Result<SegmentDescriptor> {
    if file_len.saturating_sub(offset) < SegmentHeader::LEAD_IN_SIZE as u64 {
        return Err(TdmsError::malformed(
            segment_index,
            offset,
            "truncated lead-in",
        ));
    }

    source.seek(SeekFrom::Start(offset))?;
    let mut tag = [0u8; 4];
    source.read_exact(&mut tag)?;
    if &tag != SegmentHeader::TDMS_TAG && &tag != SegmentHeader::INDEX_TAG {
        return Err(TdmsError::malformed(
            segment_index,
            offset,
            format!("expected TDSm/TDSh tag, found {:?}", String::from_utf8_lossy(&tag)),
        ));
    }

    let toc = TocFlags::new(source.read_u32::<LittleEndian>()?);
    let version = source.read_u32::<LittleEndian>()?;
    let next_segment_offset_field = source.read_u64::<LittleEndian>()?;
    let metadata_size = source.read_u64::<LittleEndian>()?;

    trace!(
        "segment {segment_index} at offset {offset}: toc=0x{:08x} version={version}",
        toc.raw_value()
    );

    let lead_in_end = offset + SegmentHeader::LEAD_IN_SIZE as u64;
    let raw_byte_length = if next_segment_offset_field == SegmentHeader::INCOMPLETE_MARKER {
        file_len
            .saturating_sub(lead_in_end)
            .saturating_sub(metadata_size)
    } else {
        next_segment_offset_field.saturating_sub(metadata_size)
    };

    let mut objects = Vec::new();
    if toc.has_metadata() {
        objects = parse_metadata_block(source, segment_index, offset)?;
    }

    Ok(SegmentDescriptor {
        index: segment_index,
        offset,
        toc,
        version,
        next_segment_offset_field,
        metadata_size,
        raw_byte_length,
        objects,
    })
}

pub(crate) fn parse_metadata_block(
    source: &mut ByteSource,
    segment_index: usize,
    segment_offset: u64,
) -> Result<Vec<ObjectEntry>> {
    let object_count = source.read_u32::<LittleEndian>()?;
    let mut objects = Vec::with_capacity(object_count as usize);

    for _ in 0..object_count {
        let path_str = read_length_prefixed_string(source)?;
        let path = ObjectPath::from_string(&path_str)?;
        let raw_index_header = source.read_u32::<LittleEndian>()?;

        debug!("reading metadata for object {path_str} with index header 0x{raw_index_header:08x}");

        let raw_index = if raw_index_header == RAW_INDEX_NO_DATA {
            RawIndex::None
        } else if raw_index_header == RAW_INDEX_MATCHES_PREVIOUS {
            RawIndex::MatchesPrevious
        } else if raw_index_header == daqmx::FORMAT_CHANGING_SCALER
            || raw_index_header == daqmx::DIGITAL_LINE_SCALER
        {
            let data_type_raw = source.read_u32::<LittleEndian>()?;
            let data_type = DataType::from_u32(data_type_raw).ok_or_else(|| {
                TdmsError::malformed(segment_index, segment_offset, format!("bad data type {data_type_raw}"))
            })?;
            let meta = DaqMxMetadata::read(source, raw_index_header)?;
            RawIndex::DaqMx(meta, data_type)
        } else {
            let data_type_raw = raw_index_header;
            let data_type = DataType::from_u32(data_type_raw).ok_or_else(|| {
                TdmsError::malformed(segment_index, segment_offset, format!("bad data type {data_type_raw}"))
            })?;
            let dimension = source.read_u32::<LittleEndian>()?;
            if dimension != 1 {
                return Err(TdmsError::malformed(
                    segment_index,
                    segment_offset,
                    format!("unsupported array dimension {dimension}"),
                ));
            }
            let num_values = source.read_u64::<LittleEndian>()?;
            let total_bytes = if data_type == DataType::String {
                source.read_u64::<LittleEndian>()?
            } else {
                num_values * data_type.fixed_size().unwrap_or(0) as u64
            };
            debug!("object data type: {}", data_type.name());
            RawIndex::Fresh(Layout {
                data_type,
                num_values,
                total_bytes,
                is_daqmx: false,
            })
        };

        let property_count = source.read_u32::<LittleEndian>()?;
        let mut properties = Vec::with_capacity(property_count as usize);
        for _ in 0..property_count {
            properties.push(read_property(source)?);
        }

        objects.push(ObjectEntry {
            path,
            raw_index,
            properties,
        });
    }

    Ok(objects)
}

fn read_property(source: &mut ByteSource) -> Result<Property> {
    let name = read_length_prefixed_string(source)?;
    let type_raw = source.read_u32::<LittleEndian>()?;
    let data_type =
        DataType::from_u32(type_raw).ok_or(TdmsError::UnsupportedFeature(format!("property type {type_raw}")))?;
    let value = read_property_value(source, data_type)?;
    Ok(Property { name, value })
}

fn read_property_value(source: &mut ByteSource, data_type: DataType) -> Result<PropertyValue> {
    use crate::raw_data::RawDataReader;
    match data_type {
        DataType::I8 => Ok(PropertyValue::I8(RawDataReader::read_i8(source)?)),
        DataType::I16 => Ok(PropertyValue::I16(RawDataReader::read_i16(source, false)?)),
        DataType::I32 => Ok(PropertyValue::I32(RawDataReader::read_i32(source, false)?)),
        DataType::I64 => Ok(PropertyValue::I64(RawDataReader::read_i64(source, false)?)),
        DataType::U8 => Ok(PropertyValue::U8(RawDataReader::read_u8(source)?)),
        DataType::U16 => Ok(PropertyValue::U16(RawDataReader::read_u16(source, false)?)),
        DataType::U32 => Ok(PropertyValue::U32(RawDataReader::read_u32(source, false)?)),
        DataType::U64 => Ok(PropertyValue::U64(RawDataReader::read_u64(source, false)?)),
        DataType::SingleFloat | DataType::Float32WithUnit => {
            Ok(PropertyValue::Float(RawDataReader::read_f32(source, false)?))
        }
        DataType::DoubleFloat | DataType::Float64WithUnit => {
            Ok(PropertyValue::Double(RawDataReader::read_f64(source, false)?))
        }
        DataType::Boolean => Ok(PropertyValue::Boolean(RawDataReader::read_bool(source)?)),
        DataType::TimeStamp => Ok(PropertyValue::Timestamp(RawDataReader::read_timestamp(source, false)?)),
        DataType::String => Ok(PropertyValue::String(read_length_prefixed_string(source)?)),
        other => Err(TdmsError::UnsupportedFeature(format!(
            "property data type {other:?}"
        ))),
    }
}

fn read_length_prefixed_string(source: &mut ByteSource) -> Result<String> {
    let len = source.read_u32::<LittleEndian>()?;
    if len == 0 {
        return Ok(String::new());
    }
    let mut buf = vec![0u8; len as usize];
    std::io::Read::read_exact(source, &mut buf)?;
    String::from_utf8(buf).map_err(|_| TdmsError::malformed(0, 0, "invalid UTF-8 in object path/property"))
}
