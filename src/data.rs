// src/data.rs
use crate::scaling::Scaling;
use crate::types::{DataType, Timestamp};
use crate::error::Result;

/// A decoded, homogeneously-typed run of channel samples.
///
/// The reader discovers a channel's type at parse time, not compile time,
/// so the public surface hands back a typed variant rather than a generic
/// `Vec<T>` — callers match on the variant they expect.
#[derive(Debug, Clone)]
pub enum ChannelData {
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    ComplexF32(Vec<(f32, f32)>),
    ComplexF64(Vec<(f64, f64)>),
    Bool(Vec<bool>),
    Timestamp(Vec<Timestamp>),
    String(Vec<String>),
}

impl ChannelData {
    pub fn len(&self) -> usize {
        match self {
            ChannelData::I8(v) => v.len(),
            ChannelData::I16(v) => v.len(),
            ChannelData::I32(v) => v.len(),
            ChannelData::I64(v) => v.len(),
            ChannelData::U8(v) => v.len(),
            ChannelData::U16(v) => v.len(),
            ChannelData::U32(v) => v.len(),
            ChannelData::U64(v) => v.len(),
            ChannelData::F32(v) => v.len(),
            ChannelData::F64(v) => v.len(),
            ChannelData::ComplexF32(v) => v.len(),
            ChannelData::ComplexF64(v) => v.len(),
            ChannelData::Bool(v) => v.len(),
            ChannelData::Timestamp(v) => v.len(),
            ChannelData::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> DataType {
        match self {
            ChannelData::I8(_) => DataType::I8,
            ChannelData::I16(_) => DataType::I16,
            ChannelData::I32(_) => DataType::I32,
            ChannelData::I64(_) => DataType::I64,
            ChannelData::U8(_) => DataType::U8,
            ChannelData::U16(_) => DataType::U16,
            ChannelData::U32(_) => DataType::U32,
            ChannelData::U64(_) => DataType::U64,
            ChannelData::F32(_) => DataType::SingleFloat,
            ChannelData::F64(_) => DataType::DoubleFloat,
            ChannelData::ComplexF32(_) => DataType::ComplexSingleFloat,
            ChannelData::ComplexF64(_) => DataType::ComplexDoubleFloat,
            ChannelData::Bool(_) => DataType::Boolean,
            ChannelData::Timestamp(_) => DataType::TimeStamp,
            ChannelData::String(_) => DataType::String,
        }
    }

    /// Numeric types viewed as `f64`, for feeding the scaling engine.
    /// Strings, timestamps, booleans, and complex values are never scaled.
    pub fn as_f64_vec(&self) -> Option<Vec<f64>> {
        match self {
            ChannelData::I8(v) => Some(v.iter().map(|&x| x as f64).collect()),
            ChannelData::I16(v) => Some(v.iter().map(|&x| x as f64).collect()),
            ChannelData::I32(v) => Some(v.iter().map(|&x| x as f64).collect()),
            ChannelData::I64(v) => Some(v.iter().map(|&x| x as f64).collect()),
            ChannelData::U8(v) => Some(v.iter().map(|&x| x as f64).collect()),
            ChannelData::U16(v) => Some(v.iter().map(|&x| x as f64).collect()),
            ChannelData::U32(v) => Some(v.iter().map(|&x| x as f64).collect()),
            ChannelData::U64(v) => Some(v.iter().map(|&x| x as f64).collect()),
            ChannelData::F32(v) => Some(v.iter().map(|&x| x as f64).collect()),
            ChannelData::F64(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// Applies `scaling` if this is a numeric type and the chain is
    /// non-empty; otherwise returns a clone unchanged.
    pub fn scaled(&self, scaling: &Scaling) -> Result<ChannelData> {
        if scaling.is_empty() {
            return Ok(self.clone());
        }
        match self.as_f64_vec() {
            Some(raw) => Ok(ChannelData::F64(scaling.apply_array(&raw)?)),
            None => Ok(self.clone()),
        }
    }

    pub fn slice_range(&self, start: usize, end: usize) -> ChannelData {
        macro_rules! slice_variant {
            ($v:expr) => {
                $v[start..end].to_vec()
            };
        }
        match self {
            ChannelData::I8(v) => ChannelData::I8(slice_variant!(v)),
            ChannelData::I16(v) => ChannelData::I16(slice_variant!(v)),
            ChannelData::I32(v) => ChannelData::I32(slice_variant!(v)),
            ChannelData::I64(v) => ChannelData::I64(slice_variant!(v)),
            ChannelData::U8(v) => ChannelData::U8(slice_variant!(v)),
            ChannelData::U16(v) => ChannelData::U16(slice_variant!(v)),
            ChannelData::U32(v) => ChannelData::U32(slice_variant!(v)),
            ChannelData::U64(v) => ChannelData::U64(slice_variant!(v)),
            ChannelData::F32(v) => ChannelData::F32(slice_variant!(v)),
            ChannelData::F64(v) => ChannelData::F64(slice_variant!(v)),
            ChannelData::ComplexF32(v) => ChannelData::ComplexF32(slice_variant!(v)),
            ChannelData::ComplexF64(v) => ChannelData::ComplexF64(slice_variant!(v)),
            ChannelData::Bool(v) => ChannelData::Bool(slice_variant!(v)),
            ChannelData::Timestamp(v) => ChannelData::Timestamp(slice_variant!(v)),
            ChannelData::String(v) => ChannelData::String(slice_variant!(v)),
        }
    }

    /// Gathers arbitrary (possibly reversed or strided) indices, used for
    /// negative-step slicing once the forward window has been decoded.
    pub fn gather(&self, indices: &[usize]) -> ChannelData {
        macro_rules! gather_variant {
            ($v:expr) => {
                indices.iter().map(|&i| $v[i].clone()).collect()
            };
        }
        match self {
            ChannelData::I8(v) => ChannelData::I8(gather_variant!(v)),
            ChannelData::I16(v) => ChannelData::I16(gather_variant!(v)),
            ChannelData::I32(v) => ChannelData::I32(gather_variant!(v)),
            ChannelData::I64(v) => ChannelData::I64(gather_variant!(v)),
            ChannelData::U8(v) => ChannelData::U8(gather_variant!(v)),
            ChannelData::U16(v) => ChannelData::U16(gather_variant!(v)),
            ChannelData::U32(v) => ChannelData::U32(gather_variant!(v)),
            ChannelData::U64(v) => ChannelData::U64(gather_variant!(v)),
            ChannelData::F32(v) => ChannelData::F32(gather_variant!(v)),
            ChannelData::F64(v) => ChannelData::F64(gather_variant!(v)),
            ChannelData::ComplexF32(v) => ChannelData::ComplexF32(gather_variant!(v)),
            ChannelData::ComplexF64(v) => ChannelData::ComplexF64(gather_variant!(v)),
            ChannelData::Bool(v) => ChannelData::Bool(gather_variant!(v)),
            ChannelData::Timestamp(v) => ChannelData::Timestamp(gather_variant!(v)),
            ChannelData::String(v) => ChannelData::String(gather_variant!(v)),
        }
    }

    /// Appends `other` in place; both sides must share a variant (true by
    /// construction — every chunk of one channel decodes to its one dtype).
    pub fn extend_from(&mut self, other: ChannelData) {
        macro_rules! extend_variant {
            ($self_v:expr, $other_v:expr) => {
                $self_v.extend($other_v)
            };
        }
        match (self, other) {
            (ChannelData::I8(a), ChannelData::I8(b)) => extend_variant!(a, b),
            (ChannelData::I16(a), ChannelData::I16(b)) => extend_variant!(a, b),
            (ChannelData::I32(a), ChannelData::I32(b)) => extend_variant!(a, b),
            (ChannelData::I64(a), ChannelData::I64(b)) => extend_variant!(a, b),
            (ChannelData::U8(a), ChannelData::U8(b)) => extend_variant!(a, b),
            (ChannelData::U16(a), ChannelData::U16(b)) => extend_variant!(a, b),
            (ChannelData::U32(a), ChannelData::U32(b)) => extend_variant!(a, b),
            (ChannelData::U64(a), ChannelData::U64(b)) => extend_variant!(a, b),
            (ChannelData::F32(a), ChannelData::F32(b)) => extend_variant!(a, b),
            (ChannelData::F64(a), ChannelData::F64(b)) => extend_variant!(a, b),
            (ChannelData::ComplexF32(a), ChannelData::ComplexF32(b)) => extend_variant!(a, b),
            (ChannelData::ComplexF64(a), ChannelData::ComplexF64(b)) => extend_variant!(a, b),
            (ChannelData::Bool(a), ChannelData::Bool(b)) => extend_variant!(a, b),
            (ChannelData::Timestamp(a), ChannelData::Timestamp(b)) => extend_variant!(a, b),
            (ChannelData::String(a), ChannelData::String(b)) => extend_variant!(a, b),
            _ => unreachable!("channel data variant mismatch within one channel"),
        }
    }

    pub fn empty_like(data_type: DataType) -> ChannelData {
        match data_type {
            DataType::I8 => ChannelData::I8(Vec::new()),
            DataType::I16 => ChannelData::I16(Vec::new()),
            DataType::I32 => ChannelData::I32(Vec::new()),
            DataType::I64 => ChannelData::I64(Vec::new()),
            DataType::U8 => ChannelData::U8(Vec::new()),
            DataType::U16 => ChannelData::U16(Vec::new()),
            DataType::U32 => ChannelData::U32(Vec::new()),
            DataType::U64 => ChannelData::U64(Vec::new()),
            DataType::SingleFloat | DataType::Float32WithUnit => ChannelData::F32(Vec::new()),
            DataType::DoubleFloat | DataType::Float64WithUnit => ChannelData::F64(Vec::new()),
            DataType::ComplexSingleFloat => ChannelData::ComplexF32(Vec::new()),
            DataType::ComplexDoubleFloat => ChannelData::ComplexF64(Vec::new()),
            DataType::Boolean => ChannelData::Bool(Vec::new()),
            DataType::TimeStamp => ChannelData::Timestamp(Vec::new()),
            _ => ChannelData::String(Vec::new()),
        }
    }
}
