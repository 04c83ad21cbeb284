// src/model/mod.rs
//! File/Group/Channel view over a built [`Index`] — the public surface most
//! callers touch. `open()` builds the index and keeps the file handle open
//! for lazy queries; `read()` additionally materializes every channel up
//! front.

use crate::byte_source::ByteSource;
use crate::data::ChannelData;
use crate::error::{Result, TdmsError};
use crate::index::Index;
use crate::reader::{eager, lazy};
use crate::types::PropertyValue;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

enum Mode {
    Eager(IndexMap<String, ChannelData>),
    Lazy(lazy::LazySource),
}

/// An opened TDMS file: the segment index plus either a materialized
/// per-channel dataset (`read`) or a live byte source served on demand
/// (`open`).
pub struct File {
    index: Index,
    mode: Mode,
}

fn sibling_index_path(path: &Path) -> PathBuf {
    let mut p = path.to_path_buf();
    let new_ext = match p.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{ext}_index"),
        None => "tdms_index".to_string(),
    };
    p.set_extension(new_ext);
    p
}

fn build_index(path: &Path, main_source: &mut ByteSource) -> Result<Index> {
    let index_path = sibling_index_path(path);
    if index_path.is_file() {
        let mut index_source = ByteSource::from_path(&index_path)?;
        Index::discover_from_index_file(&mut index_source)
    } else {
        Index::discover_from_data_file(main_source)
    }
}

impl File {
    /// Opens `path` in lazy mode. `memmap_dir` is a hint to back the byte
    /// source itself with a memory map (built under the `mmap` feature)
    /// rather than buffered I/O; it does not change read semantics.
    pub fn open_path(path: impl AsRef<Path>, memmap_dir: Option<&Path>) -> Result<File> {
        let path = path.as_ref();
        let mut main_source = open_byte_source(path, memmap_dir)?;
        let index = build_index(path, &mut main_source)?;
        Ok(File {
            index,
            mode: Mode::Lazy(lazy::LazySource::new(main_source)),
        })
    }

    /// Opens an already-constructed `ByteSource` in lazy mode — the path
    /// used for reads when the caller already owns the handle or an
    /// in-memory buffer. No sibling `.tdms_index` is consulted since there
    /// is no path to look one up next to.
    pub fn open(mut source: ByteSource) -> Result<File> {
        let index = Index::discover_from_data_file(&mut source)?;
        Ok(File {
            index,
            mode: Mode::Lazy(lazy::LazySource::new(source)),
        })
    }

    /// Reads `path` eagerly: every channel is decoded into memory and the
    /// underlying file handle is dropped once done.
    pub fn read_path(path: impl AsRef<Path>) -> Result<File> {
        let path = path.as_ref();
        let mut main_source = ByteSource::from_path(path)?;
        let index = build_index(path, &mut main_source)?;
        let data = eager::read_all(&mut main_source, &index)?;
        Ok(File {
            index,
            mode: Mode::Eager(data),
        })
    }

    /// Reads an already-constructed `ByteSource` eagerly.
    pub fn read(mut source: ByteSource) -> Result<File> {
        let index = Index::discover_from_data_file(&mut source)?;
        let data = eager::read_all(&mut source, &index)?;
        Ok(File {
            index,
            mode: Mode::Eager(data),
        })
    }

    pub fn len(&self) -> usize {
        self.index.groups().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn group_names(&self) -> &[String] {
        self.index.groups()
    }

    pub fn group(&self, name: &str) -> Result<Group<'_>> {
        if !self.index.groups().iter().any(|g| g == name) {
            return Err(TdmsError::not_found_group(name));
        }
        Ok(Group {
            file: self,
            name: name.to_string(),
        })
    }

    pub fn groups(&self) -> impl Iterator<Item = Group<'_>> {
        self.index.groups().iter().map(move |name| Group {
            file: self,
            name: name.clone(),
        })
    }

    pub fn properties(&self) -> IndexMap<String, PropertyValue> {
        self.index.properties("/")
    }

    /// Explicitly releases the underlying byte source. A no-op in eager
    /// mode; in lazy mode, subsequent `read_data` calls raise `StateError`.
    pub fn close(&self) {
        if let Mode::Lazy(lazy) = &self.mode {
            lazy.close();
        }
    }

    fn channel_entry(&self, path: &str) -> Result<&crate::index::ChannelIndexEntry> {
        self.index
            .channels
            .get(path)
            .ok_or_else(|| TdmsError::NotFound(format!("channel '{path}'")))
    }
}

#[cfg(feature = "mmap")]
fn open_byte_source(path: &Path, memmap_dir: Option<&Path>) -> Result<ByteSource> {
    match memmap_dir {
        Some(_) => ByteSource::from_path_mmap(path),
        None => ByteSource::from_path(path),
    }
}

#[cfg(not(feature = "mmap"))]
fn open_byte_source(path: &Path, _memmap_dir: Option<&Path>) -> Result<ByteSource> {
    ByteSource::from_path(path)
}

/// A named subtree of groups/channels, a thin view over the owning `File`.
pub struct Group<'a> {
    file: &'a File,
    name: String,
}

impl<'a> Group<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> String {
        crate::metadata::ObjectPath::group(self.name.clone()).to_string()
    }

    pub fn len(&self) -> usize {
        self.file.index.channels_in_group(&self.name).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn channel_names(&self) -> &[String] {
        self.file.index.channels_in_group(&self.name)
    }

    pub fn channel(&self, name: &str) -> Result<Channel<'a>> {
        if self.file.index.channel(&self.name, name).is_none() {
            return Err(TdmsError::not_found_channel(&self.name, name));
        }
        let path = crate::metadata::ObjectPath::channel(self.name.clone(), name.to_string()).to_string();
        Ok(Channel {
            file: self.file,
            group: self.name.clone(),
            name: name.to_string(),
            path,
        })
    }

    pub fn channels(&self) -> impl Iterator<Item = Channel<'a>> + 'a {
        let file = self.file;
        let group = self.name.clone();
        file.index
            .channels_in_group(&group)
            .to_vec()
            .into_iter()
            .map(move |name| {
                let path = crate::metadata::ObjectPath::channel(group.clone(), name.clone()).to_string();
                Channel {
                    file,
                    group: group.clone(),
                    name,
                    path,
                }
            })
    }

    pub fn properties(&self) -> IndexMap<String, PropertyValue> {
        self.file.index.properties(&self.path())
    }
}

/// One channel's view over the owning `File` — name/path/properties are
/// always available; `data()` requires eager mode.
pub struct Channel<'a> {
    file: &'a File,
    group: String,
    name: String,
    path: String,
}

impl<'a> Channel<'a> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.file
            .channel_entry(&self.path)
            .map(|e| e.total_samples as usize)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> crate::types::DataType {
        let entry = self.file.channel_entry(&self.path).expect("channel resolved at construction");
        if entry.scaled_by_default {
            crate::types::DataType::DoubleFloat
        } else {
            entry.dtype
        }
    }

    pub fn properties(&self) -> IndexMap<String, PropertyValue> {
        self.file.index.properties(&self.path)
    }

    /// The fully materialized array — eager mode only. Scaled per the
    /// channel's default status; use `raw_data()` for the unscaled samples.
    pub fn data(&self) -> Result<ChannelData> {
        match &self.file.mode {
            Mode::Eager(map) => {
                let raw = map
                    .get(&self.path)
                    .ok_or_else(|| TdmsError::NotFound(format!("channel '{}'", self.path)))?;
                if self.scaled_by_default() {
                    let entry = self.file.channel_entry(&self.path)?;
                    raw.scaled(&entry.scaling)
                } else {
                    Ok(raw.clone())
                }
            }
            Mode::Lazy(_) => Err(TdmsError::StateError("Channel data has not been read".into())),
        }
    }

    /// Raw (unscaled) samples, requesting `scaled: false` either from the
    /// eager array or via a fresh lazy read.
    pub fn raw_data(&self) -> Result<ChannelData> {
        self.read_data(0, self.len() as i64, false)
    }

    /// Alias kept for callers that distinguish "raw" from "the scaler's own
    /// raw intermediate"; this engine has one raw representation per
    /// channel, so both names return the same array.
    pub fn raw_scaler_data(&self) -> Result<ChannelData> {
        self.raw_data()
    }

    /// Whether this channel's `NI_Scaling_Status` (or its absence) asks for
    /// scaled output by default — used by `index`, `slice`, and `iter`,
    /// which don't take an explicit `scaled` argument.
    fn scaled_by_default(&self) -> bool {
        self.file
            .channel_entry(&self.path)
            .map(|e| e.scaled_by_default)
            .unwrap_or(false)
    }

    /// `read_data(offset, length)` per the channel's lazy/eager window
    /// semantics: validated, truncated to the channel's length, freshly
    /// allocated.
    pub fn read_data(&self, offset: i64, length: i64, scaled: bool) -> Result<ChannelData> {
        match &self.file.mode {
            Mode::Lazy(source) => lazy::read_data(source, &self.file.index, &self.path, offset, length, scaled),
            Mode::Eager(map) => {
                let data = map
                    .get(&self.path)
                    .ok_or_else(|| TdmsError::NotFound(format!("channel '{}'", self.path)))?;
                if offset < 0 {
                    return Err(TdmsError::InvalidArgument("offset must be non-negative".into()));
                }
                if length < 0 {
                    return Err(TdmsError::InvalidArgument("length must be non-negative".into()));
                }
                let total = data.len() as u64;
                let lo = (offset as u64).min(total);
                let hi = lo.saturating_add(length as u64).min(total);
                let window = data.slice_range(lo as usize, hi as usize);
                let entry = self.file.channel_entry(&self.path)?;
                if scaled && !entry.scaling.is_empty() {
                    window.scaled(&entry.scaling)
                } else {
                    Ok(window)
                }
            }
        }
    }

    /// Integer indexing: negative indices normalize from the end; out of
    /// `[0, len)` raises `IndexOutOfRange`.
    pub fn index(&self, i: i64) -> Result<ChannelData> {
        let total = self.len() as i64;
        let normalized = if i < 0 { i + total } else { i };
        if normalized < 0 || normalized >= total {
            return Err(TdmsError::IndexOutOfRange);
        }
        self.read_data(normalized, 1, self.scaled_by_default())
    }

    /// Python-style `[start:stop:step]` slicing. `step == 0` raises
    /// `InvalidArgument`; out-of-range bounds clip rather than error.
    pub fn slice(&self, start: Option<i64>, stop: Option<i64>, step: i64) -> Result<ChannelData> {
        if step == 0 {
            return Err(TdmsError::InvalidArgument("Step size cannot be zero".into()));
        }
        let total = self.len() as i64;

        let normalize = |v: i64| -> i64 {
            if v < 0 {
                (v + total).max(0)
            } else {
                v.min(total)
            }
        };

        let (lo, hi) = if step > 0 {
            let lo = start.map(normalize).unwrap_or(0);
            let hi = stop.map(normalize).unwrap_or(total);
            (lo, hi.max(lo))
        } else {
            let lo = start.map(normalize).unwrap_or(total - 1).min(total - 1);
            let hi = stop.map(normalize).unwrap_or(-1);
            (hi + 1, lo + 1)
        };

        if lo >= hi {
            return Ok(ChannelData::empty_like(self.dtype()));
        }

        let forward = self.read_data(lo, hi - lo, self.scaled_by_default())?;
        if step == 1 {
            return Ok(forward);
        }
        if step == -1 {
            let indices: Vec<usize> = (0..forward.len()).rev().collect();
            return Ok(forward.gather(&indices));
        }

        let indices: Vec<usize> = if step > 0 {
            (0..forward.len()).step_by(step as usize).collect()
        } else {
            (0..forward.len()).rev().step_by((-step) as usize).collect()
        };
        Ok(forward.gather(&indices))
    }

    pub fn iter(&self) -> Result<ChannelData> {
        self.read_data(0, self.len() as i64, self.scaled_by_default())
    }

    pub fn data_chunks(&self) -> Result<lazy::DataChunks<'_>> {
        match &self.file.mode {
            Mode::Lazy(source) => lazy::DataChunks::for_channel(source, &self.file.index, &self.path),
            Mode::Eager(_) => Err(TdmsError::StateError(
                "data_chunks requires an open (lazy-mode) file".into(),
            )),
        }
    }

    /// Synthesizes a time axis from `wf_start_offset` + `wf_increment`
    /// properties, one value per sample.
    pub fn time_track(&self) -> Result<Vec<f64>> {
        let props = self.properties();
        let increment = props.get("wf_increment").and_then(|v| v.as_f64()).unwrap_or(1.0);
        let start = props.get("wf_start_offset").and_then(|v| v.as_f64()).unwrap_or(0.0);
        let total = self.len();
        Ok((0..total).map(|i| start + increment * i as f64).collect())
    }
}

/// File-level `data_chunks()`: every channel's chunks, in file order.
pub fn file_data_chunks<'a>(file: &'a File) -> Result<lazy::DataChunks<'a>> {
    match &file.mode {
        Mode::Lazy(source) => Ok(lazy::DataChunks::new(source, &file.index)),
        Mode::Eager(_) => Err(TdmsError::StateError(
            "data_chunks requires an open (lazy-mode) file".into(),
        )),
    }
}

pub fn open_path(path: impl AsRef<Path>, memmap_dir: Option<&Path>) -> Result<File> {
    File::open_path(path, memmap_dir)
}

pub fn open(source: ByteSource) -> Result<File> {
    File::open(source)
}

pub fn read_path(path: impl AsRef<Path>) -> Result<File> {
    File::read_path(path)
}

pub fn read(source: ByteSource) -> Result<File> {
    File::read(source)
}
