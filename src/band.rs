//! Whole-band decoding: one boolean mask per label over an n-dimensional raster.
//!
//! Every cell is range-checked once, then each label's mask is a single elementwise
//! shift/mask/compare over the band. With the `parallel` feature the per-label transform runs
//! on rayon through ndarray.
//!
//! [`read_samples`] turns raw band buffers (as dumped from a GeoTIFF strip or an export) into
//! integers.

use std::io::Cursor;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use ndarray::{Array, ArrayBase, Data, Dimension};
use tracing::debug;

use crate::codec::{BitCodec, CodecError, LabelInfo};
use crate::value::QaValue;

/// Per-label masks, in the codec's label order.
#[derive(Debug, Clone)]
pub struct BandMasks<D: Dimension> {
    masks: Vec<(String, Array<bool, D>)>,
}

impl<D: Dimension> BandMasks<D> {
    pub fn get(&self, label: &str) -> Option<&Array<bool, D>> {
        self.masks
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, mask)| mask)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Array<bool, D>)> + '_ {
        self.masks.iter().map(|(name, mask)| (name.as_str(), mask))
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    pub fn into_inner(self) -> Vec<(String, Array<bool, D>)> {
        self.masks
    }
}

/// Validate every cell and widen the band to `u64`.
fn checked_band<S, D>(codec: &BitCodec, band: &ArrayBase<S, D>) -> Result<Array<u64, D>, CodecError>
where
    S: Data,
    S::Elem: QaValue,
    D: Dimension,
{
    for &v in band.iter() {
        codec.check_value(v)?;
    }
    Ok(band.mapv(|v| v.widen() as u64))
}

#[cfg(not(feature = "parallel"))]
fn mask_of<D: Dimension>(raw: &Array<u64, D>, info: &LabelInfo) -> Array<bool, D> {
    raw.mapv(|v| info.is_set_in(v))
}

#[cfg(feature = "parallel")]
fn mask_of<D: Dimension>(raw: &Array<u64, D>, info: &LabelInfo) -> Array<bool, D> {
    ndarray::Zip::from(raw).par_map_collect(|&v| info.is_set_in(v))
}

/// One mask per label: `true` where the cell carries that label.
pub fn decode_band<S, D>(codec: &BitCodec, band: &ArrayBase<S, D>) -> Result<BandMasks<D>, CodecError>
where
    S: Data,
    S::Elem: QaValue,
    D: Dimension,
{
    let raw = checked_band(codec, band)?;
    let masks = codec
        .label_infos()
        .iter()
        .map(|info| (info.name.clone(), mask_of(&raw, info)))
        .collect::<Vec<_>>();
    debug!(cells = raw.len(), labels = masks.len(), "decoded band");
    Ok(BandMasks { masks })
}

/// Mask of a single label.
pub fn label_mask<S, D>(
    codec: &BitCodec,
    band: &ArrayBase<S, D>,
    label: &str,
) -> Result<Array<bool, D>, CodecError>
where
    S: Data,
    S::Elem: QaValue,
    D: Dimension,
{
    let info = codec
        .label_info(label)
        .ok_or_else(|| CodecError::UnknownLabel(label.to_string()))?;
    let raw = checked_band(codec, band)?;
    Ok(mask_of(&raw, info))
}

/// Number of cells carrying each label, in the codec's label order.
pub fn label_counts<S, D>(codec: &BitCodec, band: &ArrayBase<S, D>) -> Result<Vec<(String, usize)>, CodecError>
where
    S: Data,
    S::Elem: QaValue,
    D: Dimension,
{
    Ok(decode_band(codec, band)?
        .into_inner()
        .into_iter()
        .map(|(label, mask)| {
            let count = mask.iter().filter(|&&set| set).count();
            (label, count)
        })
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    U8,
    U16,
    U32,
    U64,
}

impl SampleFormat {
    /// Bytes per sample.
    pub fn size(self) -> usize {
        match self {
            SampleFormat::U8 => 1,
            SampleFormat::U16 => 2,
            SampleFormat::U32 => 4,
            SampleFormat::U64 => 8,
        }
    }
}

impl std::str::FromStr for SampleFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "u8" => Ok(SampleFormat::U8),
            "u16" => Ok(SampleFormat::U16),
            "u32" => Ok(SampleFormat::U32),
            "u64" => Ok(SampleFormat::U64),
            other => Err(format!("unknown sample format {:?} (expected u8, u16, u32 or u64)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Endianness {
    Big,
    Little,
}

#[derive(Debug, thiserror::Error)]
pub enum BandError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("{len} bytes is not a whole number of {size}-byte samples")]
    TrailingBytes { len: usize, size: usize },
}

/// Read a raw buffer of unsigned samples.
pub fn read_samples(
    bytes: &[u8],
    format: SampleFormat,
    endianness: Endianness,
) -> Result<Vec<u64>, BandError> {
    let size = format.size();
    if bytes.len() % size != 0 {
        return Err(BandError::TrailingBytes {
            len: bytes.len(),
            size,
        });
    }

    let count = bytes.len() / size;
    let mut r = Cursor::new(bytes);
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let v = match (format, endianness) {
            (SampleFormat::U8, _) => r.read_u8()? as u64,
            (SampleFormat::U16, Endianness::Big) => r.read_u16::<BigEndian>()? as u64,
            (SampleFormat::U16, Endianness::Little) => r.read_u16::<LittleEndian>()? as u64,
            (SampleFormat::U32, Endianness::Big) => r.read_u32::<BigEndian>()? as u64,
            (SampleFormat::U32, Endianness::Little) => r.read_u32::<LittleEndian>()? as u64,
            (SampleFormat::U64, Endianness::Big) => r.read_u64::<BigEndian>()?,
            (SampleFormat::U64, Endianness::Little) => r.read_u64::<LittleEndian>()?,
        };
        out.push(v);
    }
    Ok(out)
}
