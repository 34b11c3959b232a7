//! # qabits: packed categorical bit-fields of satellite QA bands
//!
//! Quality bands (MODIS `state_1km`, Landsat `pixel_qa`, Sentinel-2 `QA60`, ...) pack several
//! small categorical fields into one integer per pixel. A [`BitCodec`] is compiled from a table
//! of bit groups, each an inclusive bit range with labelled raw values, and then
//!
//! - decodes a value into the set of labels it carries,
//! - tests a value against one label,
//! - encodes a label (exclusively, or as every consistent value) and combinations of labels,
//! - decodes whole bands into per-label masks ([`band`]).
//!
//! ## Layout text
//!
//! ```text
//! layout modis_state : 16 {
//!     0-1: { 0: clear, 1: cloud, 2: mix }
//!     2:   { 0: no_shadow, 1: shadow }
//!     6-7: { 0: climatology, 1: low, 2: average, 3: high }
//! }
//! ```
//!
//! ## Usage
//!
//! ```
//! use qabits::{BitCodec, LayoutSet};
//!
//! let set = LayoutSet::from_source(
//!     "layout modis_state : 16 {
//!         0-1: { 0: clear, 1: cloud, 2: mix }
//!         2:   { 0: no_shadow, 1: shadow }
//!         6-7: { 0: climatology, 1: low, 2: average, 3: high }
//!     }",
//! )?;
//! let codec: &BitCodec = set.require("modis_state")?;
//! assert_eq!(codec.encode("shadow")?, 4);
//! assert!(codec.matches(204, "high")?);
//! assert_eq!(codec.decode(204)?.into_iter().collect::<Vec<_>>(), ["clear", "high", "shadow"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Bundled product tables are available through [`Preset`].

pub mod ast;
pub mod band;
pub mod codec;
pub mod dump;
pub mod layouts;
pub mod parser;
pub mod value;

pub use ast::{BitRange, GroupDef, LayoutDef};
pub use band::{decode_band, label_counts, label_mask, BandMasks};
pub use codec::{BitCodec, CodecError, ConsistentValues, LabelInfo, TableError};
pub use layouts::{LayoutSet, LoadError, Preset};
pub use parser::{parse, ParseError};
pub use value::QaValue;
