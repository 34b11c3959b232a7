//! Named layouts: compile whole layout files into codecs, and the bundled product presets.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::ast::LayoutDef;
use crate::codec::{BitCodec, TableError};
use crate::parser::{parse, ParseError};

/// Layout source of the bundled presets.
pub const PRESETS_SOURCE: &str = include_str!("presets.bits");

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("Layout {layout}: {source}")]
    Table {
        layout: String,
        #[source]
        source: TableError,
    },
    #[error("Duplicate layout name: {0}")]
    DuplicateLayout(String),
    #[error("Unknown layout: {0}")]
    UnknownLayout(String),
}

fn compile_layout(layout: &LayoutDef) -> Result<BitCodec, LoadError> {
    BitCodec::from_layout(layout).map_err(|source| LoadError::Table {
        layout: layout.name.clone(),
        source,
    })
}

/// Compiled layouts looked up by name.
#[derive(Debug, Clone)]
pub struct LayoutSet {
    codecs: Vec<BitCodec>,
    by_name: HashMap<String, usize>,
}

impl LayoutSet {
    pub fn from_layouts(layouts: &[LayoutDef]) -> Result<Self, LoadError> {
        let mut codecs = Vec::with_capacity(layouts.len());
        let mut by_name = HashMap::new();
        for (i, layout) in layouts.iter().enumerate() {
            if by_name.insert(layout.name.clone(), i).is_some() {
                return Err(LoadError::DuplicateLayout(layout.name.clone()));
            }
            codecs.push(compile_layout(layout)?);
        }
        debug!(layouts = codecs.len(), "compiled layout set");
        Ok(LayoutSet { codecs, by_name })
    }

    pub fn from_source(source: &str) -> Result<Self, LoadError> {
        Self::from_layouts(&parse(source)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading layouts");
        let source = std::fs::read_to_string(path)?;
        Self::from_source(&source)
    }

    /// Every bundled preset.
    pub fn builtin() -> Result<Self, LoadError> {
        Self::from_source(PRESETS_SOURCE)
    }

    pub fn get(&self, name: &str) -> Option<&BitCodec> {
        self.by_name.get(name).map(|&i| &self.codecs[i])
    }

    /// Like [`LayoutSet::get`], with an error naming the missing layout.
    pub fn require(&self, name: &str) -> Result<&BitCodec, LoadError> {
        self.get(name)
            .ok_or_else(|| LoadError::UnknownLayout(name.to_string()))
    }

    /// Layout names in source order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.codecs.iter().filter_map(BitCodec::name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BitCodec> + '_ {
        self.codecs.iter()
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}

/// Bundled QA layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// MODIS MOD09GA/MYD09GA `state_1km`.
    Modis09gaState,
    /// MODIS MOD13Q1/MYD13Q1 `DetailedQA`.
    Modis13q1DetailedQa,
    /// Landsat 4-7 SR `sr_cloud_qa` (8 bits).
    LandsatSrCloudQa,
    /// Landsat 4-7 SR `pixel_qa`.
    LandsatSrPixelQa,
    /// Landsat 8 SR `pixel_qa`.
    Landsat8SrPixelQa,
    /// Landsat 4-7 TOA `BQA`.
    LandsatToaBqa,
    /// Landsat 8 TOA `BQA`.
    Landsat8ToaBqa,
    /// Landsat 8 Collection 2 `QA_PIXEL`.
    Landsat8C2QaPixel,
    /// Sentinel-2 `QA60`.
    Sentinel2Qa60,
}

impl Preset {
    pub const ALL: [Preset; 9] = [
        Preset::Modis09gaState,
        Preset::Modis13q1DetailedQa,
        Preset::LandsatSrCloudQa,
        Preset::LandsatSrPixelQa,
        Preset::Landsat8SrPixelQa,
        Preset::LandsatToaBqa,
        Preset::Landsat8ToaBqa,
        Preset::Landsat8C2QaPixel,
        Preset::Sentinel2Qa60,
    ];

    /// Layout name in [`PRESETS_SOURCE`].
    pub fn name(self) -> &'static str {
        match self {
            Preset::Modis09gaState => "modis_09ga_state",
            Preset::Modis13q1DetailedQa => "modis_13q1_detailed_qa",
            Preset::LandsatSrCloudQa => "landsat_sr_cloud_qa",
            Preset::LandsatSrPixelQa => "landsat_sr_pixel_qa",
            Preset::Landsat8SrPixelQa => "landsat8_sr_pixel_qa",
            Preset::LandsatToaBqa => "landsat_toa_bqa",
            Preset::Landsat8ToaBqa => "landsat8_toa_bqa",
            Preset::Landsat8C2QaPixel => "landsat8_c2_qa_pixel",
            Preset::Sentinel2Qa60 => "sentinel2_qa60",
        }
    }

    pub fn codec(self) -> Result<BitCodec, LoadError> {
        let layouts = parse(PRESETS_SOURCE)?;
        let layout = layouts
            .iter()
            .find(|l| l.name == self.name())
            .ok_or_else(|| LoadError::UnknownLayout(self.name().to_string()))?;
        compile_layout(layout)
    }
}

impl FromStr for Preset {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| LoadError::UnknownLayout(s.to_string()))
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
