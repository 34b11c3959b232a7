//! Definition types for bit layouts: what a caller (or a layout file) hands to the codec.
//!
//! Range strings (`"2"`, `"6-7"`) are parsed here, once. Everything past
//! [`crate::codec::BitCodec`] construction works on integers only.

use std::fmt;
use std::str::FromStr;

use crate::codec::TableError;

/// Inclusive bit-index range `[low, high]`; bit 0 is the least-significant bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BitRange {
    pub low: u32,
    pub high: u32,
}

impl BitRange {
    pub fn new(low: u32, high: u32) -> Self {
        BitRange { low, high }
    }

    /// A range covering one bit.
    pub fn bit(index: u32) -> Self {
        BitRange { low: index, high: index }
    }

    /// Number of bits covered, `None` for a reversed range or one spanning every `u32` index.
    pub fn len(&self) -> Option<u32> {
        self.high.checked_sub(self.low)?.checked_add(1)
    }

    pub fn overlaps(&self, other: &BitRange) -> bool {
        self.low <= other.high && other.low <= self.high
    }
}

impl From<u32> for BitRange {
    fn from(index: u32) -> Self {
        BitRange::bit(index)
    }
}

impl From<(u32, u32)> for BitRange {
    fn from((low, high): (u32, u32)) -> Self {
        BitRange::new(low, high)
    }
}

impl FromStr for BitRange {
    type Err = TableError;

    /// Accepts `"bit"` or `"low-high"`, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TableError::InvalidRange(s.to_string());
        let s = s.trim();
        let (low, high) = match s.split_once('-') {
            Some((low, high)) => (low.trim(), high.trim()),
            None => (s, s),
        };
        let low: u32 = low.parse().map_err(|_| invalid())?;
        let high: u32 = high.parse().map_err(|_| invalid())?;
        if low > high {
            return Err(invalid());
        }
        Ok(BitRange { low, high })
    }
}

impl fmt::Display for BitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.low == self.high {
            write!(f, "{}", self.low)
        } else {
            write!(f, "{}-{}", self.low, self.high)
        }
    }
}

/// One bit group as defined by the caller: a range plus the raw values that carry a label.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupDef {
    pub range: BitRange,
    /// `(raw value, label)` pairs in definition order.
    pub labels: Vec<(u64, String)>,
}

impl GroupDef {
    pub fn new<R, L, S>(range: R, labels: L) -> Self
    where
        R: Into<BitRange>,
        L: IntoIterator<Item = (u64, S)>,
        S: Into<String>,
    {
        GroupDef {
            range: range.into(),
            labels: labels.into_iter().map(|(raw, label)| (raw, label.into())).collect(),
        }
    }

    /// Same as [`GroupDef::new`] with the range given as `"bit"` or `"low-high"`.
    pub fn parse<L, S>(range: &str, labels: L) -> Result<Self, TableError>
    where
        L: IntoIterator<Item = (u64, S)>,
        S: Into<String>,
    {
        Ok(GroupDef::new(range.parse::<BitRange>()?, labels))
    }
}

/// A named layout: the full bit table of one product's QA band.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutDef {
    pub name: String,
    pub bit_width: u32,
    pub groups: Vec<GroupDef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_bit() {
        assert_eq!("2".parse::<BitRange>().unwrap(), BitRange::bit(2));
    }

    #[test]
    fn parse_range_with_spaces() {
        assert_eq!(" 6 - 7 ".parse::<BitRange>().unwrap(), BitRange::new(6, 7));
    }

    #[test]
    fn parse_rejects_garbage_and_reversed() {
        for bad in ["", "a", "1-", "-1", "3-2", "1-2-3"] {
            assert_eq!(
                bad.parse::<BitRange>().unwrap_err(),
                TableError::InvalidRange(bad.to_string()),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn display_matches_input_form() {
        assert_eq!(BitRange::bit(13).to_string(), "13");
        assert_eq!(BitRange::new(8, 9).to_string(), "8-9");
    }

    #[test]
    fn len_of_reversed_or_unbounded_range() {
        assert_eq!(BitRange::new(6, 7).len(), Some(2));
        assert_eq!(BitRange::bit(0).len(), Some(1));
        assert_eq!(BitRange::new(5, 2).len(), None);
        assert_eq!(BitRange::new(0, u32::MAX).len(), None);
        assert_eq!(BitRange::new(1, u32::MAX).len(), Some(u32::MAX));
    }

    #[test]
    fn overlap_is_inclusive() {
        let a = BitRange::new(0, 2);
        assert!(a.overlaps(&BitRange::bit(2)));
        assert!(!a.overlaps(&BitRange::bit(3)));
        assert!(BitRange::new(4, 9).overlaps(&BitRange::new(6, 7)));
    }

    #[test]
    fn group_def_from_str_range() {
        let g = GroupDef::parse("0-1", [(0, "clear"), (1, "cloud")]).unwrap();
        assert_eq!(g.range, BitRange::new(0, 1));
        assert_eq!(g.labels[1], (1, "cloud".to_string()));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn layout_def_from_json() {
        let json = r#"{
            "name": "s2",
            "bit_width": 16,
            "groups": [{ "range": { "low": 10, "high": 10 }, "labels": [[1, "cloud"]] }]
        }"#;
        let layout: LayoutDef = serde_json::from_str(json).unwrap();
        assert_eq!(layout.groups[0], GroupDef::new(10, [(1, "cloud")]));
    }
}
