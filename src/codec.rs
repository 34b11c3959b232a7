//! Compiled bit table: decode packed QA values into labels and encode labels back into values.
//!
//! A [`BitCodec`] is built once from [`GroupDef`]s (or a [`LayoutDef`]) and never changes
//! afterwards. Construction validates the whole table up front, so every operation below works
//! on precomputed shifts and masks.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use crate::ast::{BitRange, GroupDef, LayoutDef};
use crate::value::{checked_raw, QaValue};

/// Widest supported integer.
pub const MAX_BIT_WIDTH: u32 = 64;

/// Collecting encoders (`encode_all`, `encode_and`, ...) refuse to build more than
/// `2^MAX_COLLECTED_FREE_BITS` values (128 MiB of `u64`). Walk larger results lazily with
/// [`BitCodec::consistent_values`], which has no limit.
pub const MAX_COLLECTED_FREE_BITS: u32 = 24;

/// Errors detected while compiling a table. No codec is produced when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("Invalid bit width {0} (expected 1..=64)")]
    InvalidBitWidth(u32),
    #[error("Invalid bit range {0:?} (expected \"bit\" or \"low-high\" with low <= high)")]
    InvalidRange(String),
    #[error("Bit range {range} does not fit in {bit_width} bits")]
    RangeOutOfBounds { range: BitRange, bit_width: u32 },
    #[error("Bit ranges {first} and {second} overlap")]
    OverlappingRange { first: BitRange, second: BitRange },
    #[error("Label {label:?} is used in group {first} and in group {second}")]
    DuplicateLabel {
        label: String,
        first: BitRange,
        second: BitRange,
    },
    #[error("Raw value {raw} of label {label:?} does not fit in group {range} (max {max})")]
    InvalidRawValue {
        label: String,
        raw: u64,
        range: BitRange,
        max: u64,
    },
    #[error("Raw value {raw} is listed twice in group {range}")]
    DuplicateRawValue { raw: u64, range: BitRange },
}

/// Errors returned by codec operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("Value {value} is out of range 0..={max}")]
    ValueOutOfRange { value: i128, max: u64 },
    #[error("Unknown label: {0}")]
    UnknownLabel(String),
    #[error("Labels {first:?} and {second:?} need different values in group {range}")]
    ConflictingLabels {
        first: String,
        second: String,
        range: BitRange,
    },
    #[error("Refusing to collect 2^{free_bits} values")]
    TooManyValues { free_bits: u32 },
}

/// One compiled group: where its bits sit and which raw values carry a label.
#[derive(Debug, Clone)]
pub struct BitGroup {
    pub range: BitRange,
    /// Right shift that brings the group down to bit 0 (`range.low`).
    pub shift: u32,
    /// Number of bits in the group.
    pub len: u32,
    /// `(1 << len) - 1`.
    pub mask: u64,
    values: BTreeMap<u64, usize>,
}

impl BitGroup {
    /// The group's raw value inside `value`.
    #[inline]
    pub fn extract(&self, value: u64) -> u64 {
        (value >> self.shift) & self.mask
    }

    /// The group's bits in place.
    pub fn field_mask(&self) -> u64 {
        self.mask << self.shift
    }

    /// Raw values that carry a label, ascending.
    pub fn raw_values(&self) -> impl Iterator<Item = u64> + '_ {
        self.values.keys().copied()
    }
}

/// Precomputed encode data for one label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelInfo {
    pub name: String,
    /// Index into [`BitCodec::groups`].
    pub group: usize,
    pub shift: u32,
    pub mask: u64,
    pub raw: u64,
}

impl LabelInfo {
    /// The label's raw value in place, every other bit zero.
    pub fn encoded(&self) -> u64 {
        self.raw << self.shift
    }

    pub fn field_mask(&self) -> u64 {
        self.mask << self.shift
    }

    #[inline]
    pub fn is_set_in(&self, value: u64) -> bool {
        (value >> self.shift) & self.mask == self.raw
    }
}

/// Immutable bit table with decode and encode operations.
#[derive(Debug, Clone)]
pub struct BitCodec {
    name: Option<String>,
    bit_width: u32,
    max_value: u64,
    groups: Vec<BitGroup>,
    labels: Vec<LabelInfo>,
    labels_by_name: HashMap<String, usize>,
}

#[inline]
fn low_mask(bits: u32) -> u64 {
    if bits >= u64::BITS {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

impl BitCodec {
    /// Compile a table of `bit_width` bits from `groups` (in any bit order).
    pub fn new<I>(bit_width: u32, groups: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = GroupDef>,
    {
        let defs: Vec<GroupDef> = groups.into_iter().collect();
        Self::compile(None, bit_width, &defs)
    }

    /// Compile a named layout (e.g. one block of a layout file).
    pub fn from_layout(layout: &LayoutDef) -> Result<Self, TableError> {
        Self::compile(Some(layout.name.clone()), layout.bit_width, &layout.groups)
    }

    fn compile(
        name: Option<String>,
        bit_width: u32,
        defs: &[GroupDef],
    ) -> Result<Self, TableError> {
        if bit_width == 0 || bit_width > MAX_BIT_WIDTH {
            return Err(TableError::InvalidBitWidth(bit_width));
        }

        let mut groups: Vec<BitGroup> = Vec::with_capacity(defs.len());
        let mut labels: Vec<LabelInfo> = Vec::new();
        let mut labels_by_name: HashMap<String, usize> = HashMap::new();

        for def in defs {
            let range = def.range;
            if range.high >= bit_width {
                return Err(TableError::RangeOutOfBounds { range, bit_width });
            }
            let len = range
                .len()
                .ok_or_else(|| TableError::InvalidRange(range.to_string()))?;
            if let Some(prev) = groups.iter().find(|g| g.range.overlaps(&range)) {
                return Err(TableError::OverlappingRange {
                    first: prev.range,
                    second: range,
                });
            }

            let index = groups.len();
            let mask = low_mask(len);
            let mut values = BTreeMap::new();

            for (raw, label) in &def.labels {
                if *raw > mask {
                    return Err(TableError::InvalidRawValue {
                        label: label.clone(),
                        raw: *raw,
                        range,
                        max: mask,
                    });
                }
                if values.contains_key(raw) {
                    return Err(TableError::DuplicateRawValue { raw: *raw, range });
                }
                if let Some(&existing) = labels_by_name.get(label) {
                    let owner = labels[existing].group;
                    let first = if owner == index { range } else { groups[owner].range };
                    return Err(TableError::DuplicateLabel {
                        label: label.clone(),
                        first,
                        second: range,
                    });
                }

                let label_index = labels.len();
                labels.push(LabelInfo {
                    name: label.clone(),
                    group: index,
                    shift: range.low,
                    mask,
                    raw: *raw,
                });
                labels_by_name.insert(label.clone(), label_index);
                values.insert(*raw, label_index);
            }

            groups.push(BitGroup {
                range,
                shift: range.low,
                len,
                mask,
                values,
            });
        }

        debug!(
            layout = name.as_deref().unwrap_or("<unnamed>"),
            bit_width,
            groups = groups.len(),
            labels = labels.len(),
            "compiled bit table"
        );

        Ok(BitCodec {
            name,
            bit_width,
            max_value: low_mask(bit_width),
            groups,
            labels,
            labels_by_name,
        })
    }

    /// Layout name, when compiled from a [`LayoutDef`].
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn bit_width(&self) -> u32 {
        self.bit_width
    }

    /// `(1 << bit_width) - 1`: the largest accepted input.
    pub fn max_value(&self) -> u64 {
        self.max_value
    }

    /// Groups in definition order.
    pub fn groups(&self) -> &[BitGroup] {
        &self.groups
    }

    /// Every label in definition order.
    pub fn labels(&self) -> impl Iterator<Item = &str> + '_ {
        self.labels.iter().map(|l| l.name.as_str())
    }

    /// Encode data of every label, in definition order.
    pub fn label_infos(&self) -> &[LabelInfo] {
        &self.labels
    }

    pub fn label_info(&self, label: &str) -> Option<&LabelInfo> {
        self.labels_by_name.get(label).map(|&i| &self.labels[i])
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.labels_by_name.contains_key(label)
    }

    fn lookup(&self, label: &str) -> Result<&LabelInfo, CodecError> {
        self.label_info(label)
            .ok_or_else(|| CodecError::UnknownLabel(label.to_string()))
    }

    pub(crate) fn check_value<V: QaValue>(&self, value: V) -> Result<u64, CodecError> {
        checked_raw(value, self.max_value).ok_or(CodecError::ValueOutOfRange {
            value: value.widen(),
            max: self.max_value,
        })
    }

    /// `value` as `bit_width` binary digits, most-significant first.
    pub fn to_binary_string<V: QaValue>(&self, value: V) -> Result<String, CodecError> {
        let value = self.check_value(value)?;
        Ok(format!("{:0width$b}", value, width = self.bit_width as usize))
    }

    /// Labels present in `value`. Groups whose raw value has no label contribute nothing.
    pub fn decode<V: QaValue>(&self, value: V) -> Result<BTreeSet<&str>, CodecError> {
        let value = self.check_value(value)?;
        Ok(self.decode_unchecked(value))
    }

    pub(crate) fn decode_unchecked(&self, value: u64) -> BTreeSet<&str> {
        self.groups
            .iter()
            .filter_map(|g| g.values.get(&g.extract(value)))
            .map(|&i| self.labels[i].name.as_str())
            .collect()
    }

    /// Whether `label` is present in `value`. Unknown labels are an error, not `false`.
    pub fn matches<V: QaValue>(&self, value: V, label: &str) -> Result<bool, CodecError> {
        let info = self.lookup(label)?;
        let value = self.check_value(value)?;
        Ok(info.is_set_in(value))
    }

    /// Smallest value carrying `label`: its raw value in place and every other group at raw 0.
    pub fn encode(&self, label: &str) -> Result<u64, CodecError> {
        Ok(self.lookup(label)?.encoded())
    }

    /// Every value in `0..=max_value` carrying `label`, ascending.
    pub fn encode_all(&self, label: &str) -> Result<Vec<u64>, CodecError> {
        collect_values(self.consistent_values(&[label])?)
    }

    /// Every value carrying both labels, ascending.
    pub fn encode_intersection(&self, first: &str, second: &str) -> Result<Vec<u64>, CodecError> {
        self.encode_and(&[first, second])
    }

    /// Every value carrying all of `labels`, ascending. No labels means every value.
    pub fn encode_and(&self, labels: &[&str]) -> Result<Vec<u64>, CodecError> {
        collect_values(self.consistent_values(labels)?)
    }

    /// Every value carrying at least one of `labels`, ascending and without repeats.
    pub fn encode_or(&self, labels: &[&str]) -> Result<Vec<u64>, CodecError> {
        let walks = labels
            .iter()
            .map(|label| self.consistent_values(&[*label]))
            .collect::<Result<Vec<_>, _>>()?;
        // bounded before dedup, so the sum of every walk must fit
        let total: u128 = walks.iter().map(|w| w.remaining).sum();
        if total > 1u128 << MAX_COLLECTED_FREE_BITS {
            return Err(CodecError::TooManyValues {
                free_bits: u128::BITS - (total - 1).leading_zeros(),
            });
        }
        let mut out = Vec::with_capacity(total as usize);
        for walk in walks {
            out.extend(walk);
        }
        out.sort_unstable();
        out.dedup();
        Ok(out)
    }

    /// Every value in `0..=max_value` carrying none of `labels`, ascending. Scans the whole
    /// domain, so tables wider than [`MAX_COLLECTED_FREE_BITS`] are refused.
    pub fn encode_not(&self, labels: &[&str]) -> Result<Vec<u64>, CodecError> {
        let infos = labels
            .iter()
            .map(|label| self.lookup(label))
            .collect::<Result<Vec<_>, _>>()?;
        if self.bit_width > MAX_COLLECTED_FREE_BITS {
            return Err(CodecError::TooManyValues {
                free_bits: self.bit_width,
            });
        }
        Ok((0..=self.max_value)
            .filter(|v| !infos.iter().any(|info| info.is_set_in(*v)))
            .collect())
    }

    /// Lazy ascending walk over every value carrying all of `labels`.
    ///
    /// The labels' groups are pinned to their raw values and the remaining bits enumerate
    /// every combination, so nothing outside the result is visited.
    pub fn consistent_values(&self, labels: &[&str]) -> Result<ConsistentValues, CodecError> {
        let mut chosen: Vec<&LabelInfo> = Vec::with_capacity(labels.len());
        let mut fixed = 0u64;
        let mut fixed_mask = 0u64;

        for label in labels {
            let info = self.lookup(label)?;
            if let Some(other) = chosen
                .iter()
                .find(|o| o.group == info.group && o.raw != info.raw)
            {
                return Err(CodecError::ConflictingLabels {
                    first: other.name.clone(),
                    second: info.name.clone(),
                    range: self.groups[info.group].range,
                });
            }
            fixed |= info.encoded();
            fixed_mask |= info.field_mask();
            chosen.push(info);
        }

        Ok(ConsistentValues::new(fixed, self.max_value & !fixed_mask))
    }
}

fn collect_values(values: ConsistentValues) -> Result<Vec<u64>, CodecError> {
    let free_bits = values.free_bits();
    if free_bits > MAX_COLLECTED_FREE_BITS {
        return Err(CodecError::TooManyValues { free_bits });
    }
    Ok(values.collect())
}

/// Ascending iterator over `fixed | s` for every sub-mask `s` of `free`.
#[derive(Debug, Clone)]
pub struct ConsistentValues {
    fixed: u64,
    free: u64,
    next: u64,
    remaining: u128,
}

impl ConsistentValues {
    fn new(fixed: u64, free: u64) -> Self {
        ConsistentValues {
            fixed,
            free,
            next: 0,
            remaining: 1u128 << free.count_ones(),
        }
    }

    /// Number of unconstrained bits; the walk yields `2^free_bits` values in total.
    pub fn free_bits(&self) -> u32 {
        self.free.count_ones()
    }
}

impl Iterator for ConsistentValues {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.remaining == 0 {
            return None;
        }
        let value = self.fixed | self.next;
        // Setting every non-free bit makes the carry of the increment skip over them.
        self.next = (self.next | !self.free).wrapping_add(1) & self.free;
        self.remaining -= 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modis_state() -> BitCodec {
        BitCodec::new(
            16,
            [
                GroupDef::new((0, 1), [(0, "clear"), (1, "cloud"), (2, "mix")]),
                GroupDef::new(2, [(0, "no_shadow"), (1, "shadow")]),
                GroupDef::new(
                    (6, 7),
                    [(0, "climatology"), (1, "low"), (2, "average"), (3, "high")],
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn precomputes_shift_and_mask() {
        let codec = modis_state();
        let g = &codec.groups()[2];
        assert_eq!((g.shift, g.len, g.mask), (6, 2, 0b11));
        assert_eq!(g.field_mask(), 0b1100_0000);
        assert_eq!(g.raw_values().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(codec.max_value(), 0xFFFF);

        let info = codec.label_info("average").unwrap();
        assert_eq!((info.group, info.shift, info.mask, info.raw), (2, 6, 0b11, 2));
    }

    #[test]
    fn labels_in_definition_order() {
        let labels: Vec<_> = modis_state().labels().map(str::to_string).collect();
        assert_eq!(
            labels,
            ["clear", "cloud", "mix", "no_shadow", "shadow", "climatology", "low", "average", "high"]
        );
    }

    #[test]
    fn rejects_bad_width() {
        assert_eq!(
            BitCodec::new(0, Vec::<GroupDef>::new()).unwrap_err(),
            TableError::InvalidBitWidth(0)
        );
        assert_eq!(
            BitCodec::new(65, Vec::<GroupDef>::new()).unwrap_err(),
            TableError::InvalidBitWidth(65)
        );
    }

    #[test]
    fn rejects_reversed_range() {
        let err = BitCodec::new(16, [GroupDef::new((3, 2), [(1, "x")])]).unwrap_err();
        assert_eq!(err, TableError::InvalidRange("3-2".to_string()));
    }

    #[test]
    fn rejects_range_past_width() {
        let err = BitCodec::new(8, [GroupDef::new((6, 8), [(1, "x")])]).unwrap_err();
        assert_eq!(
            err,
            TableError::RangeOutOfBounds {
                range: BitRange::new(6, 8),
                bit_width: 8
            }
        );
    }

    #[test]
    fn rejects_overlap_in_any_order() {
        let err = BitCodec::new(
            16,
            [
                GroupDef::new(2, [(1, "shadow")]),
                GroupDef::new((0, 2), [(1, "cloud")]),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            TableError::OverlappingRange {
                first: BitRange::bit(2),
                second: BitRange::new(0, 2)
            }
        );
    }

    #[test]
    fn rejects_duplicate_label_across_groups() {
        let err = BitCodec::new(
            16,
            [
                GroupDef::new(3, [(1, "snow")]),
                GroupDef::new((9, 10), [(3, "snow")]),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            TableError::DuplicateLabel {
                label: "snow".to_string(),
                first: BitRange::bit(3),
                second: BitRange::new(9, 10)
            }
        );
    }

    #[test]
    fn rejects_duplicate_label_inside_group() {
        let err = BitCodec::new(16, [GroupDef::new((0, 1), [(1, "a"), (2, "a")])]).unwrap_err();
        assert!(matches!(err, TableError::DuplicateLabel { first, second, .. } if first == second));
    }

    #[test]
    fn rejects_raw_value_wider_than_group() {
        let err = BitCodec::new(16, [GroupDef::new((4, 5), [(4, "too_big")])]).unwrap_err();
        assert_eq!(
            err,
            TableError::InvalidRawValue {
                label: "too_big".to_string(),
                raw: 4,
                range: BitRange::new(4, 5),
                max: 3
            }
        );
    }

    #[test]
    fn rejects_repeated_raw_value() {
        let err = BitCodec::new(16, [GroupDef::new(1, [(1, "a"), (1, "b")])]).unwrap_err();
        assert_eq!(
            err,
            TableError::DuplicateRawValue {
                raw: 1,
                range: BitRange::bit(1)
            }
        );
    }

    #[test]
    fn group_without_labels_still_occupies_bits() {
        let err = BitCodec::new(
            8,
            [GroupDef::new((0, 3), Vec::<(u64, String)>::new()), GroupDef::new(3, [(1, "x")])],
        )
        .unwrap_err();
        assert!(matches!(err, TableError::OverlappingRange { .. }));
    }

    #[test]
    fn binary_string_is_fixed_width() {
        let codec = modis_state();
        assert_eq!(codec.to_binary_string(204).unwrap(), "0000000011001100");
        assert_eq!(codec.to_binary_string(0u8).unwrap(), "0000000000000000");
        assert_eq!(codec.to_binary_string(0xFFFFu16).unwrap(), "1111111111111111");
        assert!(codec.to_binary_string(0x1_0000).is_err());
    }

    #[test]
    fn decode_rejects_out_of_range() {
        let codec = modis_state();
        assert_eq!(
            codec.decode(-1).unwrap_err(),
            CodecError::ValueOutOfRange { value: -1, max: 0xFFFF }
        );
        assert_eq!(
            codec.decode(65536).unwrap_err(),
            CodecError::ValueOutOfRange { value: 65536, max: 0xFFFF }
        );
    }

    #[test]
    fn unmapped_raw_value_contributes_nothing() {
        let codec = modis_state();
        // bits 0-1 = 3 has no label
        let labels = codec.decode(0b11).unwrap();
        assert_eq!(labels, BTreeSet::from(["no_shadow", "climatology"]));
    }

    #[test]
    fn matches_checks_label_before_value() {
        let codec = modis_state();
        assert_eq!(
            codec.matches(-5, "nope").unwrap_err(),
            CodecError::UnknownLabel("nope".to_string())
        );
        assert!(matches!(
            codec.matches(-5, "cloud").unwrap_err(),
            CodecError::ValueOutOfRange { .. }
        ));
    }

    #[test]
    fn encode_and_conflict_in_same_group() {
        let codec = modis_state();
        assert_eq!(
            codec.encode_and(&["cloud", "mix"]).unwrap_err(),
            CodecError::ConflictingLabels {
                first: "cloud".to_string(),
                second: "mix".to_string(),
                range: BitRange::new(0, 1)
            }
        );
        // the same label twice is not a conflict
        assert_eq!(codec.encode_and(&["shadow", "shadow"]).unwrap().len(), 1 << 15);
    }

    #[test]
    fn encode_and_without_labels_is_everything() {
        let codec = BitCodec::new(4, [GroupDef::new(0, [(1, "a")])]).unwrap();
        assert_eq!(codec.encode_and(&[]).unwrap(), (0..16).collect::<Vec<u64>>());
    }

    #[test]
    fn encode_or_and_not_partition_the_domain() {
        let codec = BitCodec::new(
            4,
            [
                GroupDef::new(0, [(1, "a")]),
                GroupDef::new((2, 3), [(2, "b"), (0, "c")]),
            ],
        )
        .unwrap();
        let or = codec.encode_or(&["a", "b"]).unwrap();
        let not = codec.encode_not(&["a", "b"]).unwrap();
        assert_eq!(or, vec![1, 3, 5, 7, 8, 9, 10, 11, 13, 15]);
        assert_eq!(not, vec![0, 2, 4, 6, 12, 14]);
        assert_eq!(or.len() + not.len(), 16);
    }

    #[test]
    fn rejects_unbounded_range_without_overflow() {
        let err = BitCodec::new(16, [GroupDef::new((0, u32::MAX), [(1, "x")])]).unwrap_err();
        assert_eq!(
            err,
            TableError::RangeOutOfBounds {
                range: BitRange::new(0, u32::MAX),
                bit_width: 16
            }
        );
        let err = BitCodec::new(16, [GroupDef::new((5, 2), [(1, "x")])]).unwrap_err();
        assert_eq!(err, TableError::InvalidRange("5-2".to_string()));
    }

    #[test]
    fn encode_intersection_conflict_in_same_group() {
        let codec = modis_state();
        assert_eq!(
            codec.encode_intersection("cloud", "mix").unwrap_err(),
            CodecError::ConflictingLabels {
                first: "cloud".to_string(),
                second: "mix".to_string(),
                range: BitRange::new(0, 1)
            }
        );
        assert_eq!(
            codec.encode_intersection("cloud", "fog").unwrap_err(),
            CodecError::UnknownLabel("fog".to_string())
        );
    }

    #[test]
    fn collecting_encoders_refuse_oversized_results() {
        let codec = BitCodec::new(33, [GroupDef::new(32, [(1, "flag")])]).unwrap();
        assert_eq!(
            codec.encode_all("flag").unwrap_err(),
            CodecError::TooManyValues { free_bits: 32 }
        );
        assert_eq!(
            codec.encode_intersection("flag", "flag").unwrap_err(),
            CodecError::TooManyValues { free_bits: 32 }
        );
        assert_eq!(
            codec.encode_or(&["flag"]).unwrap_err(),
            CodecError::TooManyValues { free_bits: 32 }
        );
        assert_eq!(
            codec.encode_not(&["flag"]).unwrap_err(),
            CodecError::TooManyValues { free_bits: 33 }
        );
        // the lazy walk still works
        let first: Vec<u64> = codec.consistent_values(&["flag"]).unwrap().take(2).collect();
        assert_eq!(first, vec![1 << 32, (1 << 32) | 1]);
    }

    #[test]
    fn encode_or_bounds_the_sum_of_its_labels() {
        let codec = BitCodec::new(
            25,
            [GroupDef::new(0, [(1, "a")]), GroupDef::new(1, [(1, "b")])],
        )
        .unwrap();
        assert_eq!(codec.encode_all("a").unwrap().len(), 1 << 24);
        assert_eq!(
            codec.encode_or(&["a", "b"]).unwrap_err(),
            CodecError::TooManyValues { free_bits: 25 }
        );
        assert_eq!(codec.encode_or(&[]).unwrap(), Vec::<u64>::new());
    }

    #[test]
    fn encode_not_unknown_label() {
        let codec = modis_state();
        assert_eq!(
            codec.encode_not(&["clear", "fog"]).unwrap_err(),
            CodecError::UnknownLabel("fog".to_string())
        );
    }

    #[test]
    fn full_width_table() {
        let codec = BitCodec::new(
            64,
            [
                GroupDef::new(63, [(1, "top")]),
                GroupDef::new((0, 62), [(0, "empty")]),
            ],
        )
        .unwrap();
        assert_eq!(codec.max_value(), u64::MAX);
        assert_eq!(codec.encode("top").unwrap(), 1 << 63);
        assert_eq!(codec.decode(u64::MAX).unwrap(), BTreeSet::from(["top"]));
        assert_eq!(codec.to_binary_string(1u64 << 63).unwrap().len(), 64);

        let all = codec.consistent_values(&["top"]).unwrap();
        assert_eq!(all.free_bits(), 63);
        let first: Vec<u64> = all.take(3).collect();
        assert_eq!(first, vec![1 << 63, (1 << 63) | 1, (1 << 63) | 2]);

        assert_eq!(
            codec.encode_all("top").unwrap_err(),
            CodecError::TooManyValues { free_bits: 63 }
        );
        assert_eq!(
            codec.encode_not(&["top"]).unwrap_err(),
            CodecError::TooManyValues { free_bits: 64 }
        );
    }

    #[test]
    fn consistent_values_size_hint() {
        let codec = modis_state();
        let values = codec.consistent_values(&["high", "mix"]).unwrap();
        assert_eq!(values.size_hint(), (1 << 12, Some(1 << 12)));
        assert_eq!(values.count(), 1 << 12);

        let everything = BitCodec::new(64, Vec::<GroupDef>::new()).unwrap().consistent_values(&[]).unwrap();
        assert_eq!(everything.free_bits(), 64);
        assert_eq!(everything.size_hint().1, None);
    }

    #[test]
    fn codec_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BitCodec>();
    }
}
