//! Integer sample types accepted by the codec.
//!
//! QA bands come in several storage types; some products ship them signed. Every sample is
//! widened to `i128` so that negative inputs can be reported instead of wrapping.

/// A single QA sample (one pixel value of a quality band).
pub trait QaValue: Copy {
    fn widen(self) -> i128;
}

macro_rules! impl_qa_value {
    ($($t:ty),*) => {
        $(
            impl QaValue for $t {
                #[inline]
                fn widen(self) -> i128 {
                    self as i128
                }
            }
        )*
    };
}

impl_qa_value!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, i128);

/// Returns the sample as `u64` when it lies in `0..=max`.
#[inline]
pub(crate) fn checked_raw<V: QaValue>(value: V, max: u64) -> Option<u64> {
    u64::try_from(value.widen()).ok().filter(|v| *v <= max)
}
