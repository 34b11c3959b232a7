//! Layout fuzz target: arbitrary text through the parser and table compiler, then a decode of
//! every layout that compiles. Nothing may panic; errors are expected.
//! Build with: cargo fuzz run layout_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let (value, text) = match data.split_first_chunk::<8>() {
        Some((head, rest)) => (u64::from_le_bytes(*head), rest),
        None => return,
    };
    let Ok(source) = std::str::from_utf8(text) else {
        return;
    };
    let Ok(set) = qabits::LayoutSet::from_source(source) else {
        return;
    };
    for codec in set.iter() {
        let _ = codec.decode(value);
        let _ = codec.to_binary_string(value);
        for label in codec.labels() {
            let _ = codec.encode(label);
            let _ = codec.consistent_values(&[label]).map(|walk| walk.take(64).count());
        }
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run layout_fuzz");
}
