//! Format codecs and decoded values for display: the group/label table, layout source, and
//! one-line value summaries.

use std::fmt::{self, Write as _};

use crate::codec::{BitCodec, CodecError};
use crate::value::QaValue;

/// Group/label table: bits, shift, mask, then one line per labelled raw value.
pub fn format_table(codec: &BitCodec) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {} bits (max {})",
        codec.name().unwrap_or("<unnamed>"),
        codec.bit_width(),
        codec.max_value()
    );
    let _ = writeln!(out, "  {:<7} {:>5} {:>4} {:>6}  {:>4}  label", "bits", "shift", "len", "mask", "raw");
    for (index, group) in codec.groups().iter().enumerate() {
        let mut head = format!(
            "{:<7} {:>5} {:>4} {:>#6x}",
            group.range.to_string(),
            group.shift,
            group.len,
            group.mask
        );
        let mut labels = codec.label_infos().iter().filter(|l| l.group == index).peekable();
        if labels.peek().is_none() {
            let _ = writeln!(out, "  {}  {:>4}  -", head, "");
            continue;
        }
        for label in labels {
            let _ = writeln!(out, "  {}  {:>4}  {}", head, label.raw, label.name);
            head = format!("{:<7} {:>5} {:>4} {:>6}", "", "", "", "");
        }
    }
    out
}

/// The codec written back as layout source (see [`crate::parser::parse`]).
pub fn format_layout(codec: &BitCodec) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "layout {} : {} {{",
        codec.name().unwrap_or("unnamed"),
        codec.bit_width()
    );
    for (index, group) in codec.groups().iter().enumerate() {
        let entries: Vec<String> = codec
            .label_infos()
            .iter()
            .filter(|l| l.group == index)
            .map(|l| format!("{}: {}", l.raw, l.name))
            .collect();
        if entries.is_empty() {
            let _ = writeln!(out, "\t{}: {{}}", group.range);
        } else {
            let _ = writeln!(out, "\t{}: {{ {} }}", group.range, entries.join(", "));
        }
    }
    out.push_str("}\n");
    out
}

/// `value  binary  label, label, ...` with labels in definition order.
pub fn format_decoded<V: QaValue>(codec: &BitCodec, value: V) -> Result<String, CodecError> {
    let binary = codec.to_binary_string(value)?;
    let raw = codec.check_value(value)?;
    let labels: Vec<&str> = codec
        .label_infos()
        .iter()
        .filter(|l| l.is_set_in(raw))
        .map(|l| l.name.as_str())
        .collect();
    let labels = if labels.is_empty() {
        "-".to_string()
    } else {
        labels.join(", ")
    };
    Ok(format!("{}\t{}\t{}", raw, binary, labels))
}

impl fmt::Display for BitCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_table(self))
    }
}
