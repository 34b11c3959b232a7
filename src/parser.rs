//! Parse layout source into [`LayoutDef`]s using PEST.
//!
//! The parser only builds definitions. Table rules (overlaps, label uniqueness, raw values
//! that fit their group) are checked when a definition is compiled into a
//! [`crate::codec::BitCodec`].

use crate::ast::*;
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct LayoutParser;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Parse error: {0}")]
    Syntax(String),
    #[error("Malformed layout: {0}")]
    Malformed(String),
}

/// Parse layout source into definitions, in source order.
pub fn parse(source: &str) -> Result<Vec<LayoutDef>, ParseError> {
    let pairs = LayoutParser::parse(Rule::file, source)
        .map_err(|e| ParseError::Syntax(e.to_string()))?;
    let file = pairs
        .into_iter()
        .next()
        .ok_or_else(|| ParseError::Malformed("empty parse".to_string()))?;

    let mut layouts = Vec::new();
    for inner in file.into_inner() {
        if inner.as_rule() == Rule::layout {
            layouts.push(build_layout(inner)?);
        }
    }
    Ok(layouts)
}

fn build_layout(pair: pest::iterators::Pair<Rule>) -> Result<LayoutDef, ParseError> {
    let mut name = String::new();
    let mut bit_width = None;
    let mut groups = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::ident => name = inner.as_str().to_string(),
            Rule::bit_width => {
                bit_width = Some(parse_number::<u32>(inner.as_str(), "bit width")?);
            }
            Rule::group => groups.push(build_group(inner)?),
            _ => {}
        }
    }

    if name.is_empty() {
        return Err(ParseError::Malformed("layout: missing name".to_string()));
    }
    let bit_width = bit_width
        .ok_or_else(|| ParseError::Malformed(format!("layout {}: missing bit width", name)))?;
    Ok(LayoutDef {
        name,
        bit_width,
        groups,
    })
}

fn build_group(pair: pest::iterators::Pair<Rule>) -> Result<GroupDef, ParseError> {
    let mut range = None;
    let mut labels = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::bit_range => range = Some(build_bit_range(inner)?),
            Rule::label_entry => {
                let mut it = inner.into_inner();
                let raw = it
                    .next()
                    .ok_or_else(|| ParseError::Malformed("label entry: missing raw value".to_string()))?;
                let label = it
                    .next()
                    .ok_or_else(|| ParseError::Malformed("label entry: missing label".to_string()))?;
                labels.push((parse_raw_value(raw.as_str())?, label.as_str().to_string()));
            }
            _ => {}
        }
    }

    Ok(GroupDef {
        range: range.ok_or_else(|| ParseError::Malformed("group: missing bit range".to_string()))?,
        labels,
    })
}

fn build_bit_range(pair: pest::iterators::Pair<Rule>) -> Result<BitRange, ParseError> {
    let bits = pair
        .into_inner()
        .map(|p| parse_number::<u32>(p.as_str(), "bit index"))
        .collect::<Result<Vec<_>, _>>()?;
    match bits.as_slice() {
        [bit] => Ok(BitRange::bit(*bit)),
        [low, high] => Ok(BitRange::new(*low, *high)),
        _ => Err(ParseError::Malformed("bit range: expected 1 or 2 indices".to_string())),
    }
}

fn parse_number<T: std::str::FromStr>(s: &str, what: &str) -> Result<T, ParseError> {
    s.parse()
        .map_err(|_| ParseError::Malformed(format!("{} out of range: {}", what, s)))
}

/// Decimal, `0x` hex, or `0b` binary.
fn parse_raw_value(s: &str) -> Result<u64, ParseError> {
    let parsed = if let Some(hex) = s.strip_prefix("0x") {
        u64::from_str_radix(hex, 16)
    } else if let Some(bin) = s.strip_prefix("0b") {
        u64::from_str_radix(bin, 2)
    } else {
        s.parse()
    };
    parsed.map_err(|_| ParseError::Malformed(format!("raw value out of range: {}", s)))
}
