//! Inspect, decode and encode QA bit-fields from the command line.
//!
//! Usage:
//!   qa_bits [--preset NAME | --layout FILE [--name LAYOUT]] [--verbose] <command> [args]
//!
//! Commands:
//!   presets                 list built-in layouts
//!   info                    print the group/label table
//!   decode VALUE...         binary string and labels for each value
//!   match VALUE LABEL       exit status 0 when matching, 1 otherwise
//!   encode LABEL            exclusive encoding
//!   encode-all LABEL...     values carrying every label (--limit N to truncate)
//!   band FILE               per-label pixel counts of a raw band (--format u8|u16|u32|u64,
//!                           --big-endian)
//!
//! Values accept decimal, `0x` and `0b` forms. Without --preset or --layout the MODIS
//! `state_1km` table is used.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use ndarray::Array1;
use qabits::band::{read_samples, Endianness, SampleFormat};
use qabits::dump::{format_decoded, format_table};
use qabits::{label_counts, BitCodec, LayoutSet, Preset};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

const USAGE: &str = "usage: qa_bits [--preset NAME | --layout FILE [--name LAYOUT]] [--verbose] \
<presets|info|decode|match|encode|encode-all|band> [args]";

/// Remove the first of `names` found in `args`, reporting whether one was present.
fn take_flag(args: &mut Vec<String>, names: &[&str]) -> bool {
    if let Some(pos) = args.iter().position(|a| names.contains(&a.as_str())) {
        args.remove(pos);
        true
    } else {
        false
    }
}

/// Remove `--name VALUE` or `--name=VALUE` from `args`.
fn take_option(args: &mut Vec<String>, name: &str) -> anyhow::Result<Option<String>> {
    let prefix = format!("{}=", name);
    if let Some(pos) = args.iter().position(|a| a.starts_with(&prefix)) {
        let arg = args.remove(pos);
        return Ok(Some(arg[prefix.len()..].to_string()));
    }
    match args.iter().position(|a| a == name) {
        Some(pos) if pos + 1 < args.len() => {
            args.remove(pos);
            Ok(Some(args.remove(pos)))
        }
        Some(_) => bail!("{} expects a value", name),
        None => Ok(None),
    }
}

fn parse_value(s: &str) -> anyhow::Result<i128> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let magnitude = if let Some(hex) = digits.strip_prefix("0x") {
        i128::from_str_radix(hex, 16)
    } else if let Some(bin) = digits.strip_prefix("0b") {
        i128::from_str_radix(bin, 2)
    } else {
        digits.parse::<i128>()
    }
    .with_context(|| format!("invalid value {:?}", s))?;
    Ok(if negative { -magnitude } else { magnitude })
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber")
}

fn load_codec(preset: Option<String>, layout: Option<PathBuf>, name: Option<String>) -> anyhow::Result<BitCodec> {
    match (preset, layout) {
        (Some(_), Some(_)) => bail!("--preset and --layout are mutually exclusive"),
        (Some(preset), None) => {
            let preset: Preset = preset.parse()?;
            Ok(preset.codec()?)
        }
        (None, Some(path)) => {
            let set = LayoutSet::from_file(&path)
                .with_context(|| format!("loading layouts from {}", path.display()))?;
            let codec = match name {
                Some(name) => set.require(&name)?,
                None if set.len() == 1 => set
                    .iter()
                    .next()
                    .ok_or_else(|| anyhow!("{} defines no layout", path.display()))?,
                None => bail!(
                    "{} defines {} layouts; pick one with --name ({})",
                    path.display(),
                    set.len(),
                    set.names().collect::<Vec<_>>().join(", ")
                ),
            };
            Ok(codec.clone())
        }
        (None, None) => Ok(Preset::Modis09gaState.codec()?),
    }
}

fn main() -> anyhow::Result<()> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = take_flag(&mut args, &["--verbose", "-v"]);
    init_logging(verbose)?;

    let preset = take_option(&mut args, "--preset")?;
    let layout = take_option(&mut args, "--layout")?.map(PathBuf::from);
    let name = take_option(&mut args, "--name")?;
    let limit = take_option(&mut args, "--limit")?
        .map(|s| s.parse::<usize>().with_context(|| format!("invalid --limit {:?}", s)))
        .transpose()?;
    let format = take_option(&mut args, "--format")?
        .map(|s| s.parse::<SampleFormat>().map_err(|e| anyhow!(e)))
        .transpose()?
        .unwrap_or(SampleFormat::U16);
    let endianness = if take_flag(&mut args, &["--big-endian"]) {
        Endianness::Big
    } else {
        Endianness::Little
    };

    let mut args = args.into_iter();
    let command = args.next().ok_or_else(|| anyhow!(USAGE))?;
    let rest: Vec<String> = args.collect();

    if command == "presets" {
        for preset in Preset::ALL {
            let codec = preset.codec()?;
            println!("{}\t{} bits\t{} labels", preset, codec.bit_width(), codec.label_infos().len());
        }
        return Ok(());
    }

    let codec = load_codec(preset, layout, name)?;
    debug!(layout = codec.name().unwrap_or("<unnamed>"), command = %command, "running");

    match command.as_str() {
        "info" => print!("{}", format_table(&codec)),
        "decode" => {
            if rest.is_empty() {
                bail!("decode expects at least one VALUE");
            }
            for s in &rest {
                println!("{}", format_decoded(&codec, parse_value(s)?)?);
            }
        }
        "match" => {
            let [value, label] = rest.as_slice() else {
                bail!("match expects VALUE LABEL");
            };
            let matched = codec.matches(parse_value(value)?, label)?;
            println!("{}", matched);
            if !matched {
                std::process::exit(1);
            }
        }
        "encode" => {
            let [label] = rest.as_slice() else {
                bail!("encode expects one LABEL");
            };
            println!("{}", codec.encode(label)?);
        }
        "encode-all" => {
            let labels: Vec<&str> = rest.iter().map(String::as_str).collect();
            let values = codec.consistent_values(&labels)?;
            debug!(free_bits = values.free_bits(), "enumerating");
            for value in values.take(limit.unwrap_or(usize::MAX)) {
                println!("{}", value);
            }
        }
        "band" => {
            let [path] = rest.as_slice() else {
                bail!("band expects one FILE");
            };
            let bytes = std::fs::read(path).with_context(|| format!("reading {}", path))?;
            let samples = read_samples(&bytes, format, endianness)
                .with_context(|| format!("reading {} as {:?}", path, format))?;
            let band = Array1::from(samples);
            let total = band.len();
            for (label, count) in label_counts(&codec, &band)? {
                let share = if total == 0 { 0.0 } else { count as f64 * 100.0 / total as f64 };
                println!("{}\t{}\t{:.2}%", label, count, share);
            }
            println!("total\t{}", total);
        }
        other => bail!("unknown command {:?}\n{}", other, USAGE),
    }
    Ok(())
}
