// Codex: the table mapping (ilabel, olabel, weight) tuples to encoded labels.
//
// Text format:
//
//   wfst-codex <weight-type> <flags> <count>
//   <label> <composite(ilabel, olabel, weight)>
//   ...
//
// Labels are numbered 1..=count in order. The composite element uses the
// caller's CompositeConfig, so weights that are themselves composite may
// need parentheses to read back.

use std::fmt;
use std::io::{BufRead, Write};
use std::ops::BitOr;

use hashbrown::HashMap;
use wfst_weight::{
    CompositeConfig, CompositeWeightReader, CompositeWeightWriter, TextElement, Weight,
    WeightError,
};

use crate::EncodeError;
use crate::fst::Label;

pub const CODEX_MAGIC: &str = "wfst-codex";

/// Which arc fields are folded into the encoded label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EncodeFlags(u8);

impl EncodeFlags {
    /// Input labels only.
    pub const NONE: Self = Self(0);
    /// Fold output labels in: encoded arcs become acceptor arcs.
    pub const LABELS: Self = Self(0x1);
    /// Fold weights in: encoded arcs carry `One`.
    pub const WEIGHTS: Self = Self(0x2);

    pub fn from_options(labels: bool, weights: bool) -> Self {
        let mut flags = Self::NONE;
        if labels {
            flags = flags | Self::LABELS;
        }
        if weights {
            flags = flags | Self::WEIGHTS;
        }
        flags
    }

    pub const fn from_bits(bits: u8) -> Option<Self> {
        if bits & !0x3 == 0 { Some(Self(bits)) } else { None }
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for EncodeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// The fields of one arc that share an encoded label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodeTuple<W> {
    pub ilabel: Label,
    pub olabel: Label,
    pub weight: W,
}

impl<W: Weight> TextElement for EncodeTuple<W> {
    fn write_text(&self, out: &mut dyn fmt::Write, config: &CompositeConfig) -> fmt::Result {
        let mut writer = CompositeWeightWriter::new(out, config);
        writer.write_begin()?;
        writer.write_element(&self.ilabel)?;
        writer.write_element(&self.olabel)?;
        writer.write_element(&self.weight)?;
        writer.write_end()
    }

    fn parse_text(text: &str, config: &CompositeConfig) -> Result<Self, WeightError> {
        let mut chars = text.chars();
        let mut reader = CompositeWeightReader::new(&mut chars, config);
        reader.read_begin()?;
        let (ilabel, _) = reader.read_element::<Label>(false)?;
        let (olabel, _) = reader.read_element::<Label>(false)?;
        let (weight, _) = reader.read_element::<W>(true)?;
        reader.read_end()?;
        Ok(Self {
            ilabel,
            olabel,
            weight,
        })
    }
}

/// Bidirectional tuple <-> label table. Labels start at 1.
#[derive(Debug, Clone)]
pub struct EncodeTable<W: Weight> {
    flags: EncodeFlags,
    tuples: Vec<EncodeTuple<W>>,
    labels: HashMap<EncodeTuple<W>, Label>,
}

impl<W: Weight> EncodeTable<W> {
    pub fn new(flags: EncodeFlags) -> Self {
        Self {
            flags,
            tuples: Vec::new(),
            labels: HashMap::new(),
        }
    }

    #[inline]
    pub fn flags(&self) -> EncodeFlags {
        self.flags
    }

    /// Key for an arc: fields not selected by the flags are normalized away.
    fn key(&self, ilabel: Label, olabel: Label, weight: &W) -> EncodeTuple<W> {
        EncodeTuple {
            ilabel,
            olabel: if self.flags.contains(EncodeFlags::LABELS) { olabel } else { 0 },
            weight: if self.flags.contains(EncodeFlags::WEIGHTS) {
                weight.clone()
            } else {
                W::one()
            },
        }
    }

    /// Label for the arc fields, allocating a new one on first sight.
    pub fn encode(&mut self, ilabel: Label, olabel: Label, weight: &W) -> Label {
        let key = self.key(ilabel, olabel, weight);
        if let Some(&label) = self.labels.get(&key) {
            return label;
        }
        self.insert(key)
    }

    /// Label for the arc fields if already allocated.
    pub fn lookup(&self, ilabel: Label, olabel: Label, weight: &W) -> Option<Label> {
        self.labels.get(&self.key(ilabel, olabel, weight)).copied()
    }

    pub fn decode(&self, label: Label) -> Option<&EncodeTuple<W>> {
        let index = (label as usize).checked_sub(1)?;
        self.tuples.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    fn insert(&mut self, tuple: EncodeTuple<W>) -> Label {
        let label = self.tuples.len() as Label + 1;
        self.labels.insert(tuple.clone(), label);
        self.tuples.push(tuple);
        label
    }

    /// Write the codex text.
    pub fn write<O: Write>(&self, out: &mut O, config: &CompositeConfig) -> Result<(), EncodeError> {
        writeln!(
            out,
            "{CODEX_MAGIC} {} {} {}",
            W::type_name(),
            self.flags.bits(),
            self.tuples.len()
        )?;
        for (index, tuple) in self.tuples.iter().enumerate() {
            writeln!(out, "{} {}", index + 1, tuple.to_text(config))?;
        }
        Ok(())
    }

    /// Read codex text written by [`write`](Self::write) with the same config.
    pub fn read<I: BufRead>(input: I, config: &CompositeConfig) -> Result<Self, EncodeError> {
        let mut lines = input.lines();
        let header = match lines.next() {
            Some(line) => line?,
            None => return Err(malformed(1, "missing header")),
        };
        let (flags, count) = parse_header::<W>(&header)?;

        let mut table = Self::new(flags);
        for (index, line) in lines.enumerate() {
            let line = line?;
            let line_no = index + 2;
            if line.trim().is_empty() {
                continue;
            }
            let (label, text) = line
                .trim()
                .split_once(char::is_whitespace)
                .ok_or_else(|| malformed(line_no, "expected `<label> <tuple>`"))?;
            let expected = table.len() + 1;
            if label.parse::<usize>().ok() != Some(expected) {
                return Err(malformed(
                    line_no,
                    format!("expected label {expected}, found {label:?}"),
                ));
            }
            let tuple = EncodeTuple::<W>::parse_text(text.trim_start(), config)?;
            if table.labels.contains_key(&tuple) {
                return Err(malformed(line_no, "duplicate tuple"));
            }
            table.insert(tuple);
        }

        if table.len() != count {
            return Err(malformed(
                1,
                format!("header declares {count} entries, found {}", table.len()),
            ));
        }
        tracing::debug!(
            target: "wfst::encode",
            weight_type = %W::type_name(),
            entries = count,
            "codex read"
        );
        Ok(table)
    }
}

fn malformed(line: usize, reason: impl Into<String>) -> EncodeError {
    EncodeError::MalformedTable {
        line,
        reason: reason.into(),
    }
}

fn parse_header<W: Weight>(header: &str) -> Result<(EncodeFlags, usize), EncodeError> {
    let fields: Vec<&str> = header.split_whitespace().collect();
    let [magic, weight_type, flags, count] = fields[..] else {
        return Err(malformed(1, "expected `wfst-codex <weight-type> <flags> <count>`"));
    };
    if magic != CODEX_MAGIC {
        return Err(malformed(1, format!("bad magic {magic:?}")));
    }
    if weight_type != W::type_name() {
        return Err(EncodeError::TypeMismatch {
            expected: W::type_name(),
            found: weight_type.to_string(),
        });
    }
    let flags = flags
        .parse::<u8>()
        .ok()
        .and_then(EncodeFlags::from_bits)
        .ok_or_else(|| malformed(1, format!("bad flags {flags:?}")))?;
    let count = count
        .parse::<usize>()
        .map_err(|_| malformed(1, format!("bad entry count {count:?}")))?;
    Ok((flags, count))
}
