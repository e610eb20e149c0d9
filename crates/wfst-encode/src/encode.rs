// Encode and decode transducer arcs through a codex.
//
// Encoding replaces each arc (i, o, w) by (l, o', w') where l is the codex
// label of the tuple selected by the flags, o' = l when labels are encoded
// and w' = One when weights are encoded. With weights encoded, non-Zero final
// weights move onto an epsilon arc into a single superfinal state so that
// they are encoded too.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use wfst_weight::{CompositeConfig, Weight};

use crate::EncodeError;
use crate::fst::{Arc, EPSILON, StateId, VectorFst};
use crate::table::{EncodeFlags, EncodeTable};

/// Flags plus the codex table, applied arc by arc.
#[derive(Debug, Clone)]
pub struct EncodeMapper<W: Weight> {
    table: EncodeTable<W>,
}

impl<W: Weight> EncodeMapper<W> {
    pub fn new(flags: EncodeFlags) -> Self {
        Self {
            table: EncodeTable::new(flags),
        }
    }

    pub fn from_table(table: EncodeTable<W>) -> Self {
        Self { table }
    }

    #[inline]
    pub fn flags(&self) -> EncodeFlags {
        self.table.flags()
    }

    #[inline]
    pub fn table(&self) -> &EncodeTable<W> {
        &self.table
    }

    /// Encode one arc, growing the table as needed.
    pub fn encode_arc(&mut self, arc: &Arc<W>) -> Arc<W> {
        let flags = self.flags();
        let label = self.table.encode(arc.ilabel, arc.olabel, &arc.weight);
        Arc {
            ilabel: label,
            olabel: if flags.contains(EncodeFlags::LABELS) {
                label
            } else {
                arc.olabel
            },
            weight: if flags.contains(EncodeFlags::WEIGHTS) {
                W::one()
            } else {
                arc.weight.clone()
            },
            nextstate: arc.nextstate,
        }
    }

    /// Decode one arc. Epsilon-labelled arcs pass through unchanged.
    pub fn decode_arc(&self, arc: &Arc<W>) -> Result<Arc<W>, EncodeError> {
        if arc.ilabel == EPSILON {
            return Ok(arc.clone());
        }
        let flags = self.flags();
        if flags.contains(EncodeFlags::LABELS) && arc.ilabel != arc.olabel {
            return Err(EncodeError::LabelMismatch {
                ilabel: arc.ilabel,
                olabel: arc.olabel,
            });
        }
        if flags.contains(EncodeFlags::WEIGHTS) && arc.weight != W::one() {
            return Err(EncodeError::NonTrivialWeight { label: arc.ilabel });
        }
        let tuple = self
            .table
            .decode(arc.ilabel)
            .ok_or(EncodeError::UnknownLabel(arc.ilabel))?;
        Ok(Arc {
            ilabel: tuple.ilabel,
            olabel: if flags.contains(EncodeFlags::LABELS) {
                tuple.olabel
            } else {
                arc.olabel
            },
            weight: if flags.contains(EncodeFlags::WEIGHTS) {
                tuple.weight.clone()
            } else {
                arc.weight.clone()
            },
            nextstate: arc.nextstate,
        })
    }

    /// Read a mapper from a codex file.
    pub fn read(path: impl AsRef<Path>, config: &CompositeConfig) -> Result<Self, EncodeError> {
        let file = File::open(path.as_ref())?;
        EncodeTable::read(BufReader::new(file), config).map(Self::from_table)
    }

    /// Write the codex to a file, replacing any existing one.
    pub fn write(&self, path: impl AsRef<Path>, config: &CompositeConfig) -> Result<(), EncodeError> {
        let mut out = BufWriter::new(File::create(path.as_ref())?);
        self.table.write(&mut out, config)?;
        out.flush()?;
        Ok(())
    }
}

/// Encode every arc of `fst` in place.
pub fn encode<W: Weight>(fst: &mut VectorFst<W>, mapper: &mut EncodeMapper<W>) {
    let encode_weights = mapper.flags().contains(EncodeFlags::WEIGHTS);
    let num_states = fst.num_states();
    let mut superfinal: Option<StateId> = None;

    for state in 0..num_states {
        let mut arcs: Vec<Arc<W>> = fst.arcs(state).iter().map(|a| mapper.encode_arc(a)).collect();

        if encode_weights && fst.is_final(state) {
            let target = *superfinal.get_or_insert_with(|| {
                let s = fst.add_state();
                fst.set_final(s, W::one());
                s
            });
            let final_arc = Arc::new(EPSILON, EPSILON, fst.final_weight(state).clone(), target);
            arcs.push(mapper.encode_arc(&final_arc));
            fst.set_final(state, W::zero());
        }

        fst.set_arcs(state, arcs);
    }

    tracing::debug!(
        target: "wfst::encode",
        flags = mapper.flags().bits(),
        states = fst.num_states(),
        codex_entries = mapper.table().len(),
        superfinal = superfinal.is_some(),
        "encoded fst"
    );
}

/// Decode every arc of `fst` in place.
///
/// With weights encoded, the superfinal state added by [`encode`] is
/// removed again and the weights on its epsilon arcs go back to the
/// final weights of their source states. On error `fst` is left
/// unmodified.
pub fn decode<W: Weight>(fst: &mut VectorFst<W>, mapper: &EncodeMapper<W>) -> Result<(), EncodeError> {
    let mut decoded = Vec::with_capacity(fst.num_states());
    for state in fst.states() {
        let arcs = fst
            .arcs(state)
            .iter()
            .map(|arc| mapper.decode_arc(arc))
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|err| {
                tracing::warn!(target: "wfst::encode", state, error = %err, "decode failed");
            })?;
        decoded.push(arcs);
    }
    for (state, arcs) in decoded.into_iter().enumerate() {
        fst.set_arcs(state, arcs);
    }

    let superfinal = if mapper.flags().contains(EncodeFlags::WEIGHTS) {
        find_superfinal(fst)
    } else {
        None
    };
    if let Some(superfinal) = superfinal {
        for state in 0..superfinal {
            let (moved, kept): (Vec<_>, Vec<_>) = fst
                .arcs(state)
                .iter()
                .cloned()
                .partition(|arc| arc.nextstate == superfinal);
            if moved.is_empty() {
                continue;
            }
            let weight = moved.into_iter().fold(fst.final_weight(state).clone(), |acc, arc| {
                if acc == W::zero() { arc.weight } else { acc.plus(&arc.weight) }
            });
            fst.set_final(state, weight);
            fst.set_arcs(state, kept);
        }
        fst.delete_last_state();
        tracing::debug!(target: "wfst::encode", superfinal, "folded superfinal state");
    }
    Ok(())
}

// The state `encode` appends for final weights: last, final with weight One,
// no arcs, not the start, the only final state, entered only by epsilon arcs.
fn find_superfinal<W: Weight>(fst: &VectorFst<W>) -> Option<StateId> {
    let last = fst.num_states().checked_sub(1)?;
    if fst.start() == Some(last) || *fst.final_weight(last) != W::one() || fst.num_arcs(last) != 0 {
        return None;
    }
    let mut entered = false;
    for state in 0..last {
        if fst.is_final(state) {
            return None;
        }
        for arc in fst.arcs(state).iter().filter(|arc| arc.nextstate == last) {
            if arc.ilabel != EPSILON || arc.olabel != EPSILON {
                return None;
            }
            entered = true;
        }
    }
    entered.then_some(last)
}

/// Encode `fst` against the codex at `path`.
///
/// With `reuse`, the mapper (flags included) is read from `path` and the
/// file is left as is; otherwise a fresh mapper built from `flags` is
/// written to `path` after encoding.
pub fn encode_with_codex<W: Weight>(
    fst: &mut VectorFst<W>,
    flags: EncodeFlags,
    reuse: bool,
    path: impl AsRef<Path>,
    config: &CompositeConfig,
) -> Result<EncodeMapper<W>, EncodeError> {
    let path = path.as_ref();
    let mut mapper = if reuse {
        let mapper = EncodeMapper::read(path, config)?;
        if mapper.flags() != flags {
            tracing::debug!(
                target: "wfst::encode",
                requested = flags.bits(),
                codex = mapper.flags().bits(),
                "reusing codex flags"
            );
        }
        mapper
    } else {
        EncodeMapper::new(flags)
    };

    encode(fst, &mut mapper);

    if !reuse {
        mapper.write(path, config)?;
    }
    Ok(mapper)
}

/// Decode `fst` with the codex at `path`.
pub fn decode_with_codex<W: Weight>(
    fst: &mut VectorFst<W>,
    path: impl AsRef<Path>,
    config: &CompositeConfig,
) -> Result<(), EncodeError> {
    let mapper = EncodeMapper::read(path, config)?;
    decode(fst, &mapper)
}

#[cfg(test)]
mod tests {
    use wfst_semiring::TropicalWeight;

    use super::*;

    fn t(v: f32) -> TropicalWeight {
        TropicalWeight::new(v)
    }

    /// 0 -a:x/1-> 1 -b:y/2-> 2/0.5, plus 0 -a:x/1-> 2
    fn sample() -> VectorFst<TropicalWeight> {
        let mut fst = VectorFst::new();
        let s0 = fst.add_state();
        let s1 = fst.add_state();
        let s2 = fst.add_state();
        fst.set_start(s0);
        fst.add_arc(s0, Arc::new(1, 10, t(1.0), s1));
        fst.add_arc(s1, Arc::new(2, 20, t(2.0), s2));
        fst.add_arc(s0, Arc::new(1, 10, t(1.0), s2));
        fst.set_final(s2, t(0.5));
        fst
    }

    #[test]
    fn encode_labels_makes_acceptor() {
        let mut fst = sample();
        let mut mapper = EncodeMapper::new(EncodeFlags::LABELS);
        encode(&mut fst, &mut mapper);

        assert_eq!(fst.num_states(), 3);
        assert_eq!(mapper.table().len(), 2);
        for state in fst.states() {
            for arc in fst.arcs(state) {
                assert_eq!(arc.ilabel, arc.olabel);
            }
        }
        assert_eq!(fst.arcs(0)[0].ilabel, fst.arcs(0)[1].ilabel);
        assert_eq!(fst.arcs(1)[0].weight, t(2.0));
        assert_eq!(fst.final_weight(2), &t(0.5));
    }

    #[test]
    fn encode_weights_moves_final_weights() {
        let mut fst = sample();
        let mut mapper = EncodeMapper::new(EncodeFlags::WEIGHTS);
        encode(&mut fst, &mut mapper);

        assert_eq!(fst.num_states(), 4);
        assert!(!fst.is_final(2));
        assert_eq!(fst.final_weight(3), &TropicalWeight::one());
        let final_arc = &fst.arcs(2)[0];
        assert_eq!(final_arc.nextstate, 3);
        assert_eq!(final_arc.weight, TropicalWeight::one());
        assert_ne!(final_arc.ilabel, EPSILON);
        assert_eq!(final_arc.olabel, EPSILON);
        assert_eq!(fst.arcs(0)[0].olabel, 10);
    }

    #[test]
    fn single_superfinal_state() {
        let mut fst = sample();
        fst.set_final(1, t(3.0));
        let mut mapper = EncodeMapper::new(EncodeFlags::WEIGHTS);
        encode(&mut fst, &mut mapper);
        assert_eq!(fst.num_states(), 4);
        assert_eq!(fst.arcs(1).last().unwrap().nextstate, 3);
        assert_eq!(fst.arcs(2).last().unwrap().nextstate, 3);
    }

    #[test]
    fn encode_then_decode_restores_arcs() {
        let original = sample();
        for flags in [
            EncodeFlags::NONE,
            EncodeFlags::LABELS,
            EncodeFlags::WEIGHTS,
            EncodeFlags::LABELS | EncodeFlags::WEIGHTS,
        ] {
            let mut fst = original.clone();
            let mut mapper = EncodeMapper::new(flags);
            encode(&mut fst, &mut mapper);
            decode(&mut fst, &mapper).unwrap();
            assert_eq!(fst, original, "flags {flags:?}");
        }
    }

    #[test]
    fn decode_weights_restores_final_weight() {
        let mut original = VectorFst::new();
        let s0 = original.add_state();
        let s1 = original.add_state();
        original.set_start(s0);
        original.add_arc(s0, Arc::new(1, 2, t(1.0), s1));
        original.set_final(s1, t(0.5));

        let mut fst = original.clone();
        let mut mapper = EncodeMapper::new(EncodeFlags::WEIGHTS);
        encode(&mut fst, &mut mapper);
        assert_eq!(fst.num_states(), 3);

        decode(&mut fst, &mapper).unwrap();
        assert_eq!(fst.num_states(), 2);
        assert_eq!(fst.final_weight(s1), &t(0.5));
        assert!(fst.arcs(s1).is_empty());
        assert_eq!(fst, original);
    }

    #[test]
    fn decode_without_superfinal_keeps_states() {
        let mut fst = VectorFst::new();
        let s0 = fst.add_state();
        let s1 = fst.add_state();
        fst.set_start(s0);
        fst.add_arc(s0, Arc::new(3, 3, t(1.0), s1));
        let original = fst.clone();

        let mut mapper = EncodeMapper::new(EncodeFlags::WEIGHTS);
        encode(&mut fst, &mut mapper);
        assert_eq!(fst.num_states(), 2);
        decode(&mut fst, &mapper).unwrap();
        assert_eq!(fst, original);
    }

    #[test]
    fn decode_unknown_label_leaves_fst_untouched() {
        let mut fst = sample();
        let mut mapper = EncodeMapper::new(EncodeFlags::LABELS);
        encode(&mut fst, &mut mapper);
        fst.add_arc(2, Arc::new(99, 99, t(0.0), 0));
        let before = fst.clone();
        assert!(matches!(
            decode(&mut fst, &mapper),
            Err(EncodeError::UnknownLabel(99))
        ));
        assert_eq!(fst, before);
    }

    #[test]
    fn decode_checks_encoded_shape() {
        let mapper = {
            let mut fst = sample();
            let mut mapper = EncodeMapper::new(EncodeFlags::LABELS | EncodeFlags::WEIGHTS);
            encode(&mut fst, &mut mapper);
            mapper
        };
        assert!(matches!(
            mapper.decode_arc(&Arc::new(1, 2, t(0.0), 0)),
            Err(EncodeError::LabelMismatch { ilabel: 1, olabel: 2 })
        ));
        assert!(matches!(
            mapper.decode_arc(&Arc::new(1, 1, t(4.0), 0)),
            Err(EncodeError::NonTrivialWeight { label: 1 })
        ));
        let eps = Arc::new(EPSILON, 7, t(4.0), 1);
        assert_eq!(mapper.decode_arc(&eps).unwrap(), eps);
    }
}
