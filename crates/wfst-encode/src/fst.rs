// Mutable weighted transducer stored as per-state arc vectors.

use wfst_weight::Weight;

/// Arc label. `0` is epsilon.
pub type Label = u32;

/// Index of a state in a [`VectorFst`].
pub type StateId = usize;

pub const EPSILON: Label = 0;

/// A transition from its source state to `nextstate`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Arc<W> {
    pub ilabel: Label,
    pub olabel: Label,
    pub weight: W,
    pub nextstate: StateId,
}

impl<W> Arc<W> {
    pub fn new(ilabel: Label, olabel: Label, weight: W, nextstate: StateId) -> Self {
        Self {
            ilabel,
            olabel,
            weight,
            nextstate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct VectorState<W> {
    final_weight: W,
    arcs: Vec<Arc<W>>,
}

/// Weighted transducer with states in a `Vec`.
///
/// State ids are dense indices handed out by [`add_state`](Self::add_state).
/// Methods taking a [`StateId`] panic when the id was never added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorFst<W> {
    states: Vec<VectorState<W>>,
    start: Option<StateId>,
}

impl<W: Weight> Default for VectorFst<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Weight> VectorFst<W> {
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            start: None,
        }
    }

    /// Add a non-final state and return its id.
    pub fn add_state(&mut self) -> StateId {
        self.states.push(VectorState {
            final_weight: W::zero(),
            arcs: Vec::new(),
        });
        self.states.len() - 1
    }

    pub fn set_start(&mut self, state: StateId) {
        assert!(state < self.states.len(), "set_start: no state {state}");
        self.start = Some(state);
    }

    #[inline]
    pub fn start(&self) -> Option<StateId> {
        self.start
    }

    /// Set the final weight. `W::zero()` makes the state non-final.
    pub fn set_final(&mut self, state: StateId, weight: W) {
        self.states[state].final_weight = weight;
    }

    #[inline]
    pub fn final_weight(&self, state: StateId) -> &W {
        &self.states[state].final_weight
    }

    pub fn is_final(&self, state: StateId) -> bool {
        self.states[state].final_weight != W::zero()
    }

    pub fn add_arc(&mut self, state: StateId, arc: Arc<W>) {
        assert!(
            arc.nextstate < self.states.len(),
            "add_arc: no destination state {}",
            arc.nextstate
        );
        self.states[state].arcs.push(arc);
    }

    #[inline]
    pub fn arcs(&self, state: StateId) -> &[Arc<W>] {
        &self.states[state].arcs
    }

    /// Replace the arcs leaving `state`.
    pub fn set_arcs(&mut self, state: StateId, arcs: Vec<Arc<W>>) {
        self.states[state].arcs = arcs;
    }

    /// Remove the highest-numbered state along with every arc entering it.
    pub fn delete_last_state(&mut self) {
        let Some(last) = self.states.len().checked_sub(1) else {
            return;
        };
        self.states.pop();
        for state in &mut self.states {
            state.arcs.retain(|arc| arc.nextstate != last);
        }
        if self.start == Some(last) {
            self.start = None;
        }
    }

    #[inline]
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn num_arcs(&self, state: StateId) -> usize {
        self.states[state].arcs.len()
    }

    /// Total number of arcs over all states.
    pub fn total_arcs(&self) -> usize {
        self.states.iter().map(|s| s.arcs.len()).sum()
    }

    pub fn states(&self) -> std::ops::Range<StateId> {
        0..self.states.len()
    }
}
