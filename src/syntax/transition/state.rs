use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use super::{
    would_create_cycle, Action, Candidate, Error, Index, Label, Step, System, TransitionMutableState,
    TransitionState, TransitionSystem, ROOT,
};

#[inline]
fn default_capacity(num_tokens: usize) -> usize {
    2 * num_tokens
}

/// Parser configuration shared by the Covington systems.
///
/// `active` holds the tokens already compared against the queue head, `reinserted` the
/// ones popped from it while scanning for the current queue head, and `queue` the tokens
/// not yet shifted. Cloning copies every list and shares the bound system and gold
/// structure.
#[derive(Debug, Clone)]
pub struct Configuration {
    num_tokens: Index,
    active: Vec<Index>,
    reinserted: Vec<Index>,
    queue: VecDeque<Index>,
    heads: Vec<Option<Index>>,
    labels: Vec<Option<Label>>,
    tags: Vec<Option<Label>>,
    fine_tags: Vec<Option<Label>>,
    candidates: Vec<Candidate>,
    actions: Vec<Action>,
    gold: Option<Arc<Gold>>,
    system: Option<Arc<System>>,
}

impl Configuration {
    /// `num_tokens` counts the root, so a sentence of `n` words takes `n + 1`.
    pub fn new(num_tokens: u32) -> Self {
        Configuration::with_capacity(num_tokens, default_capacity(num_tokens as usize))
    }

    pub fn with_capacity(num_tokens: u32, capacity: usize) -> Self {
        let n = num_tokens as usize;
        Configuration {
            num_tokens,
            active: vec![ROOT],
            reinserted: Vec::with_capacity(n),
            queue: (1..num_tokens).collect(),
            heads: vec![None; n],
            labels: vec![None; n],
            tags: vec![None; n],
            fine_tags: vec![None; n],
            candidates: vec![],
            actions: Vec::with_capacity(capacity),
            gold: None,
            system: None,
        }
    }

    pub fn with_system(num_tokens: u32, system: Arc<System>) -> Self {
        let mut state = Configuration::new(num_tokens);
        state.bind(system);
        state
    }

    /// Binds `system` and computes the legal candidates right away.
    pub fn bind(&mut self, system: Arc<System>) {
        system.prepare(self);
        self.system = Some(system);
    }

    pub fn set_gold(&mut self, gold: Arc<Gold>) {
        self.gold = Some(gold);
    }

    pub fn with_gold(mut self, gold: Arc<Gold>) -> Self {
        self.set_gold(gold);
        self
    }

    pub fn system(&self) -> Option<&Arc<System>> {
        self.system.as_ref()
    }

    fn bound_system(&self) -> Result<Arc<System>, Error> {
        self.system.clone().ok_or(Error::UnboundSystem)
    }

    pub fn fine_tag(&self, index: Index) -> Option<Label> {
        self.fine_tags.get(index as usize).copied().flatten()
    }

    pub fn tags(&self) -> &[Option<Label>] {
        &self.tags
    }

    pub fn is_terminal(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn legal_actions(&self) -> Result<Vec<Action>, Error> {
        Ok(self.bound_system()?.legal_actions(self))
    }

    pub fn advance<T: Into<Step>>(&mut self, step: T) -> Result<Action, Error> {
        let system = self.bound_system()?;
        system.advance(self, step)
    }

    pub fn gold_transition(&self) -> Result<Action, Error> {
        self.bound_system()?.gold_transition(self, None)
    }

    pub fn encode(&self, action: &Action) -> Result<usize, Error> {
        self.bound_system()?.encode(self, action)
    }

    /// See `TransitionSystem::decode`: `id` must come from `encode` on this configuration.
    pub fn decode(&self, id: usize) -> Result<Action, Error> {
        self.bound_system()?.decode(self, id)
    }

    /// Whether every arc of `gold` has been built with its relation.
    pub fn is_complete(&self, gold: &Gold) -> bool {
        (1..self.num_tokens).all(|index| {
            let built = self.heads[index as usize].zip(self.labels[index as usize]);
            match gold.head_of(index) {
                Some(expected) => built == Some(expected),
                None => built.is_none(),
            }
        })
    }
}

impl TransitionState for Configuration {
    fn step(&self) -> usize {
        self.actions.len()
    }

    fn num_tokens(&self) -> usize {
        self.num_tokens as usize
    }

    fn active(&self) -> &[Index] {
        &self.active
    }

    fn reinserted(&self) -> &[Index] {
        &self.reinserted
    }

    fn queue_head(&self) -> Option<Index> {
        self.queue.front().copied()
    }

    fn queue_size(&self) -> usize {
        self.queue.len()
    }

    fn head(&self, index: Index) -> Option<Index> {
        if index < self.num_tokens {
            return self.heads[index as usize];
        }
        None
    }

    fn heads(&self) -> &[Option<Index>] {
        &self.heads
    }

    fn label(&self, index: Index) -> Option<Label> {
        if index < self.num_tokens {
            return self.labels[index as usize];
        }
        None
    }

    fn labels(&self) -> &[Option<Label>] {
        &self.labels
    }

    fn tag(&self, index: Index) -> Option<Label> {
        if index < self.num_tokens {
            return self.tags[index as usize];
        }
        None
    }

    fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    fn gold(&self) -> Option<&Gold> {
        self.gold.as_deref()
    }

    fn actions(&self) -> &[Action] {
        &self.actions
    }
}

impl TransitionMutableState for Configuration {
    fn add_arc(&mut self, index: Index, head: Index, label: Label) -> Result<(), Error> {
        if index >= self.num_tokens || head >= self.num_tokens {
            Err(Error::InvalidOperation("token index out of range"))
        } else if index == ROOT {
            Err(Error::InvalidOperation("root cannot take a head"))
        } else if self.heads[index as usize].is_some() {
            Err(Error::InvalidOperation("token already has a head"))
        } else if would_create_cycle(&self.heads, head, index) {
            Err(Error::InvalidOperation("arc would create a cycle"))
        } else {
            self.heads[index as usize] = Some(head);
            self.labels[index as usize] = Some(label);
            Ok(())
        }
    }

    fn reinsert(&mut self, offset: Index) -> Result<(), Error> {
        let offset = offset as usize;
        if offset >= self.active.len() {
            return Err(Error::InvalidOperation("offset exceeds the active list"));
        }
        let at = self.active.len() - 1 - offset;
        let moved: Vec<Index> = self.active.drain(at..).collect();
        self.reinserted.splice(0..0, moved);
        Ok(())
    }

    fn shift(&mut self, tag: Option<Label>, fine_tag: Option<Label>) -> Result<Index, Error> {
        let b0 = self.queue.pop_front().ok_or(Error::TerminalState)?;
        self.active.append(&mut self.reinserted);
        self.active.push(b0);
        self.tags[b0 as usize] = tag;
        self.fine_tags[b0 as usize] = fine_tag;
        Ok(b0)
    }

    fn set_candidates(&mut self, candidates: Vec<Candidate>) {
        self.candidates = candidates;
    }

    fn record(&mut self, action: Action) {
        self.actions.push(action);
    }
}

/// A gold dependency structure: for each dependent, its head(s) with the relation label,
/// plus optional gold tags used to fill Shift payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gold {
    num_tokens: usize,
    arcs: BTreeMap<Index, BTreeMap<Index, Label>>,
    tags: Vec<Option<Label>>,
    fine_tags: Vec<Option<Label>>,
}

impl Gold {
    pub fn new(arcs: BTreeMap<Index, BTreeMap<Index, Label>>) -> Self {
        let num_tokens = arcs
            .iter()
            .flat_map(|(&dependent, heads)| heads.keys().copied().chain(Some(dependent)))
            .max()
            .map_or(1, |max| max as usize + 1);
        Gold {
            num_tokens,
            arcs,
            tags: vec![],
            fine_tags: vec![],
        }
    }

    /// Builds from per-token heads and labels, both indexed by token; entry 0 (the root)
    /// is ignored.
    pub fn from_heads(heads: &[Index], labels: &[Label]) -> Result<Self, Error> {
        let n = heads.len();
        if n != labels.len() {
            return Err(Error::InvalidArgument(format!(
                "{} heads but {} labels",
                n,
                labels.len()
            )));
        }
        let mut arcs = BTreeMap::new();
        for (dependent, (&head, &label)) in heads.iter().zip(labels).enumerate().skip(1) {
            if head as usize >= n || head as usize == dependent {
                return Err(Error::InvalidArgument(format!(
                    "invalid head {} for token {}",
                    head, dependent
                )));
            }
            let mut entry = BTreeMap::new();
            entry.insert(head, label);
            arcs.insert(dependent as Index, entry);
        }
        Ok(Gold {
            num_tokens: n.max(1),
            arcs,
            tags: vec![],
            fine_tags: vec![],
        })
    }

    /// Attaches gold tags, indexed by token like the heads.
    pub fn with_tags(mut self, tags: Vec<Label>, fine_tags: Option<Vec<Label>>) -> Self {
        self.num_tokens = self.num_tokens.max(tags.len());
        self.tags = tags.into_iter().map(Some).collect();
        self.fine_tags = fine_tags
            .map(|t| t.into_iter().map(Some).collect())
            .unwrap_or_default();
        self
    }

    pub fn num_tokens(&self) -> usize {
        self.num_tokens
    }

    /// The relation of the arc `head -> dependent`, if it is gold.
    pub fn relation(&self, dependent: Index, head: Index) -> Option<Label> {
        self.arcs.get(&dependent)?.get(&head).copied()
    }

    pub fn head_of(&self, dependent: Index) -> Option<(Index, Label)> {
        self.arcs
            .get(&dependent)?
            .iter()
            .next()
            .map(|(&head, &label)| (head, label))
    }

    /// Iterates `(dependent, head, label)` triples in dependent order.
    pub fn arcs(&self) -> impl Iterator<Item = (Index, Index, Label)> + '_ {
        self.arcs.iter().flat_map(|(&dependent, heads)| {
            heads
                .iter()
                .map(move |(&head, &label)| (dependent, head, label))
        })
    }

    pub fn tag(&self, index: Index) -> Option<Label> {
        self.tags.get(index as usize).copied().flatten()
    }

    pub fn fine_tag(&self, index: Index) -> Option<Label> {
        self.fine_tags.get(index as usize).copied().flatten()
    }
}
