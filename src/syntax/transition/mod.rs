use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use self::covington::*;
pub use self::covington2::*;
pub use self::covington3::*;
pub use self::mappings::*;
pub use self::new_covington::*;
pub use self::state::*;

mod covington;
mod covington2;
mod covington3;
mod mappings;
mod new_covington;
pub mod oracle;
pub mod prelude;
mod state;

pub type Index = u32;
pub type Label = u32;

/// The synthetic token heading every sentence.
pub const ROOT: Index = 0;

/// Placeholder written in place of an absent part-of-speech tag.
pub static NO_TAG: &str = "_";

/// Opaque offset and relation fields written after NoArc by the offset-carrying systems.
/// Readers skip them.
pub static NO_ARC_FILLER: &str = "1";

/// A legal-action entry: the action kind and, for arcs, the offset below the top of the
/// active list. Relations are not part of a candidate; every arc candidate stands for one
/// action per relation label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Candidate {
    Shift,
    Reject,
    LeftArc(Index),
    RightArc(Index),
}

impl Candidate {
    /// Number of integer ids the candidate occupies in the action encoding.
    pub fn width(&self, num_relations: usize) -> usize {
        match *self {
            Candidate::Shift | Candidate::Reject => 1,
            Candidate::LeftArc(_) | Candidate::RightArc(_) => num_relations,
        }
    }

    pub fn with_relation(self, relation: Label) -> Action {
        match self {
            Candidate::Shift => Action::shift(),
            Candidate::Reject => Action::Reject,
            Candidate::LeftArc(offset) => Action::LeftArc { offset, relation },
            Candidate::RightArc(offset) => Action::RightArc { offset, relation },
        }
    }

    pub fn expand(self, num_relations: usize) -> Vec<Action> {
        (0..self.width(num_relations))
            .map(|relation| self.with_relation(relation as Label))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Shift {
        tag: Option<Label>,
        fine_tag: Option<Label>,
    },
    Reject,
    LeftArc { offset: Index, relation: Label },
    RightArc { offset: Index, relation: Label },
}

impl Action {
    pub fn shift() -> Self {
        Action::Shift {
            tag: None,
            fine_tag: None,
        }
    }

    pub fn candidate(&self) -> Candidate {
        match *self {
            Action::Shift { .. } => Candidate::Shift,
            Action::Reject => Candidate::Reject,
            Action::LeftArc { offset, .. } => Candidate::LeftArc(offset),
            Action::RightArc { offset, .. } => Candidate::RightArc(offset),
        }
    }

    pub fn relation(&self) -> Option<Label> {
        match *self {
            Action::LeftArc { relation, .. } | Action::RightArc { relation, .. } => Some(relation),
            _ => None,
        }
    }

    pub fn offset(&self) -> Option<Index> {
        match *self {
            Action::LeftArc { offset, .. } | Action::RightArc { offset, .. } => Some(offset),
            _ => None,
        }
    }

    pub fn is_shift(&self) -> bool {
        matches!(*self, Action::Shift { .. })
    }

    /// Keyword used for the action in oracle files.
    pub fn keyword(&self) -> &'static str {
        match *self {
            Action::Shift { .. } => SHIFT,
            Action::Reject => NO_ARC,
            Action::LeftArc { .. } => LEFT_ARC,
            Action::RightArc { .. } => RIGHT_ARC,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Action::Shift { .. } => write!(f, "Shift"),
            Action::Reject => write!(f, "Reject"),
            Action::LeftArc { offset, relation } => write!(f, "LeftArc({}, {})", offset, relation),
            Action::RightArc { offset, relation } => {
                write!(f, "RightArc({}, {})", offset, relation)
            }
        }
    }
}

/// What `advance` accepts: a symbolic action or an integer id to decode first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Action(Action),
    Id(usize),
}

impl From<Action> for Step {
    fn from(action: Action) -> Self {
        Step::Action(action)
    }
}

impl From<usize> for Step {
    fn from(id: usize) -> Self {
        Step::Id(id)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("action `{0}` is not allowed in the current configuration")]
    IllegalAction(Action),
    #[error("the configuration is terminal")]
    TerminalState,
    #[error("no gold structure is bound")]
    MissingGold,
    #[error("no transition system is bound to the configuration")]
    UnboundSystem,
    #[error("action id {id} is out of range for {size} encodable actions")]
    IdOutOfRange { id: usize, size: usize },
    #[error("unknown transition keyword `{0}`")]
    UnknownKeyword(String),
    #[error("malformed transition line `{0}`")]
    MalformedLine(String),
    #[error("unknown {namespace} label `{name}`")]
    UnknownLabel {
        namespace: &'static str,
        name: String,
    },
    #[error("no {namespace} label with id {id}")]
    UnknownLabelId { namespace: &'static str, id: Label },
    #[error("action vocabulary lacks `{0}`")]
    MissingAction(&'static str),
    #[error("unknown transition system `{0}`")]
    UnknownSystem(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),
    #[error("no terminal configuration within {0} steps")]
    StepLimit(usize),
    #[error("oracle sequence does not rebuild the gold structure")]
    IncompleteOracle,
}

pub static SHIFT: &str = "Shift";
pub static NO_ARC: &str = "NoArc";
pub static LEFT_ARC: &str = "Left-Arc";
pub static RIGHT_ARC: &str = "Right-Arc";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SystemKind {
    #[serde(rename = "Cov")]
    Covington,
    #[serde(rename = "NCov")]
    NewCovington,
    #[serde(rename = "Cov2")]
    Covington2,
    #[serde(rename = "Cov3")]
    Covington3,
}

impl SystemKind {
    pub fn as_str(&self) -> &'static str {
        match *self {
            SystemKind::Covington => "Cov",
            SystemKind::NewCovington => "NCov",
            SystemKind::Covington2 => "Cov2",
            SystemKind::Covington3 => "Cov3",
        }
    }

    /// Names the system expects in the `action` vocabulary.
    pub fn actions_list(&self) -> &'static [&'static str] {
        match *self {
            SystemKind::Covington => &["NoArc", "Shift", "Left-Arc", "Right-Arc"],
            SystemKind::NewCovington => &["Shift", "Left-Arc", "Right-Arc"],
            SystemKind::Covington2 | SystemKind::Covington3 => {
                &["Shift", "NoArc", "Left-Arc", "Right-Arc"]
            }
        }
    }
}

impl FromStr for SystemKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cov" | "Covington" => Ok(SystemKind::Covington),
            "NCov" | "NewCovington" => Ok(SystemKind::NewCovington),
            "Cov2" | "Covington2" => Ok(SystemKind::Covington2),
            "Cov3" | "Covington3" => Ok(SystemKind::Covington3),
            _ => Err(Error::UnknownSystem(s.to_string())),
        }
    }
}

impl fmt::Display for SystemKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait TransitionState {
    fn step(&self) -> usize {
        self.actions().len()
    }

    fn num_tokens(&self) -> usize;

    fn active(&self) -> &[Index];

    fn active_top(&self) -> Option<Index> {
        self.active().last().copied()
    }

    /// The active element `offset` positions below the top.
    fn active_at(&self, offset: Index) -> Option<Index> {
        let active = self.active();
        let offset = offset as usize;
        if offset < active.len() {
            Some(active[active.len() - 1 - offset])
        } else {
            None
        }
    }

    fn active_size(&self) -> usize {
        self.active().len()
    }

    fn reinserted(&self) -> &[Index];

    fn queue_head(&self) -> Option<Index>;

    fn queue_size(&self) -> usize;

    fn is_queue_empty(&self) -> bool {
        self.queue_size() == 0
    }

    fn head(&self, index: Index) -> Option<Index>;

    fn heads(&self) -> &[Option<Index>];

    fn label(&self, index: Index) -> Option<Label>;

    fn labels(&self) -> &[Option<Label>];

    fn tag(&self, index: Index) -> Option<Label>;

    fn candidates(&self) -> &[Candidate];

    fn gold(&self) -> Option<&Gold>;

    fn actions(&self) -> &[Action];
}

pub trait TransitionMutableState: TransitionState {
    /// Records `head` as the head of `index`. Fails if `index` already has a head or the
    /// arc would close a cycle.
    fn add_arc(&mut self, index: Index, head: Index, label: Label) -> Result<(), Error>;

    /// Moves the active element `offset` below the top, with everything above it, to the
    /// front of the reinserted list.
    fn reinsert(&mut self, offset: Index) -> Result<(), Error>;

    /// Merges the reinserted list back into the active list, appends the queue head and
    /// pops it from the queue.
    fn shift(&mut self, tag: Option<Label>, fine_tag: Option<Label>) -> Result<Index, Error>;

    fn set_candidates(&mut self, candidates: Vec<Candidate>);

    fn record(&mut self, action: Action);
}

/// Returns true iff attaching `dependent` under `head` would close a cycle, i.e. when
/// `dependent` lies on the head chain starting at `head` (itself included).
pub fn would_create_cycle(heads: &[Option<Index>], head: Index, dependent: Index) -> bool {
    let mut node = head;
    // an acyclic chain visits each token at most once
    for _ in 0..=heads.len() {
        if node == dependent {
            return true;
        }
        if node == ROOT {
            return false;
        }
        match heads.get(node as usize).and_then(|h| *h) {
            Some(next) => node = next,
            None => return false,
        }
    }
    true
}

/// Left-Arc at `offset`: the active element becomes a dependent of the queue head.
pub fn is_allowed_left_arc<S: TransitionState>(state: &S, offset: Index) -> bool {
    match (state.active_at(offset), state.queue_head()) {
        (Some(s), Some(b)) => {
            s != ROOT && state.head(s).is_none() && !would_create_cycle(state.heads(), b, s)
        }
        _ => false,
    }
}

/// Right-Arc at `offset`: the queue head becomes a dependent of the active element.
pub fn is_allowed_right_arc<S: TransitionState>(state: &S, offset: Index) -> bool {
    match (state.active_at(offset), state.queue_head()) {
        (Some(s), Some(b)) => state.head(b).is_none() && !would_create_cycle(state.heads(), s, b),
        _ => false,
    }
}

/// Maps `action` to its id within the blocks laid out by `candidates`.
pub fn encode_action(
    candidates: &[Candidate],
    action: &Action,
    num_relations: usize,
) -> Result<usize, Error> {
    let target = action.candidate();
    let mut base = 0;
    for candidate in candidates {
        let width = candidate.width(num_relations);
        if *candidate == target {
            let within = action.relation().unwrap_or(0) as usize;
            if within >= width {
                return Err(Error::InvalidArgument(format!(
                    "relation {} exceeds {} relation labels",
                    within, num_relations
                )));
            }
            return Ok(base + within);
        }
        base += width;
    }
    Err(Error::IllegalAction(*action))
}

/// Inverse of `encode_action` for the same `candidates`.
pub fn decode_action(
    candidates: &[Candidate],
    id: usize,
    num_relations: usize,
) -> Result<Action, Error> {
    let mut base = 0;
    for candidate in candidates {
        let width = candidate.width(num_relations);
        if id < base + width {
            return Ok(candidate.with_relation((id - base) as Label));
        }
        base += width;
    }
    Err(Error::IdOutOfRange { id, size: base })
}

pub fn num_encodable(candidates: &[Candidate], num_relations: usize) -> usize {
    candidates.iter().map(|c| c.width(num_relations)).sum()
}

/// The gold arc between the active element at `offset` and the queue head, if any.
pub(crate) fn gold_arc_at<S: TransitionState>(
    state: &S,
    gold: &Gold,
    offset: Index,
) -> Option<Action> {
    let s = state.active_at(offset)?;
    let b = state.queue_head()?;
    if let Some(relation) = gold.relation(b, s) {
        Some(Action::RightArc { offset, relation })
    } else if let Some(relation) = gold.relation(s, b) {
        Some(Action::LeftArc { offset, relation })
    } else {
        None
    }
}

/// Whether some active element still owes an arc to the queue head.
pub(crate) fn has_pending_arc<S: TransitionState>(state: &S, gold: &Gold) -> bool {
    let b = match state.queue_head() {
        Some(b) => b,
        None => return false,
    };
    state.active().iter().any(|&s| {
        (gold.relation(b, s).is_some() && state.head(b) != Some(s))
            || (gold.relation(s, b).is_some() && state.head(s) != Some(b))
    })
}

pub(crate) fn gold_shift<S: TransitionState>(state: &S, gold: &Gold) -> Action {
    match state.queue_head() {
        Some(b) => Action::Shift {
            tag: gold.tag(b),
            fine_tag: gold.fine_tag(b),
        },
        None => Action::shift(),
    }
}

pub(crate) fn resolve_gold<'a, S: TransitionState>(
    state: &'a S,
    gold: Option<&'a Gold>,
) -> Result<&'a Gold, Error> {
    if state.is_queue_empty() {
        return Err(Error::TerminalState);
    }
    gold.or_else(|| state.gold()).ok_or(Error::MissingGold)
}

pub(crate) fn shift_to_text(
    mappings: &Mappings,
    tag: Option<Label>,
    fine_tag: Option<Label>,
) -> Result<String, Error> {
    let pos = match tag {
        Some(id) => mappings.tag_name(id)?,
        None => NO_TAG,
    };
    match fine_tag {
        Some(id) => Ok(format!("{}\t{}\t{}", SHIFT, pos, mappings.tag_name(id)?)),
        None => Ok(format!("{}\t{}", SHIFT, pos)),
    }
}

pub(crate) fn shift_from_fields(
    mappings: &Mappings,
    fields: &[&str],
    line: &str,
) -> Result<Action, Error> {
    let parse = |field: &str| -> Result<Option<Label>, Error> {
        if field == NO_TAG {
            Ok(None)
        } else {
            mappings.tag_id(field).map(Some)
        }
    };
    match fields.len() {
        2 => Ok(Action::Shift {
            tag: parse(fields[1])?,
            fine_tag: None,
        }),
        3 => Ok(Action::Shift {
            tag: parse(fields[1])?,
            fine_tag: parse(fields[2])?,
        }),
        _ => Err(Error::MalformedLine(line.to_string())),
    }
}

/// Parses the one-based offset field written by the offset-carrying systems.
pub(crate) fn offset_from_field(field: &str, line: &str) -> Result<Index, Error> {
    match field.parse::<Index>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(Error::MalformedLine(line.to_string())),
    }
}

pub trait TransitionSystem {
    fn kind(&self) -> SystemKind;

    fn mappings(&self) -> &Mappings;

    fn num_relations(&self) -> usize {
        self.mappings().num_relations()
    }

    /// Enumerates the legal candidates for `state` in encoding order.
    fn legal_candidates<S: TransitionState>(&self, state: &S) -> Vec<Candidate>;

    fn prepare<S: TransitionMutableState>(&self, state: &mut S) {
        let candidates = self.legal_candidates(state);
        state.set_candidates(candidates);
    }

    /// Expands the cached candidates into full actions, in encoding order.
    fn legal_actions<S: TransitionState>(&self, state: &S) -> Vec<Action> {
        let num_relations = self.num_relations();
        state
            .candidates()
            .iter()
            .flat_map(|c| c.expand(num_relations))
            .collect()
    }

    fn is_allowed<S: TransitionState>(&self, action: &Action, state: &S) -> bool {
        if let Some(relation) = action.relation() {
            if relation as usize >= self.num_relations() {
                return false;
            }
        }
        state.candidates().contains(&action.candidate())
    }

    fn is_terminal<S: TransitionState>(&self, state: &S) -> bool {
        state.is_queue_empty()
    }

    /// Mutates `state` for `action` without consulting the cached candidates.
    fn apply<S: TransitionMutableState>(&self, action: Action, state: &mut S) -> Result<(), Error>;

    /// Applies a legal action (or decodes an id first), records it and recomputes the
    /// candidates. Actions outside the cached candidates are rejected.
    fn advance<S, T>(&self, state: &mut S, step: T) -> Result<Action, Error>
    where
        S: TransitionMutableState,
        T: Into<Step>,
    {
        let action = match step.into() {
            Step::Action(action) => action,
            Step::Id(id) => self.decode(state, id)?,
        };
        if !self.is_allowed(&action, state) {
            return Err(Error::IllegalAction(action));
        }
        self.apply(action, state)?;
        state.record(action);
        self.prepare(state);
        Ok(action)
    }

    /// The canonical next action towards `gold`, falling back to the gold structure bound
    /// to `state`.
    fn gold_transition<S: TransitionState>(
        &self,
        state: &S,
        gold: Option<&Gold>,
    ) -> Result<Action, Error>;

    fn encode<S: TransitionState>(&self, state: &S, action: &Action) -> Result<usize, Error> {
        encode_action(state.candidates(), action, self.num_relations())
    }

    /// Decodes `id` against the candidates cached on `state`.
    ///
    /// The id must have been produced by `encode` on this very configuration; ids computed
    /// against any other configuration decode to unrelated actions.
    fn decode<S: TransitionState>(&self, state: &S, id: usize) -> Result<Action, Error> {
        decode_action(state.candidates(), id, self.num_relations())
    }

    fn num_encodable<S: TransitionState>(&self, state: &S) -> usize {
        num_encodable(state.candidates(), self.num_relations())
    }

    fn to_text(&self, action: &Action) -> Result<String, Error>;

    fn from_text(&self, line: &str) -> Result<Action, Error>;
}

/// One of the four systems, dispatched by value.
#[derive(Debug, Clone)]
pub enum System {
    Covington(Covington),
    NewCovington(NewCovington),
    Covington2(Covington2),
    Covington3(Covington3),
}

macro_rules! dispatch {
    ($self:expr, $system:ident => $body:expr) => {
        match *$self {
            System::Covington(ref $system) => $body,
            System::NewCovington(ref $system) => $body,
            System::Covington2(ref $system) => $body,
            System::Covington3(ref $system) => $body,
        }
    };
}

impl System {
    pub fn new(kind: SystemKind, mappings: Arc<Mappings>) -> Result<Self, Error> {
        let system = match kind {
            SystemKind::Covington => System::Covington(Covington::new(mappings)?),
            SystemKind::NewCovington => System::NewCovington(NewCovington::new(mappings)?),
            SystemKind::Covington2 => System::Covington2(Covington2::new(mappings)?),
            SystemKind::Covington3 => System::Covington3(Covington3::new(mappings)?),
        };
        Ok(system)
    }
}

impl TransitionSystem for System {
    fn kind(&self) -> SystemKind {
        dispatch!(self, system => system.kind())
    }

    fn mappings(&self) -> &Mappings {
        dispatch!(self, system => system.mappings())
    }

    fn legal_candidates<S: TransitionState>(&self, state: &S) -> Vec<Candidate> {
        dispatch!(self, system => system.legal_candidates(state))
    }

    fn apply<S: TransitionMutableState>(&self, action: Action, state: &mut S) -> Result<(), Error> {
        dispatch!(self, system => system.apply(action, state))
    }

    fn gold_transition<S: TransitionState>(
        &self,
        state: &S,
        gold: Option<&Gold>,
    ) -> Result<Action, Error> {
        dispatch!(self, system => system.gold_transition(state, gold))
    }

    fn to_text(&self, action: &Action) -> Result<String, Error> {
        dispatch!(self, system => system.to_text(action))
    }

    fn from_text(&self, line: &str) -> Result<Action, Error> {
        dispatch!(self, system => system.from_text(line))
    }
}
