use std::sync::Arc;

use super::{
    gold_arc_at, gold_shift, has_pending_arc, is_allowed_left_arc, is_allowed_right_arc,
    offset_from_field, resolve_gold, shift_from_fields, shift_to_text, Action, Candidate, Error,
    Gold, Index, Label, Mappings, SystemKind, TransitionMutableState, TransitionState,
    TransitionSystem, LEFT_ARC, NO_ARC, NO_ARC_FILLER, RIGHT_ARC, SHIFT,
};

/// How many active elements, counted from the top, an arc may reach.
pub const LOOK_BACK: Index = 3;

/// Covington's system with arcs reaching up to `LOOK_BACK` elements below the top of the
/// active list; NoArc still steps one element deeper for anything farther.
#[derive(Debug, Clone)]
pub struct Covington3 {
    mappings: Arc<Mappings>,
}

impl Covington3 {
    pub fn new(mappings: Arc<Mappings>) -> Result<Self, Error> {
        mappings.validate(SystemKind::Covington3)?;
        Ok(Covington3 { mappings })
    }

    /// Shift: (λ1, λ2, j|β, A) => (λ1.λ2|j, [], β, A)
    pub fn apply_shift<S: TransitionMutableState>(
        state: &mut S,
        tag: Option<Label>,
        fine_tag: Option<Label>,
    ) -> Result<(), Error> {
        debug_assert!(Covington3::is_allowed_shift(state));
        state.shift(tag, fine_tag).map(|_| ())
    }

    /// NoArc: (λ1|i, λ2, β, A) => (λ1, i|λ2, β, A)
    pub fn apply_no_arc<S: TransitionMutableState>(state: &mut S) -> Result<(), Error> {
        debug_assert!(Covington3::is_allowed_no_arc(state));
        state.reinsert(0)
    }

    /// Left Arc(k), k < 3: (λ1|i|i_k..i_1, λ2, j|β, A) => (λ1, i|i_k..i_1|λ2, j|β, A + (j,l,i))
    pub fn apply_left_arc<S: TransitionMutableState>(
        state: &mut S,
        offset: Index,
        relation: Label,
    ) -> Result<(), Error> {
        debug_assert!(offset < LOOK_BACK && is_allowed_left_arc(state, offset));
        let s = state
            .active_at(offset)
            .ok_or(Error::InvalidOperation("offset exceeds the active list"))?;
        let b0 = state.queue_head().ok_or(Error::TerminalState)?;
        state.add_arc(s, b0, relation)?;
        state.reinsert(offset)
    }

    /// Right Arc(k), k < 3: (λ1|i|i_k..i_1, λ2, j|β, A) => (λ1, i|i_k..i_1|λ2, j|β, A + (i,l,j))
    pub fn apply_right_arc<S: TransitionMutableState>(
        state: &mut S,
        offset: Index,
        relation: Label,
    ) -> Result<(), Error> {
        debug_assert!(offset < LOOK_BACK && is_allowed_right_arc(state, offset));
        let s = state
            .active_at(offset)
            .ok_or(Error::InvalidOperation("offset exceeds the active list"))?;
        let b0 = state.queue_head().ok_or(Error::TerminalState)?;
        state.add_arc(b0, s, relation)?;
        state.reinsert(offset)
    }

    pub fn is_allowed_shift<S: TransitionState>(state: &S) -> bool {
        !state.is_queue_empty()
    }

    pub fn is_allowed_no_arc<S: TransitionState>(state: &S) -> bool {
        !state.is_queue_empty() && state.active_size() > 0
    }

    fn reach<S: TransitionState>(state: &S) -> Index {
        LOOK_BACK.min(state.active_size() as Index)
    }
}

impl TransitionSystem for Covington3 {
    fn kind(&self) -> SystemKind {
        SystemKind::Covington3
    }

    fn mappings(&self) -> &Mappings {
        &self.mappings
    }

    fn legal_candidates<S: TransitionState>(&self, state: &S) -> Vec<Candidate> {
        let mut candidates = Vec::with_capacity(2 + 2 * LOOK_BACK as usize);
        if !Covington3::is_allowed_shift(state) {
            return candidates;
        }
        candidates.push(Candidate::Shift);
        if Covington3::is_allowed_no_arc(state) {
            candidates.push(Candidate::Reject);
        }
        let reach = Covington3::reach(state);
        for offset in 0..reach {
            if is_allowed_left_arc(state, offset) {
                candidates.push(Candidate::LeftArc(offset));
            }
        }
        for offset in 0..reach {
            if is_allowed_right_arc(state, offset) {
                candidates.push(Candidate::RightArc(offset));
            }
        }
        candidates
    }

    fn apply<S: TransitionMutableState>(&self, action: Action, state: &mut S) -> Result<(), Error> {
        match action {
            Action::Shift { tag, fine_tag } => Covington3::apply_shift(state, tag, fine_tag),
            Action::Reject => Covington3::apply_no_arc(state),
            Action::LeftArc { offset, relation } => {
                Covington3::apply_left_arc(state, offset, relation)
            }
            Action::RightArc { offset, relation } => {
                Covington3::apply_right_arc(state, offset, relation)
            }
        }
    }

    fn gold_transition<S: TransitionState>(
        &self,
        state: &S,
        gold: Option<&Gold>,
    ) -> Result<Action, Error> {
        let gold = resolve_gold(state, gold)?;
        if state.active_size() == 0 {
            return Ok(gold_shift(state, gold));
        }
        for offset in 0..Covington3::reach(state) {
            if let Some(action) = gold_arc_at(state, gold, offset) {
                return Ok(action);
            }
        }
        if has_pending_arc(state, gold) {
            Ok(Action::Reject)
        } else {
            Ok(gold_shift(state, gold))
        }
    }

    fn to_text(&self, action: &Action) -> Result<String, Error> {
        match *action {
            Action::Shift { tag, fine_tag } => shift_to_text(&self.mappings, tag, fine_tag),
            Action::Reject => Ok(format!("{}\t{}\t{}", NO_ARC, NO_ARC_FILLER, NO_ARC_FILLER)),
            Action::LeftArc { offset, relation } => Ok(format!(
                "{}\t{}\t{}",
                LEFT_ARC,
                offset + 1,
                self.mappings.relation_name(relation)?
            )),
            Action::RightArc { offset, relation } => Ok(format!(
                "{}\t{}\t{}",
                RIGHT_ARC,
                offset + 1,
                self.mappings.relation_name(relation)?
            )),
        }
    }

    fn from_text(&self, line: &str) -> Result<Action, Error> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let keyword = match fields.first() {
            Some(keyword) => *keyword,
            None => return Err(Error::MalformedLine(line.to_string())),
        };
        if keyword == SHIFT {
            return shift_from_fields(&self.mappings, &fields, line);
        }
        if keyword == NO_ARC {
            return match fields.len() {
                1 | 3 => Ok(Action::Reject),
                _ => Err(Error::MalformedLine(line.to_string())),
            };
        }
        if keyword != LEFT_ARC && keyword != RIGHT_ARC {
            return Err(Error::UnknownKeyword(keyword.to_string()));
        }
        if fields.len() != 3 {
            return Err(Error::MalformedLine(line.to_string()));
        }
        let offset = offset_from_field(fields[1], line)?;
        if offset >= LOOK_BACK {
            return Err(Error::MalformedLine(line.to_string()));
        }
        let relation = self.mappings.relation_id(fields[2])?;
        if keyword == LEFT_ARC {
            Ok(Action::LeftArc { offset, relation })
        } else {
            Ok(Action::RightArc { offset, relation })
        }
    }
}
