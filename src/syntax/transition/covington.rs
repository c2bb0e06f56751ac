use std::sync::Arc;

use super::{
    gold_arc_at, gold_shift, has_pending_arc, is_allowed_left_arc, is_allowed_right_arc,
    resolve_gold, shift_from_fields, shift_to_text, Action, Candidate, Error, Gold, Label,
    Mappings, SystemKind, TransitionMutableState, TransitionState, TransitionSystem, LEFT_ARC,
    NO_ARC, RIGHT_ARC, SHIFT,
};

/// Covington's non-projective system: arcs only between the top of the active list and the
/// queue head, with NoArc stepping one element deeper.
///
/// References:
/// - http://www.aclweb.org/anthology/J08-4003 (Nivre, 2008)
#[derive(Debug, Clone)]
pub struct Covington {
    mappings: Arc<Mappings>,
}

impl Covington {
    pub fn new(mappings: Arc<Mappings>) -> Result<Self, Error> {
        mappings.validate(SystemKind::Covington)?;
        Ok(Covington { mappings })
    }

    /// Shift: (λ1, λ2, j|β, A) => (λ1.λ2|j, [], β, A)
    pub fn apply_shift<S: TransitionMutableState>(
        state: &mut S,
        tag: Option<Label>,
        fine_tag: Option<Label>,
    ) -> Result<(), Error> {
        debug_assert!(Covington::is_allowed_shift(state));
        state.shift(tag, fine_tag).map(|_| ())
    }

    /// NoArc: (λ1|i, λ2, β, A) => (λ1, i|λ2, β, A)
    pub fn apply_no_arc<S: TransitionMutableState>(state: &mut S) -> Result<(), Error> {
        debug_assert!(Covington::is_allowed_no_arc(state));
        state.reinsert(0)
    }

    /// Left Arc: (λ1|i, λ2, j|β, A) => (λ1, i|λ2, j|β, A + (j,l,i))
    pub fn apply_left_arc<S: TransitionMutableState>(
        state: &mut S,
        relation: Label,
    ) -> Result<(), Error> {
        debug_assert!(is_allowed_left_arc(state, 0));
        let s0 = state
            .active_top()
            .ok_or(Error::InvalidOperation("active list is empty"))?;
        let b0 = state.queue_head().ok_or(Error::TerminalState)?;
        state.add_arc(s0, b0, relation)?;
        state.reinsert(0)
    }

    /// Right Arc: (λ1|i, λ2, j|β, A) => (λ1, i|λ2, j|β, A + (i,l,j))
    pub fn apply_right_arc<S: TransitionMutableState>(
        state: &mut S,
        relation: Label,
    ) -> Result<(), Error> {
        debug_assert!(is_allowed_right_arc(state, 0));
        let s0 = state
            .active_top()
            .ok_or(Error::InvalidOperation("active list is empty"))?;
        let b0 = state.queue_head().ok_or(Error::TerminalState)?;
        state.add_arc(b0, s0, relation)?;
        state.reinsert(0)
    }

    pub fn is_allowed_shift<S: TransitionState>(state: &S) -> bool {
        !state.is_queue_empty()
    }

    pub fn is_allowed_no_arc<S: TransitionState>(state: &S) -> bool {
        !state.is_queue_empty() && state.active_size() > 0
    }
}

impl TransitionSystem for Covington {
    fn kind(&self) -> SystemKind {
        SystemKind::Covington
    }

    fn mappings(&self) -> &Mappings {
        &self.mappings
    }

    fn legal_candidates<S: TransitionState>(&self, state: &S) -> Vec<Candidate> {
        let mut candidates = Vec::with_capacity(4);
        if !Covington::is_allowed_shift(state) {
            return candidates;
        }
        candidates.push(Candidate::Shift);
        if Covington::is_allowed_no_arc(state) {
            candidates.push(Candidate::Reject);
        }
        if is_allowed_left_arc(state, 0) {
            candidates.push(Candidate::LeftArc(0));
        }
        if is_allowed_right_arc(state, 0) {
            candidates.push(Candidate::RightArc(0));
        }
        candidates
    }

    fn apply<S: TransitionMutableState>(&self, action: Action, state: &mut S) -> Result<(), Error> {
        match action {
            Action::Shift { tag, fine_tag } => Covington::apply_shift(state, tag, fine_tag),
            Action::Reject => Covington::apply_no_arc(state),
            Action::LeftArc { relation, .. } => Covington::apply_left_arc(state, relation),
            Action::RightArc { relation, .. } => Covington::apply_right_arc(state, relation),
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
        if let Some(action) = gold_arc_at(state, gold, 0) {
            Ok(action)
        } else if has_pending_arc(state, gold) {
            Ok(Action::Reject)
        } else {
            Ok(gold_shift(state, gold))
        }
    }

    fn to_text(&self, action: &Action) -> Result<String, Error> {
        match *action {
            Action::Shift { tag, fine_tag } => shift_to_text(&self.mappings, tag, fine_tag),
            Action::Reject => Ok(NO_ARC.to_string()),
            Action::LeftArc { relation, .. } => Ok(format!(
                "{}\t{}",
                LEFT_ARC,
                self.mappings.relation_name(relation)?
            )),
            Action::RightArc { relation, .. } => Ok(format!(
                "{}\t{}",
                RIGHT_ARC,
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
            shift_from_fields(&self.mappings, &fields, line)
        } else if keyword == NO_ARC {
            if fields.len() != 1 {
                return Err(Error::MalformedLine(line.to_string()));
            }
            Ok(Action::Reject)
        } else if keyword == LEFT_ARC || keyword == RIGHT_ARC {
            if fields.len() != 2 {
                return Err(Error::MalformedLine(line.to_string()));
            }
            let relation = self.mappings.relation_id(fields[1])?;
            if keyword == LEFT_ARC {
                Ok(Action::LeftArc {
                    offset: 0,
                    relation,
                })
            } else {
                Ok(Action::RightArc {
                    offset: 0,
                    relation,
                })
            }
        } else {
            Err(Error::UnknownKeyword(keyword.to_string()))
        }
    }
}
