use std::sync::Arc;

use super::{
    gold_arc_at, gold_shift, has_pending_arc, is_allowed_left_arc, is_allowed_right_arc,
    offset_from_field, resolve_gold, shift_from_fields, shift_to_text, Action, Candidate, Error,
    Gold, Label, Mappings, SystemKind, TransitionMutableState, TransitionState, TransitionSystem,
    LEFT_ARC, NO_ARC, NO_ARC_FILLER, RIGHT_ARC, SHIFT,
};

/// Covington's system with every non-Shift line written in the same three-field shape
/// (`keyword offset relation`), the offset always being the top of the active list.
#[derive(Debug, Clone)]
pub struct Covington2 {
    mappings: Arc<Mappings>,
}

impl Covington2 {
    pub fn new(mappings: Arc<Mappings>) -> Result<Self, Error> {
        mappings.validate(SystemKind::Covington2)?;
        Ok(Covington2 { mappings })
    }

    /// Shift: (λ1, λ2, j|β, A) => (λ1.λ2|j, [], β, A)
    pub fn apply_shift<S: TransitionMutableState>(
        state: &mut S,
        tag: Option<Label>,
        fine_tag: Option<Label>,
    ) -> Result<(), Error> {
        debug_assert!(Covington2::is_allowed_shift(state));
        state.shift(tag, fine_tag).map(|_| ())
    }

    /// NoArc: (λ1|i, λ2, β, A) => (λ1, i|λ2, β, A)
    pub fn apply_no_arc<S: TransitionMutableState>(state: &mut S) -> Result<(), Error> {
        debug_assert!(Covington2::is_allowed_no_arc(state));
        state.reinsert(0)
    }

    /// Left Arc: (λ1|i, λ2, j|β, A) => (λ1, i|λ2, j|β, A + (j,l,i))
    pub fn apply_left_arc<S: TransitionMutableState>(
        state: &mut S,
        relation: Label,
    ) -> Result<(), Error> {
        debug_assert!(is_allowed_left_arc(state, 0));
        match (state.active_top(), state.queue_head()) {
            (Some(s0), Some(b0)) => {
                state.add_arc(s0, b0, relation)?;
                state.reinsert(0)
            }
            _ => Err(Error::InvalidOperation("left arc needs an active top and a queue head")),
        }
    }

    /// Right Arc: (λ1|i, λ2, j|β, A) => (λ1, i|λ2, j|β, A + (i,l,j))
    pub fn apply_right_arc<S: TransitionMutableState>(
        state: &mut S,
        relation: Label,
    ) -> Result<(), Error> {
        debug_assert!(is_allowed_right_arc(state, 0));
        match (state.active_top(), state.queue_head()) {
            (Some(s0), Some(b0)) => {
                state.add_arc(b0, s0, relation)?;
                state.reinsert(0)
            }
            _ => Err(Error::InvalidOperation("right arc needs an active top and a queue head")),
        }
    }

    pub fn is_allowed_shift<S: TransitionState>(state: &S) -> bool {
        !state.is_queue_empty()
    }

    pub fn is_allowed_no_arc<S: TransitionState>(state: &S) -> bool {
        !state.is_queue_empty() && !state.active().is_empty()
    }
}

impl TransitionSystem for Covington2 {
    fn kind(&self) -> SystemKind {
        SystemKind::Covington2
    }

    fn mappings(&self) -> &Mappings {
        &self.mappings
    }

    fn legal_candidates<S: TransitionState>(&self, state: &S) -> Vec<Candidate> {
        let mut candidates = vec![];
        if Covington2::is_allowed_shift(state) {
            candidates.push(Candidate::Shift);
        }
        if Covington2::is_allowed_no_arc(state) {
            candidates.push(Candidate::Reject);
            if is_allowed_left_arc(state, 0) {
                candidates.push(Candidate::LeftArc(0));
            }
            if is_allowed_right_arc(state, 0) {
                candidates.push(Candidate::RightArc(0));
            }
        }
        candidates
    }

    fn apply<S: TransitionMutableState>(&self, action: Action, state: &mut S) -> Result<(), Error> {
        match action {
            Action::Shift { tag, fine_tag } => Covington2::apply_shift(state, tag, fine_tag),
            Action::Reject => Covington2::apply_no_arc(state),
            Action::LeftArc { relation, .. } => Covington2::apply_left_arc(state, relation),
            Action::RightArc { relation, .. } => Covington2::apply_right_arc(state, relation),
        }
    }

    fn gold_transition<S: TransitionState>(
        &self,
        state: &S,
        gold: Option<&Gold>,
    ) -> Result<Action, Error> {
        let gold = resolve_gold(state, gold)?;
        let action = match state.active_top() {
            None => gold_shift(state, gold),
            Some(_) => match gold_arc_at(state, gold, 0) {
                Some(arc) => arc,
                None if has_pending_arc(state, gold) => Action::Reject,
                None => gold_shift(state, gold),
            },
        };
        Ok(action)
    }

    fn to_text(&self, action: &Action) -> Result<String, Error> {
        let (keyword, relation) = match *action {
            Action::Shift { tag, fine_tag } => {
                return shift_to_text(&self.mappings, tag, fine_tag);
            }
            Action::Reject => {
                return Ok(format!("{}\t{}\t{}", NO_ARC, NO_ARC_FILLER, NO_ARC_FILLER));
            }
            Action::LeftArc { relation, .. } => (LEFT_ARC, relation),
            Action::RightArc { relation, .. } => (RIGHT_ARC, relation),
        };
        Ok(format!(
            "{}\t1\t{}",
            keyword,
            self.mappings.relation_name(relation)?
        ))
    }

    fn from_text(&self, line: &str) -> Result<Action, Error> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.first() {
            Some(&keyword) if keyword == SHIFT => shift_from_fields(&self.mappings, &fields, line),
            Some(&keyword) if keyword == NO_ARC => match fields.len() {
                1 | 3 => Ok(Action::Reject),
                _ => Err(Error::MalformedLine(line.to_string())),
            },
            Some(&keyword) if keyword == LEFT_ARC || keyword == RIGHT_ARC => {
                if fields.len() != 3 || offset_from_field(fields[1], line)? != 0 {
                    return Err(Error::MalformedLine(line.to_string()));
                }
                let relation = self.mappings.relation_id(fields[2])?;
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
            }
            Some(&keyword) => Err(Error::UnknownKeyword(keyword.to_string())),
            None => Err(Error::MalformedLine(line.to_string())),
        }
    }
}
