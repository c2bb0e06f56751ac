use std::sync::Arc;

use super::{
    gold_arc_at, gold_shift, is_allowed_left_arc, is_allowed_right_arc, offset_from_field,
    resolve_gold, shift_from_fields, shift_to_text, Action, Candidate, Error, Gold, Index, Label,
    Mappings, SystemKind, TransitionMutableState, TransitionState, TransitionSystem, LEFT_ARC,
    RIGHT_ARC, SHIFT,
};

/// Covington variant without NoArc: an arc may reach any depth of the active list in one
/// step, so the elements above the attached one are skipped together with it.
#[derive(Debug, Clone)]
pub struct NewCovington {
    mappings: Arc<Mappings>,
}

impl NewCovington {
    pub fn new(mappings: Arc<Mappings>) -> Result<Self, Error> {
        mappings.validate(SystemKind::NewCovington)?;
        Ok(NewCovington { mappings })
    }

    /// Shift: (λ1, λ2, j|β, A) => (λ1.λ2|j, [], β, A)
    pub fn apply_shift<S: TransitionMutableState>(
        state: &mut S,
        tag: Option<Label>,
        fine_tag: Option<Label>,
    ) -> Result<(), Error> {
        debug_assert!(NewCovington::is_allowed_shift(state));
        state.shift(tag, fine_tag).map(|_| ())
    }

    /// Left Arc(k): (λ1|i|i_k..i_1, λ2, j|β, A) => (λ1, i|i_k..i_1|λ2, j|β, A + (j,l,i))
    pub fn apply_left_arc<S: TransitionMutableState>(
        state: &mut S,
        offset: Index,
        relation: Label,
    ) -> Result<(), Error> {
        debug_assert!(is_allowed_left_arc(state, offset));
        let s = state
            .active_at(offset)
            .ok_or(Error::InvalidOperation("offset exceeds the active list"))?;
        let b0 = state.queue_head().ok_or(Error::TerminalState)?;
        state.add_arc(s, b0, relation)?;
        state.reinsert(offset)
    }

    /// Right Arc(k): (λ1|i|i_k..i_1, λ2, j|β, A) => (λ1, i|i_k..i_1|λ2, j|β, A + (i,l,j))
    pub fn apply_right_arc<S: TransitionMutableState>(
        state: &mut S,
        offset: Index,
        relation: Label,
    ) -> Result<(), Error> {
        debug_assert!(is_allowed_right_arc(state, offset));
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
}

impl TransitionSystem for NewCovington {
    fn kind(&self) -> SystemKind {
        SystemKind::NewCovington
    }

    fn mappings(&self) -> &Mappings {
        &self.mappings
    }

    fn legal_candidates<S: TransitionState>(&self, state: &S) -> Vec<Candidate> {
        let depth = state.active_size() as Index;
        let mut candidates = Vec::with_capacity(1 + 2 * depth as usize);
        if !NewCovington::is_allowed_shift(state) {
            return candidates;
        }
        candidates.push(Candidate::Shift);
        candidates.extend(
            (0..depth)
                .filter(|&offset| is_allowed_left_arc(state, offset))
                .map(Candidate::LeftArc),
        );
        candidates.extend(
            (0..depth)
                .filter(|&offset| is_allowed_right_arc(state, offset))
                .map(Candidate::RightArc),
        );
        candidates
    }

    fn apply<S: TransitionMutableState>(&self, action: Action, state: &mut S) -> Result<(), Error> {
        match action {
            Action::Shift { tag, fine_tag } => NewCovington::apply_shift(state, tag, fine_tag),
            Action::LeftArc { offset, relation } => {
                NewCovington::apply_left_arc(state, offset, relation)
            }
            Action::RightArc { offset, relation } => {
                NewCovington::apply_right_arc(state, offset, relation)
            }
            Action::Reject => Err(Error::IllegalAction(action)),
        }
    }

    fn gold_transition<S: TransitionState>(
        &self,
        state: &S,
        gold: Option<&Gold>,
    ) -> Result<Action, Error> {
        let gold = resolve_gold(state, gold)?;
        let depth = state.active_size() as Index;
        let arc = (0..depth).find_map(|offset| gold_arc_at(state, gold, offset));
        Ok(arc.unwrap_or_else(|| gold_shift(state, gold)))
    }

    fn to_text(&self, action: &Action) -> Result<String, Error> {
        match *action {
            Action::Shift { tag, fine_tag } => shift_to_text(&self.mappings, tag, fine_tag),
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
            Action::Reject => Err(Error::IllegalAction(*action)),
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
        } else if keyword == LEFT_ARC || keyword == RIGHT_ARC {
            if fields.len() != 3 {
                return Err(Error::MalformedLine(line.to_string()));
            }
            let offset = offset_from_field(fields[1], line)?;
            let relation = self.mappings.relation_id(fields[2])?;
            if keyword == LEFT_ARC {
                Ok(Action::LeftArc { offset, relation })
            } else {
                Ok(Action::RightArc { offset, relation })
            }
        } else {
            Err(Error::UnknownKeyword(keyword.to_string()))
        }
    }
}
