//! Drives a transition system with its gold oracle to produce canonical action sequences.

use std::sync::Arc;

use slog::{Discard, Logger};

use super::{
    Action, Candidate, Configuration, Error, Gold, Index, Label, System, TransitionState,
    TransitionSystem,
};
use crate::config::Config;

#[inline]
fn estimate_num_actions(num_tokens: usize) -> usize {
    2 * num_tokens
}

/// Upper bound on the actions needed for `num_tokens` tokens (root included): every queue
/// head takes one Shift and at most one non-Shift action per active element.
#[inline]
pub fn step_limit(num_tokens: usize) -> usize {
    num_tokens * num_tokens + num_tokens
}

pub struct Oracle {
    system: Arc<System>,
    logger: Logger,
    verify: bool,
}

impl Oracle {
    pub fn new(system: Arc<System>) -> Self {
        Oracle {
            system,
            logger: Logger::root(Discard, o!()),
            verify: true,
        }
    }

    pub fn from_config(config: &Config, system: Arc<System>, logger: &Logger) -> Self {
        Oracle {
            logger: logger.new(o!("system" => config.system.as_str())),
            verify: config.verify,
            system,
        }
    }

    pub fn logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Whether a generated sequence is checked against the gold arcs at the end. Every
    /// oracle action is checked for legality by `advance` either way.
    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn system(&self) -> &Arc<System> {
        &self.system
    }

    pub fn generate(&self, gold: Arc<Gold>) -> Result<GoldState, Error> {
        self.generate_with(gold, |_, _| ())
    }

    /// Runs the oracle to a terminal configuration, calling `observe` with every
    /// configuration and the action chosen for it.
    pub fn generate_with<F>(&self, gold: Arc<Gold>, mut observe: F) -> Result<GoldState, Error>
    where
        F: FnMut(&Configuration, &Action),
    {
        let num_tokens = gold.num_tokens();
        let limit = step_limit(num_tokens);
        let mut internal =
            Configuration::with_capacity(num_tokens as Index, estimate_num_actions(num_tokens));
        internal.bind(self.system.clone());
        internal.set_gold(gold.clone());
        while !self.system.is_terminal(&internal) {
            if internal.step() >= limit {
                return Err(Error::StepLimit(limit));
            }
            let action = self.system.gold_transition(&internal, Some(&*gold))?;
            trace!(self.logger, "oracle";
                   "step" => internal.step(),
                   "action" => %action,
                   "active" => ?internal.active(),
                   "queue_head" => ?internal.queue_head());
            observe(&internal, &action);
            self.system.advance(&mut internal, action)?;
        }
        if self.verify && !internal.is_complete(&gold) {
            return Err(Error::IncompleteOracle);
        }
        debug!(self.logger, "generated oracle sequence";
               "tokens" => num_tokens,
               "actions" => internal.step());
        Ok(GoldState { internal })
    }

    /// Re-applies a stored sequence from the initial configuration of a sentence with
    /// `num_tokens` tokens (root included).
    pub fn replay(&self, num_tokens: usize, actions: &[Action]) -> Result<Configuration, Error> {
        let mut state = Configuration::with_capacity(num_tokens as Index, actions.len());
        state.bind(self.system.clone());
        for &action in actions {
            self.system.advance(&mut state, action)?;
        }
        debug!(self.logger, "replayed oracle sequence";
               "tokens" => num_tokens,
               "actions" => actions.len(),
               "terminal" => state.is_terminal());
        Ok(state)
    }
}

/// Terminal configuration reached by following the gold oracle.
#[derive(Debug, Clone)]
pub struct GoldState {
    internal: Configuration,
}

impl GoldState {
    pub fn into_inner(self) -> Configuration {
        self.internal
    }

    pub fn configuration(&self) -> &Configuration {
        &self.internal
    }
}

impl TransitionState for GoldState {
    fn step(&self) -> usize {
        self.internal.step()
    }

    fn num_tokens(&self) -> usize {
        self.internal.num_tokens()
    }

    fn active(&self) -> &[Index] {
        self.internal.active()
    }

    fn reinserted(&self) -> &[Index] {
        self.internal.reinserted()
    }

    fn queue_head(&self) -> Option<Index> {
        self.internal.queue_head()
    }

    fn queue_size(&self) -> usize {
        self.internal.queue_size()
    }

    fn head(&self, index: Index) -> Option<Index> {
        self.internal.head(index)
    }

    fn heads(&self) -> &[Option<Index>] {
        self.internal.heads()
    }

    fn label(&self, index: Index) -> Option<Label> {
        self.internal.label(index)
    }

    fn labels(&self) -> &[Option<Label>] {
        self.internal.labels()
    }

    fn tag(&self, index: Index) -> Option<Label> {
        self.internal.tag(index)
    }

    fn candidates(&self) -> &[Candidate] {
        self.internal.candidates()
    }

    fn gold(&self) -> Option<&Gold> {
        self.internal.gold()
    }

    fn actions(&self) -> &[Action] {
        self.internal.actions()
    }
}
