use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Error, Label, SystemKind};
use crate::preprocessing::Vocab;

static ACTION_NAMESPACE: &str = "action";
static REL_NAMESPACE: &str = "rel";
static POS_NAMESPACE: &str = "pos";

/// The vocabularies a transition system is built with: action names, relation labels and
/// part-of-speech tags. Each `Vocab` carries both directions of its mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mappings {
    action: Vocab,
    rel: Vocab,
    #[serde(default)]
    pos: Vocab,
}

impl Mappings {
    pub fn new(action: Vocab, rel: Vocab) -> Self {
        Mappings {
            action,
            rel,
            pos: Vocab::new(),
        }
    }

    /// Builds the canonical action vocabulary for `kind` alongside the given labels.
    pub fn for_system<I, S>(kind: SystemKind, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Mappings::new(
            Vocab::from_names(kind.actions_list().iter().cloned()),
            Vocab::from_names(relations),
        )
    }

    /// Builds from namespace-keyed forward maps. `action` and `rel` are required, `pos` is
    /// optional; every map must use the ids `0..len` exactly once.
    pub fn from_maps(forward: &HashMap<String, HashMap<String, Label>>) -> Result<Self, Error> {
        let vocab = |namespace: &'static str, required: bool| -> Result<Vocab, Error> {
            match forward.get(namespace) {
                Some(map) => Vocab::from_ids(map).ok_or_else(|| {
                    Error::InvalidArgument(format!("`{}` ids are not contiguous", namespace))
                }),
                None if required => Err(Error::InvalidArgument(format!(
                    "missing `{}` mapping",
                    namespace
                ))),
                None => Ok(Vocab::new()),
            }
        };
        Ok(Mappings {
            action: vocab(ACTION_NAMESPACE, true)?,
            rel: vocab(REL_NAMESPACE, true)?,
            pos: vocab(POS_NAMESPACE, false)?,
        })
    }

    pub fn with_pos(mut self, pos: Vocab) -> Self {
        self.pos = pos;
        self
    }

    pub fn action(&self) -> &Vocab {
        &self.action
    }

    pub fn rel(&self) -> &Vocab {
        &self.rel
    }

    pub fn pos(&self) -> &Vocab {
        &self.pos
    }

    pub fn num_relations(&self) -> usize {
        self.rel.size()
    }

    pub fn validate(&self, kind: SystemKind) -> Result<(), Error> {
        match kind
            .actions_list()
            .iter()
            .find(|name| !self.action.contains(**name))
        {
            Some(name) => Err(Error::MissingAction(*name)),
            None => Ok(()),
        }
    }

    pub fn relation_name(&self, id: Label) -> Result<&str, Error> {
        self.rel.lookup(id).ok_or(Error::UnknownLabelId {
            namespace: REL_NAMESPACE,
            id,
        })
    }

    pub fn relation_id(&self, name: &str) -> Result<Label, Error> {
        self.rel.get(name).ok_or_else(|| Error::UnknownLabel {
            namespace: REL_NAMESPACE,
            name: name.to_string(),
        })
    }

    pub fn tag_name(&self, id: Label) -> Result<&str, Error> {
        self.pos.lookup(id).ok_or(Error::UnknownLabelId {
            namespace: POS_NAMESPACE,
            id,
        })
    }

    pub fn tag_id(&self, name: &str) -> Result<Label, Error> {
        self.pos.get(name).ok_or_else(|| Error::UnknownLabel {
            namespace: POS_NAMESPACE,
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward(entries: &[(&str, &[(&str, Label)])]) -> HashMap<String, HashMap<String, Label>> {
        entries
            .iter()
            .map(|(namespace, map)| {
                let map = map.iter().map(|(k, v)| (k.to_string(), *v)).collect();
                (namespace.to_string(), map)
            })
            .collect()
    }

    #[test]
    fn test_from_maps() {
        let maps = forward(&[
            ("action", &[("Shift", 0), ("Left-Arc", 1), ("Right-Arc", 2)]),
            ("rel", &[("root", 1), ("nsubj", 0)]),
        ]);
        let mappings = Mappings::from_maps(&maps).unwrap();
        assert_eq!(mappings.num_relations(), 2);
        assert_eq!(mappings.action().size(), 3);
        assert_eq!(mappings.action().lookup(1), Some("Left-Arc"));
        assert_eq!(mappings.rel().iter().collect::<Vec<_>>(), vec!["nsubj", "root"]);
        assert_eq!(mappings.relation_name(1).unwrap(), "root");
        assert_eq!(mappings.relation_id("nsubj").unwrap(), 0);
        assert!(mappings.pos().is_empty());
        assert!(mappings.validate(SystemKind::NewCovington).is_ok());
        match mappings.validate(SystemKind::Covington2) {
            Err(Error::MissingAction(name)) => assert_eq!(name, "NoArc"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_from_maps_rejects_gaps() {
        let maps = forward(&[
            ("action", &[("Shift", 0)]),
            ("rel", &[("root", 0), ("nsubj", 2)]),
        ]);
        assert!(Mappings::from_maps(&maps).is_err());
        let maps = forward(&[("action", &[("Shift", 0)])]);
        assert!(Mappings::from_maps(&maps).is_err());
    }

    #[test]
    fn test_serialize() {
        let mappings = Mappings::for_system(SystemKind::Covington, vec!["root", "obj"]);
        let json = serde_json::to_string(&mappings).unwrap();
        assert_eq!(
            json,
            r#"{"action":["NoArc","Shift","Left-Arc","Right-Arc"],"rel":["root","obj"],"pos":[]}"#
        );
        let decoded: Mappings = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, mappings);
    }
}
