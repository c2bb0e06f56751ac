use std::borrow::Borrow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

const DEFAULT_CAPACITY: usize = 32;

/// Dense, insertion-ordered table between names and ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocab {
    s2i: HashMap<String, u32>,
    i2s: Vec<String>,
}

impl Vocab {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Vocab {
            s2i: HashMap::with_capacity(capacity),
            i2s: Vec::with_capacity(capacity),
        }
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut v = Vocab::new();
        for name in names {
            v.add(name);
        }
        v
    }

    /// Builds from a forward map; `None` unless the ids are exactly `0..map.len()`.
    pub fn from_ids(map: &HashMap<String, u32>) -> Option<Self> {
        let mut i2s: Vec<Option<&String>> = vec![None; map.len()];
        for (name, &id) in map {
            let slot = i2s.get_mut(id as usize)?;
            if slot.is_some() {
                return None;
            }
            *slot = Some(name);
        }
        let names = i2s.into_iter().collect::<Option<Vec<_>>>()?;
        Some(Vocab::from_names(names.into_iter().cloned()))
    }

    /// Returns the id of `word`, inserting it first if unseen.
    pub fn add<S: Into<String>>(&mut self, word: S) -> u32 {
        let word = word.into();
        if let Some(&id) = self.s2i.get(&word) {
            return id;
        }
        let id = self.i2s.len() as u32;
        self.i2s.push(word.clone());
        self.s2i.insert(word, id);
        id
    }

    pub fn get<Q: Borrow<str> + ?Sized>(&self, word: &Q) -> Option<u32> {
        self.s2i.get(word.borrow()).copied()
    }

    pub fn contains<Q: Borrow<str> + ?Sized>(&self, word: &Q) -> bool {
        self.s2i.contains_key(word.borrow())
    }

    pub fn lookup(&self, id: u32) -> Option<&str> {
        self.i2s.get(id as usize).map(|v| v.as_str())
    }

    pub fn size(&self) -> usize {
        self.i2s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.i2s.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.i2s.iter().map(|s| s.as_str())
    }
}

impl From<Vec<String>> for Vocab {
    fn from(names: Vec<String>) -> Self {
        Vocab::from_names(names)
    }
}

impl From<Vocab> for Vec<String> {
    fn from(vocab: Vocab) -> Self {
        vocab.i2s
    }
}
