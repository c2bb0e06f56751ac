#![allow(dead_code)]

pub mod mock {
    use std::sync::Arc;

    use covington::preprocessing::Vocab;
    use covington::syntax::transition::{Gold, Index, Label, Mappings, System, SystemKind};

    pub static RELATIONS: &[&str] = &["root", "nsubj", "obj", "amod"];
    pub static TAGS: &[&str] = &["NOUN", "VERB", "ADJ", "PROPN"];

    pub const ROOT: Label = 0;
    pub const NSUBJ: Label = 1;
    pub const OBJ: Label = 2;
    pub const AMOD: Label = 3;

    pub static SYSTEMS: &[SystemKind] = &[
        SystemKind::Covington,
        SystemKind::NewCovington,
        SystemKind::Covington2,
        SystemKind::Covington3,
    ];

    pub fn mappings(kind: SystemKind) -> Arc<Mappings> {
        Arc::new(
            Mappings::for_system(kind, RELATIONS.iter().cloned())
                .with_pos(Vocab::from_names(TAGS.iter().cloned())),
        )
    }

    pub fn system(kind: SystemKind) -> Arc<System> {
        Arc::new(System::new(kind, mappings(kind)).unwrap())
    }

    /// "John loves Mary": 1 <-nsubj- 2 <-root- 0, 2 -obj-> 3
    pub fn svo() -> Arc<Gold> {
        gold(&[0, 2, 0, 2], &[0, NSUBJ, ROOT, OBJ])
    }

    /// 1 <-root- 0 with 2 and 3 both attached to 1
    pub fn fan_out() -> Arc<Gold> {
        gold(&[0, 0, 1, 1], &[0, ROOT, AMOD, AMOD])
    }

    /// A chain 1 -> 2 -> 3 -> 4 under the root plus 5 attached back to 1.
    pub fn long_chain() -> Arc<Gold> {
        gold(
            &[0, 0, 1, 2, 3, 1],
            &[0, ROOT, AMOD, AMOD, AMOD, OBJ],
        )
    }

    /// The arcs 0 -> 2 and 1 -> 4 cross.
    pub fn non_projective() -> Arc<Gold> {
        gold(&[0, 3, 0, 2, 1], &[0, AMOD, ROOT, OBJ, AMOD])
    }

    pub fn provide_gold_trees() -> Vec<Arc<Gold>> {
        vec![svo(), fan_out(), long_chain(), non_projective()]
    }

    pub fn gold(heads: &[Index], labels: &[Label]) -> Arc<Gold> {
        Arc::new(Gold::from_heads(heads, labels).unwrap())
    }

    /// Every token reaches the root without revisiting a token.
    pub fn is_forest(heads: &[Option<Index>]) -> bool {
        (1..heads.len()).all(|start| {
            let mut node = start;
            for _ in 0..heads.len() {
                match heads[node] {
                    Some(head) => node = head as usize,
                    None => return true,
                }
                if node == 0 {
                    return true;
                }
            }
            false
        })
    }
}
