extern crate covington;
extern crate rand;

mod test_utils;

mod tests {
    use std::sync::Arc;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use covington::syntax::transition::oracle::{self, Oracle};
    use covington::syntax::transition::prelude::*;
    use covington::syntax::transition::{
        Action, Candidate, Configuration, Error, Gold, Mappings, System, SystemKind,
    };

    use super::test_utils::mock::{self, AMOD, NSUBJ, OBJ, ROOT};

    fn right(offset: u32, relation: u32) -> Action {
        Action::RightArc { offset, relation }
    }

    fn left(offset: u32, relation: u32) -> Action {
        Action::LeftArc { offset, relation }
    }

    fn shift() -> Action {
        Action::shift()
    }

    fn oracle_actions(kind: SystemKind, gold: Arc<Gold>) -> Vec<Action> {
        let state = Oracle::new(mock::system(kind)).generate(gold).unwrap();
        state.actions().to_vec()
    }

    #[test]
    fn test_svo_oracle() {
        let expected = vec![
            shift(),
            left(0, NSUBJ),
            right(0, ROOT),
            shift(),
            right(0, OBJ),
            shift(),
        ];
        for &kind in mock::SYSTEMS {
            assert_eq!(oracle_actions(kind, mock::svo()), expected, "system: {}", kind);
        }
    }

    #[test]
    fn test_fan_out_oracle() {
        assert_eq!(
            oracle_actions(SystemKind::Covington, mock::fan_out()),
            vec![
                right(0, ROOT),
                shift(),
                right(0, AMOD),
                shift(),
                Action::Reject,
                right(0, AMOD),
                shift(),
            ]
        );
        assert_eq!(
            oracle_actions(SystemKind::NewCovington, mock::fan_out()),
            vec![
                right(0, ROOT),
                shift(),
                right(0, AMOD),
                shift(),
                right(1, AMOD),
                shift(),
            ]
        );
        assert_eq!(
            oracle_actions(SystemKind::Covington3, mock::fan_out()),
            oracle_actions(SystemKind::NewCovington, mock::fan_out())
        );
    }

    #[test]
    fn test_covington3_reaches_past_look_back() {
        let actions = oracle_actions(SystemKind::Covington3, mock::long_chain());
        assert_eq!(
            actions,
            vec![
                right(0, ROOT),
                shift(),
                right(0, AMOD),
                shift(),
                right(0, AMOD),
                shift(),
                right(0, AMOD),
                shift(),
                Action::Reject,
                right(2, OBJ),
                shift(),
            ]
        );
    }

    #[test]
    fn test_oracle_builds_gold() {
        for &kind in mock::SYSTEMS {
            for gold in mock::provide_gold_trees() {
                let state = Oracle::new(mock::system(kind))
                    .generate(gold.clone())
                    .unwrap()
                    .into_inner();
                assert!(state.is_terminal());
                assert!(state.is_complete(&gold), "system: {}, state: {:?}", kind, state);
                assert!(mock::is_forest(state.heads()));
                assert!(state.actions().len() <= oracle::step_limit(gold.num_tokens()));
            }
        }
    }

    #[test]
    fn test_initial_candidates() {
        let state = Configuration::with_system(4, mock::system(SystemKind::Covington));
        assert_eq!(state.active(), &[0]);
        assert_eq!(state.queue_head(), Some(1));
        assert_eq!(state.queue_size(), 3);
        assert_eq!(
            state.candidates(),
            &[Candidate::Shift, Candidate::Reject, Candidate::RightArc(0)]
        );
        let actions = state.legal_actions().unwrap();
        assert_eq!(actions.len(), 2 + mock::RELATIONS.len());
        assert_eq!(actions[0], shift());
        assert_eq!(actions[1], Action::Reject);
        assert_eq!(actions[2], right(0, 0));

        let state = Configuration::with_system(4, mock::system(SystemKind::NewCovington));
        assert_eq!(
            state.candidates(),
            &[Candidate::Shift, Candidate::RightArc(0)]
        );
    }

    #[test]
    fn test_illegal_actions() {
        let mut state = Configuration::with_system(4, mock::system(SystemKind::Covington));
        // root never takes a head
        assert!(matches!(
            state.advance(left(0, NSUBJ)),
            Err(Error::IllegalAction(_))
        ));
        assert!(matches!(
            state.advance(right(0, 99)),
            Err(Error::IllegalAction(_))
        ));
        assert_eq!(state.step(), 0);

        let mut state = Configuration::with_system(4, mock::system(SystemKind::NewCovington));
        assert!(matches!(
            state.advance(Action::Reject),
            Err(Error::IllegalAction(Action::Reject))
        ));

        let mut state = Configuration::with_system(6, mock::system(SystemKind::Covington3));
        for _ in 0..4 {
            state.advance(shift()).unwrap();
        }
        assert_eq!(state.active(), &[0, 1, 2, 3, 4]);
        assert!(state.candidates().contains(&Candidate::RightArc(2)));
        assert!(!state.candidates().contains(&Candidate::RightArc(3)));
        assert!(matches!(
            state.advance(right(3, AMOD)),
            Err(Error::IllegalAction(_))
        ));
    }

    #[test]
    fn test_single_head_and_cycle() {
        let mut state = Configuration::with_system(4, mock::system(SystemKind::NewCovington));
        state.advance(shift()).unwrap();
        state.advance(right(0, AMOD)).unwrap(); // 1 -> 2
        assert_eq!(state.head(2), Some(1));
        // 2 already has a head
        assert_eq!(state.candidates(), &[Candidate::Shift]);
        state.advance(shift()).unwrap();
        assert_eq!(state.active(), &[0, 1, 2]);
        state.advance(right(0, AMOD)).unwrap(); // 2 -> 3
        assert_eq!(state.active(), &[0, 1]);
        assert_eq!(state.reinserted(), &[2]);
        // 3 -> 1 would close 1 -> 2 -> 3 -> 1
        assert_eq!(state.candidates(), &[Candidate::Shift]);
        assert!(matches!(
            state.advance(left(0, AMOD)),
            Err(Error::IllegalAction(_))
        ));

        let mut state = Configuration::with_system(4, mock::system(SystemKind::Covington));
        state.advance(shift()).unwrap();
        state.advance(right(0, AMOD)).unwrap();
        state.advance(shift()).unwrap();
        state.advance(right(0, AMOD)).unwrap();
        assert_eq!(state.candidates(), &[Candidate::Shift, Candidate::Reject]);
    }

    #[test]
    fn test_shift_merges_reinserted() {
        let mut state = Configuration::with_system(4, mock::system(SystemKind::Covington));
        state.advance(shift()).unwrap();
        state.advance(Action::Reject).unwrap();
        assert_eq!(state.active(), &[0]);
        assert_eq!(state.reinserted(), &[1]);
        state.advance(Action::Reject).unwrap();
        assert!(state.active().is_empty());
        assert_eq!(state.reinserted(), &[0, 1]);
        // nothing left to compare against
        assert_eq!(state.candidates(), &[Candidate::Shift]);
        state.advance(shift()).unwrap();
        assert_eq!(state.active(), &[0, 1, 2]);
        assert!(state.reinserted().is_empty());
        assert_eq!(state.queue_head(), Some(3));
    }

    #[test]
    fn test_encoding() {
        let mut state = Configuration::with_system(4, mock::system(SystemKind::NewCovington));
        state.advance(right(0, ROOT)).unwrap();
        state.advance(shift()).unwrap();
        state.advance(right(0, AMOD)).unwrap();
        state.advance(shift()).unwrap();
        assert_eq!(state.active(), &[0, 1, 2]);
        assert_eq!(
            state.candidates(),
            &[
                Candidate::Shift,
                Candidate::RightArc(0),
                Candidate::RightArc(1),
                Candidate::RightArc(2),
            ]
        );
        let system = mock::system(SystemKind::NewCovington);
        assert_eq!(system.num_encodable(&state), 13);

        assert_eq!(state.encode(&shift()).unwrap(), 0);
        assert_eq!(state.encode(&right(1, OBJ)).unwrap(), 7);
        assert_eq!(state.decode(7).unwrap(), right(1, OBJ));
        assert_eq!(state.decode(12).unwrap(), right(2, AMOD));
        assert!(matches!(
            state.decode(13),
            Err(Error::IdOutOfRange { id: 13, size: 13 })
        ));
        assert!(matches!(
            state.encode(&left(0, OBJ)),
            Err(Error::IllegalAction(_))
        ));

        // tags are not part of the encoding
        let tagged = Action::Shift {
            tag: Some(1),
            fine_tag: None,
        };
        assert_eq!(state.encode(&tagged).unwrap(), 0);

        assert_eq!(state.advance(7usize).unwrap(), right(1, OBJ));
        assert_eq!(state.head(3), Some(1));
        assert_eq!(state.label(3), Some(OBJ));
        assert_eq!(state.active(), &[0]);
        assert_eq!(state.reinserted(), &[1, 2]);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut state = Configuration::with_system(4, mock::system(SystemKind::Covington2));
        state.advance(shift()).unwrap();
        let snapshot = state.clone();
        state.advance(left(0, AMOD)).unwrap();
        state.advance(right(0, ROOT)).unwrap();
        assert_eq!(snapshot.active(), &[0, 1]);
        assert_eq!(snapshot.head(1), None);
        assert_eq!(snapshot.head(2), None);
        assert_eq!(snapshot.step(), 1);
        assert_eq!(state.head(1), Some(2));
        assert_eq!(state.head(2), Some(0));
    }

    #[test]
    fn test_random_walk() {
        let mut rng = StdRng::seed_from_u64(42);
        let num_tokens = 8;
        for &kind in mock::SYSTEMS {
            let system = mock::system(kind);
            for _ in 0..20 {
                let mut state = Configuration::with_system(num_tokens, system.clone());
                while !state.is_terminal() {
                    let size = system.num_encodable(&state);
                    assert!(size > 0);
                    let id = rng.gen_range(0..size);
                    state.advance(id).unwrap();
                    assert!(mock::is_forest(state.heads()));
                }
                assert!(state.step() <= oracle::step_limit(num_tokens as usize));
                assert!(state.candidates().is_empty());
                assert!(matches!(
                    state.advance(shift()),
                    Err(Error::IllegalAction(_))
                ));
            }
        }
    }

    #[test]
    fn test_unbound_configuration() {
        let mut state = Configuration::new(3);
        assert!(matches!(state.advance(shift()), Err(Error::UnboundSystem)));
        assert!(matches!(state.gold_transition(), Err(Error::UnboundSystem)));
        assert!(state.candidates().is_empty());
    }

    #[test]
    fn test_missing_gold_and_terminal() {
        let mut state = Configuration::with_system(2, mock::system(SystemKind::Covington));
        assert!(matches!(state.gold_transition(), Err(Error::MissingGold)));
        state.set_gold(mock::gold(&[0, 0], &[0, ROOT]));
        assert_eq!(state.gold_transition().unwrap(), right(0, ROOT));
        state.advance(right(0, ROOT)).unwrap();
        state.advance(shift()).unwrap();
        assert!(state.is_terminal());
        assert!(matches!(state.gold_transition(), Err(Error::TerminalState)));
    }

    #[test]
    fn test_system_validates_mappings() {
        let mappings = Arc::new(Mappings::for_system(
            SystemKind::NewCovington,
            mock::RELATIONS.iter().cloned(),
        ));
        assert!(matches!(
            System::new(SystemKind::Covington, mappings.clone()),
            Err(Error::MissingAction("NoArc"))
        ));
        assert!(System::new(SystemKind::NewCovington, mappings).is_ok());
        assert_eq!("Cov3".parse::<SystemKind>().unwrap(), SystemKind::Covington3);
        assert!("ArcStandard".parse::<SystemKind>().is_err());
    }

    #[test]
    fn test_text_format() {
        let cov = mock::system(SystemKind::Covington);
        assert_eq!(cov.to_text(&Action::Reject).unwrap(), "NoArc");
        assert_eq!(cov.to_text(&right(0, AMOD)).unwrap(), "Right-Arc\tamod");
        assert_eq!(cov.from_text("Left-Arc\tnsubj").unwrap(), left(0, NSUBJ));
        assert_eq!(cov.from_text("NoArc").unwrap(), Action::Reject);
        // Covington writes NoArc without fields
        assert!(matches!(
            cov.from_text("NoArc\t1\t1"),
            Err(Error::MalformedLine(_))
        ));

        let cov2 = mock::system(SystemKind::Covington2);
        assert_eq!(cov2.to_text(&Action::Reject).unwrap(), "NoArc\t1\t1");
        assert_eq!(cov2.to_text(&left(0, OBJ)).unwrap(), "Left-Arc\t1\tobj");
        assert_eq!(cov2.from_text("NoArc\t1\t1").unwrap(), Action::Reject);
        assert!(matches!(
            cov2.from_text("Left-Arc\t2\tobj"),
            Err(Error::MalformedLine(_))
        ));

        let cov3 = mock::system(SystemKind::Covington3);
        assert_eq!(cov3.to_text(&right(2, OBJ)).unwrap(), "Right-Arc\t3\tobj");
        assert_eq!(cov3.from_text("Right-Arc\t3\tamod").unwrap(), right(2, AMOD));
        assert!(matches!(
            cov3.from_text("Right-Arc\t4\tamod"),
            Err(Error::MalformedLine(_))
        ));

        let ncov = mock::system(SystemKind::NewCovington);
        assert_eq!(ncov.to_text(&left(4, ROOT)).unwrap(), "Left-Arc\t5\troot");
        assert_eq!(ncov.from_text("Left-Arc\t5\troot").unwrap(), left(4, ROOT));
        assert!(ncov.to_text(&Action::Reject).is_err());
        assert!(matches!(
            ncov.from_text("NoArc"),
            Err(Error::UnknownKeyword(_))
        ));
        assert!(matches!(
            ncov.from_text("Left-Arc\t0\troot"),
            Err(Error::MalformedLine(_))
        ));

        for &kind in mock::SYSTEMS {
            let system = mock::system(kind);
            let tagged = Action::Shift {
                tag: Some(1),
                fine_tag: Some(3),
            };
            assert_eq!(system.to_text(&tagged).unwrap(), "Shift\tVERB\tPROPN");
            assert_eq!(system.from_text("Shift\tVERB\tPROPN").unwrap(), tagged);
            assert_eq!(system.to_text(&shift()).unwrap(), "Shift\t_");
            assert_eq!(system.from_text("Shift\t_").unwrap(), shift());
            assert!(matches!(
                system.from_text("Reduce"),
                Err(Error::UnknownKeyword(_))
            ));
            assert!(matches!(
                system.from_text(""),
                Err(Error::MalformedLine(_))
            ));
            assert!(matches!(
                system.from_text("Shift\tDET"),
                Err(Error::UnknownLabel { namespace: "pos", .. })
            ));
        }
        assert!(matches!(
            cov2.from_text("Right-Arc\t1\tdobj"),
            Err(Error::UnknownLabel { namespace: "rel", .. })
        ));
    }
}
