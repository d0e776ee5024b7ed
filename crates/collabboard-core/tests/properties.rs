//! Property tests for history, identity and zoom invariants.

use collabboard_core::{
    ElementPatch, EventHandler, Modifiers, MouseButton, PointerEvent, SerializableColor, ToolKind,
    Whiteboard, WhiteboardConfig,
};
use kurbo::Point;
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
    Draw { tool: ToolKind, from: (f64, f64), to: (f64, f64) },
    DuplicateAll,
    DeleteFirst,
    RecolorFirst(u8),
    CopyPaste,
}

fn arb_tool() -> impl Strategy<Value = ToolKind> {
    prop_oneof![
        Just(ToolKind::Pen),
        Just(ToolKind::Rectangle),
        Just(ToolKind::Circle),
        Just(ToolKind::Arrow),
        Just(ToolKind::Line),
        Just(ToolKind::Sticky),
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    let coord = -500.0f64..500.0;
    prop_oneof![
        4 => (arb_tool(), (coord.clone(), coord.clone()), (coord.clone(), coord))
            .prop_map(|(tool, from, to)| Op::Draw { tool, from, to }),
        1 => Just(Op::DuplicateAll),
        1 => Just(Op::DeleteFirst),
        1 => any::<u8>().prop_map(Op::RecolorFirst),
        1 => Just(Op::CopyPaste),
    ]
}

/// Apply `op`; returns true if it changed the scene as one undo step.
fn apply(board: &mut Whiteboard, handler: &mut EventHandler, op: &Op) -> bool {
    match op {
        Op::Draw { tool, from, to } => {
            board.set_tool(*tool);
            let events = [
                PointerEvent::Down {
                    position: Point::new(from.0, from.1),
                    button: MouseButton::Left,
                },
                PointerEvent::Move {
                    position: Point::new(to.0, to.1),
                },
                PointerEvent::Up {
                    position: Point::new(to.0, to.1),
                    button: MouseButton::Left,
                },
            ];
            for event in events {
                handler.handle_pointer(board, event, Modifiers::NONE);
            }
            true
        }
        Op::DuplicateAll => {
            board.select_all();
            !board.duplicate_selected().is_empty()
        }
        Op::DeleteFirst => match board.scene().ids().first() {
            Some(&id) => board.select(id) && board.delete_selected() > 0,
            None => false,
        },
        Op::RecolorFirst(shade) => match board.scene().ids().first() {
            Some(&id) => board.update_element(
                id,
                &ElementPatch {
                    color: Some(SerializableColor::new(*shade, 0, 0, 255)),
                    ..Default::default()
                },
            ),
            None => false,
        },
        Op::CopyPaste => {
            board.select_all();
            board.copy_selected() > 0 && !board.paste().is_empty()
        }
    }
}

proptest! {
    #[test]
    fn prop_undo_redo_are_inverse(ops in prop::collection::vec(arb_op(), 1..20)) {
        let mut board = Whiteboard::default();
        let mut handler = EventHandler::new();
        let initial = board.scene().elements().to_vec();

        let mut steps = 0;
        for op in &ops {
            if apply(&mut board, &mut handler, op) {
                steps += 1;
            }
        }
        let last = board.scene().elements().to_vec();

        for _ in 0..steps {
            prop_assert!(board.undo());
        }
        prop_assert_eq!(board.scene().elements(), initial.as_slice());
        prop_assert!(!board.undo());

        for _ in 0..steps {
            prop_assert!(board.redo());
        }
        prop_assert_eq!(board.scene().elements(), last.as_slice());
        prop_assert!(!board.redo());
    }

    #[test]
    fn prop_element_ids_are_unique(ops in prop::collection::vec(arb_op(), 1..30)) {
        let mut board = Whiteboard::default();
        let mut handler = EventHandler::new();
        let mut seen = HashSet::new();

        for op in &ops {
            let before: HashSet<_> = board.scene().ids().into_iter().collect();
            apply(&mut board, &mut handler, op);
            let ids = board.scene().ids();
            let unique: HashSet<_> = ids.iter().copied().collect();
            prop_assert_eq!(unique.len(), ids.len());

            for id in ids {
                if !before.contains(&id) {
                    prop_assert!(seen.insert(id), "id {} was reused", id);
                }
            }
        }
    }

    #[test]
    fn prop_zoom_stays_within_bounds(
        min_zoom in 1.0f64..100.0,
        span in 1.0f64..900.0,
        step in 0.5f64..200.0,
        moves in prop::collection::vec(any::<bool>(), 0..100),
    ) {
        let config = WhiteboardConfig {
            min_zoom,
            max_zoom: min_zoom + span,
            zoom_step: step,
            ..Default::default()
        };
        let mut board = Whiteboard::try_new(config).unwrap();

        for zoom_in in moves {
            if zoom_in {
                board.zoom_in();
            } else {
                board.zoom_out();
            }
            let zoom = board.viewport.zoom();
            prop_assert!(zoom >= min_zoom && zoom <= min_zoom + span);
        }
    }
}
