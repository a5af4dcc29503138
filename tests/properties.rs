//! Property tests: identifier uniqueness under random edit sequences, document
//! round-trips and incremental re-evaluation.
use proptest::prelude::*;
use yoshiki::ident::validate_identifier;
use yoshiki::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add(u8),
    AddInto(usize, usize),
    Move(usize, usize, usize),
    Rename(usize, u16),
    Delete(usize),
    AddPage,
    SwitchPage(usize),
    Depend(usize, usize, bool),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u8..5).prop_map(Op::Add),
        2 => (any::<usize>(), 0usize..3).prop_map(|(c, col)| Op::AddInto(c, col)),
        2 => (any::<usize>(), any::<usize>(), 0usize..6).prop_map(|(f, c, i)| Op::Move(f, c, i)),
        1 => (any::<usize>(), 0u16..40).prop_map(|(f, n)| Op::Rename(f, n)),
        1 => any::<usize>().prop_map(Op::Delete),
        1 => Just(Op::AddPage),
        1 => any::<usize>().prop_map(Op::SwitchPage),
        2 => (any::<usize>(), any::<usize>(), any::<bool>())
            .prop_map(|(o, r, empty)| Op::Depend(o, r, empty)),
    ]
}

fn kind(selector: u8) -> FieldKind {
    match selector {
        0 => FieldKind::Text,
        1 => FieldKind::Email,
        2 => FieldKind::section(),
        3 => FieldKind::columns(2),
        _ => FieldKind::Number(Default::default()),
    }
}

fn pick<T: Clone>(items: &[T], n: usize) -> Option<T> {
    if items.is_empty() {
        None
    } else {
        Some(items[n % items.len()].clone())
    }
}

/// Field ids of the current page, optionally only containers.
fn page_fields(editor: &FormEditor, containers_only: bool) -> Vec<(String, bool)> {
    let current = editor.current_page();
    editor
        .form()
        .fields()
        .into_iter()
        .filter(|(page, field)| *page == current && (!containers_only || field.is_container()))
        .map(|(_, field)| (field.id.clone(), matches!(field.kind, FieldKind::Section(_))))
        .collect()
}

fn container_slot(id: String, is_section: bool, column: usize) -> ContainerSlot {
    if is_section {
        ContainerSlot::section(id)
    } else {
        ContainerSlot::column(id, column % 2)
    }
}

/// Applies one edit. Rejected edits are part of the exercise.
fn apply(editor: &mut FormEditor, op: &Op) {
    let all: Vec<String> = editor
        .form()
        .fields()
        .into_iter()
        .map(|(_, field)| field.id.clone())
        .collect();
    let _ = match op.clone() {
        Op::Add(selector) => editor.add_field(kind(selector)).map(|_| ()),
        Op::AddInto(container, column) => match pick(&page_fields(editor, true), container) {
            Some((id, is_section)) => editor
                .add_field_to_container(FieldKind::Text, &container_slot(id, is_section, column), None)
                .map(|_| ()),
            None => Ok(()),
        },
        Op::Move(field, container, index) => {
            let fields = page_fields(editor, false);
            let containers = page_fields(editor, true);
            let slot = match container % (containers.len() + 1) {
                0 => ContainerSlot::Root,
                n => {
                    let (id, is_section) = containers[n - 1].clone();
                    container_slot(id, is_section, index)
                }
            };
            match pick(&fields, field) {
                Some((id, _)) => editor.move_field_to_container(&id, &slot, index).map(|_| ()),
                None => Ok(()),
            }
        }
        Op::Rename(field, n) => match pick(&all, field) {
            Some(id) => {
                let new = if n % 2 == 0 {
                    format!("field_{}", n)
                } else {
                    format!("renamed_{}", n)
                };
                editor.rename_field(&id, &new).map(|_| ())
            }
            None => Ok(()),
        },
        Op::Delete(field) => match pick(&page_fields(editor, false), field) {
            Some((id, _)) => editor.delete_field(&id).map(|_| ()),
            None => Ok(()),
        },
        Op::AddPage => {
            editor.add_page("Generated");
            Ok(())
        }
        Op::SwitchPage(page) => {
            let count = editor.form().pages.len();
            editor.set_current_page(page % count)
        }
        Op::Depend(owner, reference, empty) => match (pick(&all, owner), pick(&all, reference)) {
            (Some(owner), Some(reference)) => {
                let operator = if empty {
                    Operator::IsEmpty
                } else {
                    Operator::IsNotEmpty
                };
                editor.update_field(
                    &owner,
                    FieldPatch::visibility(RuleGroup::all(vec![Rule::unary(reference, operator)])),
                )
            }
            _ => Ok(()),
        },
    };
}

fn build(ops: &[Op]) -> FormEditor {
    let mut editor = FormEditor::new("Generated");
    for op in ops {
        apply(&mut editor, op);
    }
    editor
}

proptest! {
    #[test]
    fn ids_stay_unique_and_valid(ops in prop::collection::vec(arb_op(), 0..40)) {
        let mut editor = FormEditor::new("Generated");
        for op in &ops {
            apply(&mut editor, op);
            let form = editor.form();
            prop_assert!(form.duplicate_ids().is_empty(), "duplicates after {:?}", op);
            for id in form.field_ids() {
                prop_assert!(validate_identifier(id).is_ok(), "invalid id '{}'", id);
            }
            prop_assert!(editor.drain_events().len() <= 1);
        }
    }

    #[test]
    fn documents_round_trip(ops in prop::collection::vec(arb_op(), 0..40)) {
        let form = build(&ops).into_form();
        let json = form.to_json().expect("serialize");
        let parsed = Form::from_json(&json).expect("deserialize");
        prop_assert_eq!(parsed, form);
    }

    #[test]
    fn incremental_matches_full_evaluation(
        ops in prop::collection::vec(arb_op(), 0..40),
        filled in prop::collection::vec(any::<bool>(), 1..8),
    ) {
        let form = build(&ops).into_form();
        let vars = VariableRegistry::new();
        let engine = VisibilityEngine::new();
        let mut entered: HashMap<String, Value> = HashMap::new();
        let mut tracker = VisibilityTracker::new(engine, &form, &entered, &vars);

        for (n, id) in form.field_ids().into_iter().enumerate() {
            let value = if filled[n % filled.len()] { "x" } else { "" };
            entered.insert(id.to_string(), Value::from(value));
            tracker.field_changed(&form, &entered, &vars, id);
        }

        let full = engine.evaluate_all(&form, &entered, &vars);
        prop_assert_eq!(tracker.report().targets(), full.targets());
    }
}
