//! Tests for the fluent builder and the value DSL

use rstest::rstest;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

use dialogtree::{dsl, BranchPath, Dialog, DialogBuilder, DialogLine, DomainError};

#[rstest]
#[case(0, false)]
#[case(1, true)]
#[case(3, true)]
fn given_line_count_when_building_branch_then_only_empty_fails(
    #[case] lines: usize,
    #[case] ok: bool,
) {
    let mut builder = DialogBuilder::<String, DialogLine>::named("count");
    builder.start_branch(|b| {
        b.add_lines((0..lines).map(|i| DialogLine::new("Npc", format!("line {i}"))));
    });

    let result = builder.build();

    assert_eq!(result.is_ok(), ok);
    if !ok {
        assert_eq!(
            result.unwrap_err(),
            DomainError::EmptyBranch {
                path: BranchPath::start()
            }
        );
    }
}

#[test]
fn given_empty_child_when_building_then_error_message_names_branch() {
    let mut builder = DialogBuilder::<String, DialogLine>::new();
    builder.start_branch(|b| {
        b.add_line(DialogLine::new("Npc", "Well?"))
            .add_branch(|c| {
                c.add_line(DialogLine::new("Player", "Fine."));
            })
            .add_branch(|c| {
                c.entry("silence".to_string());
            });
    });

    let err = builder.build().unwrap_err();

    assert_eq!(err.to_string(), "branch must contain at least one line: start.2");
}

/// Custom payloads only need the serde and value capabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Mood {
    Calm,
    Angry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Beat {
    actor: u32,
    mood: Mood,
}

#[test]
fn given_custom_payloads_when_round_tripped_then_equal() {
    let dialog: Dialog<Mood, Beat> = dsl::unnamed()
        .start(
            dsl::branch()
                .line(Beat {
                    actor: 1,
                    mood: Mood::Calm,
                })
                .then([dsl::branch().entry(Mood::Angry).line(Beat {
                    actor: 2,
                    mood: Mood::Angry,
                })]),
        )
        .unwrap();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("beats.JSON");

    dialogtree::save(&dialog, &path).unwrap();
    let loaded: Dialog<Mood, Beat> = dialogtree::load(&path).unwrap();

    assert_eq!(loaded, dialog);
    assert_eq!(loaded.name(), None);
    assert_eq!(loaded.start().child(0).unwrap().entry(), Some(&Mood::Angry));
}

#[test]
fn given_dsl_and_builder_when_describing_same_dialog_then_equal() {
    let from_dsl: Dialog<String, DialogLine> = dsl::dialog("cat")
        .start(
            dsl::branch()
                .line(("Cat", "Meow"))
                .then([dsl::branch().entry("agree".to_string()).line(("Person", "Yes."))]),
        )
        .unwrap();

    let mut builder = DialogBuilder::named("cat");
    builder.start_branch(|b| {
        b.add_line(DialogLine::new("Cat", "Meow")).add_branch(|c| {
            c.entry("agree".to_string())
                .add_line(DialogLine::new("Person", "Yes."));
        });
    });

    assert_eq!(from_dsl, builder.build().unwrap());
}
