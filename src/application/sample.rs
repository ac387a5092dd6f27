//! Built-in sample dialog used by `dialogtree demo`.

use crate::domain::{DialogBuilder, DialogLine, DomainResult, TextDialog};

const NPC: &str = "Sphinx";
const PLAYER: &str = "Traveller";

fn npc(text: &str) -> DialogLine {
    DialogLine::new(NPC, text)
}

fn player(text: &str) -> DialogLine {
    DialogLine::new(PLAYER, text)
}

/// A riddle with four possible answers, one of them right.
pub fn riddle() -> DomainResult<TextDialog> {
    let mut builder = DialogBuilder::named("The Sphinx at the gate");
    builder.start_branch(|b| {
        b.add_lines([
            npc("Halt, traveller."),
            npc("Answer my riddle and the gate is yours."),
            npc("What has keys but opens no locks?"),
        ])
        .add_branch(|c| {
            c.add_lines([
                player("A map!"),
                npc("Maps have legends, not keys. Try again another day."),
            ]);
        })
        .add_branch(|c| {
            c.add_lines([
                player("A piano!"),
                npc("Correct."),
                npc("The gate is open. Mind the third step."),
            ]);
        })
        .add_branch(|c| {
            c.add_lines([player("A jailer!"), npc("A jailer opens every lock he can. No.")]);
        })
        .add_branch(|c| {
            c.add_lines([
                player("A hash map?"),
                npc("..."),
                player("Was that wrong?"),
                npc("Painfully."),
            ]);
        });
    });
    builder.build()
}
