//! Play through a short scripted session with mock dialogue.
//!
//! Run with: `cargo run -p mystery-core --example mock_session`

use mystery_core::{hogwarts_catalog, hogwarts_clues, MysteryEngine};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let engine = MysteryEngine::mock(hogwarts_catalog(), hogwarts_clues());
    let started = engine.start_session();

    println!("=== session {} ===\n", started.session_id);
    for entry in &started.state.timeline {
        println!("{}: {}\n", entry.speaker, entry.text);
    }

    let script = [
        "inspect shimmer",
        "go to library",
        "inspect books",
        "ask evelyn what did you see last night",
        "go to great hall",
        "talk to draco",
        "go to the dungeons",
    ];

    for line in script {
        println!("> {line}");
        let outcome = engine.apply_action(started.session_id, line).await?;
        for entry in &outcome.reply {
            println!("{}: {}", entry.speaker, entry.text);
        }
        println!(
            "[{} | clues: {}]\n",
            outcome.state.location, outcome.state.clues_found
        );
    }

    Ok(())
}
