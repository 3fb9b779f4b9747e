//! `bmo ask`: one wake and respond round without the HTTP server.
//!
//! Handy for checking the API key, the model list and the speech engine
//! from a terminal.

use std::path::Path;

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use console::style;

use bmo_types::conversation::{ConversationReply, Mode};

use crate::state::AppState;

/// Start a session, answer `transcript`, and print the reply.
pub async fn ask(
    state: &AppState,
    transcript: &str,
    json: bool,
    save_audio: Option<&Path>,
) -> Result<()> {
    let session = state.conversation.start_session();
    let reply = state
        .conversation
        .generate_response(&session.session_id, transcript)
        .await?;

    if let Some(path) = save_audio {
        let audio = STANDARD
            .decode(&reply.speech.base64)
            .context("speech payload is not valid base64")?;
        tokio::fs::write(path, &audio)
            .await
            .with_context(|| format!("failed to write audio to {}", path.display()))?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
        return Ok(());
    }

    print_reply(&reply, save_audio);
    Ok(())
}

fn print_reply(reply: &ConversationReply, save_audio: Option<&Path>) {
    let response = &reply.response;

    println!();
    println!("  {} {}", style("BMO:").cyan().bold(), response.narration);
    println!();
    println!(
        "  {}  {}   {}  {}",
        style("Mode").dim(),
        response.mode,
        style("Emotion").dim(),
        response.emotion
    );

    if response.mode == Mode::Navigating {
        let nav = &response.navigation_display;
        println!(
            "  {}  {} ({} Zone)",
            style("Destination").dim(),
            style(&response.destination).bold(),
            nav.zone_color
        );
        println!();
        for (i, step) in response.directions.iter().enumerate() {
            println!("  {}. {step}", i + 1);
        }
    }

    println!();
    match save_audio {
        Some(path) => println!(
            "  {} audio saved to {}",
            style(&reply.speech.mime_type).dim(),
            style(path.display()).cyan()
        ),
        None => println!(
            "  {} {} base64 chars (use --save-audio to keep it)",
            style(&reply.speech.mime_type).dim(),
            reply.speech.base64.len()
        ),
    }
    println!();
}
