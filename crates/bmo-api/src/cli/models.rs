//! `bmo models`: show the order in which models will be tried.

use anyhow::Result;
use console::style;

use bmo_core::llm::fallback::{RetryPolicy, candidate_models};
use bmo_types::config::Settings;

/// Print the resolved candidate list.
pub fn list_models(settings: &Settings, json: bool) -> Result<()> {
    let candidates = candidate_models(&settings.model);

    if json {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
        return Ok(());
    }

    let retry = RetryPolicy::from_settings(&settings.model);

    println!();
    println!("  {}", style("── Model candidates ──").dim());
    if candidates.is_empty() {
        println!("  {}", style("No models configured.").yellow());
        println!();
        return Ok(());
    }

    for (i, model) in candidates.iter().enumerate() {
        let tag = if i == 0 {
            format!(" {}", style("(primary)").green())
        } else {
            String::new()
        };
        println!("  {}. {}{tag}", i + 1, style(model).cyan());
    }
    println!();
    println!(
        "  {} attempt(s) per model, backoff from {}ms, provider {}",
        style(retry.max_attempts).bold(),
        retry.initial_delay.as_millis(),
        style(&settings.model.base_url).dim()
    );
    println!();

    Ok(())
}
