//! `cleanroute run`: executes the optimizer against JSON fixtures on disk,
//! with no database required. Modeled on the teacher's `schedule::generate`
//! (load inputs, run the algorithm in-process, print a report).

use anyhow::{Context, Result};
use chrono::NaiveDate;
use cleanroute_core::{run_optimizer, CollectingDecisionSink, InMemoryRunStore, OptimizerInputs};
use cleanroute_domain::{Cleaner, GroupScoreWeights, Phase1Params, Phase2Params, Phase3Params, Task};
use colored::*;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct Fixture {
    work_date: NaiveDate,
    tasks: Vec<Task>,
    cleaners: Vec<Cleaner>,
    #[serde(default)]
    phase1_params: Phase1Params,
    #[serde(default)]
    phase2_params: Phase2Params,
    #[serde(default)]
    phase3_params: Phase3Params,
    #[serde(default)]
    group_score_weights: GroupScoreWeights,
}

pub async fn run(fixture_path: &Path, algorithm_version: &str, verbose: bool) -> Result<()> {
    println!("{}", format!("Loading fixture: {}", fixture_path.display()).bright_cyan().bold());

    let raw = std::fs::read_to_string(fixture_path)
        .with_context(|| format!("reading {}", fixture_path.display()))?;
    let fixture: Fixture = serde_json::from_str(&raw).context("parsing fixture JSON")?;

    println!(
        "   {} {} tasks, {} cleaners",
        "Loaded".green(),
        fixture.tasks.len().to_string().bold(),
        fixture.cleaners.len().to_string().bold()
    );

    cleanroute_domain::validate_ingest(&fixture.tasks, &fixture.cleaners)
        .context("input validation failed")?;

    let inputs = OptimizerInputs {
        work_date: fixture.work_date,
        algorithm_version: algorithm_version.to_string(),
        tasks: fixture.tasks.clone(),
        cleaners: fixture.cleaners,
        phase1_params: fixture.phase1_params,
        phase2_params: fixture.phase2_params,
        phase3_params: fixture.phase3_params,
        group_score_weights: fixture.group_score_weights,
        defaulted_priority_window_keys: Vec::new(),
    };

    let sink = CollectingDecisionSink::new();
    let store = InMemoryRunStore::new();
    let result = run_optimizer(&sink, &store, inputs).await?;

    println!();
    println!("{}", "Run complete".green().bold());
    println!("   {}: {}", "Run ID".bright_white(), result.run_id);
    println!("   {}: {:?}", "Status".bright_white(), result.status);
    println!(
        "   {}: {} loaded, {} groups, {} assigned, {} scheduled, {} unassigned ({} ms)",
        "Summary".bright_white(),
        result.summary.tasks_loaded,
        result.summary.groups_generated,
        result.summary.groups_assigned,
        result.summary.tasks_scheduled,
        result.summary.tasks_unassigned,
        result.summary.duration_ms
    );
    println!();

    if verbose {
        println!("   {:<10} {:<10} {:>4} {:>8} {:>8} {:>8}", "Cleaner", "Task", "Seq", "Start", "End", "Travel");
        println!("   {}", "-".repeat(60));
        for row in &result.schedule {
            println!(
                "   {:<10} {:<10} {:>4} {:>8} {:>8} {:>8}",
                row.cleaner_id.0,
                row.task_id.0,
                row.sequence,
                row.start.format("%H:%M"),
                row.end.format("%H:%M"),
                row.travel_from_prev_min
            );
        }
        println!();
        if !result.unassigned.is_empty() {
            println!("   {}", "Unassigned:".yellow().bold());
            for task in &result.unassigned {
                println!("   - task {} ({})", task.task_id.0, task.reason_code);
            }
            println!();
        }
        println!("   {} decision events emitted", sink.events().len());
    } else {
        for task in &result.unassigned {
            println!("   {} task {} ({})", "unassigned".yellow(), task.task_id.0, task.reason_code);
        }
        println!("   (use --verbose for the full schedule and decision log count)");
    }

    Ok(())
}
