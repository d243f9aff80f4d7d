//! Interactive session
//!
//! Thin rendering layer over [`LifecycleManager`]. Every command maps onto
//! one lifecycle operation; no plan state lives here.

use std::path::Path;

use colored::Colorize;
use eyre::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::domain::{CheckIn, DayPlan, Profile, StressLevel, StudyPlan};
use crate::lifecycle::{LifecycleManager, Phase, Snapshot};

/// Interactive session over the lifecycle actor
pub struct Session {
    manager: LifecycleManager,
}

enum CommandResult {
    Continue,
    Quit,
}

impl Session {
    pub fn new(manager: LifecycleManager) -> Self {
        Self { manager }
    }

    /// Run the session main loop
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome().await?;

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(input);

                    match self.handle_command(input).await {
                        Ok(CommandResult::Continue) => continue,
                        Ok(CommandResult::Quit) => break,
                        Err(e) => {
                            println!("{} {}", "error:".bright_red(), e);
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        self.manager.shutdown().await;
        println!("Goodbye!");
        Ok(())
    }

    async fn print_welcome(&self) -> Result<()> {
        let snapshot = self.manager.snapshot().await?;

        println!("{}", "RescuePlan".bright_cyan().bold());
        match snapshot.phase {
            Phase::Onboarding => {
                println!("No plan yet. Describe your exam in a YAML file and run:");
                println!("  {} <path>", "onboard".bright_yellow());
            }
            _ => {
                render_snapshot(&snapshot);
            }
        }
        println!("Type {} for commands.", "help".bright_yellow());
        Ok(())
    }

    async fn handle_command(&mut self, input: &str) -> Result<CommandResult> {
        debug!(%input, "handle_command: called");
        let mut parts = input.split_whitespace();
        let command = parts.next().unwrap_or("");
        let rest: Vec<&str> = parts.collect();

        match command {
            "help" => {
                self.print_help();
                Ok(CommandResult::Continue)
            }
            "onboard" => {
                let path = rest.first().ok_or_else(|| eyre::eyre!("usage: onboard <profile.yml>"))?;
                self.onboard(Path::new(path)).await?;
                Ok(CommandResult::Continue)
            }
            "show" | "status" => {
                let snapshot = self.manager.snapshot().await?;
                render_snapshot(&snapshot);
                Ok(CommandResult::Continue)
            }
            "toggle" => {
                let task_id = rest.first().ok_or_else(|| eyre::eyre!("usage: toggle <task-id>"))?;
                let done = self.manager.toggle_task(task_id).await?;
                let mark = if done { "done".bright_green() } else { "not done".yellow() };
                println!("{} is now {}", task_id, mark);
                Ok(CommandResult::Continue)
            }
            "checkin" => {
                let stress = rest
                    .first()
                    .ok_or_else(|| eyre::eyre!("usage: checkin <low|medium|high> [notes...]"))?
                    .parse::<StressLevel>()
                    .map_err(|e| eyre::eyre!(e))?;
                let notes = rest[1..].join(" ");
                self.check_in(stress, notes).await?;
                Ok(CommandResult::Continue)
            }
            "reset" => {
                self.manager.reset().await?;
                println!("Profile and plan deleted. Back to onboarding.");
                Ok(CommandResult::Continue)
            }
            "quit" | "exit" => Ok(CommandResult::Quit),
            other => {
                println!("Unknown command: {}. Type {} for commands.", other, "help".bright_yellow());
                Ok(CommandResult::Continue)
            }
        }
    }

    fn print_help(&self) {
        println!("Commands:");
        println!("  {} <profile.yml>          submit your exam profile and generate a plan", "onboard".bright_yellow());
        println!("  {}                        show the current plan", "show".bright_yellow());
        println!("  {} <task-id>            mark a today-task done or undone", "toggle".bright_yellow());
        println!("  {} <stress> [notes...] end the day and adapt the plan", "checkin".bright_yellow());
        println!("  {}                       delete everything and start over", "reset".bright_yellow());
        println!("  {}                        leave the session", "quit".bright_yellow());
    }

    async fn onboard(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
        let profile: Profile =
            serde_yaml::from_str(&content).context(format!("Failed to parse profile from {}", path.display()))?;

        println!("Generating your rescue plan, this can take a minute...");
        self.manager.submit_profile(profile).await?;

        let snapshot = self.manager.snapshot().await?;
        render_snapshot(&snapshot);
        Ok(())
    }

    async fn check_in(&mut self, stress: StressLevel, notes: String) -> Result<()> {
        // Completion is read back from the snapshot so the check-in reports
        // exactly what the user toggled this session
        let snapshot = self.manager.snapshot().await?;
        let completed_task_ids = snapshot
            .plan
            .as_ref()
            .and_then(StudyPlan::today)
            .map(|day| {
                day.tasks
                    .iter()
                    .filter(|t| t.completed)
                    .map(|t| t.id.clone())
                    .collect()
            })
            .unwrap_or_default();

        let check_in = CheckIn {
            completed_task_ids,
            current_stress: stress,
            notes,
        };

        println!("Adapting your plan, this can take a minute...");
        self.manager.submit_check_in(check_in).await?;

        let snapshot = self.manager.snapshot().await?;
        render_snapshot(&snapshot);
        Ok(())
    }
}

/// Render a snapshot to the terminal
pub fn render_snapshot(snapshot: &Snapshot) {
    println!("Phase: {}", format!("{}", snapshot.phase).bright_cyan());

    if let Some(profile) = &snapshot.profile {
        println!(
            "Exam: {} on {} ({} h/day, stress {})",
            profile.exam_name.bold(),
            profile.exam_date,
            profile.daily_hours,
            profile.stress_level
        );
    }

    let Some(plan) = &snapshot.plan else {
        return;
    };

    if !plan.strategy.pacing_philosophy.is_empty() {
        println!("Pacing: {}", plan.strategy.pacing_philosophy);
    }
    if !plan.adaptation_notes.is_empty() {
        println!("Notes: {}", plan.adaptation_notes.italic());
    }

    for (i, day) in plan.schedule.iter().enumerate() {
        render_day(day, i == 0);
    }
}

fn render_day(day: &DayPlan, is_today: bool) {
    let header = format!("Day {} - {}", day.day_number, day.date);
    if is_today {
        println!("\n{} {}", header.bright_yellow().bold(), "(today)".bright_yellow());
    } else {
        println!("\n{}", header.bold());
    }

    for task in &day.tasks {
        let mark = if task.completed { "[x]".bright_green() } else { "[ ]".normal() };
        println!(
            "  {} {}  {} ({}, {} effort, {})",
            mark,
            task.id.bright_blue(),
            task.title,
            task.duration,
            task.effort,
            task.task_type
        );
    }

    if !day.checkpoint.is_empty() {
        println!("  checkpoint: {}", day.checkpoint);
    }
    if is_today && !day.stress_tip.is_empty() {
        println!("  {} {}", "tip:".bright_magenta(), day.stress_tip);
    }
}
