use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod archive;
mod config;
mod gmail;
mod home;
mod metrics;
mod ollama;
mod prompts;
mod report_cmd;

use spendscope_core::{CategoryList, RuleSet};

#[derive(Parser, Debug)]
#[command(name = "spendscope", version, about = "Monthly spending reports from bank statements")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the monthly spending workbook from a statements directory
    Report {
        /// Directory containing .csv/.pdf statements (prompted if omitted)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Statement selection, e.g. "1,3" or "all" (prompted if omitted)
        #[arg(long)]
        files: Option<String>,

        /// Report month as MM/YYYY (prompted if omitted)
        #[arg(long)]
        month: Option<String>,

        /// Output workbook path (default: Spending_Report_MM_YYYY.xlsx)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Email the workbook after writing it
        #[arg(long)]
        send_email: bool,

        /// Category rules CSV (default: ./category_rules.csv)
        #[arg(long)]
        rules: Option<PathBuf>,
    },

    /// Ask questions about archived spending via a local Ollama model
    Ask {
        /// Model name (default from config)
        #[arg(long)]
        model: Option<String>,

        /// Ollama server URL (default from config)
        #[arg(long)]
        host: Option<String>,
    },

    /// Inspect the category rules file
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },

    /// Print the most recent run metrics
    Metrics,
}

#[derive(Subcommand, Debug)]
enum RulesCommand {
    /// List rules in evaluation order
    List {
        /// Category rules CSV (default: ./category_rules.csv)
        #[arg(long)]
        rules: Option<PathBuf>,
    },

    /// Report equal-priority rules whose patterns overlap
    Check {
        /// Category rules CSV (default: ./category_rules.csv)
        #[arg(long)]
        rules: Option<PathBuf>,
    },
}

fn rules_path(arg: Option<PathBuf>) -> PathBuf {
    arg.unwrap_or_else(|| PathBuf::from("category_rules.csv"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Report {
            dir,
            files,
            month,
            out,
            send_email,
            rules,
        } => {
            report_cmd::run_report(report_cmd::ReportArgs {
                dir,
                files,
                month,
                out,
                send_email,
                rules,
            })
            .await?;
        }

        Command::Ask { model, host } => {
            let cfg = config::load_config()?;
            let client = ollama::OllamaClient::new(
                host.as_deref().unwrap_or(&cfg.llm.host),
                model.as_deref().unwrap_or(&cfg.llm.model),
            );
            let rules = RuleSet::load_or_default("category_rules.csv");
            let categories = CategoryList::load_or_builtin("categories.csv");
            let archive = archive::TransactionArchive::open_default()?;
            let mut metrics = metrics::RunMetrics::new();

            ollama::run_ask_loop(&client, &rules, &categories, &archive, &mut metrics).await?;

            if let Ok(dir) = home::logs_dir() {
                if let Err(e) = metrics.save(&dir) {
                    eprintln!("Warning: could not save metrics: {e:#}");
                }
            }
        }

        Command::Rules { command } => match command {
            RulesCommand::List { rules } => {
                let set = RuleSet::load(rules_path(rules))?;
                println!("{} rule(s), evaluation order:", set.len());
                for r in set.rules() {
                    let custom = if r.is_custom { " (custom)" } else { "" };
                    let overrides = r
                        .override_rule_id
                        .as_deref()
                        .map(|id| format!(" overrides {id}"))
                        .unwrap_or_default();
                    println!(
                        "  [{}] p{} \"{}\" -> {}{custom}{overrides}",
                        r.rule_id, r.priority, r.vendor_pattern, r.category
                    );
                }
            }
            RulesCommand::Check { rules } => {
                let set = RuleSet::load(rules_path(rules))?;
                let conflicts = set.conflicts();
                if conflicts.is_empty() {
                    println!("No equal-priority pattern overlaps.");
                } else {
                    println!("{} overlap(s) found:", conflicts.len());
                    for (a, b) in conflicts {
                        println!(
                            "  p{}: [{}] \"{}\" vs [{}] \"{}\" (tie breaks to {})",
                            a.priority,
                            a.rule_id,
                            a.vendor_pattern,
                            b.rule_id,
                            b.vendor_pattern,
                            a.rule_id.as_str().min(b.rule_id.as_str()),
                        );
                    }
                }
            }
        },

        Command::Metrics => {
            let dir = home::logs_dir()?;
            match metrics::latest_snapshot(&dir)? {
                Some(snapshot) => metrics::print_summary(&snapshot),
                None => println!("No metrics recorded yet. Run a report first."),
            }
        }
    }

    Ok(())
}
