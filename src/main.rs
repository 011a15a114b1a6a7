use agentfix::{
    apply_patch, locate, nearest_line, primary_regions, run_transaction, ConsoleReporter,
    PatchOutcome, PatchSpec, SourceDocument, TransactionState,
};
use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "agentfix")]
#[command(about = "One-shot transactional source patcher for the Q CLI agent selection bug", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the patch to a target file inside a backup/rollback transaction
    Apply {
        /// Target source file
        file: PathBuf,

        /// Patch spec TOML (defaults to the built-in agent-selection fix)
        #[arg(short, long)]
        spec: Option<PathBuf>,

        /// Dry run - patch in memory and report, without touching the file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Scan a file for the bug signature without applying anything
    Scan {
        /// Target source file
        file: PathBuf,

        /// Patch spec TOML (defaults to the built-in agent-selection fix)
        #[arg(short, long)]
        spec: Option<PathBuf>,
    },

    /// Report whether a file is patched, unpatched, or unrecognized
    Status {
        /// Target source file
        file: PathBuf,

        /// Patch spec TOML (defaults to the built-in agent-selection fix)
        #[arg(short, long)]
        spec: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            file,
            spec,
            dry_run,
            diff,
        } => cmd_apply(&file, spec, dry_run, diff),

        Commands::Scan { file, spec } => cmd_scan(&file, spec),

        Commands::Status { file, spec } => cmd_status(&file, spec),
    }
}

/// Resolve the spec: an explicit TOML file, or the built-in fix.
fn resolve_spec(spec: Option<PathBuf>) -> Result<PatchSpec> {
    match spec {
        Some(path) => {
            let spec = agentfix::load_from_path(&path)?;
            println!(
                "{}",
                format!("Loaded patch spec from {}", path.display()).dimmed()
            );
            Ok(spec)
        }
        None => Ok(PatchSpec::builtin()),
    }
}

/// Show unified diff between original and patched content.
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn cmd_apply(file: &Path, spec: Option<PathBuf>, dry_run: bool, show_diff: bool) -> Result<()> {
    let spec = resolve_spec(spec)?;

    if let Some(desc) = &spec.meta.description {
        println!("{}", desc.dimmed());
    }

    if dry_run {
        println!("{}", "[DRY RUN - no files will be modified]".cyan());

        let document = SourceDocument::read(file)?;
        match apply_patch(&document.content, &spec) {
            PatchOutcome::Changed {
                content,
                primary_matches,
                auxiliary_applied,
            } => {
                println!(
                    "{} Would rewrite {} region(s) and {} call site(s) in {}",
                    "✓".green(),
                    primary_matches,
                    auxiliary_applied,
                    file.display().to_string().bold()
                );
                if show_diff {
                    display_diff(file, &document.content, &content);
                }
            }
            PatchOutcome::NoMatch => {
                println!(
                    "{} Pattern not found in {} - nothing would change",
                    "⊙".yellow(),
                    file.display()
                );
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let original = SourceDocument::read(file)?;
    let report = run_transaction(file, &spec, &mut ConsoleReporter)?;

    match report.state {
        TransactionState::Committed => {
            if show_diff {
                let patched = SourceDocument::read(file)?;
                display_diff(file, &original.content, &patched.content);
            }
            println!();
            println!("{}", "Next steps:".bold());
            println!("  1. Rebuild the extension: npm run compile");
            println!("  2. Reload the editor window");
            println!("  3. Selecting an active agent should no longer toggle its state");
            Ok(())
        }
        TransactionState::Aborted | TransactionState::RolledBack => {
            std::process::exit(1);
        }
    }
}

fn cmd_scan(file: &Path, spec: Option<PathBuf>) -> Result<()> {
    let spec = resolve_spec(spec)?;
    let document = SourceDocument::read(file)?;

    let matches: Vec<_> = locate(&document.content, &spec.fragment).collect();

    if matches.is_empty() {
        println!(
            "{} No occurrences of the signature fragment in {}",
            "⊙".yellow(),
            file.display()
        );
        if let Some(near) = nearest_line(&document.content, &spec.fragment) {
            println!(
                "  closest line {} ({:.0}% similar): {}",
                near.line.to_string().yellow(),
                near.score * 100.0,
                near.text.dimmed()
            );
        }
        std::process::exit(1);
    }

    println!(
        "{} {} occurrence(s) in {}:",
        "✓".green(),
        matches.len(),
        file.display().to_string().bold()
    );
    for m in &matches {
        println!("  line {}: {}", m.line.to_string().yellow(), m.text);
    }

    Ok(())
}

fn cmd_status(file: &Path, spec: Option<PathBuf>) -> Result<()> {
    let spec = resolve_spec(spec)?;
    let document = SourceDocument::read(file)?;

    let regions = primary_regions(&document.content, &spec.primary);

    if !regions.is_empty() {
        let lines: Vec<String> = regions
            .iter()
            .map(|&(start, _)| document.line_for_offset(start).to_string())
            .collect();
        println!(
            "{} {} - buggy method present at line(s) {}",
            "⊙".yellow(),
            "UNPATCHED".yellow().bold(),
            lines.join(", ")
        );
        std::process::exit(1);
    }

    if document.content.contains(&spec.primary.replacement) {
        println!(
            "{} {} - corrected method already in place",
            "✓".green(),
            "PATCHED".green().bold()
        );
        return Ok(());
    }

    println!(
        "{} {} - neither the buggy nor the corrected form was found",
        "✗".red(),
        "UNKNOWN".red().bold()
    );
    std::process::exit(1);
}
