use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gantt_tracker::config::{default_data_path, TrackerConfig};
use gantt_tracker::io::{self, JsonSnapshotFile};
use gantt_tracker::model::{BurndownTarget, TaskStatus};
use gantt_tracker::session::{FileSessionStore, SessionContext};
use gantt_tracker::{SearchFilters, Tracker};

#[derive(Parser)]
#[command(name = "gantt-tracker")]
#[command(about = "Projects, big projects, Gantt timeline and burndown from a JSON snapshot")]
struct Cli {
    /// Snapshot file (defaults to the platform data directory)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Stored session used to attribute changes
    #[arg(long, global = true)]
    session: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the demo data set to the snapshot file
    Sample,
    /// List projects and big projects with their progress
    Summary,
    /// Print Gantt rows with bar placement
    Timeline,
    /// Print the burndown for a project or a sub-project
    Burndown {
        #[arg(long, conflicts_with_all = ["big_project", "sub_project"])]
        project: Option<u32>,
        #[arg(long, requires = "sub_project")]
        big_project: Option<u32>,
        #[arg(long, requires = "big_project")]
        sub_project: Option<u32>,
    },
    /// Search every collection by title or description
    Search { query: String },
    /// Print the task board, optionally a single column
    Board {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
    /// Export the Gantt rows to a semicolon-delimited CSV file
    ExportCsv { path: PathBuf },
    /// Import tasks from CSV into an existing project
    ImportCsv {
        path: PathBuf,
        #[arg(long)]
        project: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    NotStarted,
    InProgress,
    Completed,
}

impl From<StatusArg> for TaskStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::NotStarted => TaskStatus::NotStarted,
            StatusArg::InProgress => TaskStatus::InProgress,
            StatusArg::Completed => TaskStatus::Completed,
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "gantt_tracker=info".into()),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = match &cli.config {
        Some(path) => TrackerConfig::load_from(path),
        None => TrackerConfig::load(),
    };
    let session = cli
        .session
        .as_ref()
        .and_then(|path| SessionContext::restore(&mut FileSessionStore::new(path)));
    let file = JsonSnapshotFile::new(cli.data.clone().unwrap_or_else(default_data_path));

    if let Commands::Sample = cli.command {
        let tracker = Tracker::sample(config)?;
        file.save(&tracker.snapshot())
            .with_context(|| format!("failed to write {}", file.path().display()))?;
        tracing::info!("sample data written to {}", file.path().display());
        return Ok(());
    }

    let mut tracker = if file.exists() {
        Tracker::load(&file, config)
            .with_context(|| format!("failed to load {}", file.path().display()))?
    } else {
        tracing::warn!("{} not found, starting empty", file.path().display());
        Tracker::new(config)
    }
    .with_session(session);

    match cli.command {
        Commands::Sample => {}
        Commands::Summary => print_summary(&tracker),
        Commands::Timeline => print_timeline(&tracker),
        Commands::Burndown {
            project,
            big_project,
            sub_project,
        } => {
            let target = match (project, big_project, sub_project) {
                (Some(id), _, _) => BurndownTarget::Project { id },
                (None, Some(big_project_id), Some(sub_project_id)) => BurndownTarget::SubProject {
                    big_project_id,
                    sub_project_id,
                },
                _ => bail!("pass --project, or --big-project with --sub-project"),
            };
            let burndown = tracker.select_burndown(Some(target));
            if burndown.is_empty() {
                println!("no burndown data (missing dates or no tasks)");
            }
            for point in &burndown.points {
                println!(
                    "{}  planned {:>3}%  completed {:>3}%  {}",
                    point.date, point.planned, point.completed, point.label
                );
            }
        }
        Commands::Search { query } => {
            for hit in tracker.search(&query, SearchFilters::default()) {
                println!(
                    "[{}] #{} {}  {}  {}",
                    hit.type_label,
                    hit.id,
                    hit.title,
                    hit.parent.as_deref().unwrap_or("-"),
                    hit.status.as_deref().unwrap_or("")
                );
            }
        }
        Commands::Board { status } => {
            let columns = match status {
                Some(status) => {
                    let status = TaskStatus::from(status);
                    vec![(status, tracker.tasks_by_status(status))]
                }
                None => tracker.board(),
            };
            for (status, cards) in columns {
                println!("== {} ({}) ==", status.label(), cards.len());
                for card in cards {
                    println!("  {}  [{}]  {}", card.title, card.parent_label, card.duration);
                }
            }
        }
        Commands::ExportCsv { path } => {
            let rows = io::export_csv(tracker.store(), tracker.timeline().tasks(), &path)
                .with_context(|| format!("failed to export {}", path.display()))?;
            println!("exported {rows} rows to {}", path.display());
        }
        Commands::ImportCsv { path, project } => {
            let imported = io::import_csv(&path)
                .with_context(|| format!("failed to import {}", path.display()))?;
            let Some(summary) = tracker.import_tasks(project, imported) else {
                bail!("project {project} not found");
            };
            file.save(&tracker.snapshot())
                .with_context(|| format!("failed to write {}", file.path().display()))?;
            println!("imported {} tasks, skipped {}", summary.created, summary.skipped);
        }
    }

    Ok(())
}

fn print_summary(tracker: &Tracker) {
    for project in tracker.store().projects() {
        println!(
            "P{:<3} {:<30} {:>3}%  {} tasks  {}",
            project.id,
            project.name,
            project.progress,
            project.tasks.len(),
            project.duration()
        );
    }
    for big_project in tracker.store().big_projects() {
        println!(
            "B{:<3} {:<30} {:>3}%  {}  {}",
            big_project.id,
            big_project.name,
            big_project.progress,
            big_project.status.label(),
            big_project.duration()
        );
        for sub_project in &big_project.sub_projects {
            println!("      - {} ({} tasks)", sub_project.name, sub_project.tasks.len());
        }
    }
}

fn print_timeline(tracker: &Tracker) {
    let timeline = tracker.timeline();
    let window = timeline.window();
    println!("{} .. {}  {}", window.start, window.end, timeline.months().join(" "));
    for (task, bar) in timeline.bars() {
        println!(
            "{:<28} {:<10} {} .. {}  left {:>5.1}%  width {:>5.1}%  {}",
            task.name,
            task.assignee,
            task.start,
            task.end,
            bar.left,
            bar.width,
            bar.color.hex()
        );
    }
}
