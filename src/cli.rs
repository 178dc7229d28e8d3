//! Command line wiring for the `rand-picker` binary

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::warn;

use rand_picker::transfer::{import_groups_from_path, import_students_from_path};
use rand_picker::{
    Committed, ExportFormat, ExportKind, Exporter, HistoryFilter, HistoryItem, PickerError,
    PickerResult, SelectionMode, Store,
};

#[derive(Parser)]
#[command(name = "rand-picker", version, about = "Pick students or groups at random")]
pub struct Cli {
    /// Settings file (JSON); defaults apply when omitted or missing
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show students and groups
    List,
    /// Add a student under the next free id
    AddStudent {
        name: String,
        #[arg(long, default_value_t = 1)]
        weight: i32,
        #[arg(long)]
        inactive: bool,
        #[arg(long)]
        avatar: Option<String>,
    },
    /// Delete a student and remove it from every group
    DeleteStudent { id: u32 },
    /// Add a group, optionally with members
    AddGroup {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Comma separated student ids
        #[arg(long, value_delimiter = ',')]
        members: Vec<u32>,
    },
    /// Pick one active student
    Pick {
        /// Weighted pick (also enabled by `useWeight` in settings)
        #[arg(long)]
        weighted: bool,
    },
    /// Pick one active group
    PickGroup,
    /// Replace all groups with a balanced random partition
    Partition {
        groups: usize,
        /// Confirm that existing groups are discarded
        #[arg(long)]
        yes: bool,
    },
    /// Show pick history, most recent first
    History {
        #[arg(long)]
        search: Option<String>,
        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// individual or group
        #[arg(long)]
        mode: Option<SelectionMode>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Delete every history record
    ClearHistory {
        #[arg(long)]
        yes: bool,
    },
    /// Pick counts per student
    Stats,
    /// Export students, groups, history or all of them
    Export {
        kind: ExportKind,
        /// excel, csv, pdf or json; defaults to the configured format
        #[arg(long)]
        format: Option<ExportFormat>,
    },
    /// Merge students or groups from a CSV file
    Import { kind: ImportKind, file: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ImportKind {
    Students,
    Groups,
}

fn report<T>(committed: Committed<T>) -> T {
    if !committed.persisted {
        warn!("Change applied for this session but could not be saved");
    }
    committed.value
}

fn print_history(items: &[HistoryItem]) {
    if items.is_empty() {
        println!("No history");
        return;
    }
    for item in items {
        println!(
            "{}  {:<10}  {}  {}",
            item.formatted_time(),
            item.mode,
            item.selected_name,
            item.details
        );
    }
}

fn list(store: &Store) {
    let roster = store.snapshot();

    println!("Students ({}):", roster.student_count());
    for student in &roster.students {
        let state = if student.active { "" } else { "  [inactive]" };
        println!(
            "  {:>4}  {}  weight {}{}",
            student.id, student.name, student.weight, state
        );
    }

    println!("Groups ({}):", roster.group_count());
    for group in &roster.groups {
        let members: Vec<String> = roster
            .members_of(group.id)
            .unwrap_or_default()
            .into_iter()
            .map(|s| s.name)
            .collect();
        println!("  {:>4}  {}  [{}]", group.id, group.name, members.join(", "));
    }
}

pub async fn run(store: &Store, command: Command) -> PickerResult<()> {
    match command {
        Command::List => list(store),

        Command::AddStudent {
            name,
            weight,
            inactive,
            avatar,
        } => {
            let student = report(store.add_student(&name, weight, !inactive, avatar).await?);
            println!("Added {}", student);
        }

        Command::DeleteStudent { id } => {
            if report(store.delete_student(id).await?) {
                println!("Deleted student {}", id);
            } else {
                println!("No student with id {}", id);
            }
        }

        Command::AddGroup {
            name,
            description,
            members,
        } => {
            let group = report(
                store
                    .add_group_with_members(&name, &description, &members)
                    .await?,
            );
            println!("Added {} with {} members", group, group.member_count());
        }

        Command::Pick { weighted } => {
            let weighted = weighted || store.config().use_weight;
            match report(store.pick_student(weighted).await) {
                Some(student) => println!("{}", student.display_name()),
                None => println!("No active students"),
            }
        }

        Command::PickGroup => match report(store.pick_group().await) {
            Some(group) => println!("{}", group.name),
            None => println!("No active groups"),
        },

        Command::Partition { groups, yes } => {
            if !yes {
                return Err(PickerError::InvalidArgument(
                    "partition replaces every existing group; pass --yes to confirm".into(),
                ));
            }
            let created = report(store.partition(groups).await?);
            let roster = store.snapshot();
            for group in &created {
                let names: Vec<String> = roster
                    .members_of(group.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|s| s.name)
                    .collect();
                println!("{}: {}", group.name, names.join(", "));
            }
        }

        Command::History {
            search,
            from,
            to,
            mode,
            limit,
        } => {
            let mut filter = HistoryFilter::new();
            if let Some(text) = search {
                filter = filter.text(text);
            }
            if let Some(date) = from {
                filter = filter.since(date);
            }
            if let Some(date) = to {
                filter = filter.until(date);
            }
            if let Some(mode) = mode {
                filter = filter.mode(mode);
            }

            let mut items = if filter.is_empty() && limit.is_none() {
                store.recent_history()
            } else {
                store.filter_history(&filter)
            };
            if let Some(limit) = limit {
                items.truncate(limit);
            }
            print_history(&items);
        }

        Command::ClearHistory { yes } => {
            if !yes {
                return Err(PickerError::InvalidArgument(
                    "clear-history deletes every record; pass --yes to confirm".into(),
                ));
            }
            if !store.clear_history().await {
                warn!("History cleared for this session but could not be saved");
            }
            println!("History cleared");
        }

        Command::Stats => {
            let stats = store.statistics();
            if stats.is_empty() {
                println!("No individual picks yet");
            }
            for (name, count) in stats {
                println!("{:>5}  {}", count, name);
            }
        }

        Command::Export { kind, format } => {
            let settings = store.config().export.clone();
            let format = format.unwrap_or(settings.format);
            let paths = Exporter::new(settings)
                .export(&store.export_snapshot(), kind, format)
                .await?;
            for path in paths {
                println!("{}", path.display());
            }
        }

        Command::Import { kind, file } => match kind {
            ImportKind::Students => {
                let imported = import_students_from_path(&file)?;
                let (added, updated) = report(store.import_students(imported.items).await?);
                println!(
                    "Students: {} added, {} updated, {} rows skipped",
                    added, updated, imported.skipped
                );
            }
            ImportKind::Groups => {
                let imported = import_groups_from_path(&file, &store.students())?;
                let added = report(store.import_groups(imported.items).await?);
                println!("Groups: {} added, {} rows skipped", added, imported.skipped);
            }
        },
    }

    Ok(())
}
