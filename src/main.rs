use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use csvdesk::app::{App, RestoreOutcome};
use csvdesk::config::AppConfig;
use csvdesk::domain::entities::dataset::SortSpec;
use csvdesk::domain::entities::edit::{CellKey, EditedCell};
use csvdesk::domain::entities::record::format_cell_value;
use csvdesk::infra::connectivity::StaticConnectivity;
use csvdesk::infra::import::csv::LoadProgress;
use csvdesk::infra::memory::MemoryTableCache;
use csvdesk::infra::sqlite::cache::SqliteTableCache;
use csvdesk::usecase::ports::cache::TableCache;
use csvdesk::usecase::services::edit_service::EditOutcome;

#[derive(Parser, Debug)]
#[command(name = "csvdesk", version, about = "Browse, edit and export CSV files")]
struct Cli {
    /// SQLite file holding unsaved edits (overrides CSVDESK_CACHE_PATH)
    #[arg(long, global = true)]
    cache: Option<PathBuf>,

    /// Keep edits in memory only; nothing survives the command
    #[arg(long, global = true, conflicts_with = "cache")]
    no_cache: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of the table
    Show {
        file: PathBuf,
        /// Case-insensitive text that must appear in some cell
        #[arg(long)]
        search: Option<String>,
        /// Column to sort by
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending
        #[arg(long, requires = "sort")]
        desc: bool,
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Change one cell, addressed by the row number printed by `show`
    Edit {
        file: PathBuf,
        #[arg(long)]
        row: usize,
        #[arg(long)]
        field: String,
        #[arg(long)]
        value: String,
    },
    /// List cells that differ from the file
    Diff { file: PathBuf },
    /// Discard all edits
    Reset { file: PathBuf },
    /// Write the edited table as CSV
    Export {
        file: PathBuf,
        /// Destination file; stdout when omitted
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cache = open_cache(&cli)?;
    let mut app = App::new(cache);

    match cli.command {
        Command::Show {
            file,
            search,
            sort,
            desc,
            page,
        } => {
            open_session(&mut app, &file)?;
            let query = app.query_mut();
            query.set_search(search.unwrap_or_default());
            query.set_sort(sort.map(|field| {
                if desc {
                    SortSpec::descending(field)
                } else {
                    SortSpec::ascending(field)
                }
            }));
            query.set_page(page);
            print_page(&mut app);
        }
        Command::Edit {
            file,
            row,
            field,
            value,
        } => {
            open_session(&mut app, &file)?;
            match app.edit(row, &field, value) {
                EditOutcome::Applied { persisted: true } => println!("updated row {row} {field}"),
                EditOutcome::Applied { persisted: false } => {
                    println!("updated row {row} {field}");
                    eprintln!("warning: the edit could not be cached and will be lost");
                }
                EditOutcome::Ignored => {
                    eprintln!("no cell at row {row}, field {field:?}; nothing changed")
                }
            }
        }
        Command::Diff { file } => {
            open_session(&mut app, &file)?;
            let edited = app.edited_cells();
            if edited.is_empty() {
                println!("no changes");
            }
            for cell in edited {
                println!(
                    "row {}\t{}\t{:?} -> {:?}",
                    cell.row_idx, cell.field, cell.original_value, cell.new_value
                );
            }
        }
        Command::Reset { file } => {
            open_session(&mut app, &file)?;
            if !app.reset() {
                eprintln!("warning: cached edits could not be removed");
            }
            println!("restored original values");
        }
        Command::Export { file, output } => {
            open_session(&mut app, &file)?;
            match output {
                Some(path) => {
                    app.export_to_path(&path)?;
                    println!("wrote {}", path.display());
                }
                None => print!("{}", app.export_csv()?),
            }
        }
    }

    Ok(())
}

fn open_cache(cli: &Cli) -> Result<Arc<dyn TableCache>> {
    let config = AppConfig::from_env()?;
    let connectivity = Arc::new(StaticConnectivity::new(config.online));
    if cli.no_cache {
        return Ok(Arc::new(MemoryTableCache::new(config.expiry, connectivity)));
    }

    let cache_path = cli.cache.clone().unwrap_or(config.cache_path);
    let cache = SqliteTableCache::open(&cache_path, config.expiry, connectivity)
        .with_context(|| format!("failed to open cache: {}", cache_path.display()))?;
    Ok(Arc::new(cache))
}

fn open_session(app: &mut App, file: &Path) -> Result<()> {
    app.load_file(file, log_progress)?;
    match app.restore_from_cache() {
        RestoreOutcome::Restored => tracing::info!("resumed cached edits"),
        RestoreOutcome::Absent => {}
        RestoreOutcome::Rejected => {
            eprintln!(
                "warning: cached edits belong to another file or an older version of this one \
                 and were ignored"
            )
        }
        RestoreOutcome::Failed(err) => eprintln!("warning: cached edits unavailable: {err}"),
    }
    Ok(())
}

fn log_progress(progress: LoadProgress) {
    tracing::debug!(
        "parsed {} rows{}",
        progress.rows_parsed,
        if progress.done { " (done)" } else { "" }
    );
}

fn print_page(app: &mut App) {
    let headers = app.store().headers().to_vec();
    let modified: BTreeSet<CellKey> = app.edited_cells().iter().map(EditedCell::key).collect();

    let page = app.page();
    println!("row\t{}", headers.join("\t"));
    for row in &page.rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|header| {
                let value = format_cell_value(row.record.get(header));
                let key = CellKey {
                    row_idx: row.row_idx,
                    field: header.clone(),
                };
                if modified.contains(&key) {
                    format!("{value}*")
                } else {
                    value.to_string()
                }
            })
            .collect();
        println!("{}\t{}", row.row_idx, cells.join("\t"));
    }
    println!(
        "page {} of {} ({} rows)",
        page.page, page.total_pages, page.total_rows
    );
}
