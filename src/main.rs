#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{Level as TraceLevel, info, warn};
use tracing_subscriber::FmtSubscriber;

use dashgrid::geometry::CoordinateScheme;
use dashgrid::export::RowsSource;
use dashgrid::{Catalog, CellId, ConfigDiagnostic, Editor, Settings};

/// Dashboard grid layout editor
#[derive(Parser, Debug)]
#[command(name = "dashgrid", version)]
#[command(about = "Build and edit dashboard grid layout documents")]
struct Args {
    /// Settings file to use instead of the one in the user config directory
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a document with an empty columns x rows grid
    New {
        #[arg(long, default_value_t = 3)]
        columns: u32,
        #[arg(long, default_value_t = 3)]
        rows: u32,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long)]
        title_visible: bool,
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the widgets of a document by grid position
    Show { file: PathBuf },
    /// Re-import and re-export a document in canonical form
    Normalize {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Change the job, widget or config of the cell at a position
    Set {
        file: PathBuf,
        #[arg(long)]
        col: u32,
        #[arg(long)]
        row: u32,
        #[arg(long)]
        job: Option<String>,
        #[arg(long)]
        widget: Option<String>,
        /// Config text; bare `"key": value` pairs are accepted
        #[arg(long)]
        config: Option<String>,
    },
    /// Resize the cell at a position
    Resize {
        file: PathBuf,
        #[arg(long)]
        col: u32,
        #[arg(long)]
        row: u32,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
    },
    /// Merge two adjacent cells
    Merge {
        file: PathBuf,
        /// First cell as COL,ROW
        #[arg(value_parser = parse_slot)]
        first: (u32, u32),
        /// Second cell as COL,ROW
        #[arg(value_parser = parse_slot)]
        second: (u32, u32),
    },
    /// Swap two cells
    Swap {
        file: PathBuf,
        #[arg(value_parser = parse_slot)]
        first: (u32, u32),
        #[arg(value_parser = parse_slot)]
        second: (u32, u32),
    },
    /// Print the job/widget catalog
    Catalog,
    /// Print the effective settings, or write them to the settings file
    Settings {
        #[arg(long)]
        save: bool,
        #[arg(long, value_enum)]
        scheme: Option<SchemeArg>,
        #[arg(long, value_enum)]
        rows_source: Option<RowsArg>,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum SchemeArg {
    Pixel,
    Index,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum RowsArg {
    Explicit,
    LastVisible,
}

fn parse_slot(s: &str) -> Result<(u32, u32), String> {
    let (col, row) = s
        .split_once(',')
        .ok_or_else(|| format!("expected COL,ROW, got {s:?}"))?;
    let col = col.trim().parse().map_err(|e| format!("bad column {col:?}: {e}"))?;
    let row = row.trim().parse().map_err(|e| format!("bad row {row:?}: {e}"))?;
    Ok((col, row))
}

fn init_logging(settings_level: &str) -> Result<()> {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings_level.to_string());
    let log_level = match level.to_lowercase().as_str() {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    // Documents go to stdout, so logs stay on stderr
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
}

fn cell_at(editor: &Editor, (col, row): (u32, u32)) -> Result<CellId> {
    editor
        .cell_at(col, row)
        .with_context(|| format!("No cell at column {col}, row {row}"))
}

fn print_diagnostics(diagnostics: &[ConfigDiagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{diagnostic}");
    }
}

fn write_output(editor: &mut Editor, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => print_diagnostics(&editor.save_document(path)?),
        None => {
            let (text, diagnostics) = editor.export_json()?;
            print_diagnostics(&diagnostics);
            println!("{text}");
        }
    }
    Ok(())
}

/// Load a document, apply an edit and write it back in place
async fn edit_in_place(
    editor: &mut Editor,
    file: &Path,
    edit: impl FnOnce(&mut Editor) -> Result<()>,
) -> Result<()> {
    let summary = editor
        .upload_file(file)
        .await?
        .context("Upload was superseded")?;
    if !summary.dropped.is_empty() {
        warn!(dropped = summary.dropped.len(), "Some widgets lie outside the grid and were dropped");
    }
    edit(editor)?;
    write_output(editor, Some(file))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(args.settings.as_deref())?;
    init_logging(&settings.log_level)?;

    let catalog = settings.load_catalog()?;
    let mut editor = Editor::new(&settings, catalog);

    match args.command {
        Command::New {
            columns,
            rows,
            title,
            title_visible,
            output,
        } => {
            editor.create_grid(columns, rows);
            editor.set_title(&title);
            editor.set_title_visible(title_visible);
            write_output(&mut editor, output.as_deref())?;
        }
        Command::Show { file } => {
            let summary = editor.load_document(&file)?;
            let outcome = editor.export();
            let doc = &outcome.document;
            println!(
                "{} ({}x{}){}",
                if doc.title.is_empty() { "<untitled>" } else { doc.title.as_str() },
                doc.layout.grid_size.columns,
                doc.layout.grid_size.rows,
                if doc.title_visible { "" } else { " [title hidden]" }
            );
            for w in &doc.layout.widgets {
                println!(
                    "  col {:>2} row {:>2}  {}x{}  job={} widget={} config={}",
                    w.col, w.row, w.width, w.height, w.job, w.widget, w.config
                );
            }
            if !summary.dropped.is_empty() {
                println!("  {} widget(s) outside the grid were dropped", summary.dropped.len());
            }
            print_config_errors(&outcome.diagnostics);
        }
        Command::Normalize { file, output } => {
            editor.load_document(&file)?;
            write_output(&mut editor, output.as_deref())?;
        }
        Command::Set {
            file,
            col,
            row,
            job,
            widget,
            config,
        } => {
            edit_in_place(&mut editor, &file, |editor| {
                let id = cell_at(editor, (col, row))?;
                if let Some(job) = job {
                    editor.set_job(id, &job)?;
                }
                if let Some(widget) = widget {
                    editor.set_widget(id, &widget)?;
                }
                if let Some(config) = config {
                    editor.set_config_text(id, &config)?;
                }
                Ok(())
            })
            .await?;
        }
        Command::Resize {
            file,
            col,
            row,
            width,
            height,
        } => {
            edit_in_place(&mut editor, &file, |editor| {
                let id = cell_at(editor, (col, row))?;
                editor.toggle_select(id)?;
                editor.resize_selected(width, height)?;
                Ok(())
            })
            .await?;
        }
        Command::Merge { file, first, second } => {
            edit_in_place(&mut editor, &file, |editor| {
                let a = cell_at(editor, first)?;
                let b = cell_at(editor, second)?;
                editor.toggle_select(a)?;
                editor.toggle_select(b)?;
                let kept = editor.merge_selected()?;
                info!(cell = %kept, "Merged");
                Ok(())
            })
            .await?;
        }
        Command::Swap { file, first, second } => {
            edit_in_place(&mut editor, &file, |editor| {
                let a = cell_at(editor, first)?;
                let b = cell_at(editor, second)?;
                editor.swap_cells(a, b)?;
                Ok(())
            })
            .await?;
        }
        Command::Catalog => print_catalog(editor.catalog()),
        Command::Settings {
            save,
            scheme,
            rows_source,
        } => {
            if let Some(scheme) = scheme {
                settings.coordinate_scheme = match scheme {
                    SchemeArg::Pixel => CoordinateScheme::PixelOffset,
                    SchemeArg::Index => CoordinateScheme::Index,
                };
            }
            if let Some(rows_source) = rows_source {
                settings.rows_source = match rows_source {
                    RowsArg::Explicit => RowsSource::Explicit,
                    RowsArg::LastVisible => RowsSource::LastVisible,
                };
            }
            if save {
                match &args.settings {
                    Some(path) => settings.save_to(path)?,
                    None => settings.save()?,
                }
            }
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }

    Ok(())
}

fn print_config_errors(diagnostics: &[ConfigDiagnostic]) {
    if !diagnostics.is_empty() {
        println!("  {} config error(s):", diagnostics.len());
        for diagnostic in diagnostics {
            println!("    {diagnostic}");
        }
    }
}

fn print_catalog(catalog: &Catalog) {
    println!("jobs:");
    for entry in catalog.jobs() {
        println!("  {}", entry.name);
    }
    println!("widgets:");
    for entry in catalog.widgets() {
        match &entry.template {
            Some(template) if !template.is_empty() => println!("  {} (template)", entry.name),
            _ => println!("  {}", entry.name),
        }
    }
}
