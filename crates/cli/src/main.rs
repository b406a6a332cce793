mod render;

use std::fs;
use std::io::{self, IsTerminal};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use ariadne::Fmt;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use sticker_sheet_barcode::Code128Encoder;
use sticker_sheet_core::{
    BatchProgress, ColumnSelection, RawRecord, SourceError, Table, generate_sheet,
    read_table,
};
use sticker_sheet_diagnostics as diag;
use sticker_sheet_pdf::PdfDocument;
use sticker_sheet_profile::{PageSize, ProfileError, SheetProfile};
use tracing_subscriber::EnvFilter;

use crate::render::{
    CsvSource, Format, SheetSummary, print_summary, render_diagnostics_pretty, render_failure,
    render_skipped, sheet_warnings,
};

/// Data rows shown by `columns`.
const PREVIEW_ROWS: usize = 3;

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "stickers",
    version,
    about = "Barcode sticker sheets: turn a product CSV into a printable PDF label grid"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Lay out one sticker per CSV row and write the PDF sheet.
    Generate {
        /// Product table with a header row.
        csv: PathBuf,
        /// Column holding the barcode / SKU (header name or zero-based index).
        #[arg(long)]
        code_column: String,
        /// Column holding the product name.
        #[arg(long)]
        name_column: String,
        /// Column holding the price.
        #[arg(long)]
        price_column: String,
        /// Where to write the PDF.
        #[arg(short = 'o', long = "out")]
        out: PathBuf,
        #[command(flatten)]
        sheet: SheetArgs,
    },

    /// Render a single sticker at the first cell of a sheet.
    Preview {
        /// Barcode / SKU.
        #[arg(long)]
        code: String,
        /// Product name.
        #[arg(long, default_value = "")]
        name: String,
        /// Price.
        #[arg(long, default_value = "")]
        price: String,
        /// Where to write the PDF.
        #[arg(short = 'o', long = "out")]
        out: PathBuf,
        #[command(flatten)]
        sheet: SheetArgs,
    },

    /// List the columns of a CSV file and its first rows.
    Columns {
        /// Product table with a header row.
        csv: PathBuf,
    },

    /// Explain a diagnostic code (e.g. STK2001).
    Explain { id: String },
}

/// Sheet settings. Flags override the profile file, which overrides the
/// built-in defaults.
#[derive(Args, Debug)]
struct SheetArgs {
    /// Sheet profile JSON. Missing fields take their defaults.
    #[arg(long)]
    profile: Option<PathBuf>,
    /// Shop name printed at the top of each sticker.
    #[arg(long)]
    shop: Option<String>,
    /// Currency symbol for the price line.
    #[arg(long)]
    currency: Option<String>,
    /// Page size: "a4" or "letter".
    #[arg(long, value_parser = parse_page)]
    page: Option<PageSize>,
    /// Stickers per row.
    #[arg(long)]
    columns: Option<u32>,
    /// Sticker rows per page.
    #[arg(long)]
    rows: Option<u32>,
    /// Sticker width in mm.
    #[arg(long)]
    cell_width: Option<f64>,
    /// Sticker height in mm.
    #[arg(long)]
    cell_height: Option<f64>,
    /// Left page margin in mm.
    #[arg(long, allow_negative_numbers = true)]
    margin_x: Option<f64>,
    /// Top page margin in mm.
    #[arg(long, allow_negative_numbers = true)]
    margin_y: Option<f64>,
}

fn parse_page(name: &str) -> Result<PageSize, String> {
    PageSize::from_name(name).ok_or_else(|| format!("unknown page size {name:?} (expected a4 or letter)"))
}

impl SheetArgs {
    /// The profile file (or defaults) with every given flag applied. Not yet
    /// validated.
    fn resolve(&self) -> Result<SheetProfile> {
        let mut profile = match &self.profile {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read profile {}", path.display()))?;
                serde_json::from_str::<SheetProfile>(&text)
                    .map_err(ProfileError::from)
                    .with_context(|| format!("in profile {}", path.display()))?
            }
            None => SheetProfile::default(),
        };

        if let Some(shop) = &self.shop {
            profile.shop_name.clone_from(shop);
        }
        if let Some(currency) = &self.currency {
            profile.currency_symbol.clone_from(currency);
        }
        if let Some(page) = self.page {
            profile.page = page;
        }
        let grid = &mut profile.grid;
        if let Some(columns) = self.columns {
            grid.columns_per_page = columns;
        }
        if let Some(rows) = self.rows {
            grid.rows_per_page = rows;
        }
        if let Some(width) = self.cell_width {
            grid.cell_width = width;
        }
        if let Some(height) = self.cell_height {
            grid.cell_height = height;
        }
        if let Some(margin) = self.margin_x {
            grid.margin_x = margin;
        }
        if let Some(margin) = self.margin_y {
            grid.margin_y = margin;
        }
        Ok(profile)
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing();
    let format = Format::resolve_or_detect(cli.output.as_deref());

    if let Err(err) = run(cli.cmd, format) {
        render_failure(&err, format);
        process::exit(1);
    }
}

/// Log lines go to stderr; `RUST_LOG` selects them, errors only by default.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cmd: Cmd, format: Format) -> Result<()> {
    match cmd {
        Cmd::Generate {
            csv,
            code_column,
            name_column,
            price_column,
            out,
            sheet,
        } => {
            let columns = ColumnSelection::new(code_column, name_column, price_column);
            cmd_generate(&csv, &columns, &out, &sheet, format)
        }
        Cmd::Preview {
            code,
            name,
            price,
            out,
            sheet,
        } => cmd_preview(RawRecord::new(code, name, price), &out, &sheet, format),
        Cmd::Columns { csv } => cmd_columns(&csv, format),
        Cmd::Explain { id } => cmd_explain(&id, format),
    }
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_generate(
    csv: &Path,
    columns: &ColumnSelection,
    out: &Path,
    sheet: &SheetArgs,
    format: Format,
) -> Result<()> {
    let profile = sheet.resolve()?;
    let (bytes, table) = load_table(csv)?;
    let records = table.records(columns)?;

    let show_progress = format == Format::Pretty && io::stderr().is_terminal();
    let (result, pdf) = generate_sheet(
        records,
        &profile,
        Code128Encoder,
        PdfDocument::new(profile.page),
        |progress: BatchProgress| {
            if show_progress {
                let total = progress.total.unwrap_or(progress.processed);
                eprint!("\rrow {}/{total}", progress.processed);
            }
            ControlFlow::Continue(())
        },
    )?;
    if show_progress {
        eprintln!();
    }

    fs::write(out, &pdf).with_context(|| format!("failed to write {}", out.display()))?;

    let warnings = sheet_warnings(&profile);
    let output = out.display().to_string();
    match format {
        Format::Json => print_json(&SheetSummary::new(true, &output, &result, &warnings))?,
        Format::Pretty => {
            render_diagnostics_pretty(None, &warnings);
            let name = csv.display().to_string();
            let source = std::str::from_utf8(&bytes).ok().map(|text| CsvSource {
                name: &name,
                text,
                table: &table,
            });
            render_skipped(source.as_ref(), &result.skipped);
            print_summary(&output, &result);
        }
    }
    Ok(())
}

fn cmd_preview(record: RawRecord, out: &Path, sheet: &SheetArgs, format: Format) -> Result<()> {
    let profile = sheet.resolve()?;
    let (result, pdf) = generate_sheet(
        [record],
        &profile,
        Code128Encoder,
        PdfDocument::new(profile.page),
        |_| ControlFlow::Continue(()),
    )?;
    let rendered = result.success_count == 1;
    if rendered {
        fs::write(out, &pdf).with_context(|| format!("failed to write {}", out.display()))?;
    }

    let warnings = sheet_warnings(&profile);
    let output = out.display().to_string();
    match format {
        Format::Json => print_json(&SheetSummary::new(rendered, &output, &result, &warnings))?,
        Format::Pretty => {
            render_diagnostics_pretty(None, &warnings);
            render_skipped(None, &result.skipped);
            if rendered {
                print_summary(&output, &result);
            } else if result.blank_count > 0 {
                eprintln!("{}: code is blank, nothing to preview", "error".fg(ariadne::Color::Red));
            }
        }
    }
    if !rendered {
        process::exit(1);
    }
    Ok(())
}

#[derive(Serialize)]
struct ColumnsReport<'a> {
    headers: &'a [String],
    rows: &'a [Vec<String>],
}

fn cmd_columns(csv: &Path, format: Format) -> Result<()> {
    let (_, table) = load_table(csv)?;
    let preview = table.preview(PREVIEW_ROWS);
    match format {
        Format::Json => print_json(&ColumnsReport {
            headers: table.headers(),
            rows: preview,
        })?,
        Format::Pretty => {
            // The listing is the expected output, so it goes to stdout.
            for (i, header) in table.headers().iter().enumerate() {
                println!("{}  {header}", format!("{i:>3}").fg(ariadne::Color::Cyan));
            }
            if !preview.is_empty() {
                println!();
                for row in preview {
                    println!("     {}", row.join(" | "));
                }
            }
            if table.len() > preview.len() {
                println!("     ... {} more rows", table.len() - preview.len());
            }
        }
    }
    Ok(())
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "id": id,
                "explanation": diag::explain(id),
            });
            print_json(&out)?;
        }
        Format::Pretty => {
            if let Some(text) = diag::explain(id) {
                println!("{}: {}", id.fg(ariadne::Color::Cyan), text);
            } else {
                println!("{id}: (no explanation available)");
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Read `path` whole and parse it as a table. The raw bytes are kept for
/// pointing diagnostics at source rows.
fn load_table(path: &Path) -> Result<(Vec<u8>, Table)> {
    let bytes = fs::read(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_table(bytes.as_slice())
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok((bytes, table))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
