use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use label_core::render::plan_sheet;
use label_core::{Command, LayoutKind, Normalizer, Settings, Workbench};
use log::{LevelFilter, Metadata, Record};

mod pdf;
mod preview;
mod remote;

use remote::Remote;

#[derive(Parser, Debug)]
#[command(name = "label-sheet", about = "Render and sync sample label sheets")]
struct Cli {
    /// Settings JSON replacing the bundled endpoints and cleanup rules.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    /// More output (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Map orders onto a sheet and write the PDF.
    Render(RenderArgs),
    /// Post the order list to the spreadsheet webhook.
    Sync {
        #[arg(long)]
        orders: PathBuf,
        /// Print the payload instead of sending it.
        #[arg(long)]
        dry_run: bool,
    },
    /// List order numbers already in the sheet.
    Existing {
        /// Flag which of these imported orders are already synced.
        #[arg(long)]
        orders: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// CSV/TSV export; without it labels come from the remote sheet.
    #[arg(long)]
    orders: Option<PathBuf>,
    #[arg(long, default_value = "standard")]
    layout: LayoutKind,
    /// Defaults to the layout's first volume.
    #[arg(long)]
    volume: Option<String>,
    /// 1-based cells to fill, e.g. `1-20,25`. Defaults to every cell.
    #[arg(long)]
    cells: Option<String>,
    #[arg(long, default_value = "labels.pdf")]
    out: PathBuf,
    /// Also write the self-printing HTML document.
    #[arg(long)]
    html: Option<PathBuf>,
    /// Also write a PNG preview.
    #[arg(long)]
    png: Option<PathBuf>,
    /// PNG logo placed under each label in the PDF.
    #[arg(long)]
    logo: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = load_settings(cli.settings.as_deref())?;
    let normalizer = Normalizer::new(&settings.rules).context("compiling cleanup rules")?;

    match cli.command {
        Cmd::Render(args) => render(args, settings, normalizer),
        Cmd::Sync { orders, dry_run } => sync(&orders, dry_run, settings, normalizer),
        Cmd::Existing { orders } => existing(orders.as_deref(), settings, normalizer),
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(p) => {
            let text = fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
            Settings::from_json(&text).with_context(|| format!("parsing {}", p.display()))
        }
        None => Ok(Settings::bundled()),
    }
}

fn read_orders(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading orders {}", path.display()))
}

fn render(args: RenderArgs, settings: Settings, normalizer: Normalizer) -> Result<()> {
    let mut bench = Workbench::new(args.layout, normalizer);
    if let Some(volume) = args.volume {
        bench.apply(Command::SetVolume(volume))?;
    }

    let remote = match &args.orders {
        Some(path) => {
            bench.apply(Command::Import(read_orders(path)?))?;
            None
        }
        None => Some(Remote::new(settings.clone()).entries(bench.normalizer())?),
    };

    let total = bench.total_cells();
    let cells = match &args.cells {
        Some(list) => parse_cells(list, total)?,
        None => (0..total).collect(),
    };
    for cell in cells {
        bench.apply(Command::SetCell(cell, true))?;
    }
    bench.apply(Command::AutoMap { remote })?;
    log::info!("render: {} labels on the {} layout", bench.mapping.len(), bench.layout);

    let plan = plan_sheet(bench.layout, &bench.mapping, bench.normalizer());
    let logo = match &args.logo {
        Some(p) => {
            let bytes = fs::read(p).with_context(|| format!("reading logo {}", p.display()))?;
            Some(pdf::Logo::from_png(&bytes).with_context(|| format!("decoding {}", p.display()))?)
        }
        None => None,
    };
    fs::write(&args.out, pdf::sheet_pdf(&plan, logo.as_ref()))
        .with_context(|| format!("writing {}", args.out.display()))?;
    println!("wrote {}", args.out.display());

    if let Some(path) = &args.html {
        let doc = bench.print_document(&settings.logo_url)?;
        fs::write(path, doc.html).with_context(|| format!("writing {}", path.display()))?;
        println!("wrote {} (downloads {})", path.display(), doc.file_name);
    }
    if let Some(path) = &args.png {
        let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
        preview::render_png(&plan, 96.0, file)?;
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn sync(orders: &Path, dry_run: bool, settings: Settings, normalizer: Normalizer) -> Result<()> {
    let mut bench = Workbench::new(LayoutKind::default(), normalizer);
    bench.apply(Command::Import(read_orders(orders)?))?;
    let today = chrono::Local::now().format("%-m/%-d/%Y").to_string();
    let rows = bench.begin_sync(&today)?;
    if dry_run {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        Remote::new(settings).submit(&rows)?;
        println!("submitted {} rows", rows.len());
    }
    bench.apply(Command::FinishSync)?;
    Ok(())
}

fn existing(orders: Option<&Path>, settings: Settings, normalizer: Normalizer) -> Result<()> {
    let set = Remote::new(settings).existing_orders()?;
    let Some(path) = orders else {
        for order in &set {
            println!("{order}");
        }
        return Ok(());
    };
    let mut bench = Workbench::new(LayoutKind::default(), normalizer);
    bench.apply(Command::Import(read_orders(path)?))?;
    bench.apply(Command::SetExistingOrders(set))?;
    let rows = bench.store.view("", &bench.existing);
    for row in rows.iter().filter(|r| !r.blank && !r.hide_order) {
        let mark = if row.in_sheet { "already synced" } else { "new" };
        println!("{}\t{mark}", row.effective_order);
    }
    if bench.store.has_existing(&bench.existing) {
        log::warn!("some imported orders are already in the sheet");
    }
    Ok(())
}

/// Parse `1-20,25` into zero-based cell indices.
fn parse_cells(list: &str, total: usize) -> Result<Vec<usize>> {
    let mut out = Vec::new();
    for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (lo, hi) = match part.split_once('-') {
            Some((a, b)) => (a.trim().parse::<usize>()?, b.trim().parse::<usize>()?),
            None => {
                let n = part.parse::<usize>()?;
                (n, n)
            }
        };
        if lo == 0 || hi < lo || hi > total {
            bail!("cell range `{part}` is outside 1-{total}");
        }
        out.extend(lo - 1..hi);
    }
    Ok(out)
}

fn init_logging(verbose: u8) {
    static LOGGER: SimpleLogger = SimpleLogger;
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    });
}

struct SimpleLogger;

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}
