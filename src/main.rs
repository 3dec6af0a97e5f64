mod config;
mod descriptor;
mod error;
mod generator;
mod layout;
mod parser;
mod sync;

use std::{fs, path::{Path, PathBuf}, process::ExitCode};

use clap::{Args, Parser, Subcommand};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use config::VgenConfig;
use descriptor::{ArtifactKind, PadList, RegisterMap, Table};
use error::{VgenError, VgenResult};
use generator::gen_common::GeneratorBaseSetting;
use parser::{extract_signals, ExtractMode};
use sync::{reconcile, SyncOptions, SyncVariant};

#[derive(Parser)]
#[command(version, rename_all="snake_case")]
/// Descriptor table synchronization and code generation for registers and pads
struct VgenArgs {
    /// Verbose logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true, action)]
    verbose: bool,
    #[command(subcommand)]
    cmd: VgenCmd,
}

#[derive(Subcommand)]
enum VgenCmd {
    /// Memory-mapped register file
    Regs(RegsArgs),
    /// Chip IO pads
    Pads(PadsArgs),
}

#[derive(Args)]
struct CommonArgs {
    /// Output directory for generated files
    #[arg(short, long, default_value = "output")]
    output: PathBuf,
    /// Template overriding the embedded one
    #[arg(short, long)]
    template: Option<PathBuf>,
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Report changes to the descriptor table without writing it
    #[arg(long, action)]
    dry_run: bool,
}

#[derive(Args)]
struct RegsArgs {
    /// Register descriptor table
    #[arg(short, long)]
    csv: PathBuf,
    /// Verilog source to scan for new registers
    #[arg(short, long)]
    update: Option<PathBuf>,
    /// Only consider signals starting with this prefix
    #[arg(short, long)]
    prefix: Option<String>,
    /// Generate the register file and its collateral
    #[arg(short, long, action)]
    generate: bool,
    /// Module name (default: CSV file stem)
    #[arg(short, long)]
    module: Option<String>,
    /// Clock in the instantiation template
    #[arg(long)]
    clock: Option<String>,
    /// Reset in the instantiation template
    #[arg(long)]
    reset: Option<String>,
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args)]
struct PadsArgs {
    /// Pad descriptor table
    #[arg(short, long, default_value = "pads.csv")]
    csv: PathBuf,
    /// Top level Verilog source to scan for new pads
    #[arg(short, long)]
    update: Option<PathBuf>,
    /// Copy of the descriptor table kept for physical design
    #[arg(long)]
    mirror: Option<PathBuf>,
    /// Ignore top level ports starting with this prefix
    #[arg(long)]
    ignore_prefix: Option<String>,
    /// Generate the pad module with the given name
    #[arg(short, long, num_args = 0..=1, default_missing_value = "TOP_PADS")]
    generate: Option<String>,
    #[command(flatten)]
    common: CommonArgs,
}

fn init_logging(verbose: bool) {
    let default = if verbose {"debug"} else {"info"};
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn check_action(update: bool, generate: bool) -> VgenResult<()> {
    if update || generate {
        Ok(())
    } else {
        Err(VgenError::Config("nothing to do: use --update and/or --generate".to_owned()))
    }
}

fn sync_options(table: &Path, source: &Path, ignore_prefix: Option<String>) -> SyncOptions {
    SyncOptions {
        ignore_prefix,
        table_label: table.display().to_string(),
        source_label: source.display().to_string(),
    }
}

fn run_regs(args: RegsArgs) -> VgenResult<()> {
    check_action(args.update.is_some(), args.generate)?;
    let mut cfg = VgenConfig::load(args.common.config.as_deref())?;
    if let Some(clock) = args.clock {
        cfg.regs.clock = clock;
    }
    if let Some(reset) = args.reset {
        cfg.regs.reset = reset;
    }

    if let Some(src) = &args.update {
        info!("Updating {} from {}", args.csv.display(), src.display());
        let table = if args.csv.is_file() {Table::read(&args.csv)?} else {Table::default()};
        let hdl = fs::read_to_string(src)?;
        let signals = extract_signals(&hdl, ExtractMode::AllSignals, args.prefix.as_deref());
        let opts = sync_options(&args.csv, src, None);
        let outcome = reconcile(&table, signals, SyncVariant::Registers, &opts)?;
        if args.common.dry_run {
            info!(
                "Dry run: {} new register(s) not written ({} records after update)",
                outcome.new_records.len(), outcome.table.len()
            );
        } else {
            outcome.commit(&args.csv, None, SyncVariant::Registers)?;
        }
    }

    if args.generate {
        let module = match args.module {
            Some(m) => m,
            None => args.csv
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .ok_or_else(|| VgenError::Config(format!("no module name for {}", args.csv.display())))?,
        };
        let table = Table::read(&args.csv)?;
        let map = RegisterMap::from_table(&table, &ArtifactKind::schema(&ArtifactKind::REGS))?;
        info!(
            "Generating register file {module} ({} registers, {} unused words)",
            map.len(), layout::gaps(&map).len()
        );
        let setting = GeneratorBaseSetting {
            path: args.common.output,
            template: args.common.template,
            module,
        };
        generator::gen_regs(&map, setting, &cfg)?;
    }
    Ok(())
}

fn run_pads(args: PadsArgs) -> VgenResult<()> {
    check_action(args.update.is_some(), args.generate.is_some())?;
    let cfg = VgenConfig::load(args.common.config.as_deref())?;

    if let Some(src) = &args.update {
        info!("Updating {} from {}", args.csv.display(), src.display());
        let table = if args.csv.is_file() {Table::read(&args.csv)?} else {Table::default()};
        let hdl = fs::read_to_string(src)?;
        let signals = extract_signals(&hdl, ExtractMode::Ports, None);
        let prefix = args.ignore_prefix.clone().unwrap_or_else(|| cfg.pads.ignore_prefix.clone());
        let opts = sync_options(&args.csv, src, Some(prefix));
        let outcome = reconcile(&table, signals, SyncVariant::Pads, &opts)?;
        debug!(
            "Ignored ports {:?}, merged in bidir pads {:?}",
            outcome.report.ignored, outcome.report.bidir_dropped
        );
        if args.common.dry_run {
            info!(
                "Dry run: {} new pad(s) not written ({} records after update)",
                outcome.new_records.len(), outcome.table.len()
            );
        } else {
            outcome.commit(&args.csv, args.mirror.as_deref(), SyncVariant::Pads)?;
        }
    } else if args.mirror.is_some() {
        warn!("Mirror table is only updated with --update");
    }

    if let Some(module) = args.generate {
        let table = Table::read(&args.csv)?;
        let pads = PadList::from_table(&table, &ArtifactKind::schema(&ArtifactKind::PADS))?;
        info!("Generating pad module {module} ({} pads)", pads.len());
        let setting = GeneratorBaseSetting {
            path: args.common.output,
            template: args.common.template,
            module,
        };
        generator::gen_pads(&pads, setting, &cfg)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = VgenArgs::parse();
    init_logging(args.verbose);
    let res = match args.cmd {
        VgenCmd::Regs(a) => run_regs(a),
        VgenCmd::Pads(a) => run_pads(a),
    };
    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
