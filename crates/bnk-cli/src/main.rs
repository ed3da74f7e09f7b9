mod manifest;
mod merge;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use bnk::reader::magic_str;
use bnk::{Bank, DecodeOptions, WemInfo};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use manifest::load_manifest;
use merge::{plan_merge, Prefer};

#[derive(Parser)]
#[command(name = "bnk", about = "Inspect and patch sound banks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Keep the object hierarchy as raw bytes.
    #[arg(long, global = true)]
    raw_hierarchy: bool,
    /// Read one extra byte after an odd-length audio data chunk.
    #[arg(long, global = true)]
    pad_odd_data: bool,
    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Show the header, chunk list and object counts.
    Info { bank: PathBuf },
    /// List embedded sub-files with their format details.
    List { bank: PathBuf },
    /// Write embedded sub-files as `<id>.wem`.
    Extract {
        bank: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Only this sub-file.
        #[arg(long)]
        id: Option<u32>,
    },
    /// Replace one embedded sub-file.
    Replace {
        bank: PathBuf,
        #[arg(long)]
        id: u32,
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Apply the replacements listed in a JSON manifest.
    Patch {
        #[arg(long)]
        manifest: PathBuf,
    },
    /// Apply every sub-file the patch banks change relative to vanilla.
    Merge {
        vanilla: PathBuf,
        #[arg(required = true)]
        patches: Vec<PathBuf>,
        #[arg(long)]
        out: PathBuf,
        /// Resolve disagreeing patches instead of failing.
        #[arg(long, value_enum)]
        prefer: Option<Prefer>,
    },
    /// Print the decoded chunks as JSON.
    Dump { bank: PathBuf },
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_bank(path: &Path, options: &DecodeOptions) -> Result<Bank> {
    let data = fs::read(path).with_context(|| format!("failed to read bank: {}", path.display()))?;
    Bank::parse_with(&data, options, &mut bnk::Logged)
        .with_context(|| format!("failed to decode bank: {}", path.display()))
}

fn save_bank(bank: &Bank, path: &Path) -> Result<()> {
    let bytes = bank
        .to_bytes()
        .with_context(|| format!("failed to encode bank for {}", path.display()))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &bytes).with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

fn cmd_info(path: &Path, options: &DecodeOptions) -> Result<()> {
    let bank = load_bank(path, options)?;
    if let Some(header) = bank.header() {
        println!("Version: {:#x}", header.version);
        println!("Bank id: {}", header.bank_id);
    }
    if let Some(name) = bank
        .header()
        .and_then(|h| bank.strings()?.name_of(h.bank_id))
    {
        println!("Name:    {name}");
    }
    println!("Chunks:");
    for chunk in bank.chunks() {
        let len = chunk.payload(&mut bnk::Silent)?.len();
        let note = if chunk.is_opaque() { " (raw)" } else { "" };
        println!("  {} {len:>10}{note}", magic_str(&chunk.magic()));
    }
    println!(
        "Sub-files: {}",
        bank.sub_files().map_or(0, |m| m.len())
    );
    if let Some(hirc) = bank.hierarchy() {
        println!("Objects: {}", hirc.entries.len());
        for (kind, count) in hirc.kind_counts() {
            println!("  {:<24} {count}", kind.name());
        }
        let undecoded = hirc.undecoded().count();
        if undecoded > 0 {
            println!("  ({undecoded} kept undecoded)");
        }
    }
    Ok(())
}

fn cmd_list(path: &Path, options: &DecodeOptions) -> Result<()> {
    let bank = load_bank(path, options)?;
    let Some(sub_files) = bank.sub_files() else {
        println!("No embedded sub-files.");
        return Ok(());
    };
    println!("{:>12} {:>10} {:>10}  format", "id", "offset", "size");
    for file in sub_files.iter() {
        let format = match WemInfo::probe(&file.data, options) {
            Ok(info) => format!(
                "{:#06x} {}ch {}Hz{}",
                info.format_tag,
                info.channels,
                info.sample_rate,
                info.duration_ms()
                    .map(|ms| format!(" ~{ms}ms"))
                    .unwrap_or_default()
            ),
            Err(e) => format!("unreadable: {e}"),
        };
        println!(
            "{:>12} {:>10} {:>10}  {format}",
            file.id,
            file.offset,
            file.size()
        );
    }
    Ok(())
}

fn cmd_extract(path: &Path, out: &Path, only: Option<u32>, options: &DecodeOptions) -> Result<()> {
    let bank = load_bank(path, options)?;
    let Some(sub_files) = bank.sub_files() else {
        bail!("{} has no embedded sub-files", path.display());
    };
    if let Some(id) = only
        && sub_files.lookup(id).is_none()
    {
        bail!("sub-file {id} not found in {}", path.display());
    }

    fs::create_dir_all(out)
        .with_context(|| format!("failed to create {}", out.display()))?;
    let mut count = 0;
    for file in sub_files.iter().filter(|f| only.is_none_or(|id| f.id == id)) {
        let dest = out.join(format!("{}.wem", file.id));
        fs::write(&dest, &file.data)
            .with_context(|| format!("failed to write {}", dest.display()))?;
        count += 1;
    }
    println!("Extracted {count} sub-files to {}", out.display());
    Ok(())
}

fn cmd_replace(path: &Path, id: u32, file: &Path, out: &Path, options: &DecodeOptions) -> Result<()> {
    let mut bank = load_bank(path, options)?;
    let data = fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    bank.replace(id, data)
        .with_context(|| format!("failed to replace sub-file {id}"))?;
    save_bank(&bank, out)
}

fn cmd_patch(manifest_path: &Path, flags: &DecodeOptions) -> Result<()> {
    let manifest = load_manifest(manifest_path)?;
    let options = DecodeOptions {
        decode_hierarchy: manifest.options.decode_hierarchy && flags.decode_hierarchy,
        pad_odd_data_chunk: manifest.options.pad_odd_data_chunk || flags.pad_odd_data_chunk,
        ..manifest.options.clone()
    };

    let mut bank = load_bank(&manifest.source, &options)?;
    for r in &manifest.replacements {
        let data = fs::read(&r.file)
            .with_context(|| format!("failed to read {}", r.file.display()))?;
        bank.replace(r.id, data)
            .with_context(|| format!("failed to replace sub-file {}", r.id))?;
        tracing::info!(id = r.id, file = %r.file.display(), "replaced");
    }
    save_bank(&bank, &manifest.output)
}

fn cmd_merge(
    vanilla_path: &Path,
    patch_paths: &[PathBuf],
    out: &Path,
    prefer: Option<Prefer>,
    options: &DecodeOptions,
) -> Result<()> {
    let mut vanilla = load_bank(vanilla_path, options)?;
    let patches = patch_paths
        .iter()
        .map(|p| load_bank(p, options))
        .collect::<Result<Vec<_>>>()?;

    let Some(base) = vanilla.sub_files() else {
        bail!("{} has no embedded sub-files", vanilla_path.display());
    };
    let mut marshallers = Vec::with_capacity(patches.len());
    for (bank, path) in patches.iter().zip(patch_paths) {
        let Some(m) = bank.sub_files() else {
            bail!("{} has no embedded sub-files", path.display());
        };
        marshallers.push(m);
    }

    let plan = plan_merge(base, &marshallers, prefer);
    if !plan.conflicts.is_empty() {
        for conflict in &plan.conflicts {
            let names: Vec<String> = conflict
                .patches
                .iter()
                .map(|&i| patch_paths[i].display().to_string())
                .collect();
            eprintln!("conflict: sub-file {} differs in {}", conflict.id, names.join(", "));
        }
        bail!(
            "{} conflicting sub-files; pass --prefer first|last to resolve",
            plan.conflicts.len()
        );
    }

    for &(id, patch) in &plan.picks {
        let Some(data) = marshallers[patch].lookup(id) else {
            continue;
        };
        vanilla.replace(id, data.to_vec())?;
        tracing::info!(id, patch = %patch_paths[patch].display(), "merged");
    }
    println!("Merged {} sub-files", plan.picks.len());
    save_bank(&vanilla, out)
}

fn cmd_dump(path: &Path, options: &DecodeOptions) -> Result<()> {
    let bank = load_bank(path, options)?;
    let json =
        serde_json::to_string_pretty(bank.chunks()).context("failed to serialize bank")?;
    println!("{json}");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = DecodeOptions {
        decode_hierarchy: !cli.raw_hierarchy,
        pad_odd_data_chunk: cli.pad_odd_data,
        ..DecodeOptions::default()
    };
    match &cli.command {
        Command::Info { bank } => cmd_info(bank, &options),
        Command::List { bank } => cmd_list(bank, &options),
        Command::Extract { bank, out, id } => cmd_extract(bank, out, *id, &options),
        Command::Replace { bank, id, file, out } => cmd_replace(bank, *id, file, out, &options),
        Command::Patch { manifest } => cmd_patch(manifest, &options),
        Command::Merge {
            vanilla,
            patches,
            out,
            prefer,
        } => cmd_merge(vanilla, patches, out, *prefer, &options),
        Command::Dump { bank } => cmd_dump(bank, &options),
    }
}
