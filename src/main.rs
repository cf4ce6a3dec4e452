use clap::{Parser, Subcommand};
use log::info;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use plaza_save::bag::BagSave;
use plaza_save::block::BlockKey;
use plaza_save::codec;
use plaza_save::dex::DexSave;
use plaza_save::items::ItemTable;
use plaza_save::player::CoreData;
use plaza_save::presets;
use plaza_save::repair::{repair_bag, RepairOptions};
use plaza_save::store::HashDb;

#[derive(Parser)]
#[command(name = "plaza-save", about = "PLZA save container repair tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Repair corrupt bag categories and mega stone quantities
    Repair {
        save_file: PathBuf,
        /// Emit log lines as JSON records
        #[arg(long)]
        json_output: bool,
        /// Keep existing mega stone quantities
        #[arg(long)]
        keep_mega: bool,
        /// Skip fixing categories of items which have not been obtained yet
        #[arg(long)]
        no_preemptive_edit: bool,
        /// Output file path (default: <save_file>_modified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Mark the curated species list captured/battled/shiny in the dex
    CompleteDex {
        save_file: PathBuf,
        /// Output file path (default: "main" next to the input, with the
        /// input preserved as <save_file>_old)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show container diagnostics
    Info {
        save_file: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let result = match Cli::parse().command {
        Commands::Repair { save_file, json_output, keep_mega, no_preemptive_edit, output } => {
            run_repair(&save_file, json_output, keep_mega, no_preemptive_edit, output)
        }
        Commands::CompleteDex { save_file, output } => run_complete_dex(&save_file, output),
        Commands::Info { save_file } => run_info(&save_file),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

// ── Reporter ─────────────────────────────────────────────────────────────────

/// Console or JSON log lines, matching the repair tool's two output modes.
struct Reporter {
    json: bool,
}

impl Reporter {
    fn msg(&self, text: &str) {
        if !self.json {
            println!("{text}");
        }
    }

    fn record(&self, text: &str, mut data: serde_json::Value) {
        if self.json {
            data["log"] = json!(text);
            println!("{data}");
        } else {
            println!("{text}");
        }
    }
}

// ── Repair ───────────────────────────────────────────────────────────────────

fn run_repair(
    save_file: &Path,
    json_output: bool,
    keep_mega: bool,
    no_preemptive_edit: bool,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let rep = Reporter { json: json_output };
    rep.msg("PLZA save repair");
    rep.msg(&format!("file: {}", save_file.display()));

    let raw = fs::read(save_file)?;
    if !raw.starts_with(codec::MAGIC) {
        rep.record("file is not a PLZA save container", json!({"success": false}));
        return Err("invalid save file".into());
    }

    let blocks = match codec::decode(&raw) {
        Ok(blocks) => blocks,
        Err(e) => {
            rep.record(&format!("error decrypting save file: {e}"), json!({"success": false}));
            return Err(e.into());
        }
    };
    info!("decrypted {} blocks", blocks.len());
    info!("container hash valid: {}", codec::is_hash_valid(&raw));

    let mut db = HashDb::new(blocks)?;

    let core = CoreData::from_bytes(db.get(BlockKey::CoreData)?.data())?;
    rep.msg(&format!("trainer: {core}"));

    let mut bag = match BagSave::from_bytes(db.get(BlockKey::BagItems)?.data()) {
        Ok(bag) => bag,
        Err(e) => {
            rep.record("invalid bag size, can't fix", json!({"success": false}));
            return Err(e.into());
        }
    };
    let dex = DexSave::from_bytes(db.get(BlockKey::Pokedex)?.data())?;
    rep.msg(&format!("{bag}"));
    rep.msg(&format!("{dex}"));

    let items = ItemTable::builtin()?;
    let opts = RepairOptions {
        fix_mega_quantity: !keep_mega,
        preemptive_category_fix: !no_preemptive_edit,
    };
    let actions = repair_bag(&mut bag, &items, &opts);

    for action in &actions {
        rep.record(&action.to_string(), serde_json::to_value(action)?);
    }

    if actions.is_empty() {
        rep.record("no items needed to be modified", json!({"success": true}));
        return Ok(());
    }
    rep.record(
        &format!("done, modified {} entries", actions.len()),
        json!({"edited_count": actions.len(), "success": true}),
    );

    db.get_mut(BlockKey::BagItems)?.replace_data(bag.to_bytes());

    let out_path = output.unwrap_or_else(|| append_suffix(save_file, "_modified"));
    rep.msg(&format!("writing modified file to {}", out_path.display()));
    fs::write(&out_path, codec::encode(db.blocks()))?;
    rep.msg("wrote file, exiting");
    Ok(())
}

// ── Complete dex ─────────────────────────────────────────────────────────────

fn run_complete_dex(
    save_file: &Path,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = fs::read(save_file)?;
    if !raw.starts_with(codec::MAGIC) {
        return Err("file is not a PLZA save container".into());
    }

    let blocks = codec::decode(&raw)?;
    info!("decrypted {} blocks", blocks.len());

    let mut db = HashDb::new(blocks)?;
    let mut dex = DexSave::from_bytes(db.get(BlockKey::Pokedex)?.data())?;
    let applied = presets::complete_dex(&mut dex, presets::LUMIOSE_DEX_COMPLETION)?;
    db.get_mut(BlockKey::Pokedex)?.replace_data(dex.to_bytes());
    let encoded = codec::encode(db.blocks());

    // The game loads a file literally named "main"; keep the original
    // around as <name>_old so a bad write can always be undone by hand.
    let out_path = output.unwrap_or_else(|| save_file.with_file_name("main"));
    let backup = append_suffix(save_file, "_old");
    if backup.exists() {
        fs::remove_file(&backup)?;
    }
    fs::rename(save_file, &backup)?;
    if let Err(e) = fs::write(&out_path, &encoded) {
        // put the input back before bailing
        fs::rename(&backup, save_file)?;
        return Err(e.into());
    }

    println!("dex entries applied: {applied}");
    println!(
        "wrote {} (backup at {})",
        out_path.display(),
        backup.display()
    );
    Ok(())
}

// ── Info ─────────────────────────────────────────────────────────────────────

fn run_info(save_file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let raw = fs::read(save_file)?;

    // report what can be probed cheaply before attempting a full decode,
    // so a corrupt file still gets a diagnostic listing
    println!("── PLZA save container ──────────────────────────────────");
    println!("  path        {}", save_file.display());
    println!("  size        {} B", raw.len());
    println!("  signature   {}", if raw.starts_with(codec::MAGIC) { "ok" } else { "BAD" });
    println!("  hash        {}", if codec::is_hash_valid(&raw) { "valid" } else { "INVALID" });
    if raw.len() >= codec::MIN_CONTAINER_LEN {
        println!("  tail        {}", hex::encode(&raw[raw.len() - 32..]));
    }

    let blocks = codec::decode(&raw)?;
    println!("  blocks      {}", blocks.len());
    for block in &blocks {
        println!(
            "    {:#010x}  {:>7} B  crc={:08x}  {}",
            block.key(),
            block.data().len(),
            block.checksum(),
            block.known_key().map(|k| k.name()).unwrap_or("-"),
        );
    }
    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn append_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}
