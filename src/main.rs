use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::env;
use std::path::Path;

// Use library instead of local modules
use weightlog::{
    config, export_csv, export_json, format_percent, import_csv, import_json,
    validate_non_negative_integer, validate_percentage, validate_weight, EntryDraft, EntryStore,
    PhotoStore, WeightUnit,
};

fn main() -> Result<()> {
    weightlog::logging::init();

    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        None => run_ui_mode(),
        Some("add") => run_add(&args[2..]),
        Some("history") => run_history(),
        Some("latest") => run_latest(),
        Some("edit") => run_edit(&args[2..]),
        Some("delete") => run_delete(&args[2..]),
        Some("export") => run_export(&args[2..]),
        Some("import") => run_import(&args[2..]),
        Some("unit") => run_unit(&args[2..]),
        Some("help" | "--help" | "-h") => {
            print_usage();
            Ok(())
        }
        Some(other) => {
            eprintln!("❌ Unknown command: {other}\n");
            print_usage();
            std::process::exit(1);
        }
    }
}

/// Opens the entry database and photo directory under the app's home.
fn open_store() -> Result<EntryStore> {
    let photos = PhotoStore::open(config::photos_dir()?)?;
    let store = EntryStore::open(&config::db_path()?)?.with_photos(photos);
    Ok(store)
}

fn parse_unit(text: &str) -> Result<WeightUnit> {
    WeightUnit::parse(text).with_context(|| format!("Unknown weight unit: {text}"))
}

fn run_add(args: &[String]) -> Result<()> {
    if args.len() < 4 {
        bail!("Usage: weightlog add <weight> <muscle%> <body-fat%> <visceral> [kg|lbs|st] [photo]");
    }

    let config = config::load_or_default()?;
    let unit = match args.get(4) {
        Some(text) => parse_unit(text)?,
        None => config.display_unit,
    };

    let weight = validate_weight(&args[0])?.context("Weight is required")?;
    let muscle = validate_percentage(&args[1], None)?.context("Muscle mass is required")?;
    let body_fat = validate_percentage(&args[2], Some(muscle))?.context("Body fat is required")?;
    let visceral = validate_non_negative_integer(&args[3])?.context("Visceral fat is required")?;

    let mut store = open_store()?;
    let photo = match args.get(5) {
        Some(path) => {
            let photos = store.photos().context("Photo storage is not available")?;
            Some(photos.import(Path::new(path))?)
        }
        None => None,
    };

    let entry = store.add_entry(EntryDraft {
        date: Utc::now(),
        weight_kg: unit.to_kilograms(weight),
        muscle_mass_percent: muscle,
        body_fat_percent: body_fat,
        visceral_fat: visceral,
        weight_unit: unit,
        photo,
    })?;

    println!(
        "✓ Logged {} on {}",
        entry.display_weight(),
        entry.date.format("%d/%m/%y %H:%M")
    );
    println!(
        "  muscle {}  body fat {}  visceral {}",
        format_percent(entry.muscle_mass_percent),
        format_percent(entry.body_fat_percent),
        entry.visceral_fat
    );
    println!("  id: {}", entry.id);

    Ok(())
}

fn run_history() -> Result<()> {
    let store = open_store()?;
    let unit = config::load_or_default()?.display_unit;
    let entries = store.newest_first()?;

    if entries.is_empty() {
        println!("No entries yet. Log one with: weightlog add <weight> <muscle%> <body-fat%> <visceral>");
        return Ok(());
    }

    println!("📊 {} entries (weights in {})\n", entries.len(), unit);
    println!(
        "{:<16} {:>8} {:>9} {:>11} {:>9}  {:<20} {}",
        "Date", "Weight", "Muscle %", "Body Fat %", "Visceral", "Photo", "Id"
    );
    for entry in &entries {
        println!(
            "{:<16} {:>8.1} {:>9.1} {:>11.1} {:>9}  {:<20} {}",
            entry.date.format("%d/%m/%y %H:%M").to_string(),
            entry.weight_in(unit),
            entry.muscle_mass_percent,
            entry.body_fat_percent,
            entry.visceral_fat,
            entry.photo.as_deref().unwrap_or("-"),
            entry.id
        );
    }

    Ok(())
}

fn run_latest() -> Result<()> {
    let store = open_store()?;
    match store.latest_entry()? {
        Some(entry) => {
            println!(
                "✓ Latest: {} on {}",
                entry.display_weight(),
                entry.date.format("%d/%m/%y %H:%M")
            );
            println!(
                "  muscle {}  body fat {}  visceral {}",
                format_percent(entry.muscle_mass_percent),
                format_percent(entry.body_fat_percent),
                entry.visceral_fat
            );
            println!("  id: {}", entry.id);
        }
        None => println!("No entries yet."),
    }
    Ok(())
}

fn run_edit(args: &[String]) -> Result<()> {
    if args.len() < 5 {
        bail!("Usage: weightlog edit <id> <weight> <muscle%> <body-fat%> <visceral> [kg|lbs|st]");
    }

    let mut store = open_store()?;
    let id = &args[0];
    let existing = store
        .entry(id)?
        .with_context(|| format!("No entry with id {id}"))?;

    let unit = match args.get(5) {
        Some(text) => parse_unit(text)?,
        None => existing.weight_unit,
    };
    let weight = validate_weight(&args[1])?.context("Weight is required")?;
    let muscle = validate_percentage(&args[2], None)?.context("Muscle mass is required")?;
    let body_fat = validate_percentage(&args[3], Some(muscle))?.context("Body fat is required")?;
    let visceral = validate_non_negative_integer(&args[4])?.context("Visceral fat is required")?;

    // The measurement date and any attached photo stay as they are.
    let updated = store.update_entry(
        id,
        EntryDraft {
            date: existing.date,
            weight_kg: unit.to_kilograms(weight),
            muscle_mass_percent: muscle,
            body_fat_percent: body_fat,
            visceral_fat: visceral,
            weight_unit: unit,
            photo: existing.photo.clone(),
        },
    )?;

    println!("✓ Updated {} ({})", updated.display_weight(), updated.id);
    Ok(())
}

fn run_delete(args: &[String]) -> Result<()> {
    let id = args.first().context("Usage: weightlog delete <id>")?;
    let mut store = open_store()?;
    if store.delete_entry(id)? {
        println!("✓ Deleted entry {id}");
    } else {
        println!("Entry {id} was not found; nothing to delete.");
    }
    Ok(())
}

fn run_export(args: &[String]) -> Result<()> {
    let path = args
        .first()
        .context("Usage: weightlog export <file.csv|file.json>")?;
    let path = Path::new(path);

    let store = open_store()?;
    let written = if is_json(path) {
        export_json(&store, path)?
    } else {
        export_csv(&store, path)?
    };

    println!("✓ Exported {} entries to {}", written, path.display());
    Ok(())
}

fn run_import(args: &[String]) -> Result<()> {
    let path = args
        .first()
        .context("Usage: weightlog import <file.csv|file.json>")?;
    let path = Path::new(path);

    let mut store = open_store()?;
    let summary = if is_json(path) {
        import_json(&mut store, path)?
    } else {
        import_csv(&mut store, path)?
    };

    println!(
        "✓ Imported {} entries ({} already present)",
        summary.imported, summary.skipped
    );
    Ok(())
}

fn run_unit(args: &[String]) -> Result<()> {
    let text = args.first().context("Usage: weightlog unit <kg|lbs|st>")?;
    let unit = parse_unit(text)?;

    let mut config = config::load_or_default()?;
    config.display_unit = unit;
    config::save(&config)?;

    println!("✓ Display unit set to {unit}");
    Ok(())
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn print_usage() {
    println!("Weight Log v{}", weightlog::VERSION);
    println!();
    println!("Usage: weightlog [COMMAND]");
    println!();
    println!("Commands:");
    println!("  (none)                       open the TUI");
    println!("  add <weight> <muscle%> <body-fat%> <visceral> [kg|lbs|st] [photo]");
    println!("                               log a new entry dated now");
    println!("  history                      list every entry, newest first");
    println!("  latest                       show the most recent entry");
    println!("  edit <id> <weight> <muscle%> <body-fat%> <visceral> [kg|lbs|st]");
    println!("                               replace an entry's figures");
    println!("  delete <id>                  remove an entry and its photo");
    println!("  export <file.csv|file.json>  back up every entry");
    println!("  import <file.csv|file.json>  restore entries, skipping known ids");
    println!("  unit <kg|lbs|st>             set the display unit");
}

#[cfg(feature = "tui")]
fn run_ui_mode() -> Result<()> {
    println!("🖥️  Loading Weight Log UI...\n");

    let store = open_store()?;
    let config = config::load_or_default()?;

    println!("✓ Opened log with {} entries", store.count()?);
    println!("Starting UI... (Press Esc to quit)\n");

    let mut app = weightlog::ui::App::new(store, config)?;
    weightlog::ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode() -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or log an entry directly: weightlog add <weight> <muscle%> <body-fat%> <visceral>");
    std::process::exit(1);
}
