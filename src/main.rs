// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use catalog_classifier::{
    logging, parse_user_id, sort_categories, CatalogStore, Config, ItemRef, ItemSource, Location, Price,
};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "catalog", version, about = "Classify, curate and search a product catalog")]
struct Cli {
    /// Directory holding the catalog documents
    #[arg(long, global = true, env = "CATALOG_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Replace the auto-catalog from a CSV spreadsheet
    Import { file: PathBuf },
    /// Write the merged catalog as CSV (stdout when no file is given)
    Export { file: Option<PathBuf> },
    /// Show how a description would be classified
    Classify { description: String },
    /// Search the merged catalog
    Search { query: String },
    /// List categories, brands of a category, or items of a bucket
    List {
        category: Option<String>,
        subcategory: Option<String>,
    },
    /// Move numbered items ("1,3" or "2-5") to another bucket
    Move {
        category: String,
        subcategory: String,
        selection: String,
        to_category: String,
        to_subcategory: String,
    },
    /// Add a hand-entered item
    AddItem {
        category: String,
        subcategory: String,
        description: String,
        price: Option<String>,
    },
    /// Fix the price of one numbered item
    SetPrice {
        category: String,
        subcategory: String,
        number: String,
        price: String,
    },
    /// Delete numbered items from a bucket
    DeleteItems {
        category: String,
        subcategory: String,
        selection: String,
    },
    /// Delete a manual bucket (or a whole manual category), restoring moved items
    DeleteManual {
        category: String,
        subcategory: Option<String>,
    },
    /// Manage administrators
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Browse the catalog in the terminal
    Browse,
}

#[derive(Subcommand)]
enum AdminAction {
    List,
    Add { user_id: String },
    Remove { user_id: String },
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }
    let store = CatalogStore::open(config);

    match cli.command.unwrap_or(Command::Browse) {
        Command::Import { file } => run_import(&store, &file)?,
        Command::Export { file } => run_export(&store, file)?,
        Command::Classify { description } => {
            let result = store.classify(&description);
            println!("{} / {}  (rule: {})", result.category, result.subcategory, result.rule_id);
        }
        Command::Search { query } => {
            let hits = store.search(&query);
            if hits.is_empty() {
                println!("Nothing found for {:?}", query);
            }
            for hit in hits {
                println!("{} / {}: {}", hit.category, hit.subcategory, hit.item.display_line());
            }
        }
        Command::List { category, subcategory } => run_list(&store, category, subcategory),
        Command::Move {
            category,
            subcategory,
            selection,
            to_category,
            to_subcategory,
        } => {
            let moved = store.move_selection(
                &Location::new(category, subcategory),
                &Location::new(to_category, to_subcategory),
                &selection,
            )?;
            println!("✓ Moved {} item(s)", moved);
        }
        Command::AddItem {
            category,
            subcategory,
            description,
            price,
        } => {
            let price = price.as_deref().map(Price::parse).unwrap_or_default();
            let item = store.add_manual_item(&Location::new(category, subcategory), &description, price)?;
            println!("✓ Added {}", item.display_line());
        }
        Command::SetPrice {
            category,
            subcategory,
            number,
            price,
        } => run_set_price(&store, Location::new(category, subcategory), &number, &price)?,
        Command::DeleteItems {
            category,
            subcategory,
            selection,
        } => {
            let deleted = store.delete_selection(&Location::new(category, subcategory), &selection)?;
            println!("✓ Deleted {} item(s)", deleted);
        }
        Command::DeleteManual { category, subcategory } => {
            let restored = match subcategory {
                Some(subcategory) => store.delete_manual_bucket(&Location::new(category, subcategory))?,
                None => store.delete_manual_category(&category)?,
            };
            println!("✓ Deleted; {} moved item(s) returned to their original place", restored);
        }
        Command::Admin { action } => run_admin(&store, action)?,
        Command::Browse => run_ui_mode(&store)?,
    }

    if store.persist_failures() > 0 {
        eprintln!("⚠️  {} write(s) failed; see log for details", store.persist_failures());
    }

    Ok(())
}

fn run_import(store: &CatalogStore, file: &Path) -> Result<()> {
    println!("📂 Loading {}...", file.display());
    let bytes = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;

    let report = store.import_spreadsheet(&bytes)?;
    println!("✓ {}", report.summary());
    println!("✓ SHA-256 {}", report.sha256);
    Ok(())
}

fn run_export(store: &CatalogStore, file: Option<PathBuf>) -> Result<()> {
    let csv = store.export_csv()?;
    match file {
        Some(path) => {
            fs::write(&path, csv).with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✓ Exported to {}", path.display());
        }
        None => print!("{}", String::from_utf8_lossy(&csv)),
    }
    Ok(())
}

fn run_list(store: &CatalogStore, category: Option<String>, subcategory: Option<String>) {
    let merged = store.merged();
    match (category, subcategory) {
        (None, _) => {
            for name in sort_categories(&merged.category_names()) {
                println!("{} ({})", name, merged.category_count(&name));
            }
        }
        (Some(category), None) => {
            for (brand, count) in merged.subcategories(&category) {
                println!("{} ({})", brand, count);
            }
        }
        (Some(category), Some(subcategory)) => {
            for listed in store.bucket_listing(&Location::new(category, subcategory)) {
                println!("{:>3}. {}  [{}]", listed.number, listed.item.display_line(), listed.source.as_str());
            }
        }
    }
}

fn run_set_price(store: &CatalogStore, location: Location, number: &str, price: &str) -> Result<()> {
    let listing = store.bucket_listing(&location);
    let numbers = catalog_classifier::parse_selection(number, listing.len())?;
    let Some(listed) = numbers.first().and_then(|n| listing.iter().find(|l| l.number == *n)) else {
        anyhow::bail!("no item selected");
    };

    let item_ref: ItemRef = listed.item_ref();
    if store.set_price(&location, &item_ref, Price::parse(price)) {
        let pinned = if item_ref.source == ItemSource::Auto { " (pinned)" } else { "" };
        println!("✓ Price of {} set to {}{}", item_ref.description, price.trim(), pinned);
    } else {
        println!("Item changed meanwhile; nothing updated");
    }
    Ok(())
}

fn run_admin(store: &CatalogStore, action: AdminAction) -> Result<()> {
    match action {
        AdminAction::List => {
            for id in store.admins() {
                println!("{}", id);
            }
        }
        AdminAction::Add { user_id } => {
            let id = parse_user_id(&user_id)?;
            if store.add_admin(id) {
                println!("✓ {} is now an administrator", id);
            } else {
                println!("{} is already an administrator", id);
            }
        }
        AdminAction::Remove { user_id } => {
            let id = parse_user_id(&user_id)?;
            if store.remove_admin(id) {
                println!("✓ {} removed", id);
            } else {
                println!("{} was not an administrator", id);
            }
        }
    }
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(store: &CatalogStore) -> Result<()> {
    println!("🖥️  Loading catalog browser...\n");
    let mut app = ui::App::new(store.snapshot());
    ui::run_ui(&mut app)?;
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_store: &CatalogStore) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    std::process::exit(1);
}
