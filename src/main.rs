//! Herosave CLI - Play from the save menu or inspect slots from scripts

use clap::{Parser, Subcommand};
use herosave::{Menu, SaveRepository, SlotDir, SlotEntry};
use std::io;

#[derive(Parser)]
#[command(name = "herosave")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Saves directory (defaults to ./saves)
    #[arg(long, global = true)]
    saves_dir: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every save slot, corrupt ones included
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Print one save slot
    Show {
        /// 1-based slot index
        index: usize,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Delete a save slot and renumber the ones above it
    Delete {
        /// 1-based slot index
        index: usize,
    },
}

fn main() {
    let cli = Cli::parse();
    let slots = match cli.saves_dir {
        Some(dir) => SlotDir::new(dir),
        None => SlotDir::default(),
    };
    let repo = SaveRepository::new(slots);

    let result = match cli.command {
        Some(Commands::List { format }) => list(&repo, &format),
        Some(Commands::Show { index, format }) => show(&repo, index, &format),
        Some(Commands::Delete { index }) => delete(&repo, index),
        None => play(repo),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Interactive mode: repair any half-finished compaction, then menu.
fn play(repo: SaveRepository) -> herosave::Result<()> {
    let moved = repo.repair()?;
    if moved > 0 {
        eprintln!("Recovered {} save slot(s) after an interrupted delete.", moved);
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    Menu::new(repo, stdin.lock(), stdout.lock()).run()
}

fn list(repo: &SaveRepository, format: &str) -> herosave::Result<()> {
    if format == "json" {
        let entries: Vec<serde_json::Value> = repo
            .summaries()
            .map(|summary| match summary.entry {
                SlotEntry::Valid(loaded) => serde_json::json!({
                    "slot": summary.index,
                    "record": loaded.record,
                }),
                SlotEntry::Corrupt(error) => serde_json::json!({
                    "slot": summary.index,
                    "error": error.to_string(),
                }),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".into()));
        return Ok(());
    }

    for summary in repo.summaries() {
        match summary.entry {
            SlotEntry::Valid(loaded) => {
                let r = &loaded.record;
                println!(
                    "save {}: {} | {} HP | {} coins | {} items | {} quests",
                    summary.index, r.name, r.health, r.coins, r.items, r.quests_completed
                );
            }
            SlotEntry::Corrupt(error) => {
                println!("save {}: unreadable ({})", summary.index, error);
            }
        }
    }
    Ok(())
}

fn show(repo: &SaveRepository, index: usize, format: &str) -> herosave::Result<()> {
    let loaded = repo.read(index)?;
    if format == "json" {
        println!(
            "{}",
            serde_json::to_string_pretty(&loaded.record).unwrap_or_else(|_| "{}".into())
        );
    } else {
        let r = &loaded.record;
        println!("name: {}", r.name);
        println!("saved_at: {}", r.saved_at);
        println!("health: {}", r.health);
        println!("coins: {}", r.coins);
        println!("items: {}", r.items);
        println!("quests_completed: {}", r.quests_completed);
    }
    Ok(())
}

fn delete(repo: &SaveRepository, index: usize) -> herosave::Result<()> {
    repo.delete(index)?;
    println!("Deleted save {}.", index);
    Ok(())
}
