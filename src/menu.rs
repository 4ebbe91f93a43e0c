//! Menu - Interactive terminal menus over the save repository
//!
//! All input and output go through generic `BufRead`/`Write` handles
//! so tests can drive the menus with in-memory buffers.

use crate::cheats::{self, CheatCode, CheatState, CodeEntry};
use crate::hero::Hero;
use crate::repository::{Loaded, Migration, SaveRepository, SlotEntry, Upsert};
use crate::Result;
use chrono::DateTime;
use lazy_static::lazy_static;
use regex::Regex;
use std::io::{BufRead, Write};

lazy_static! {
    /// Slot selection accepts digits only
    static ref DIGITS_RE: Regex = Regex::new(r"^[0-9]+$").unwrap();

    /// Cheat deltas may be negative
    static ref DELTA_RE: Regex = Regex::new(r"^-?[0-9]+$").unwrap();
}

const BLUE: &str = "\x1b[94m";
const RED: &str = "\x1b[91m";
const GREEN: &str = "\x1b[92m";
const YELLOW: &str = "\x1b[93m";
const RESET: &str = "\x1b[0m";

/// The interactive menu layer.
///
/// Owns the repository and the cheat state for the session; the cheat
/// flag is a value threaded through the calls here, never a global.
pub struct Menu<R, W> {
    input: R,
    output: W,
    repo: SaveRepository,
    cheats: CheatState,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(repo: SaveRepository, input: R, output: W) -> Self {
        Self {
            input,
            output,
            repo,
            cheats: CheatState::Inactive,
        }
    }

    /// Start the session with cheats already unlocked.
    pub fn with_cheats(mut self, state: CheatState) -> Self {
        self.cheats = state;
        self
    }

    /// Main menu loop. Returns when the player quits or input ends.
    pub fn run(&mut self) -> Result<()> {
        let mut code = CheatCode::new();

        loop {
            self.render_main_menu()?;
            let Some(key) = self.read_key()? else {
                return Ok(());
            };

            if !cheats::valid_menu_char(key, self.cheats) {
                writeln!(self.output, "Invalid option, try again.")?;
                continue;
            }

            match key {
                '0' => {
                    writeln!(self.output, "Leaving the game. Farewell!")?;
                    return Ok(());
                }
                '1' => self.new_game()?,
                '2' => self.load_menu()?,
                '3' if self.cheats.is_active() => self.cheat_menu()?,
                other => match code.press(other) {
                    CodeEntry::Pending => {}
                    CodeEntry::Activated => {
                        self.cheats = CheatState::Active;
                        writeln!(self.output, "{}CHEATS ACTIVATED!{}", YELLOW, RESET)?;
                    }
                    CodeEntry::Rejected => {
                        writeln!(self.output, "{}Wrong code. Try again.{}", RED, RESET)?;
                    }
                    CodeEntry::EmptySubmit => {
                        writeln!(self.output, "Nothing to submit.")?;
                    }
                },
            }
        }
    }

    fn render_main_menu(&mut self) -> Result<()> {
        writeln!(self.output, "{}*************************************", BLUE)?;
        writeln!(self.output, "*            MAIN  MENU             *")?;
        writeln!(self.output, "*                                   *")?;
        writeln!(self.output, "*  1. New game                      *")?;
        writeln!(self.output, "*  2. Load save                     *")?;
        if self.cheats.is_active() {
            writeln!(self.output, "*  3. Cheats                        *")?;
        }
        writeln!(self.output, "*  0. Quit                          *")?;
        writeln!(self.output, "*************************************{}", RESET)?;
        let range = if self.cheats.is_active() {
            "1 - 2 - 3 - 0"
        } else {
            "1 - 2 - 0"
        };
        write!(self.output, "Choose an option [{}]: ", range)?;
        self.output.flush()?;
        Ok(())
    }

    fn new_game(&mut self) -> Result<()> {
        write!(self.output, "Name your hero: ")?;
        self.output.flush()?;
        let Some(name) = self.read_line()? else {
            return Ok(());
        };
        let name = name.trim();
        if name.is_empty() {
            writeln!(self.output, "A hero needs a name.")?;
            return Ok(());
        }

        let hero = Hero::new(name);
        match self.repo.upsert(&hero.to_record())? {
            Upsert::Created(index) => {
                writeln!(
                    self.output,
                    "{}New save created for '{}' in slot {}.{}",
                    GREEN, hero.name, index, RESET
                )?;
            }
            Upsert::Updated(index) => {
                writeln!(
                    self.output,
                    "{}Save updated for '{}' in slot {}.{}",
                    GREEN, hero.name, index, RESET
                )?;
            }
        }
        writeln!(self.output, "{}", hero.stat_card())?;
        Ok(())
    }

    /// Render the save list, corrupt slots included, without aborting.
    fn render_summaries(&mut self) -> Result<usize> {
        let total = self.repo.count();
        writeln!(self.output, "There are {} saves available:", total)?;
        if total == 0 {
            writeln!(self.output, "No saves found.")?;
            return Ok(0);
        }

        let summaries: Vec<_> = self.repo.summaries().collect();
        for summary in summaries {
            match summary.entry {
                SlotEntry::Valid(loaded) => self.render_slot_line(summary.index, &loaded)?,
                SlotEntry::Corrupt(error) => {
                    writeln!(
                        self.output,
                        "{}Slot {}: unreadable ({}){}",
                        RED, summary.index, error, RESET
                    )?;
                }
            }
        }
        Ok(total)
    }

    fn render_slot_line(&mut self, index: usize, loaded: &Loaded) -> Result<()> {
        let record = &loaded.record;
        let when = DateTime::from_timestamp(record.saved_at, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| format!("@{}", record.saved_at));
        writeln!(
            self.output,
            "{}Save{} {}: {} | {} | {} HP | {} coins | {} items | {} quests",
            BLUE,
            RESET,
            index,
            record.name,
            when,
            record.health,
            record.coins,
            record.items,
            record.quests_completed
        )?;
        if let Migration::Failed(reason) = &loaded.migration {
            writeln!(
                self.output,
                "{}  warning: save is stuck in the old format ({}){}",
                YELLOW, reason, RESET
            )?;
        }
        Ok(())
    }

    fn load_menu(&mut self) -> Result<()> {
        if self.render_summaries()? == 0 {
            return Ok(());
        }
        let Some(index) = self.pick_slot()? else {
            writeln!(self.output, "Back to the main menu...")?;
            return Ok(());
        };
        self.manage_slot(index)
    }

    /// Ask for a slot number in range, `b` to go back.
    fn pick_slot(&mut self) -> Result<Option<usize>> {
        loop {
            let total = self.repo.count();
            write!(
                self.output,
                "\nSelect a save [1 - {}] (or 'b' to go back): ",
                total
            )?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            let line = line.trim();
            if line.contains('b') {
                return Ok(None);
            }
            if !DIGITS_RE.is_match(line) {
                writeln!(self.output, "Digits between 1 and {} only.", total)?;
                continue;
            }
            match line.parse::<usize>() {
                Ok(choice) if (1..=total).contains(&choice) => return Ok(Some(choice)),
                _ => writeln!(self.output, "Out of range! Pick 1 to {}.", total)?,
            }
        }
    }

    fn manage_slot(&mut self, index: usize) -> Result<()> {
        writeln!(self.output, "Options for save {}:", index)?;
        writeln!(self.output, "1. Load save")?;
        writeln!(self.output, "2. Delete save")?;
        writeln!(self.output, "3. Back to the main menu")?;

        loop {
            write!(self.output, "Choose an option [1-3]: ")?;
            self.output.flush()?;
            let Some(key) = self.read_key()? else {
                return Ok(());
            };

            match key {
                '1' => {
                    match self.repo.read(index) {
                        Ok(loaded) => {
                            let hero = Hero::from_record(&loaded.record);
                            writeln!(self.output, "{}Save loaded!{}", GREEN, RESET)?;
                            if let Migration::Failed(reason) = &loaded.migration {
                                writeln!(
                                    self.output,
                                    "{}  warning: could not upgrade the file ({}){}",
                                    YELLOW, reason, RESET
                                )?;
                            }
                            writeln!(self.output, "{}", hero.stat_card())?;
                        }
                        Err(error) => {
                            writeln!(self.output, "{}Load failed: {}{}", RED, error, RESET)?;
                        }
                    }
                    return Ok(());
                }
                '2' => {
                    match self.repo.delete(index) {
                        Ok(()) => writeln!(self.output, "{}Save deleted.{}", GREEN, RESET)?,
                        Err(error) => {
                            writeln!(self.output, "{}Delete failed: {}{}", RED, error, RESET)?
                        }
                    }
                    return Ok(());
                }
                '3' => {
                    writeln!(self.output, "Cancelled.")?;
                    return Ok(());
                }
                _ => writeln!(self.output, "Invalid option, try again.")?,
            }
        }
    }

    /// Cheat menu: tweak a saved hero's health or coins by a delta.
    fn cheat_menu(&mut self) -> Result<()> {
        writeln!(self.output, "Welcome to the CHEAT menu!")?;
        if self.render_summaries()? == 0 {
            return Ok(());
        }
        let Some(index) = self.pick_slot()? else {
            writeln!(self.output, "Back to the main menu...")?;
            return Ok(());
        };

        let loaded = match self.repo.read(index) {
            Ok(loaded) => loaded,
            Err(error) => {
                writeln!(self.output, "{}Load failed: {}{}", RED, error, RESET)?;
                return Ok(());
            }
        };
        let mut hero = Hero::from_record(&loaded.record);

        writeln!(self.output, "What do you want to change in save {}?", index)?;
        writeln!(self.output, "1. Health")?;
        writeln!(self.output, "2. Coins")?;
        writeln!(self.output, "3. Cancel")?;

        let field = loop {
            write!(self.output, "Choose an option [1-3]: ")?;
            self.output.flush()?;
            let Some(key) = self.read_key()? else {
                return Ok(());
            };
            match key {
                '1' | '2' => break key,
                '3' => {
                    writeln!(self.output, "Cancelled.")?;
                    return Ok(());
                }
                _ => writeln!(self.output, "Invalid option, try again.")?,
            }
        };

        let Some(delta) = self.read_delta()? else {
            return Ok(());
        };
        match field {
            '1' => hero.adjust_health(delta),
            _ => hero.adjust_coins(delta),
        }

        self.repo.upsert(&hero.to_record())?;
        writeln!(self.output, "{}Change saved!{}", GREEN, RESET)?;
        writeln!(self.output, "{}", hero.stat_card())?;
        Ok(())
    }

    fn read_delta(&mut self) -> Result<Option<i32>> {
        loop {
            write!(
                self.output,
                "By how much? (negative numbers decrease): "
            )?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            let line = line.trim();
            if DELTA_RE.is_match(line) {
                if let Ok(delta) = line.parse::<i32>() {
                    return Ok(Some(delta));
                }
            }
            writeln!(self.output, "Whole numbers only.")?;
        }
    }

    /// Read one line; `None` means end of input.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    /// Read one line and keep only its first character.
    fn read_key(&mut self) -> Result<Option<char>> {
        loop {
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match line.chars().next() {
                Some(c) => return Ok(Some(c)),
                None => writeln!(self.output, "Invalid option, try again.")?,
            }
        }
    }
}
