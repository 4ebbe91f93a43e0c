//! Cheats - Cheat activation code and menu keystroke validation

/// The secret keystroke sequence that unlocks the cheat menu
pub const CHEAT_SEQUENCE: &str = "wwssadadba";

/// Longest sequence the tracker will buffer before giving up
const MAX_SEQUENCE: usize = 32;

/// Whether cheats are unlocked for this session.
///
/// Threaded explicitly through the menu call chain; there is no
/// process-wide flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheatState {
    #[default]
    Inactive,
    Active,
}

impl CheatState {
    pub fn is_active(&self) -> bool {
        matches!(self, CheatState::Active)
    }
}

/// Outcome of feeding one keystroke to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeEntry {
    /// Still collecting keystrokes
    Pending,
    /// A space submitted the buffer and it matched the sequence
    Activated,
    /// A space submitted a non-matching buffer, or it overflowed
    Rejected,
    /// A space arrived with nothing buffered
    EmptySubmit,
}

/// Accumulates cheat-code keystrokes typed at the main menu.
///
/// Letters pile up in a buffer; a space submits it. A match activates
/// cheats, anything else resets the buffer.
#[derive(Debug, Default)]
pub struct CheatCode {
    buffer: String,
}

impl CheatCode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one keystroke.
    pub fn press(&mut self, c: char) -> CodeEntry {
        if c == ' ' {
            if self.buffer.is_empty() {
                return CodeEntry::EmptySubmit;
            }
            let matched = self.buffer == CHEAT_SEQUENCE;
            self.buffer.clear();
            return if matched {
                CodeEntry::Activated
            } else {
                CodeEntry::Rejected
            };
        }

        if self.buffer.len() >= MAX_SEQUENCE {
            self.buffer.clear();
            return CodeEntry::Rejected;
        }
        self.buffer.push(c);
        CodeEntry::Pending
    }
}

/// Whether `c` appears in the cheat sequence at all.
pub fn is_cheat_char(c: char) -> bool {
    CHEAT_SEQUENCE.contains(c)
}

/// Whether `c` is a legal main-menu keystroke under the given state.
///
/// With cheats inactive the menu accepts its two options, quit, the
/// space submitter, and any cheat-sequence letter; once active, the
/// cheat option replaces the code entry keys.
pub fn valid_menu_char(c: char, state: CheatState) -> bool {
    if state.is_active() {
        matches!(c, '1' | '2' | '3' | '0')
    } else {
        matches!(c, '1' | '2' | '0' | ' ') || is_cheat_char(c)
    }
}
