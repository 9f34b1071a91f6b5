//! Markdown rendering for the terminal.

use anyhow::Result;
use termimad::{crossterm::style::Color, MadSkin};

/// Prints markdown either styled with termimad or as plain text.
pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(Color::Cyan);
        skin.bold.set_fg(Color::Yellow);
        skin.quote_mark.set_fg(Color::Red);
        skin.inline_code.set_bg(Color::AnsiValue(238));

        Self { rich_enabled, skin }
    }

    pub fn render(&self, markdown: &str) -> Result<()> {
        if !self.rich_enabled {
            print!("{markdown}");
            return Ok(());
        }

        for line in markdown.lines() {
            if line.starts_with('#') {
                // Keep the hashes visible; print_inline would strip them.
                println!("\x1b[36m{line}\x1b[0m");
            } else if let Some(banner) = line.strip_prefix("> ") {
                println!("\x1b[31m{banner}\x1b[0m");
            } else {
                self.skin.print_inline(line);
                println!();
            }
        }
        Ok(())
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}
