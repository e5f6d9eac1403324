//! Terminal output for the markdown produced by `roster_core::display`
//!
//! Headings and outcome notices get a fixed color so they stand out in a
//! scrolling terminal; everything else goes through termimad's inline
//! renderer. With color disabled the markdown is printed as-is.

use anyhow::Result;
use termimad::{crossterm::style::Color, MadSkin};

/// How a single output line is drawn.
#[derive(Debug, PartialEq, Eq)]
enum LineStyle {
    Heading,
    Success,
    Failure,
    Inline,
}

fn classify(line: &str) -> LineStyle {
    if line.starts_with('#') {
        LineStyle::Heading
    } else if line.starts_with("Success:") {
        LineStyle::Success
    } else if line.starts_with("Error:") {
        LineStyle::Failure
    } else {
        LineStyle::Inline
    }
}

/// Prints markdown either through termimad or as plain text.
pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(Color::Blue);
        skin.bold.set_fg(Color::Yellow);
        skin.italic.set_fg(Color::DarkGrey);
        skin.inline_code.set_bg(Color::AnsiValue(238));

        Self { rich_enabled, skin }
    }

    pub fn render(&self, markdown: &str) -> Result<()> {
        if !self.rich_enabled {
            print!("{markdown}");
            if !markdown.ends_with('\n') {
                println!();
            }
            return Ok(());
        }

        for line in markdown.lines() {
            match classify(line) {
                // termimad would swallow the hashes; keep them visible
                LineStyle::Heading => println!("\x1b[34m{line}\x1b[0m"),
                LineStyle::Success => println!("\x1b[32m{line}\x1b[0m"),
                LineStyle::Failure => println!("\x1b[31m{line}\x1b[0m"),
                LineStyle::Inline => {
                    self.skin.print_inline(line);
                    println!();
                }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_renderer() {
        let renderer = TerminalRenderer::new(false);
        assert!(!renderer.rich_enabled);
        renderer.render("# Slots\n\nNo slots found.\n").unwrap();
    }

    #[test]
    fn test_default_is_rich() {
        assert!(TerminalRenderer::default().rich_enabled);
    }

    #[test]
    fn test_line_classification() {
        assert_eq!(classify("## 2025-01-06 (monday)"), LineStyle::Heading);
        assert_eq!(
            classify("Success: Opened 2 slot(s)"),
            LineStyle::Success
        );
        assert_eq!(
            classify("Error: [SLOT_NOT_FOUND] no slot"),
            LineStyle::Failure
        );
        assert_eq!(classify("- **3** monday 09:00-10:00"), LineStyle::Inline);
    }
}
