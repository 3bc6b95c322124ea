//! Terminal prompting for the interactive pipeline choice.

use std::io::{self, BufRead, IsTerminal, Write};

use crate::error::{KickoffError, Result};
use crate::output::{accent, emphasis, muted};
use crate::pipelines::Picker;

/// Numbered-list picker on stderr/stdin.
pub struct TerminalPicker;

impl TerminalPicker {
    pub fn is_interactive() -> bool {
        io::stdin().is_terminal() && io::stderr().is_terminal()
    }
}

impl Picker for TerminalPicker {
    fn pick(&self, message: &str, options: &[String], default: Option<&str>) -> Result<String> {
        if !Self::is_interactive() {
            return Err(KickoffError::NotInteractive);
        }
        if options.is_empty() {
            return Err(KickoffError::Config("There are no pipelines to choose from".into()));
        }

        let mut stderr = io::stderr();
        for (index, option) in options.iter().enumerate() {
            if Some(option.as_str()) == default {
                writeln!(stderr, "  {:>3}) {} {}", index + 1, accent(option), muted("(default)"))?;
            } else {
                writeln!(stderr, "  {:>3}) {option}", index + 1)?;
            }
        }

        let stdin = io::stdin();
        loop {
            write!(stderr, "{}", emphasis(message))?;
            stderr.flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                return Err(KickoffError::NotInteractive);
            }

            match resolve_answer(line.trim(), options, default) {
                Some(choice) => return Ok(choice),
                None => writeln!(stderr, "Please enter a number between 1 and {}", options.len())?,
            }
        }
    }
}

/// Maps a typed answer to an option: empty picks the default, otherwise a
/// 1-based index or an exact name.
fn resolve_answer(answer: &str, options: &[String], default: Option<&str>) -> Option<String> {
    if answer.is_empty() {
        return default.map(ToString::to_string);
    }
    if let Ok(index) = answer.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| options.get(i))
            .cloned();
    }
    options.iter().find(|o| o.as_str() == answer).cloned()
}
