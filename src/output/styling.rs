use std::fmt::Display;

use console::{style, Style, StyledObject};

fn paint(text: impl Display, with: Style) -> StyledObject<String> {
    with.apply_to(text.to_string())
}

/// Banner text.
pub fn heading(text: impl Display) -> StyledObject<String> {
    paint(text, Style::new().magenta().bold())
}

/// A phase that is still waiting on the server.
pub fn pending(text: impl Display) -> StyledObject<String> {
    paint(text, Style::new().yellow().bright())
}

pub fn success(text: impl Display) -> StyledObject<String> {
    paint(text, Style::new().green().bright())
}

pub fn failure(text: impl Display) -> StyledObject<String> {
    paint(text, Style::new().red().bright())
}

/// Job names and URLs.
pub fn accent(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).cyan()
}

pub fn muted(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).dim()
}

pub fn emphasis(text: impl Display) -> StyledObject<String> {
    style(text.to_string()).bright()
}
