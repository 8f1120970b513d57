use std::fmt;
use std::str::FromStr;

/// Top-level screen mode. Each mode keeps its state while the other is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Search,
    DirectQa,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Search => "search",
            Mode::DirectQa => "qa",
        })
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "search" | "s" => Ok(Mode::Search),
            "qa" | "ask" | "direct" => Ok(Mode::DirectQa),
            other => Err(format!("unknown mode '{other}' (expected search or qa)")),
        }
    }
}

/// What the search pane shows, derived from the search controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    NotSearched,
    Searching,
    Results,
    Empty,
    Error,
}
