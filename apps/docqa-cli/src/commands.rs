use std::path::PathBuf;

use docqa_core::types::VlmModel;
use docqa_view::Mode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Health,
    Mode(Mode),
    Model(VlmModel),
    /// Open provenance for the result with this citation number.
    Select(u32),
    /// Show the provenance panel of the current selection again.
    Open,
    /// Follow-up question about the selected result.
    Ask(String),
    /// Attach a file to the next direct question; `None` detaches it.
    Stage(Option<PathBuf>),
    Upload(PathBuf),
    New,
    Download,
    Clear,
    /// Plain input: a search query or a direct question, depending on mode.
    Input(String),
}

fn required<'a>(arg: &'a str, usage: &str) -> Result<&'a str, String> {
    if arg.is_empty() {
        Err(format!("Usage: {usage}"))
    } else {
        Ok(arg)
    }
}

pub fn parse(input: &str) -> Result<Command, String> {
    let input = input.trim();
    if !input.starts_with('/') {
        return Ok(Command::Input(input.to_string()));
    }
    let (name, arg) = input.split_once(char::is_whitespace).unwrap_or((input, ""));
    let arg = arg.trim();
    match name {
        "/help" | "/h" => Ok(Command::Help),
        "/quit" | "/q" | "/exit" => Ok(Command::Quit),
        "/health" => Ok(Command::Health),
        "/mode" | "/m" => required(arg, "/mode <search|qa>")?.parse().map(Command::Mode),
        "/model" => required(arg, "/model <gpt-4o|qwen-vl|intern-vl>")?.parse().map(Command::Model),
        "/select" | "/s" => required(arg, "/select <citation>")?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse()
            .map(Command::Select)
            .map_err(|_| format!("'{arg}' is not a citation number")),
        "/open" | "/o" => Ok(Command::Open),
        "/ask" | "/a" => Ok(Command::Ask(arg.to_string())),
        "/stage" => Ok(Command::Stage((!arg.is_empty()).then(|| PathBuf::from(arg)))),
        "/upload" | "/u" => required(arg, "/upload <path>").map(|p| Command::Upload(PathBuf::from(p))),
        "/new" | "/n" => Ok(Command::New),
        "/download" | "/d" => Ok(Command::Download),
        "/clear" => Ok(Command::Clear),
        other => Err(format!("Unknown command: {other} (try /help)")),
    }
}
