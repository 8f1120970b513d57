use std::io::{self, Write};

use indicatif::{ProgressBar, ProgressStyle};

use docqa_cli::{display, init_tracing, parse, Command};
use docqa_client::backend_from_settings;
use docqa_controllers::{Interaction, Phase};
use docqa_core::config::{expand_path, Config};
use docqa_core::types::UploadFile;
use docqa_view::{Mode, Orchestrator, SearchStatus};

fn upload_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_message("uploading (estimated)");
    pb
}

fn show_help() {
    println!("🎯 Commands:");
    println!("  <text>              - Search (search mode) or ask a question (qa mode)");
    println!("  /mode <search|qa>   - Switch mode; each mode keeps its own state");
    println!("  /model <name>       - gpt-4o, qwen-vl or intern-vl");
    println!("  /select <n>         - Open provenance for result [n]");
    println!("  /open               - Show the selected result again");
    println!("  /ask <question>     - Follow-up question about the selected result");
    println!("  /download           - Save the selected result's file");
    println!("  /upload <path>      - Upload a document");
    println!("  /stage [path]       - Attach a file to the next question (no path detaches)");
    println!("  /new                - Start a new question");
    println!("  /clear              - Clear search results");
    println!("  /health             - Check the backend");
    println!("  /quit               - Exit");
}

fn show_search(view: &Orchestrator) {
    match view.search_status() {
        SearchStatus::NotSearched => println!("Enter a query to search."),
        SearchStatus::Searching => println!("⏳ Searching..."),
        SearchStatus::Empty => match view.search().last_query() {
            Some(query) => println!("🔍 No results for '{query}'. Try different wording."),
            None => println!("🔍 No results. Try different wording."),
        },
        SearchStatus::Error => {
            if let Some(err) = view.search().error() {
                println!("❌ {err}");
            }
        }
        SearchStatus::Results => {
            if let Some(query) = view.search().last_query() {
                println!("🔍 Query: {query}");
            }
            if let Some(response) = view.search().response() {
                let selected = view.selected().map(|r| r.id.as_str());
                print!("{}", display::results(view.renderer(), response, selected));
            }
            show_provenance(view);
        }
    }
}

fn show_provenance(view: &Orchestrator) {
    match view.provenance() {
        Some(panel) => print!("{}", display::provenance(view.renderer(), &panel)),
        None => println!("No result selected."),
    }
}

fn show_answer(view: &Orchestrator) {
    if let Some(err) = view.upload_state().error() {
        println!("❌ Upload: {err}");
    }
    if let Some(err) = view.answer().error() {
        println!("❌ {err}");
    }
    if let Some(panel) = view.answer_panel() {
        print!("{}", display::answer(view.renderer(), &panel));
    }
    if let Some(panel) = view.source_panel() {
        print!("{}", display::sources(view.renderer(), &panel));
    }
}

fn stat(path: &str) -> Option<UploadFile> {
    let path = expand_path(path);
    match UploadFile::from_path(&path) {
        Ok(file) => Some(file),
        Err(e) => {
            println!("❌ Cannot read {}: {e}", path.display());
            None
        }
    }
}

/// Run one command. Returns `false` when the session should end.
async fn handle(view: &mut Orchestrator, command: Command) -> bool {
    match command {
        Command::Help => show_help(),
        Command::Quit => {
            println!("👋 Goodbye!");
            return false;
        }
        Command::Health => match view.health().await {
            Ok(status) => println!("✅ {} ({})", status.status, status.timestamp),
            Err(e) => println!("❌ {e}"),
        },
        Command::Mode(mode) => {
            view.set_mode(mode);
            println!("Mode: {mode}");
            match mode {
                Mode::Search => show_search(view),
                Mode::DirectQa => show_answer(view),
            }
        }
        Command::Model(model) => {
            view.set_model(model);
            println!("Model: {model}");
        }
        Command::Select(citation) => match view.select_citation(citation) {
            Ok(()) => show_provenance(view),
            Err(e) => println!("❌ {e}"),
        },
        Command::Open => show_provenance(view),
        Command::Ask(question) => match view.ask_follow_up(&question).await {
            Ok(_) => {
                if let Some(err) = view.follow_up().error() {
                    println!("❌ {err}");
                }
                show_provenance(view);
            }
            Err(e) => println!("❌ {e}"),
        },
        Command::Stage(None) => {
            view.unstage();
            println!("No file attached.");
        }
        Command::Stage(Some(path)) => {
            if let Some(file) = stat(&path.to_string_lossy()) {
                println!("📎 {} ({} bytes) will be uploaded with the next question", file.file_name, file.size);
                view.stage(file);
            }
        }
        Command::Upload(path) => {
            let Some(file) = stat(&path.to_string_lossy()) else {
                return true;
            };
            let pb = upload_bar();
            let outcome = view.upload(Some(&file), |p| pb.set_position(u64::from(p))).await;
            pb.finish_and_clear();
            let phase = match outcome {
                Ok(phase) => phase,
                Err(e) => {
                    println!("❌ {e}");
                    return true;
                }
            };
            match (phase, view.upload_state().response(), view.upload_state().error()) {
                (Phase::Succeeded, Some(resp), _) => println!(
                    "✅ Uploaded {} as {}{}",
                    resp.file_name,
                    resp.file_id,
                    resp.message.as_deref().map(|m| format!(" ({m})")).unwrap_or_default()
                ),
                (_, _, Some(err)) => println!("❌ {err}"),
                _ => {}
            }
        }
        Command::New => {
            view.new_question();
            println!("Ready for a new question.");
        }
        Command::Download => match view.download_selected().await {
            Ok(path) => println!("💾 Saved to {}", path.display()),
            Err(e) => println!("❌ {e}"),
        },
        Command::Clear => {
            view.clear_search();
            println!("Search cleared.");
        }
        Command::Input(text) => match view.mode() {
            Mode::Search => match view.submit_search(&text).await {
                Ok(_) => show_search(view),
                Err(e) => println!("❌ {e}"),
            },
            Mode::DirectQa => {
                let pb = view.staged().map(|_| upload_bar());
                let outcome = view
                    .submit_question(&text, |p| {
                        if let Some(pb) = &pb {
                            pb.set_position(u64::from(p));
                        }
                    })
                    .await;
                if let Some(pb) = pb {
                    pb.finish_and_clear();
                }
                match outcome {
                    Ok(_) => show_answer(view),
                    Err(e) => println!("❌ {e}"),
                }
            }
        },
    }
    true
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;
    let settings = config.settings()?;
    tracing::debug!(base_url = %settings.api.base_url, mock = settings.backend.mock, "settings loaded");
    let backend = backend_from_settings(&settings)?;
    let mut view = Orchestrator::new(backend, &settings);

    println!("🔍 Document Q&A");
    println!("===============");
    println!("Model: {} · downloads go to {}", view.model(), view.download_dir().display());
    if !view.renderer().keywords().is_empty() {
        println!("Highlighting: {}", view.renderer().keywords().join("、"));
    }
    println!("Type /help for commands.");
    println!();

    loop {
        print!("{}> ", view.mode());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        if input.trim().is_empty() {
            continue;
        }

        let keep_going = match parse(&input) {
            Ok(command) => handle(&mut view, command).await,
            Err(e) => {
                println!("❌ {e}");
                true
            }
        };
        if !keep_going {
            break;
        }
        println!();
    }

    Ok(())
}
