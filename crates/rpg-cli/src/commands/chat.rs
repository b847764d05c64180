use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;

use rpg_table::{
    ChatMessage, Dispatcher, JsonFileStore, RetryingStore, Table, TableConfig, YamlTemplates,
};

pub fn run(
    config: &Path,
    state: &Path,
    room: &str,
    user: &str,
    seed: Option<u64>,
) -> Result<(), String> {
    let mut config = TableConfig::load(config).map_err(|e| e.to_string())?;
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    let store = JsonFileStore::open(state).map_err(|e| e.to_string())?;
    let store = RetryingStore::new(store, config.store_attempts);
    let templates = YamlTemplates::new(config.template_dir.clone());
    let roller = super::rng(config.seed);
    tracing::debug!(
        state = %state.display(),
        templates = %templates.base().display(),
        "serving table"
    );
    let mut dispatcher = Dispatcher::new(Table::new(store, templates, config, roller));

    let mut room = room.to_string();
    println!("  {} as {user} in {room}", "Chatting".bold());
    println!("  '@name text' speaks as name, '/room name' moves, '/quit' leaves.\n");

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    loop {
        print!("{room}> ");
        io::stdout().flush().map_err(|e| e.to_string())?;

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Err(e) => return Err(e.to_string()),
            _ => {}
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "/quit" {
            break;
        }
        if let Some(rest) = input.strip_prefix("/room") {
            match rest.trim() {
                "" => println!("{}\n", "usage: /room <name>".yellow()),
                next => room = next.to_string(),
            }
            continue;
        }

        let (speaker, text) = match input.strip_prefix('@').and_then(|s| s.split_once(' ')) {
            Some((speaker, text)) => (speaker, text),
            None => (user, input),
        };

        let responses = dispatcher.handle(&ChatMessage::new(speaker, room.as_str(), text));
        for response in &responses {
            if response.room == room {
                println!("{}", response.text);
            } else {
                println!("{} {}", format!("[{}]", response.room).dimmed(), response.text);
            }
        }
        if !responses.is_empty() {
            println!();
        }
    }

    Ok(())
}
