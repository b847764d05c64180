use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use rpg_table::JsonFileStore;
use rpg_table::state::{load_roster, load_tracker};

pub fn run(state: &Path, room: &str) -> Result<(), String> {
    let store = JsonFileStore::open(state).map_err(|e| e.to_string())?;
    let roster = load_roster(&store, room).map_err(|e| e.to_string())?;
    let tracker = load_tracker(&store, room).map_err(|e| e.to_string())?;

    if roster.is_empty() {
        println!("  No characters in {room}.");
    } else {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Name", "Race", "Class", "Level", "HP", "AC", "XP"]);
        for c in roster.values() {
            table.add_row(vec![
                c.name.clone(),
                c.race.clone(),
                c.class.clone(),
                c.level.to_string(),
                format!("{}/{}", c.current_hp, c.max_hp),
                c.armor_class.to_string(),
                c.xp.to_string(),
            ]);
        }
        println!("{table}");
        println!();
        println!("  {} characters", roster.len());
    }

    println!();
    match tracker.report_order() {
        Some(order) => {
            println!("  Initiative:");
            for (i, entry) in order.iter().enumerate() {
                let marker = if i == 0 { ">" } else { " " };
                let event = tracker
                    .event_text(&entry.name)
                    .map(|t| format!(": {t}"))
                    .unwrap_or_default();
                println!("  {marker} {entry}{event}");
            }
        }
        None => println!("  No combat in progress."),
    }

    Ok(())
}
