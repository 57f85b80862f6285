//! Scripted demo session: seed people and clubs, watch live queries react
//! to mutations, flip reactive parameters, toggle a membership.
//!
//! Run with `RUST_LOG=info` to see the live updates.

use std::sync::Arc;
use std::time::Duration;

use live_query::notifier::EventNotifier;
use live_query_demo::store::{Database, SortOrder};
use live_query_demo::views::{ClubsView, PeopleView};

/// Give spawned refreshes a moment to land.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let notifier = Arc::new(EventNotifier::new());
    let db = Database::open_in_memory(Arc::clone(&notifier))?;

    let people = PeopleView::new(Arc::clone(&db));
    let _unwatch = people.people().watch(|data| match (&data.results, &data.error) {
        (Some(rows), _) => log::info!("people: {} row(s)", rows.len()),
        (None, Some(err)) => log::warn!("people query failed: {err}"),
        _ => {}
    });

    log::info!("seeding people");
    for _ in 0..3 {
        let p = people.add_person()?;
        log::info!("added {} (age {})", p.name, p.age);
    }
    settle().await;

    let clubs = ClubsView::new(Arc::clone(&db));
    let club = clubs.add_club()?;
    log::info!("added club {}", club.name);
    settle().await;

    // Open the first person and toggle their membership in the new club.
    if let Some(rows) = people.rows() {
        if let Some(id) = rows.first().and_then(|row| row["id"].as_str()) {
            let detail = people.open_person(id);
            settle().await;
            let joined = detail.toggle_membership(&club.id)?;
            settle().await;
            log::info!(
                "membership toggled: joined={joined}, is_member={}",
                detail.is_member(&club.id)
            );
        }
    }

    // Reactive parameters: flip the sort order, then search.
    people.set_order(SortOrder::Desc);
    settle().await;
    if let Some(first) = people.rows().and_then(|rows| rows.first().cloned()) {
        log::info!("first person descending: {}", first["name"]);
    }

    people.set_search("a");
    settle().await;
    log::info!(
        "search \"a\": {} row(s)",
        people.rows().map_or(0, |rows| rows.len())
    );
    people.set_search("");
    settle().await;

    people.change_first()?;
    settle().await;

    people.clear()?;
    clubs.clear_clubs()?;
    settle().await;
    log::info!(
        "cleared: {} person row(s), {} club row(s)",
        people.rows().map_or(0, |rows| rows.len()),
        clubs.rows().map_or(0, |rows| rows.len())
    );

    Ok(())
}
