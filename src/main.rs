use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;

use tasksync::config::Config;
use tasksync::network::StaticNetworkMonitor;
use tasksync::remote::HttpRemoteService;
use tasksync::storage::LocalStorage;
use tasksync::sync::{SyncService, SyncStatus};
use tasksync::{logger, utils};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    logger::init(&config.logging)?;

    let storage = LocalStorage::open(&config.database_url()?).await?;
    let remote = HttpRemoteService::new(&config.server.base_url, config.api_token().as_deref())?;
    // Reachability is assumed here; a failing pass reports itself.
    let network = StaticNetworkMonitor::new(true);

    let service = SyncService::new(
        Arc::new(Mutex::new(storage)),
        Arc::new(remote),
        Arc::new(network),
    );

    println!("🔄 Syncing with {}...", config.server.base_url);
    match service.sync_with_remote().await {
        SyncStatus::Success { stats } => {
            println!(
                "✅ Done: {} uploaded, {} downloaded, {} deleted, {} conflicts, {} failed",
                stats.uploaded, stats.downloaded, stats.deleted, stats.conflicts, stats.failed
            );
        }
        SyncStatus::NoConnectivity => println!("📡 Offline, nothing synced"),
        SyncStatus::InProgress => println!("⏳ A sync is already running"),
        SyncStatus::Error { message } => {
            eprintln!("❌ Sync failed: {message}");
            std::process::exit(1);
        }
    }

    let todos = service.get_all_todos().await?;
    println!("\n{} todos:", todos.len());
    for todo in todos {
        let mark = if todo.is_completed { "x" } else { " " };
        let due = todo
            .due_date
            .map(|d| format!(" (due {})", utils::time::format_millis(d)))
            .unwrap_or_default();
        println!("[{mark}] {:?} {}{due}", todo.priority, todo.title);
    }

    Ok(())
}
