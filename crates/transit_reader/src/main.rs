use std::path::Path;

use transit_reader::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let now = std::time::Instant::now();
    // Read path to the data directory from command line
    let data_dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data".to_string());

    let tables = ReferenceTables::from_dir(Path::new(&data_dir))?;

    let elapsed = now.elapsed();

    println!(
        "Finished reading reference data in {}.{:03} seconds",
        elapsed.as_secs(),
        elapsed.subsec_millis()
    );
    println!(
        "Today: {} stations, {} connections",
        tables.stations.len(),
        tables.connections.len()
    );
    println!(
        "Future additions: {} stations, {} connections",
        tables.future_stations.len(),
        tables.future_connections.len()
    );
    println!("Transfers: {}", tables.transfers.len());

    let issues = tables.issues();
    if !issues.is_empty() {
        println!("Skipped {} rows:", issues.len());
        for (file, issue) in issues {
            println!("  {}: {}", file, issue);
        }
    }
    Ok(())
}
