use anyhow::Result;
use bondgraph::db::{migrate, Db};
use bondgraph::graph::{derive_implicit_links, network_stats};
use bondgraph::store::{list_bonds, list_people};
use bondgraph::Config;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load()?;
    let db = Db::new(config.db_path());
    db.with_connection(|conn| migrate::run_migrations(conn))
        .await?;

    let people = list_people(&db).await?;
    let bonds = list_bonds(&db).await?;
    let stats = network_stats(&people, &bonds);

    println!("\n=== Bondgraph Network Statistics ===\n");
    println!("{:-<50}", "");
    println!("{:<30} {:>18}", "People", stats.total_people);
    println!("{:<30} {:>18}", "Explicit bonds", stats.total_bonds);
    println!("{:<30} {:>18.1}", "Avg connections", stats.avg_connections);
    println!("{:-<50}", "");

    if let Some(top) = &stats.most_connected {
        println!(
            "Most connected: {} ({} connections)",
            top.name, top.connections
        );
    } else {
        println!("Most connected: none (no bonds yet)");
    }

    if !stats.type_breakdown.is_empty() {
        println!("\nBond types:");
        let mut breakdown: Vec<_> = stats.type_breakdown.iter().collect();
        breakdown.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (bond_type, count) in breakdown {
            let percentage = (*count as f64 / stats.total_bonds as f64) * 100.0;
            println!("  {:<20} {:>5} ({:>3.0}%)", bond_type, count, percentage);
        }
    }

    // Derived view: how much of the drawn graph is implicit.
    let links = derive_implicit_links(&people, &bonds);
    let second = links.iter().filter(|l| l.category == 2).count();
    let third = links.iter().filter(|l| l.category == 3).count();
    println!("\nDerived links: {} second degree, {} third degree", second, third);
    println!("Total drawn links: {}", links.len());
    println!();

    Ok(())
}
