use anyhow::Result;
use bondgraph::db::{migrate, Db};
use bondgraph::store::{insert_bond, insert_person, BondInput, PersonInput};
use bondgraph::Config;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "seed")]
#[command(about = "Seed the bondgraph database with sample people and bonds")]
struct Args {
    /// Wipe existing people and bonds before seeding
    #[arg(short, long)]
    reset: bool,
}

fn sample_person(name: &str, vibe: &str) -> PersonInput {
    PersonInput {
        name: name.to_string(),
        vibe: Some(vibe.to_string()),
        img: Some(format!(
            "https://api.dicebear.com/7.x/avataaars/svg?seed={}",
            name
        )),
        ..Default::default()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let args = Args::parse();

    let config = Config::load()?;
    let db = Db::new(config.db_path());
    db.with_connection(|conn| migrate::run_migrations(conn))
        .await?;

    if args.reset {
        log::warn!("Wiping existing people and bonds");
        db.with_connection(|conn| {
            conn.execute("DELETE FROM bonds", [])?;
            conn.execute("DELETE FROM people", [])?;
            Ok(())
        })
        .await?;
    }

    let ayal = insert_person(&db, sample_person("Ayal", "The Architect")).await?;
    let sarah = insert_person(&db, sample_person("Sarah", "Chaos Energy")).await?;
    let mike = insert_person(&db, sample_person("Mike", "Gym Rat")).await?;

    let mut first = BondInput::new(&ayal.id, &sarah.id, "best_friend");
    first.lore = Some("Met in CTIS 101".to_string());
    insert_bond(&db, first).await?;

    let mut second = BondInput::new(&sarah.id, &mike.id, "lover");
    second.lore = Some("It's complicated".to_string());
    insert_bond(&db, second).await?;

    log::info!("Seeded 3 people and 2 bonds");
    println!("Seed complete. Run `bondgraph serve` and fetch /api/graph.");

    Ok(())
}
