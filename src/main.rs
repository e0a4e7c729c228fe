use anyhow::Result;
use bondgraph::db::{migrate, Db};
use bondgraph::http::HttpServer;
use bondgraph::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger from environment variable or default to info level
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    // Parse command-line arguments
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("verify");

    match command {
        "serve" => {
            run_http_server().await?;
        }
        "verify" | _ => {
            // Default: verify database schema
            run_schema_verification().await?;
        }
    }

    Ok(())
}

/// Run the graph HTTP server
async fn run_http_server() -> Result<()> {
    let config = Config::load()?;

    let db = Db::new(config.db_path());
    db.with_connection(|conn| migrate::run_migrations(conn))
        .await?;

    log::info!("Database initialized at {}", config.db_path().display());

    let server = HttpServer::new(db, config);
    server.run().await?;

    Ok(())
}

/// Verify the database schema and print a summary
async fn run_schema_verification() -> Result<()> {
    let config = Config::load()?;

    let db = Db::new(config.db_path());
    db.with_connection(|conn| migrate::run_migrations(conn))
        .await?;

    let (tables, people_count, bonds_count) = db
        .with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )?;
            let tables = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;

            let people_count: i64 = conn.query_row("SELECT COUNT(*) FROM people", [], |r| r.get(0))?;
            let bonds_count: i64 = conn.query_row("SELECT COUNT(*) FROM bonds", [], |r| r.get(0))?;

            Ok((tables, people_count, bonds_count))
        })
        .await?;

    println!("Database: {}", config.db_path().display());
    println!("Tables: {}", tables.join(", "));
    println!("People: {}", people_count);
    println!("Bonds: {}", bonds_count);
    println!("\nSchema OK. Run `bondgraph serve` to start the HTTP server.");

    Ok(())
}
