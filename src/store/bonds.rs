use super::{Bond, EndpointRef};
use crate::db::Db;
use crate::error::{BondgraphError, Result};
use chrono::Utc;
use rusqlite::{params, Row};
use serde::Deserialize;
use serde_json::Map;
use std::collections::HashSet;
use uuid::Uuid;

/// Incoming bond payload (id and created_at are assigned on insert).
#[derive(Debug, Clone, Deserialize)]
pub struct BondInput {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub bond_type: String,
    #[serde(default)]
    pub lore: Option<String>,
}

impl BondInput {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        bond_type: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            bond_type: bond_type.into(),
            lore: None,
        }
    }
}

fn row_to_bond(row: &Row<'_>) -> rusqlite::Result<Bond> {
    Ok(Bond {
        id: row.get(0)?,
        source: EndpointRef::Id(row.get(1)?),
        target: EndpointRef::Id(row.get(2)?),
        bond_type: row.get(3)?,
        lore: row.get(4)?,
        created_at: row.get(5)?,
        extra: Map::new(),
    })
}

/// List all bonds in insertion order.
pub async fn list_bonds(db: &Db) -> Result<Vec<Bond>> {
    db.with_connection(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id, source, target, type, lore, created_at FROM bonds ORDER BY created_at, id",
        )?;
        let bonds = stmt
            .query_map([], row_to_bond)?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(bonds)
    })
    .await
}

/// Insert a new bond. Rejects self-bonds and duplicate unordered pairs;
/// endpoints are not required to reference known people (a dangling bond is
/// preserved and simply never contributes adjacency).
pub async fn insert_bond(db: &Db, input: BondInput) -> Result<Bond> {
    if input.source.is_empty() || input.target.is_empty() {
        return Err(BondgraphError::InvalidInput(
            "bond endpoints must not be empty".to_string(),
        ));
    }
    if input.source == input.target {
        return Err(BondgraphError::InvalidInput(
            "cannot bond a person to themselves".to_string(),
        ));
    }
    if input.bond_type.trim().is_empty() {
        return Err(BondgraphError::InvalidInput(
            "bond type must not be empty".to_string(),
        ));
    }

    let bond = Bond {
        id: Some(Uuid::new_v4().to_string()),
        source: EndpointRef::Id(input.source.clone()),
        target: EndpointRef::Id(input.target.clone()),
        bond_type: input.bond_type,
        lore: Some(input.lore.unwrap_or_else(|| "No lore yet.".to_string())),
        created_at: Some(Utc::now().to_rfc3339()),
        extra: Map::new(),
    };

    let row = bond.clone();
    db.with_connection(move |conn| {
        let existing: i64 = conn.query_row(
            "SELECT COUNT(*) FROM bonds \
             WHERE (source = ?1 AND target = ?2) OR (source = ?2 AND target = ?1)",
            params![row.source_id(), row.target_id()],
            |r| r.get(0),
        )?;
        if existing > 0 {
            return Err(BondgraphError::InvalidInput(
                "bond between this pair already exists".to_string(),
            ));
        }

        conn.execute(
            "INSERT INTO bonds (id, source, target, type, lore, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                row.id,
                row.source_id(),
                row.target_id(),
                row.bond_type,
                row.lore,
                row.created_at,
            ],
        )?;
        Ok(())
    })
    .await?;

    log::info!(
        "Forged bond {} -> {} ({})",
        bond.source_id(),
        bond.target_id(),
        bond.bond_type
    );
    Ok(bond)
}

/// Delete a bond by id.
pub async fn delete_bond(db: &Db, id: &str) -> Result<()> {
    let id_owned = id.to_string();
    let deleted = db
        .with_connection(move |conn| {
            let deleted = conn.execute("DELETE FROM bonds WHERE id = ?1", params![id_owned])?;
            Ok(deleted)
        })
        .await?;

    if deleted == 0 {
        return Err(BondgraphError::BondNotFound(id.to_string()));
    }
    log::info!("Dissolved bond {}", id);
    Ok(())
}

/// Rewrite legacy `best_friend` bonds to `friend`. Returns the number of
/// bonds updated.
pub async fn normalize_legacy_types(db: &Db) -> Result<usize> {
    let changed = db
        .with_connection(|conn| {
            let changed = conn.execute(
                "UPDATE bonds SET type = 'friend' WHERE type = 'best_friend'",
                [],
            )?;
            Ok(changed)
        })
        .await?;
    if changed > 0 {
        log::info!("Normalized {} legacy bond types", changed);
    }
    Ok(changed)
}

/// Remove duplicate bonds, keeping the first bond of each unordered pair in
/// insertion order. Returns the number of bonds removed.
pub async fn dedupe_bonds(db: &Db) -> Result<usize> {
    db.with_connection(|conn| {
        let mut stmt =
            conn.prepare("SELECT id, source, target FROM bonds ORDER BY created_at, id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        drop(stmt);

        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for (id, source, target) in rows {
            let key = if source < target {
                format!("{}-{}", source, target)
            } else {
                format!("{}-{}", target, source)
            };
            if !seen.insert(key) {
                duplicates.push(id);
            }
        }

        let tx = conn.transaction()?;
        for id in &duplicates {
            tx.execute("DELETE FROM bonds WHERE id = ?1", params![id])?;
        }
        tx.commit()?;

        if !duplicates.is_empty() {
            log::info!("Removed {} duplicate bonds", duplicates.len());
        }
        Ok(duplicates.len())
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate;
    use tempfile::TempDir;

    async fn setup_test_db() -> (Db, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Db::new(temp_dir.path().join("test.db"));
        db.with_connection(|conn| migrate::run_migrations(conn))
            .await
            .unwrap();
        (db, temp_dir)
    }

    #[tokio::test]
    async fn test_insert_and_list() {
        let (db, _tmp) = setup_test_db().await;

        let bond = insert_bond(&db, BondInput::new("a", "b", "friend")).await.unwrap();
        assert!(bond.id.is_some());
        assert_eq!(bond.lore.as_deref(), Some("No lore yet."));

        let bonds = list_bonds(&db).await.unwrap();
        assert_eq!(bonds.len(), 1);
        assert_eq!(bonds[0].source_id(), "a");
        assert_eq!(bonds[0].target_id(), "b");
    }

    #[tokio::test]
    async fn test_insert_rejects_self_bond() {
        let (db, _tmp) = setup_test_db().await;
        let result = insert_bond(&db, BondInput::new("a", "a", "friend")).await;
        assert!(matches!(result, Err(BondgraphError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_pair_either_direction() {
        let (db, _tmp) = setup_test_db().await;

        insert_bond(&db, BondInput::new("a", "b", "friend")).await.unwrap();

        let same = insert_bond(&db, BondInput::new("a", "b", "lover")).await;
        assert!(matches!(same, Err(BondgraphError::InvalidInput(_))));

        let reversed = insert_bond(&db, BondInput::new("b", "a", "lover")).await;
        assert!(matches!(reversed, Err(BondgraphError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_insert_keeps_custom_lore() {
        let (db, _tmp) = setup_test_db().await;
        let mut input = BondInput::new("a", "b", "lover");
        input.lore = Some("It's complicated".to_string());
        let bond = insert_bond(&db, input).await.unwrap();
        assert_eq!(bond.lore.as_deref(), Some("It's complicated"));
    }

    #[tokio::test]
    async fn test_delete_bond() {
        let (db, _tmp) = setup_test_db().await;

        let bond = insert_bond(&db, BondInput::new("a", "b", "friend")).await.unwrap();
        delete_bond(&db, bond.id.as_deref().unwrap()).await.unwrap();
        assert!(list_bonds(&db).await.unwrap().is_empty());

        let missing = delete_bond(&db, "no-such-bond").await;
        assert!(matches!(missing, Err(BondgraphError::BondNotFound(_))));
    }

    #[tokio::test]
    async fn test_normalize_legacy_types() {
        let (db, _tmp) = setup_test_db().await;

        insert_bond(&db, BondInput::new("a", "b", "best_friend")).await.unwrap();
        insert_bond(&db, BondInput::new("b", "c", "lover")).await.unwrap();

        let changed = normalize_legacy_types(&db).await.unwrap();
        assert_eq!(changed, 1);

        let bonds = list_bonds(&db).await.unwrap();
        let types: Vec<_> = bonds.iter().map(|b| b.bond_type.as_str()).collect();
        assert!(types.contains(&"friend"));
        assert!(types.contains(&"lover"));
        assert!(!types.contains(&"best_friend"));

        // Second run is a no-op.
        assert_eq!(normalize_legacy_types(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_dedupe_bonds_keeps_first_of_pair() {
        let (db, _tmp) = setup_test_db().await;

        let first = insert_bond(&db, BondInput::new("a", "b", "friend")).await.unwrap();
        // insert_bond guards against duplicates, so plant them directly.
        db.with_connection(|conn| {
            conn.execute(
                "INSERT INTO bonds (id, source, target, type, lore, created_at) \
                 VALUES ('dup-1', 'b', 'a', 'friend', NULL, '2099-01-01T00:00:00Z')",
                [],
            )?;
            conn.execute(
                "INSERT INTO bonds (id, source, target, type, lore, created_at) \
                 VALUES ('dup-2', 'a', 'b', 'lover', NULL, '2099-01-02T00:00:00Z')",
                [],
            )?;
            Ok(())
        })
        .await
        .unwrap();

        let removed = dedupe_bonds(&db).await.unwrap();
        assert_eq!(removed, 2);

        let bonds = list_bonds(&db).await.unwrap();
        assert_eq!(bonds.len(), 1);
        assert_eq!(bonds[0].id, first.id);
    }
}
