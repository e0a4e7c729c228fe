use super::Person;
use crate::db::Db;
use crate::error::{BondgraphError, Result};
use chrono::Utc;
use rusqlite::{params, Row};
use serde::Deserialize;
use uuid::Uuid;

/// Incoming person payload (id and created_at are assigned on insert).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonInput {
    pub name: String,
    #[serde(default)]
    pub vibe: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
}

/// Fallback avatar URL derived from the person's name.
fn default_avatar(name: &str) -> String {
    format!("https://api.dicebear.com/7.x/initials/svg?seed={}", name)
}

fn row_to_person(row: &Row<'_>) -> rusqlite::Result<Person> {
    Ok(Person {
        id: row.get(0)?,
        name: row.get(1)?,
        vibe: row.get(2)?,
        img: row.get(3)?,
        bio: row.get(4)?,
        birthday: row.get(5)?,
        location: row.get(6)?,
        emoji: row.get(7)?,
        instagram: row.get(8)?,
        twitter: row.get(9)?,
        created_at: row.get(10)?,
    })
}

const PERSON_COLUMNS: &str =
    "id, name, vibe, img, bio, birthday, location, emoji, instagram, twitter, created_at";

/// List all people, sorted by name.
pub async fn list_people(db: &Db) -> Result<Vec<Person>> {
    db.with_connection(|conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM people ORDER BY name COLLATE NOCASE",
            PERSON_COLUMNS
        ))?;
        let people = stmt
            .query_map([], row_to_person)?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(people)
    })
    .await
}

/// Fetch a single person by id.
pub async fn get_person(db: &Db, id: &str) -> Result<Person> {
    let id = id.to_string();
    db.with_connection(move |conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM people WHERE id = ?1",
            PERSON_COLUMNS
        ))?;
        stmt.query_row(params![id], row_to_person)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => BondgraphError::PersonNotFound(id.clone()),
                other => BondgraphError::Database(other),
            })
    })
    .await
}

/// Insert a new person. Assigns a UUID id and a creation timestamp; falls
/// back to a generated avatar URL when no image is given.
pub async fn insert_person(db: &Db, input: PersonInput) -> Result<Person> {
    if input.name.trim().is_empty() {
        return Err(BondgraphError::InvalidInput(
            "person name must not be empty".to_string(),
        ));
    }

    let img = match input.img {
        Some(url) if !url.is_empty() => Some(url),
        _ => Some(default_avatar(&input.name)),
    };
    let person = Person {
        id: Uuid::new_v4().to_string(),
        name: input.name,
        vibe: input.vibe,
        img,
        bio: input.bio,
        birthday: input.birthday,
        location: input.location,
        emoji: input.emoji,
        instagram: input.instagram,
        twitter: input.twitter,
        created_at: Some(Utc::now().to_rfc3339()),
    };

    let row = person.clone();
    db.with_connection(move |conn| {
        conn.execute(
            "INSERT INTO people (id, name, vibe, img, bio, birthday, location, emoji, instagram, twitter, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                row.id,
                row.name,
                row.vibe,
                row.img,
                row.bio,
                row.birthday,
                row.location,
                row.emoji,
                row.instagram,
                row.twitter,
                row.created_at,
            ],
        )?;
        Ok(())
    })
    .await?;

    log::info!("Added person {} ({})", person.name, person.id);
    Ok(person)
}

/// Update an existing person's profile fields.
pub async fn update_person(db: &Db, id: &str, input: PersonInput) -> Result<Person> {
    if input.name.trim().is_empty() {
        return Err(BondgraphError::InvalidInput(
            "person name must not be empty".to_string(),
        ));
    }

    let img = match input.img {
        Some(url) if !url.is_empty() => Some(url),
        _ => Some(default_avatar(&input.name)),
    };
    let id_owned = id.to_string();
    let updated = db
        .with_connection(move |conn| {
            let changed = conn.execute(
                "UPDATE people SET name = ?1, vibe = ?2, img = ?3, bio = ?4, birthday = ?5, \
                 location = ?6, emoji = ?7, instagram = ?8, twitter = ?9 WHERE id = ?10",
                params![
                    input.name,
                    input.vibe,
                    img,
                    input.bio,
                    input.birthday,
                    input.location,
                    input.emoji,
                    input.instagram,
                    input.twitter,
                    id_owned,
                ],
            )?;
            Ok(changed)
        })
        .await?;

    if updated == 0 {
        return Err(BondgraphError::PersonNotFound(id.to_string()));
    }
    get_person(db, id).await
}

/// Delete a person and every bond touching them, in one transaction.
pub async fn delete_person(db: &Db, id: &str) -> Result<()> {
    let id_owned = id.to_string();
    let deleted = db
        .with_connection(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM bonds WHERE source = ?1 OR target = ?1",
                params![id_owned],
            )?;
            let deleted = tx.execute("DELETE FROM people WHERE id = ?1", params![id_owned])?;
            tx.commit()?;
            Ok(deleted)
        })
        .await?;

    if deleted == 0 {
        return Err(BondgraphError::PersonNotFound(id.to_string()));
    }
    log::info!("Removed person {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate;
    use crate::store::{insert_bond, list_bonds, BondInput};
    use tempfile::TempDir;

    async fn setup_test_db() -> (Db, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Db::new(temp_dir.path().join("test.db"));
        db.with_connection(|conn| migrate::run_migrations(conn))
            .await
            .unwrap();
        (db, temp_dir)
    }

    fn named(name: &str) -> PersonInput {
        PersonInput {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_and_list_sorted_by_name() {
        let (db, _tmp) = setup_test_db().await;

        insert_person(&db, named("mike")).await.unwrap();
        insert_person(&db, named("Ayal")).await.unwrap();
        insert_person(&db, named("Sarah")).await.unwrap();

        let people = list_people(&db).await.unwrap();
        let names: Vec<_> = people.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Ayal", "mike", "Sarah"]);
    }

    #[tokio::test]
    async fn test_insert_defaults_avatar() {
        let (db, _tmp) = setup_test_db().await;

        let person = insert_person(&db, named("Ayal")).await.unwrap();
        assert!(person.img.unwrap().contains("seed=Ayal"));

        let with_img = insert_person(
            &db,
            PersonInput {
                name: "Sarah".to_string(),
                img: Some("https://example.com/sarah.png".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(with_img.img.as_deref(), Some("https://example.com/sarah.png"));
    }

    #[tokio::test]
    async fn test_insert_rejects_empty_name() {
        let (db, _tmp) = setup_test_db().await;
        let result = insert_person(&db, named("   ")).await;
        assert!(matches!(result, Err(BondgraphError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_update_person() {
        let (db, _tmp) = setup_test_db().await;

        let person = insert_person(&db, named("Ayal")).await.unwrap();
        let updated = update_person(
            &db,
            &person.id,
            PersonInput {
                name: "Ayal".to_string(),
                vibe: Some("The Architect".to_string()),
                location: Some("Ankara".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.vibe.as_deref(), Some("The Architect"));
        assert_eq!(updated.location.as_deref(), Some("Ankara"));
        assert_eq!(updated.id, person.id);
    }

    #[tokio::test]
    async fn test_update_missing_person() {
        let (db, _tmp) = setup_test_db().await;
        let result = update_person(&db, "no-such-id", named("Ghost")).await;
        assert!(matches!(result, Err(BondgraphError::PersonNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_person_cascades_bonds() {
        let (db, _tmp) = setup_test_db().await;

        let a = insert_person(&db, named("Ayal")).await.unwrap();
        let b = insert_person(&db, named("Sarah")).await.unwrap();
        let c = insert_person(&db, named("Mike")).await.unwrap();
        insert_bond(&db, BondInput::new(&a.id, &b.id, "friend")).await.unwrap();
        insert_bond(&db, BondInput::new(&b.id, &c.id, "lover")).await.unwrap();

        delete_person(&db, &b.id).await.unwrap();

        let people = list_people(&db).await.unwrap();
        assert_eq!(people.len(), 2);
        let bonds = list_bonds(&db).await.unwrap();
        assert!(bonds.is_empty(), "bonds touching Sarah should be gone");
    }

    #[tokio::test]
    async fn test_delete_missing_person() {
        let (db, _tmp) = setup_test_db().await;
        let result = delete_person(&db, "no-such-id").await;
        assert!(matches!(result, Err(BondgraphError::PersonNotFound(_))));
    }

    #[tokio::test]
    async fn test_get_person_not_found() {
        let (db, _tmp) = setup_test_db().await;
        let result = get_person(&db, "missing").await;
        assert!(matches!(result, Err(BondgraphError::PersonNotFound(_))));
    }
}
