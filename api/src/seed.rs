use std::collections::HashSet;

use tracing::{info, warn};

use auth::{User, ADMIN, DEFAULT};
use docstore::{Database, DocumentId};

use crate::models::Article;
use crate::{ARTICLES_COLLECTION, USERS_COLLECTION};

/// Seed a development database with a known admin account and a few sample
/// articles. Skipped when the users collection already holds data.
pub async fn seed_dev_data(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    let users = db.collection(USERS_COLLECTION);
    users.ensure().await?;

    if users.count().await? > 0 {
        info!("Database already contains users, skipping seed data");
        return Ok(());
    }

    let admin = User {
        id: "admin".to_string(),
        password: "admin".to_string(),
        mail: String::new(),
        alias: "Administrator".to_string(),
        roles: HashSet::from([ADMIN.to_string(), DEFAULT.to_string()]),
    };
    users.insert(&admin.id, &admin).await?;
    warn!("Seeded development admin account with default credentials");

    let articles = db.collection(ARTICLES_COLLECTION);
    articles.ensure().await?;

    for (title, body, author) in [
        (
            "Getting Started",
            "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.",
            "admin",
        ),
        (
            "Release Notes",
            "Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat.",
            "admin",
        ),
    ] {
        let article = Article {
            id: DocumentId::new().to_string(),
            title: title.to_string(),
            body: body.to_string(),
            author: author.to_string(),
        };
        articles.insert(&article.id, &article).await?;
        info!("Seeded article: {}", article.title);
    }

    Ok(())
}
