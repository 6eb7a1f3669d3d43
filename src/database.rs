use mongodb::Database;
use mongodb::IndexModel;
use mongodb::options::IndexOptions;
use tokio::sync::OnceCell;
use wither::bson::{Document, doc};
use wither::mongodb;

use crate::config::APP_CONFIG;
use crate::errors::Error;

static CONNECTION: OnceCell<Database> = OnceCell::const_new();

pub async fn connection() -> &'static Database {
    CONNECTION
        .get_or_init(|| async {
            let db_uri = &APP_CONFIG.database_uri;
            let db_name = &APP_CONFIG.database_name;

            mongodb::Client::with_uri_str(db_uri)
                .await
                .expect("Failed to initialize MongoDB connection")
                .database(db_name)
        })
        .await
}

/// The unique index on `userId` is the source of truth for "one preference
/// record per user"; concurrent first accesses converge on it.
pub async fn sync_indexes() -> Result<(), Error> {
    let database = connection().await;

    let options = IndexOptions::builder().unique(true).build();
    let user_id_unique = IndexModel::builder()
        .keys(doc! { "userId": 1 })
        .options(options)
        .build();

    database
        .collection::<Document>("notification_preferences")
        .create_index(user_id_unique)
        .await
        .map_err(Error::Mongo)?;

    Ok(())
}
