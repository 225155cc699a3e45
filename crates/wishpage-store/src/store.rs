//! Transactional item store over SQLite

use crate::{
    item::{Item, ItemPatch, NewItem},
    Result, StoreError, DATABASE_FILE,
};
use sqlx::{
    query::Query,
    sqlite::{
        SqliteArguments, SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions,
    },
    Sqlite, Transaction,
};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info, instrument};

const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    person TEXT NOT NULL,
    link TEXT,
    price INTEGER,
    count INTEGER NOT NULL DEFAULT 1 CHECK (count >= 0),
    category TEXT NOT NULL
)";

const DROP_TABLE_SQL: &str = "DROP TABLE IF EXISTS items";

const LIST_SQL: &str = "SELECT id, name, person, COALESCE(link, '') AS link, \
    COALESCE(price, 0) AS price, count, category \
    FROM items ORDER BY price ASC, name ASC";

const GET_SQL: &str = "SELECT id, name, person, COALESCE(link, '') AS link, \
    COALESCE(price, 0) AS price, count, category \
    FROM items WHERE id = ?";

const INSERT_SQL: &str =
    "INSERT INTO items (name, person, link, price, count, category) VALUES (?, ?, ?, ?, ?, ?)";

/// Where the relation lives
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum StorageLocation {
    /// Non-persistent, lost when the process exits
    #[default]
    Memory,
    /// `items.db` inside this directory
    Directory(PathBuf),
}

impl StorageLocation {
    /// Directory if given, memory otherwise
    pub fn from_dir(dir: Option<PathBuf>) -> Self {
        dir.map_or(Self::Memory, Self::Directory)
    }

    /// Whether data survives a restart
    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::Directory(_))
    }

    /// Database file path, `None` for memory
    pub fn database_path(&self) -> Option<PathBuf> {
        match self {
            Self::Memory => None,
            Self::Directory(dir) => Some(dir.join(DATABASE_FILE)),
        }
    }
}

/// Store configuration
#[derive(Clone, Debug, Default)]
pub struct StoreConfig {
    pub location: StorageLocation,
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self {
            location: StorageLocation::Memory,
        }
    }

    pub fn in_directory(dir: impl Into<PathBuf>) -> Self {
        Self {
            location: StorageLocation::Directory(dir.into()),
        }
    }
}

/// Result of [`ItemStore::list`]
///
/// A backend failure yields an empty `items` and the failure in `error`;
/// an empty `items` alone does not mean the store failed.
#[derive(Debug, Default)]
pub struct ItemListing {
    pub items: Vec<Item>,
    pub error: Option<StoreError>,
}

impl ItemListing {
    /// Convert into a plain `Result`
    pub fn into_result(self) -> Result<Vec<Item>> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.items),
        }
    }
}

/// Row as stored, nullable columns kept nullable
#[derive(sqlx::FromRow)]
struct StoredRow {
    id: i64,
    name: String,
    person: String,
    link: Option<String>,
    price: Option<i64>,
    count: i64,
    category: String,
}

impl StoredRow {
    fn apply(&mut self, patch: &ItemPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(person) = &patch.person {
            self.person = person.clone();
        }
        if let Some(link) = &patch.link {
            self.link = Some(link.clone());
        }
        if let Some(price) = patch.price {
            self.price = Some(price);
        }
        if let Some(count) = patch.count {
            self.count = count;
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
    }
}

/// Inventory store
///
/// Cloning is cheap and shares the single underlying connection.
#[derive(Clone, Debug)]
pub struct ItemStore {
    pool: SqlitePool,
    location: StorageLocation,
}

impl ItemStore {
    /// Open the store and create the schema if needed
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        let options = match config.location.database_path() {
            Some(path) => SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal),
            None => SqliteConnectOptions::from_str("sqlite::memory:")?,
        };

        // One connection, never recycled: an in-memory database lives exactly
        // as long as its connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self {
            pool,
            location: config.location.clone(),
        };
        store.create_schema().await?;

        info!(
            persistent = store.location.is_persistent(),
            path = ?store.location.database_path(),
            "Item store opened"
        );
        Ok(store)
    }

    /// Where this store keeps its data
    pub fn location(&self) -> &StorageLocation {
        &self.location
    }

    async fn create_schema(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE_SQL).execute(&self.pool).await?;
        Ok(())
    }

    /// All items ordered by price, then name
    #[instrument(skip(self))]
    pub async fn list(&self) -> ItemListing {
        match sqlx::query_as::<_, Item>(LIST_SQL).fetch_all(&self.pool).await {
            Ok(items) => ItemListing { items, error: None },
            Err(e) => ItemListing {
                items: Vec::new(),
                error: Some(e.into()),
            },
        }
    }

    /// Fetch one item
    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Item> {
        sqlx::query_as::<_, Item>(GET_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::ItemNotFound(id))
    }

    /// Insert an item and return its new id
    #[instrument(skip(self, item), fields(name = ?item.name))]
    pub async fn insert(&self, item: NewItem) -> Result<i64> {
        let result = insert_query(item).execute(&self.pool).await?;
        let id = result.last_insert_rowid();
        debug!(id, "Item inserted");
        Ok(id)
    }

    /// Apply a partial update to one item
    ///
    /// Unchanged fields are written back with their stored values.
    #[instrument(skip(self, patch), fields(fields = ?patch.changed_fields()))]
    pub async fn update(&self, id: i64, patch: &ItemPatch) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let mut row = sqlx::query_as::<_, StoredRow>(
            "SELECT id, name, person, link, price, count, category FROM items WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::ItemNotFound(id))?;

        row.apply(patch);

        sqlx::query(
            "UPDATE items SET name = ?, person = ?, link = ?, price = ?, count = ?, category = ? \
             WHERE id = ?",
        )
        .bind(&row.name)
        .bind(&row.person)
        .bind(&row.link)
        .bind(row.price)
        .bind(row.count)
        .bind(&row.category)
        .bind(row.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Take one unit of an item, returning how many are left
    ///
    /// The `count > 0` guard on the write is what prevents overselling; the
    /// read before it only distinguishes "already reserved out" and supplies
    /// the return value.
    #[instrument(skip(self))]
    pub async fn reserve(&self, id: i64) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let count: i64 = sqlx::query_scalar("SELECT count FROM items WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::ItemNotFound(id))?;

        if count == 0 {
            return Err(StoreError::ReservedOut(id));
        }

        let result = sqlx::query("UPDATE items SET count = count - 1 WHERE id = ? AND count > 0")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ReservationConflict(id));
        }

        tx.commit().await?;
        Ok(count - 1)
    }

    /// Remove an item
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ItemNotFound(id));
        }
        Ok(())
    }

    /// Drop everything and load the fixed sample items
    pub async fn reset_with_sample_data(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(DROP_TABLE_SQL).execute(&mut *tx).await?;
        sqlx::query(CREATE_TABLE_SQL).execute(&mut *tx).await?;

        let samples = crate::seed::sample_items();
        let inserted = samples.len();
        for item in samples {
            insert_in(&mut tx, item).await?;
        }

        tx.commit().await?;
        info!(inserted, "Sample data inserted");
        Ok(())
    }

    /// Close the connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn insert_query(item: NewItem) -> Query<'static, Sqlite, SqliteArguments<'static>> {
    sqlx::query(INSERT_SQL)
        .bind(item.name)
        .bind(item.person)
        .bind(item.link)
        .bind(item.price)
        .bind(item.count)
        .bind(item.category)
}

async fn insert_in(tx: &mut Transaction<'_, Sqlite>, item: NewItem) -> Result<i64> {
    let result = insert_query(item).execute(&mut **tx).await?;
    Ok(result.last_insert_rowid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;

    async fn memory_store() -> ItemStore {
        ItemStore::open(&StoreConfig::in_memory()).await.unwrap()
    }

    fn shoes() -> NewItem {
        NewItem::new("Shoes", "Bob", "Specific Item")
            .with_link("https://www.amazon.de")
            .with_price(35)
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = memory_store().await;

        let id = store.insert(shoes()).await.unwrap();
        let item = store.get(id).await.unwrap();

        assert_eq!(item.name, "Shoes");
        assert_eq!(item.person, "Bob");
        assert_eq!(item.price, 35);
        assert_eq!(item.count, 1);
        assert_eq!(item.category, "Specific Item");
    }

    #[tokio::test]
    async fn test_ids_are_not_reused() {
        let store = memory_store().await;

        let first = store.insert(shoes()).await.unwrap();
        store.delete(first).await.unwrap();
        let second = store.insert(shoes()).await.unwrap();

        assert!(second > first);
    }

    #[tokio::test]
    async fn test_insert_without_name_fails_in_store() {
        let store = memory_store().await;
        let item = NewItem {
            name: None,
            ..NewItem::new("x", "Bob", "Specific Item")
        };

        let err = store.insert(item).await.unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
        assert!(store.list().await.items.is_empty());
    }

    #[tokio::test]
    async fn test_negative_count_rejected() {
        let store = memory_store().await;

        let err = store.insert(shoes().with_count(-3)).await.unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_list_ordering() {
        let store = memory_store().await;
        for (name, price) in [("Pants", 55), ("Zebra", 0), ("Shirt", 25), ("Apple", 25), ("Lunch", 0)] {
            store
                .insert(NewItem::new(name, "Bob", "Misc").with_price(price))
                .await
                .unwrap();
        }

        let names: Vec<_> = store
            .list()
            .await
            .into_result()
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();

        assert_eq!(names, vec!["Lunch", "Zebra", "Apple", "Shirt", "Pants"]);
    }

    #[tokio::test]
    async fn test_list_reports_backend_error_separately() {
        let store = memory_store().await;
        store.insert(shoes()).await.unwrap();
        store.close().await;

        let listing = store.list().await;
        assert!(listing.items.is_empty());
        assert!(matches!(listing.error, Some(StoreError::Database(_))));
    }

    #[tokio::test]
    async fn test_reserve_decrements_to_zero_then_fails() {
        let store = memory_store().await;
        let id = store.insert(shoes().with_count(2)).await.unwrap();

        assert_eq!(store.reserve(id).await.unwrap(), 1);
        assert_eq!(store.reserve(id).await.unwrap(), 0);

        let err = store.reserve(id).await.unwrap_err();
        assert!(matches!(err, StoreError::ReservedOut(_)));
        assert_eq!(store.get(id).await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_reserve_unknown_item() {
        let store = memory_store().await;

        let err = store.reserve(42).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_concurrent_reservations_never_oversell() {
        let store = memory_store().await;
        let units = 5;
        let extra = 7;
        let id = store.insert(shoes().with_count(units)).await.unwrap();

        let attempts = (0..units + extra).map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.reserve(id).await })
        });
        let results: Vec<_> = join_all(attempts)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        let successes = results.iter().filter(|r| r.is_ok()).count();
        let exhausted = results
            .iter()
            .filter(|r| matches!(r, Err(e) if e.is_exhaustion()))
            .count();

        assert_eq!(successes as i64, units);
        assert_eq!(exhausted as i64, extra);
        assert_eq!(store.get(id).await.unwrap().count, 0);

        let mut remaining: Vec<i64> = results.into_iter().filter_map(|r| r.ok()).collect();
        remaining.sort_unstable();
        assert_eq!(remaining, (0..units).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_sentinel_update_leaves_row_unchanged() {
        let store = memory_store().await;
        let id = store.insert(shoes().with_count(3)).await.unwrap();
        let before = store.get(id).await.unwrap();

        let patch: ItemPatch = serde_json::from_str(
            r#"{"name": "NULL", "person": "NULL", "link": "NULL",
                "price": -1, "count": -1, "category": "NULL"}"#,
        )
        .unwrap();
        store.update(id, &patch).await.unwrap();

        assert_eq!(store.get(id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_keeps_null_columns_null() {
        let store = memory_store().await;
        sqlx::query("INSERT INTO items (name, person, category) VALUES ('Lunch', 'Bob', 'Shared')")
            .execute(&store.pool)
            .await
            .unwrap();

        store
            .update(1, &ItemPatch { count: Some(2), ..Default::default() })
            .await
            .unwrap();

        let (link, price): (Option<String>, Option<i64>) =
            sqlx::query_as("SELECT link, price FROM items WHERE id = 1")
                .fetch_one(&store.pool)
                .await
                .unwrap();
        assert_eq!(link, None);
        assert_eq!(price, None);
    }

    #[tokio::test]
    async fn test_update_single_field() {
        let store = memory_store().await;
        let id = store.insert(shoes()).await.unwrap();
        let before = store.get(id).await.unwrap();

        let patch = ItemPatch {
            price: Some(40),
            ..Default::default()
        };
        store.update(id, &patch).await.unwrap();

        let after = store.get(id).await.unwrap();
        assert_eq!(after, Item { price: 40, ..before });
    }

    #[tokio::test]
    async fn test_update_unknown_item() {
        let store = memory_store().await;
        let patch = ItemPatch {
            name: Some("Socks".to_string()),
            ..Default::default()
        };

        let err = store.update(9, &patch).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_failed_update_rolls_back() {
        let store = memory_store().await;
        let id = store.insert(shoes()).await.unwrap();
        let before = store.get(id).await.unwrap();

        let patch = ItemPatch {
            name: Some("Boots".to_string()),
            count: Some(-4),
            ..Default::default()
        };
        let err = store.update(id, &patch).await.unwrap_err();

        assert!(matches!(err, StoreError::Constraint(_)));
        assert_eq!(store.get(id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = memory_store().await;
        let id = store.insert(shoes()).await.unwrap();

        store.delete(id).await.unwrap();
        assert!(store.get(id).await.unwrap_err().is_not_found());
        assert!(store.delete(id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_reset_with_sample_data() {
        let store = memory_store().await;
        store.insert(NewItem::new("Old", "Dave", "Gone")).await.unwrap();

        store.reset_with_sample_data().await.unwrap();

        let items = store.list().await.into_result().unwrap();
        assert_eq!(items.len(), 5);
        assert!(items.iter().all(|i| i.name != "Old"));
        assert_eq!(items[0].price, 0);
        assert_eq!(items.last().unwrap().name, "Pants");
    }

    #[test_log::test(tokio::test)]
    async fn test_directory_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::in_directory(dir.path());

        let store = ItemStore::open(&config).await.unwrap();
        let id = store.insert(shoes()).await.unwrap();
        store.close().await;

        let reopened = ItemStore::open(&config).await.unwrap();
        assert_eq!(reopened.get(id).await.unwrap().name, "Shoes");
        assert!(dir.path().join(DATABASE_FILE).exists());
    }

    #[tokio::test]
    async fn test_unreachable_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::in_directory(dir.path().join("missing").join("nested"));

        assert!(ItemStore::open(&config).await.is_err());
    }
}
