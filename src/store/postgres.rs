use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, Row, Transaction};
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::order::{Order, OrderFilter, OrderItem, OrderNumber, OrderStatus};
use crate::domain::product::{Product, Sku};
use crate::domain::shared::{Money, Quantity};
use super::{Store, StoreError, UnitOfWork};

// ============================================================================
// PostgreSQL Store (sqlx)
// ============================================================================
//
// Each unit of work is one database transaction. `lock_*` reads use
// SELECT ... FOR UPDATE, so concurrent reservations on the same product
// queue on the row lock instead of both reading the old stock level.
//
// ============================================================================

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS products (
        id UUID PRIMARY KEY,
        sku VARCHAR(50) NOT NULL UNIQUE,
        name TEXT NOT NULL,
        description TEXT,
        price NUMERIC(12,2) NOT NULL CHECK (price >= 0),
        currency CHAR(3) NOT NULL,
        stock_quantity INTEGER NOT NULL CHECK (stock_quantity >= 0),
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL,
        deleted_at TIMESTAMPTZ
    )"#,
    r#"CREATE TABLE IF NOT EXISTS orders (
        id UUID PRIMARY KEY,
        order_number VARCHAR(32) NOT NULL UNIQUE,
        customer_id UUID NOT NULL,
        status VARCHAR(16) NOT NULL,
        total_amount NUMERIC(12,2) NOT NULL CHECK (total_amount >= 0),
        currency CHAR(3) NOT NULL,
        notes TEXT,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL,
        deleted_at TIMESTAMPTZ,
        stock_released_at TIMESTAMPTZ
    )"#,
    "ALTER TABLE orders ADD COLUMN IF NOT EXISTS stock_released_at TIMESTAMPTZ",
    r#"CREATE TABLE IF NOT EXISTS order_items (
        id UUID PRIMARY KEY,
        order_id UUID NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
        product_id UUID NOT NULL REFERENCES products(id),
        position INTEGER NOT NULL,
        quantity INTEGER NOT NULL CHECK (quantity > 0),
        unit_price NUMERIC(12,2) NOT NULL,
        subtotal NUMERIC(12,2) NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_orders_customer ON orders (customer_id)",
    "CREATE INDEX IF NOT EXISTS idx_orders_status ON orders (status)",
    "CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items (order_id, position)",
];

const PRODUCT_COLUMNS: &str = "id, sku, name, description, price, currency, stock_quantity, \
     is_active, created_at, updated_at, deleted_at";

const ORDER_COLUMNS: &str = "id, order_number, customer_id, status, total_amount, currency, \
     notes, created_at, updated_at, deleted_at, stock_released_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and create the schema if it does not exist yet.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::info!(statements = SCHEMA.len(), "Database schema ready");
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }

    async fn find_product(&self, id: Uuid, include_deleted: bool) -> Result<Option<Product>, StoreError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND ($2 OR deleted_at IS NULL)"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(include_deleted)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn list_products(&self, include_deleted: bool) -> Result<Vec<Product>, StoreError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE ($1 OR deleted_at IS NULL) ORDER BY name, created_at"
        );
        let rows = sqlx::query(&sql)
            .bind(include_deleted)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(product_from_row).collect()
    }

    async fn search_products(&self, keyword: &str, include_deleted: bool) -> Result<Vec<Product>, StoreError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE ($1 OR deleted_at IS NULL) AND (name ILIKE $2 OR sku ILIKE $2) \
             ORDER BY name, created_at"
        );
        let rows = sqlx::query(&sql)
            .bind(include_deleted)
            .bind(like_pattern(keyword))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(product_from_row).collect()
    }

    async fn find_order(&self, id: Uuid, include_deleted: bool) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        load_order(&mut conn, id, include_deleted, false).await
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE ($1::text IS NULL OR status = $1) \
               AND ($2::uuid IS NULL OR customer_id = $2) \
               AND ($3 OR deleted_at IS NULL) \
             ORDER BY created_at DESC"
        );

        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query(&sql)
            .bind(filter.status.map(|status| status.value()))
            .bind(filter.customer_id)
            .bind(filter.include_deleted)
            .fetch_all(&mut *conn)
            .await?;

        let records = rows
            .iter()
            .map(OrderRecord::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        let ids: Vec<Uuid> = records.iter().map(|record| record.id).collect();
        let mut items = load_items(&mut conn, &ids).await?;

        records
            .into_iter()
            .map(|record| {
                let lines = items.remove(&record.id).unwrap_or_default();
                record.into_order(lines)
            })
            .collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn lock_product(&mut self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 FOR UPDATE");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.as_ref().map(product_from_row).transpose()
    }

    async fn sku_in_use(&mut self, sku: &Sku, except: Option<Uuid>) -> Result<bool, StoreError> {
        let in_use: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM products WHERE sku = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(sku.as_str())
        .bind(except)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(in_use)
    }

    async fn save_product(&mut self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO products (id, sku, name, description, price, currency, stock_quantity,
                                     is_active, created_at, updated_at, deleted_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
               ON CONFLICT (id) DO UPDATE SET
                   sku = EXCLUDED.sku,
                   name = EXCLUDED.name,
                   description = EXCLUDED.description,
                   price = EXCLUDED.price,
                   currency = EXCLUDED.currency,
                   stock_quantity = EXCLUDED.stock_quantity,
                   is_active = EXCLUDED.is_active,
                   updated_at = EXCLUDED.updated_at,
                   deleted_at = EXCLUDED.deleted_at"#,
        )
        .bind(product.id)
        .bind(product.sku.as_str())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.amount())
        .bind(product.price.currency())
        .bind(product.stock_quantity.value())
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .bind(product.deleted_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn lock_order(&mut self, id: Uuid, include_deleted: bool) -> Result<Option<Order>, StoreError> {
        load_order(&mut self.tx, id, include_deleted, true).await
    }

    async fn save_order(&mut self, order: &Order) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO orders (id, order_number, customer_id, status, total_amount, currency,
                                   notes, created_at, updated_at, deleted_at, stock_released_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
               ON CONFLICT (id) DO UPDATE SET
                   status = EXCLUDED.status,
                   total_amount = EXCLUDED.total_amount,
                   notes = EXCLUDED.notes,
                   updated_at = EXCLUDED.updated_at,
                   deleted_at = EXCLUDED.deleted_at,
                   stock_released_at = EXCLUDED.stock_released_at"#,
        )
        .bind(order.id)
        .bind(order.order_number.as_str())
        .bind(order.customer_id)
        .bind(order.status.value())
        .bind(order.total_amount.amount())
        .bind(order.currency())
        .bind(&order.notes)
        .bind(order.created_at)
        .bind(order.updated_at)
        .bind(order.deleted_at)
        .bind(order.stock_released_at)
        .execute(&mut *self.tx)
        .await?;

        let kept: Vec<Uuid> = order.items.iter().map(|item| item.id).collect();
        sqlx::query("DELETE FROM order_items WHERE order_id = $1 AND NOT (id = ANY($2))")
            .bind(order.id)
            .bind(&kept)
            .execute(&mut *self.tx)
            .await?;

        for (position, item) in order.items.iter().enumerate() {
            sqlx::query(
                r#"INSERT INTO order_items (id, order_id, product_id, position, quantity, unit_price, subtotal)
                   VALUES ($1, $2, $3, $4, $5, $6, $7)
                   ON CONFLICT (id) DO UPDATE SET
                       position = EXCLUDED.position,
                       quantity = EXCLUDED.quantity,
                       subtotal = EXCLUDED.subtotal"#,
            )
            .bind(item.id)
            .bind(order.id)
            .bind(item.product_id)
            .bind(position as i32)
            .bind(item.quantity)
            .bind(item.unit_price.amount())
            .bind(item.subtotal.amount())
            .execute(&mut *self.tx)
            .await?;
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

// ============================================================================
// Row Mapping
// ============================================================================
//
// Rows are first read into plain records; turning a record into a domain
// value re-runs the domain validation, so a bad row surfaces as
// `StoreError::Corrupt` instead of an invalid aggregate.
//
// ============================================================================

async fn load_order(
    conn: &mut PgConnection,
    id: Uuid,
    include_deleted: bool,
    for_update: bool,
) -> Result<Option<Order>, StoreError> {
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND ($2 OR deleted_at IS NULL){}",
        if for_update { " FOR UPDATE" } else { "" }
    );
    let Some(row) = sqlx::query(&sql)
        .bind(id)
        .bind(include_deleted)
        .fetch_optional(&mut *conn)
        .await?
    else {
        return Ok(None);
    };

    let record = OrderRecord::from_row(&row)?;
    let lines = load_items(conn, &[record.id]).await?.remove(&record.id).unwrap_or_default();
    record.into_order(lines).map(Some)
}

/// Item rows keyed by order id, each list in position order.
async fn load_items(
    conn: &mut PgConnection,
    order_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<ItemRecord>>, StoreError> {
    let mut items: HashMap<Uuid, Vec<ItemRecord>> = HashMap::new();
    if order_ids.is_empty() {
        return Ok(items);
    }

    let rows = sqlx::query(
        "SELECT id, order_id, product_id, quantity, unit_price, subtotal \
         FROM order_items WHERE order_id = ANY($1) ORDER BY order_id, position",
    )
    .bind(order_ids)
    .fetch_all(conn)
    .await?;

    for row in rows {
        let record = ItemRecord::from_row(&row)?;
        items.entry(record.order_id).or_default().push(record);
    }
    Ok(items)
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    ProductRecord::from_row(row)?.into_product()
}

#[derive(Debug, Clone)]
struct ProductRecord {
    id: Uuid,
    sku: String,
    name: String,
    description: Option<String>,
    price: Decimal,
    currency: String,
    stock_quantity: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl ProductRecord {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            sku: row.try_get("sku")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            currency: row.try_get("currency")?,
            stock_quantity: row.try_get("stock_quantity")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
        })
    }

    fn into_product(self) -> Result<Product, StoreError> {
        Ok(Product {
            id: self.id,
            sku: Sku::new(&self.sku).map_err(|e| StoreError::corrupt("products", e))?,
            name: self.name,
            description: self.description,
            price: Money::new(self.price, &self.currency).map_err(|e| StoreError::corrupt("products", e))?,
            is_active: self.is_active,
            stock_quantity: Quantity::new(self.stock_quantity)
                .map_err(|e| StoreError::corrupt("products", e))?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        })
    }
}

#[derive(Debug, Clone)]
struct OrderRecord {
    id: Uuid,
    order_number: String,
    customer_id: Uuid,
    status: String,
    total_amount: Decimal,
    currency: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
    stock_released_at: Option<DateTime<Utc>>,
}

impl OrderRecord {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            order_number: row.try_get("order_number")?,
            customer_id: row.try_get("customer_id")?,
            status: row.try_get("status")?,
            total_amount: row.try_get("total_amount")?,
            currency: row.try_get("currency")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
            stock_released_at: row.try_get("stock_released_at")?,
        })
    }

    /// Item prices carry no currency column; they take the order's.
    fn into_order(self, lines: Vec<ItemRecord>) -> Result<Order, StoreError> {
        let items = lines
            .into_iter()
            .map(|line| line.into_item(&self.currency))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Order {
            id: self.id,
            order_number: OrderNumber::from_stored(self.order_number),
            customer_id: self.customer_id,
            status: OrderStatus::parse(&self.status).map_err(|e| StoreError::corrupt("orders", e))?,
            total_amount: Money::new(self.total_amount, &self.currency)
                .map_err(|e| StoreError::corrupt("orders", e))?,
            notes: self.notes,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
            stock_released_at: self.stock_released_at,
        })
    }
}

#[derive(Debug, Clone)]
struct ItemRecord {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
    subtotal: Decimal,
}

impl ItemRecord {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            order_id: row.try_get("order_id")?,
            product_id: row.try_get("product_id")?,
            quantity: row.try_get("quantity")?,
            unit_price: row.try_get("unit_price")?,
            subtotal: row.try_get("subtotal")?,
        })
    }

    fn into_item(self, currency: &str) -> Result<OrderItem, StoreError> {
        Ok(OrderItem {
            id: self.id,
            order_id: self.order_id,
            product_id: self.product_id,
            quantity: self.quantity,
            unit_price: Money::new(self.unit_price, currency).map_err(|e| StoreError::corrupt("order_items", e))?,
            subtotal: Money::new(self.subtotal, currency).map_err(|e| StoreError::corrupt("order_items", e))?,
        })
    }
}

/// `%keyword%` with LIKE wildcards in the keyword escaped.
fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order_record(status: &str, currency: &str) -> OrderRecord {
        let now = Utc::now();
        OrderRecord {
            id: Uuid::new_v4(),
            order_number: "ORD-20240101-0A1B2C3D".to_string(),
            customer_id: Uuid::new_v4(),
            status: status.to_string(),
            total_amount: dec!(70.00),
            currency: currency.to_string(),
            notes: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            stock_released_at: None,
        }
    }

    fn item_record(order_id: Uuid) -> ItemRecord {
        ItemRecord {
            id: Uuid::new_v4(),
            order_id,
            product_id: Uuid::new_v4(),
            quantity: 2,
            unit_price: dec!(35.00),
            subtotal: dec!(70.00),
        }
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" ring "), "%ring%");
        assert_eq!(like_pattern("100%_off"), "%100\\%\\_off%");
        assert_eq!(like_pattern(""), "%%");
    }

    #[test]
    fn test_schema_uses_fixed_point_money() {
        assert!(SCHEMA.iter().filter(|s| s.contains("NUMERIC(12,2)")).count() >= 3);
        assert!(SCHEMA.iter().any(|s| s.contains("stock_released_at")));
    }

    #[test]
    fn test_order_record_items_take_order_currency() {
        let record = order_record("PROCESSING", "EUR");
        let lines = vec![item_record(record.id)];

        let order = record.into_order(lines).unwrap();

        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.currency(), "EUR");
        assert_eq!(order.items[0].unit_price, Money::new(dec!(35), "EUR").unwrap());
        assert_eq!(order.items[0].subtotal.currency(), "EUR");
        assert!(order.total_is_consistent());
    }

    #[test]
    fn test_bad_rows_are_reported_as_corrupt() {
        let record = order_record("shipped", "USD");
        assert!(matches!(
            record.into_order(Vec::new()),
            Err(StoreError::Corrupt { table: "orders", .. })
        ));

        let record = order_record("pending", "USD");
        let mut line = item_record(record.id);
        line.subtotal = dec!(-1);
        assert!(matches!(
            record.into_order(vec![line]),
            Err(StoreError::Corrupt { table: "order_items", .. })
        ));

        let now = Utc::now();
        let product = ProductRecord {
            id: Uuid::new_v4(),
            sku: "RING-001".to_string(),
            name: "Silver Ring".to_string(),
            description: None,
            price: dec!(50),
            currency: "USD".to_string(),
            stock_quantity: -3,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        assert!(matches!(
            product.into_product(),
            Err(StoreError::Corrupt { table: "products", .. })
        ));
    }

    // ------------------------------------------------------------------------
    // Against a live database: TEST_DATABASE_URL=postgres://... cargo test -- --ignored
    // ------------------------------------------------------------------------

    mod live {
        use super::*;
        use crate::application::testkit::TestApp;
        use crate::application::CommerceError;
        use crate::domain::order::{CreateOrder, OrderLine};
        use crate::store::Store;
        use std::sync::Arc;

        async fn app() -> TestApp {
            let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
            let store = PgStore::connect(&url, 5).await.unwrap();
            TestApp::with_store(Arc::new(store))
        }

        fn unique_sku(prefix: &str) -> String {
            format!("{prefix}-{}", &Uuid::new_v4().simple().to_string()[..8])
        }

        #[tokio::test]
        #[ignore = "requires TEST_DATABASE_URL"]
        async fn test_order_round_trip_and_item_pruning() {
            let app = app().await;
            let ring = app.product("Silver Ring", &unique_sku("RING"), dec!(50), 10).await;
            let pearl = app.product("Pearl Bracelet", &unique_sku("PEARL"), dec!(35), 10).await;

            let order = app
                .order(vec![
                    OrderLine { product_id: ring.id, quantity: 1 },
                    OrderLine { product_id: pearl.id, quantity: 2 },
                ])
                .await;
            let loaded = app.store.find_order(order.id, false).await.unwrap().unwrap();
            assert_eq!(loaded.order_number, order.order_number);
            assert_eq!(loaded.total_amount, Money::usd(dec!(120)).unwrap());
            let item_ids: Vec<Uuid> = loaded.items.iter().map(|item| item.id).collect();
            assert_eq!(item_ids, order.items.iter().map(|item| item.id).collect::<Vec<_>>());

            let pearl_item = order.items[1].id;
            let order = app.orders.remove_order_item(order.id, pearl_item).await.unwrap();
            let loaded = app.store.find_order(order.id, false).await.unwrap().unwrap();
            assert_eq!(loaded.items.len(), 1);
            assert_eq!(loaded.total_amount, Money::usd(dec!(50)).unwrap());
            assert_eq!(app.stock(pearl.id).await, 10);

            let cancelled = app.orders.cancel_order(order.id, None).await.unwrap();
            let loaded = app.store.find_order(order.id, false).await.unwrap().unwrap();
            assert_eq!(loaded.status, OrderStatus::Cancelled);
            assert!(cancelled.stock_released_at.is_some());
            assert!(loaded.stock_released_at.is_some());
        }

        #[tokio::test]
        #[ignore = "requires TEST_DATABASE_URL"]
        async fn test_list_orders_filters_by_status_and_customer() {
            let app = app().await;
            let ring = app.product("Silver Ring", &unique_sku("RING"), dec!(50), 10).await;
            let order = app.order(vec![OrderLine { product_id: ring.id, quantity: 1 }]).await;
            app.orders.update_order_status(order.id, OrderStatus::Processing).await.unwrap();

            let mine = app
                .store
                .list_orders(&OrderFilter::by_customer(order.customer_id))
                .await
                .unwrap();
            assert_eq!(mine.len(), 1);
            assert_eq!(mine[0].status, OrderStatus::Processing);

            let processing = app
                .store
                .list_orders(&OrderFilter {
                    status: Some(OrderStatus::Processing),
                    customer_id: Some(order.customer_id),
                    include_deleted: false,
                })
                .await
                .unwrap();
            assert_eq!(processing.len(), 1);

            let pending = app
                .store
                .list_orders(&OrderFilter {
                    status: Some(OrderStatus::Pending),
                    customer_id: Some(order.customer_id),
                    include_deleted: false,
                })
                .await
                .unwrap();
            assert!(pending.is_empty());
        }

        #[tokio::test]
        #[ignore = "requires TEST_DATABASE_URL"]
        async fn test_concurrent_orders_cannot_oversell() {
            let app = app().await;
            let ring = app.product("Silver Ring", &unique_sku("RING"), dec!(50), 1).await;
            let command = || CreateOrder {
                customer_id: Uuid::new_v4(),
                items: vec![OrderLine { product_id: ring.id, quantity: 1 }],
                status: None,
                notes: None,
            };

            let (first, second) = tokio::join!(
                app.orders.create_order(command()),
                app.orders.create_order(command())
            );

            let results = [first, second];
            assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
            assert!(results
                .iter()
                .any(|r| matches!(r, Err(CommerceError::InsufficientStock { .. }))));
            assert_eq!(app.stock(ring.id).await, 0);
        }
    }
}
