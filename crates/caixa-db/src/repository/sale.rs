//! # Sale Repository
//!
//! Records finalized sales and reads them back.
//!
//! ## Recording a Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    record_sale(&SaleDraft)                              │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │   │                                                                     │
//! │   ├── next receipt number for today  (YYYYMMDD-HHMMSS-NNNN)            │
//! │   ├── INSERT INTO sales                                                │
//! │   │                                                                     │
//! │   ├── for each line:                                                   │
//! │   │     UPDATE products SET stock = stock - qty                        │
//! │   │       WHERE id = ? AND stock >= qty    ── 0 rows? ──► ROLLBACK     │
//! │   │     INSERT INTO sale_items (snapshot of name/price)                │
//! │   │                                                                     │
//! │  COMMIT                                                                │
//! │                                                                         │
//! │  Any failure drops the transaction: no sale, no items, stock intact.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use caixa_core::{CartLine, Money, Sale, SaleDraft, SaleItem};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a finalized cart as a sale, atomically.
    ///
    /// ## Returns
    /// * `Ok(Sale)` - The stored sale with its receipt number
    /// * `Err(DbError::Invalid)` - Empty draft or total not matching its lines
    /// * `Err(DbError::InsufficientStock)` - A line wants more than the catalog holds
    /// * `Err(DbError::NotFound)` - A line's product is not in the catalog
    pub async fn record_sale(&self, draft: &SaleDraft) -> DbResult<Sale> {
        check_draft(draft)?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let receipt_number = next_receipt_number(&mut tx, now).await?;
        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            receipt_number,
            total_cents: draft.total.cents(),
            item_count: draft.lines.len() as i64,
            created_at: now,
        };

        debug!(id = %sale.id, receipt_number = %sale.receipt_number, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (id, receipt_number, total_cents, item_count, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.receipt_number)
        .bind(sale.total_cents)
        .bind(sale.item_count)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        for (position, line) in draft.lines.iter().enumerate() {
            decrement_stock(&mut tx, line, now).await?;
            insert_item(&mut tx, &sale.id, position, line).await?;
        }

        tx.commit().await?;

        info!(
            receipt_number = %sale.receipt_number,
            total = %sale.total(),
            lines = sale.item_count,
            "Sale recorded"
        );

        Ok(sale)
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, receipt_number, total_cents, item_count, created_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets all items for a sale, in cart order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT
                id,
                sale_id,
                product_id,
                name_snapshot,
                unit_price_cents,
                quantity,
                line_total_cents
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY position
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Most recent sales first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, receipt_number, total_cents, item_count, created_at
            FROM sales
            ORDER BY created_at DESC, receipt_number DESC
            LIMIT ?1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Counts recorded sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Transaction Steps
// =============================================================================

fn check_draft(draft: &SaleDraft) -> DbResult<()> {
    if draft.lines.is_empty() {
        return Err(DbError::Invalid {
            entity: "Sale".to_string(),
            reason: "a sale needs at least one line".to_string(),
        });
    }

    let lines_total = draft
        .lines
        .iter()
        .try_fold(Money::zero(), |acc, line| {
            acc.checked_add(line.unit_price().checked_mul(line.quantity)?)
        })
        .ok_or_else(|| DbError::Invalid {
            entity: "Sale".to_string(),
            reason: "line totals exceed the largest storable amount".to_string(),
        })?;
    if lines_total != draft.total {
        return Err(DbError::Invalid {
            entity: "Sale".to_string(),
            reason: format!(
                "total {} does not match the sum of its lines {}",
                draft.total, lines_total
            ),
        });
    }

    Ok(())
}

/// Guarded decrement: never takes stock below zero.
async fn decrement_stock(
    tx: &mut Transaction<'_, Sqlite>,
    line: &CartLine,
    now: DateTime<Utc>,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET stock = stock - ?2, updated_at = ?3
        WHERE id = ?1 AND stock >= ?2
        "#,
    )
    .bind(line.product_id())
    .bind(line.quantity)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 1 {
        return Ok(());
    }

    let exists: Option<String> = sqlx::query_scalar("SELECT id FROM products WHERE id = ?1")
        .bind(line.product_id())
        .fetch_optional(&mut **tx)
        .await?;

    if exists.is_none() {
        return Err(DbError::not_found("Product", line.product_id()));
    }

    warn!(
        product_id = %line.product_id(),
        requested = line.quantity,
        "Stock changed under an open cart"
    );

    Err(DbError::InsufficientStock {
        product_id: line.product_id().to_string(),
        requested: line.quantity,
    })
}

async fn insert_item(
    tx: &mut Transaction<'_, Sqlite>,
    sale_id: &str,
    position: usize,
    line: &CartLine,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sale_items (
            id, sale_id, product_id, position,
            name_snapshot, unit_price_cents, quantity, line_total_cents
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(sale_id)
    .bind(line.product_id())
    .bind(position as i64)
    .bind(&line.product.name)
    .bind(line.unit_price().cents())
    .bind(line.quantity)
    .bind(line.line_total().cents())
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Next receipt number: `YYYYMMDD-HHMMSS-NNNN`, where NNNN counts the sales
/// of the day. Runs inside the recording transaction, so numbers stay
/// unique on a single register.
async fn next_receipt_number(
    tx: &mut Transaction<'_, Sqlite>,
    now: DateTime<Utc>,
) -> DbResult<String> {
    let day = now.format("%Y%m%d").to_string();

    let today: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE receipt_number LIKE ?1")
        .bind(format!("{}-%", day))
        .fetch_one(&mut **tx)
        .await?;

    Ok(format_receipt_number(now, today + 1))
}

fn format_receipt_number(now: DateTime<Utc>, sequence: i64) -> String {
    format!("{}-{:04}", now.format("%Y%m%d-%H%M%S"), sequence)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::product::generate_product_id;
    use crate::{Database, DbConfig};
    use caixa_core::{Cart, Product};
    use chrono::TimeZone;

    async fn db_with(products: &[(&str, i64, i64)]) -> (Database, Vec<Product>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut stored = Vec::new();
        for (name, price, stock) in products {
            let p = Product::new(generate_product_id(), *name, Money::from_cents(*price), *stock);
            stored.push(db.products().insert(&p).await.unwrap());
        }
        (db, stored)
    }

    #[tokio::test]
    async fn test_record_sale_persists_and_decrements_stock() {
        let (db, products) = db_with(&[("Café 500g", 1000, 2), ("Leite 1L", 549, 10)]).await;

        let mut cart = Cart::new();
        cart.add_product(&products[0]).unwrap();
        cart.add_product(&products[0]).unwrap();
        cart.add_product(&products[1]).unwrap();
        let draft = cart.checkout().unwrap();

        let sale = db.sales().record_sale(&draft).await.unwrap();
        assert_eq!(sale.total_cents, 2549);
        assert_eq!(sale.item_count, 2);
        assert!(sale.receipt_number.ends_with("-0001"));

        let items = db.sales().get_items(&sale.id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name_snapshot, "Café 500g");
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].line_total_cents, 2000);
        assert_eq!(items[1].product_id, products[1].id);

        let cafe = db.products().get_by_id(&products[0].id).await.unwrap().unwrap();
        let leite = db.products().get_by_id(&products[1].id).await.unwrap().unwrap();
        assert_eq!(cafe.stock, 0);
        assert_eq!(leite.stock, 9);

        let loaded = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(loaded.receipt_number, sale.receipt_number);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_everything() {
        let (db, products) = db_with(&[("Leite 1L", 549, 10), ("Café 500g", 1000, 2)]).await;

        let mut cart = Cart::new();
        cart.add_product(&products[0]).unwrap();
        cart.add_product(&products[1]).unwrap();
        cart.add_product(&products[1]).unwrap();
        let draft = cart.checkout().unwrap();

        // Another register sold one café after it went into this cart
        db.products().set_stock(&products[1].id, 1).await.unwrap();

        let err = db.sales().record_sale(&draft).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::InsufficientStock { requested: 2, .. }
        ));

        assert_eq!(db.sales().count().await.unwrap(), 0);
        let leite = db.products().get_by_id(&products[0].id).await.unwrap().unwrap();
        assert_eq!(leite.stock, 10);
    }

    #[tokio::test]
    async fn test_unknown_product_is_not_found() {
        let (db, _) = db_with(&[]).await;

        let ghost = Product::new(generate_product_id(), "Fantasma", Money::from_cents(100), 5);
        let mut cart = Cart::new();
        cart.add_product(&ghost).unwrap();

        let err = db.sales().record_sale(&cart.checkout().unwrap()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rejects_inconsistent_draft() {
        let (db, products) = db_with(&[("Pão", 75, 20)]).await;

        let mut cart = Cart::new();
        cart.add_product(&products[0]).unwrap();
        let mut draft = cart.checkout().unwrap();
        draft.total = Money::from_cents(1);

        assert!(matches!(
            db.sales().record_sale(&draft).await,
            Err(DbError::Invalid { .. })
        ));

        let empty = SaleDraft {
            lines: Vec::new(),
            total: Money::zero(),
        };
        assert!(matches!(
            db.sales().record_sale(&empty).await,
            Err(DbError::Invalid { .. })
        ));
    }

    #[tokio::test]
    async fn test_rejects_draft_whose_total_overflows() {
        let (db, _) = db_with(&[]).await;

        let huge = Product::new(
            generate_product_id(),
            "Ouro 1kg",
            Money::from_cents(i64::MAX / 2 + 1),
            3,
        );
        let draft = SaleDraft {
            lines: vec![CartLine {
                product: huge,
                quantity: 3,
            }],
            total: Money::from_cents(i64::MAX),
        };

        let err = db.sales().record_sale(&draft).await.unwrap_err();
        assert!(matches!(err, DbError::Invalid { .. }));
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_receipt_numbers_are_sequential() {
        let (db, products) = db_with(&[("Pão", 75, 20)]).await;

        let mut cart = Cart::new();
        cart.add_product(&products[0]).unwrap();
        let draft = cart.checkout().unwrap();

        let first = db.sales().record_sale(&draft).await.unwrap();
        let second = db.sales().record_sale(&draft).await.unwrap();

        assert!(first.receipt_number.ends_with("-0001"));
        assert!(second.receipt_number.ends_with("-0002"));

        let recent = db.sales().list_recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, second.id);
    }

    #[test]
    fn test_format_receipt_number() {
        let at = Utc.with_ymd_and_hms(2026, 3, 7, 9, 5, 30).unwrap();
        assert_eq!(format_receipt_number(at, 12), "20260307-090530-0012");
    }
}
