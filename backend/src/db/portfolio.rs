use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{NewPortfolioItemRequest, PortfolioItem, UpdatePortfolioItemRequest};

const ITEM_COLUMNS: &str = "id, user_id, asset_name, asset_type, quantity, purchase_price, purchase_date, notes, created_at, updated_at";

pub async fn fetch_items(db: &SqlitePool, user_id: &str) -> Result<Vec<PortfolioItem>, sqlx::Error> {
    sqlx::query_as::<_, PortfolioItem>(&format!(
        r#"
        SELECT {ITEM_COLUMNS}
        FROM portfolio_items
        WHERE user_id = ?1
        ORDER BY purchase_date DESC, created_at DESC
        "#
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn find_item(db: &SqlitePool, user_id: &str, id: &str) -> Result<Option<PortfolioItem>, sqlx::Error> {
    sqlx::query_as::<_, PortfolioItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM portfolio_items WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn insert_item(
    db: &SqlitePool,
    user_id: &str,
    req: NewPortfolioItemRequest,
) -> Result<PortfolioItem, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO portfolio_items
            (id, user_id, asset_name, asset_type, quantity, purchase_price,
            purchase_date, notes, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(&req.asset_name)
    .bind(req.asset_type)
    .bind(req.quantity)
    .bind(req.purchase_price)
    .bind(&req.purchase_date)
    .bind(&req.notes)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(PortfolioItem {
        id,
        user_id: user_id.to_string(),
        asset_name: req.asset_name,
        asset_type: req.asset_type,
        quantity: req.quantity,
        purchase_price: req.purchase_price,
        purchase_date: req.purchase_date,
        notes: req.notes,
        created_at: now.clone(),
        updated_at: now,
    })
}

pub async fn update_item(
    db: &SqlitePool,
    user_id: &str,
    id: &str,
    req: UpdatePortfolioItemRequest,
) -> Result<Option<PortfolioItem>, sqlx::Error> {
    let mut current = match find_item(db, user_id, id).await? {
        Some(item) => item,
        None => return Ok(None),
    };

    if let Some(asset_name) = req.asset_name {
        current.asset_name = asset_name;
    }
    if let Some(asset_type) = req.asset_type {
        current.asset_type = asset_type;
    }
    if let Some(quantity) = req.quantity {
        current.quantity = quantity;
    }
    if let Some(purchase_price) = req.purchase_price {
        current.purchase_price = purchase_price;
    }
    if let Some(purchase_date) = req.purchase_date {
        current.purchase_date = purchase_date;
    }
    if let Some(notes) = req.notes {
        current.notes = Some(notes);
    }
    current.updated_at = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        UPDATE portfolio_items
        SET asset_name = ?1,
            asset_type = ?2,
            quantity = ?3,
            purchase_price = ?4,
            purchase_date = ?5,
            notes = ?6,
            updated_at = ?7
        WHERE id = ?8 AND user_id = ?9
        "#,
    )
    .bind(&current.asset_name)
    .bind(current.asset_type)
    .bind(current.quantity)
    .bind(current.purchase_price)
    .bind(&current.purchase_date)
    .bind(&current.notes)
    .bind(&current.updated_at)
    .bind(id)
    .bind(user_id)
    .execute(db)
    .await?;

    Ok(Some(current))
}

pub async fn delete_item(db: &SqlitePool, user_id: &str, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM portfolio_items WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
