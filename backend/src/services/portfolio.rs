use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::db::portfolio;
use crate::error::AppError;
use crate::models::{AssetType, NewPortfolioItemRequest, PortfolioItem, UpdatePortfolioItemRequest};

#[derive(Debug, Clone, Serialize)]
pub struct AssetAllocation {
    pub asset_type: AssetType,
    pub invested: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSummary {
    pub item_count: usize,
    pub total_invested: f64,
    pub allocations: Vec<AssetAllocation>,
}

pub struct PortfolioService {
    db: SqlitePool,
}

fn check_positive(field: &str, value: f64) -> Result<(), AppError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AppError::BadRequest(format!("{} must be a positive number", field)));
    }
    Ok(())
}

fn check_date(value: &str) -> Result<(), AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| AppError::BadRequest(format!("purchase_date must be YYYY-MM-DD, got {}", value)))
}

fn check_name(value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest("asset_name must not be empty".to_string()));
    }
    Ok(())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Invested value per asset type, largest first.
pub fn summarize(items: &[PortfolioItem]) -> PortfolioSummary {
    let total_invested: f64 = items.iter().map(PortfolioItem::invested_value).sum();

    let mut by_type: HashMap<AssetType, f64> = HashMap::new();
    for item in items {
        *by_type.entry(item.asset_type).or_default() += item.invested_value();
    }

    let mut allocations: Vec<AssetAllocation> = by_type
        .into_iter()
        .map(|(asset_type, invested)| AssetAllocation {
            asset_type,
            invested: round2(invested),
            percentage: if total_invested > 0.0 {
                round2(invested / total_invested * 100.0)
            } else {
                0.0
            },
        })
        .collect();
    allocations.sort_by(|a, b| b.invested.total_cmp(&a.invested));

    PortfolioSummary {
        item_count: items.len(),
        total_invested: round2(total_invested),
        allocations,
    }
}

impl PortfolioService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<PortfolioItem>, AppError> {
        Ok(portfolio::fetch_items(&self.db, user_id).await?)
    }

    pub async fn summary(&self, user_id: &str) -> Result<PortfolioSummary, AppError> {
        let items = portfolio::fetch_items(&self.db, user_id).await?;
        Ok(summarize(&items))
    }

    pub async fn create(&self, user_id: &str, req: NewPortfolioItemRequest) -> Result<PortfolioItem, AppError> {
        check_name(&req.asset_name)?;
        check_positive("quantity", req.quantity)?;
        check_positive("purchase_price", req.purchase_price)?;
        check_date(&req.purchase_date)?;

        let item = portfolio::insert_item(&self.db, user_id, req).await?;
        info!(user_id, item_id = %item.id, "portfolio item added");
        Ok(item)
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        req: UpdatePortfolioItemRequest,
    ) -> Result<PortfolioItem, AppError> {
        if let Some(name) = &req.asset_name {
            check_name(name)?;
        }
        if let Some(quantity) = req.quantity {
            check_positive("quantity", quantity)?;
        }
        if let Some(price) = req.purchase_price {
            check_positive("purchase_price", price)?;
        }
        if let Some(date) = &req.purchase_date {
            check_date(date)?;
        }

        portfolio::update_item(&self.db, user_id, id, req)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> Result<(), AppError> {
        if portfolio::delete_item(&self.db, user_id, id).await? {
            info!(user_id, item_id = id, "portfolio item removed");
            Ok(())
        } else {
            Err(AppError::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn item(asset_type: AssetType, quantity: f64, price: f64) -> PortfolioItem {
        PortfolioItem {
            id: "x".to_string(),
            user_id: "u".to_string(),
            asset_name: "aset".to_string(),
            asset_type,
            quantity,
            purchase_price: price,
            purchase_date: "2026-01-01".to_string(),
            notes: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_summarize_groups_by_type() {
        let items = vec![
            item(AssetType::Stock, 10.0, 300.0),
            item(AssetType::Gold, 1.0, 1_000.0),
            item(AssetType::Stock, 20.0, 150.0),
        ];

        let summary = summarize(&items);
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.total_invested, 7_000.0);
        assert_eq!(summary.allocations[0].asset_type, AssetType::Stock);
        assert_eq!(summary.allocations[0].invested, 6_000.0);
        assert_eq!(summary.allocations[0].percentage, 85.71);
        assert_eq!(summary.allocations[1].percentage, 14.29);
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_invested, 0.0);
        assert!(summary.allocations.is_empty());
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let service = PortfolioService::new(test_pool().await);
        let req = NewPortfolioItemRequest {
            asset_name: "ANTM".to_string(),
            asset_type: AssetType::Gold,
            quantity: 0.0,
            purchase_price: 1_200_000.0,
            purchase_date: "2026-02-10".to_string(),
            notes: None,
        };
        assert!(matches!(service.create("u", req.clone()).await, Err(AppError::BadRequest(_))));

        let bad_date = NewPortfolioItemRequest {
            quantity: 2.0,
            purchase_date: "10/02/2026".to_string(),
            ..req.clone()
        };
        assert!(matches!(service.create("u", bad_date).await, Err(AppError::BadRequest(_))));

        let ok = NewPortfolioItemRequest { quantity: 2.0, ..req };
        let created = service.create("u", ok).await.unwrap();
        assert_eq!(service.summary("u").await.unwrap().total_invested, 2_400_000.0);

        service.delete("u", &created.id).await.unwrap();
        assert!(service.list("u").await.unwrap().is_empty());
    }
}
