use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AssetType {
    Stock,
    Bond,
    MutualFund,
    Gold,
    Deposit,
    Crypto,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PortfolioItem {
    pub id: String,
    pub user_id: String,
    pub asset_name: String,
    pub asset_type: AssetType,
    pub quantity: f64,
    pub purchase_price: f64,
    pub purchase_date: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl PortfolioItem {
    pub fn invested_value(&self) -> f64 {
        self.quantity * self.purchase_price
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPortfolioItemRequest {
    pub asset_name: String,
    pub asset_type: AssetType,
    pub quantity: f64,
    pub purchase_price: f64,
    pub purchase_date: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePortfolioItemRequest {
    pub asset_name: Option<String>,
    pub asset_type: Option<AssetType>,
    pub quantity: Option<f64>,
    pub purchase_price: Option<f64>,
    pub purchase_date: Option<String>,
    pub notes: Option<String>,
}
