//! Order, funding and assistant request/response models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionType {
    Limit,
    Market,
}

/// Body of `POST /user/api/create_order`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderRequest {
    pub ticker: String,
    pub order_type: OrderSide,
    pub order_execution_type: ExecutionType,
    pub order_quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_price: Option<f64>,
}

/// Server verdict on an order. Business-rule rejections still arrive as 200.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderReceipt {
    pub status: Option<String>,
    pub order_status: Option<String>,
    pub message: Option<String>,
    pub order_id: Option<i64>,
}

/// Body of the deposit and withdraw endpoints
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FundRequest {
    pub amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FundReceipt {
    pub message: Option<String>,
    pub transaction_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub response: String,
}
