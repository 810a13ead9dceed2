use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::schema::orders;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub seq: i64,
    pub user_id: String,
    pub items: Value,
    pub address: Value,
    pub amount: BigDecimal,
    pub payment_method: String,
    pub payment: bool,
    pub status: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub user_id: String,
    pub items: Value,
    pub address: Value,
    pub amount: BigDecimal,
    pub payment_method: String,
    pub payment: bool,
    pub status: String,
    pub date: DateTime<Utc>,
}
