use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::cart::CartLine;
use crate::domain::errors::DomainError;
use crate::domain::notification::{Recipient, StoreContact};
use crate::domain::order::OrderHeader;
use crate::schema::{cart_items, carts, order_items, orders, stores, users};

#[derive(Debug, Insertable)]
#[diesel(table_name = carts)]
pub struct NewCartRow {
    pub id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = cart_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CartItemRow {
    pub cart_id: Uuid,
    pub item_id: Uuid,
    pub quantity: i32,
    pub price: BigDecimal,
}

impl From<CartItemRow> for CartLine {
    fn from(row: CartItemRow) -> Self {
        CartLine {
            item_id: row.item_id,
            quantity: row.quantity,
            price: row.price,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub store_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub total_amount: BigDecimal,
    pub status: String,
    pub address: String,
    pub pincode: String,
}

impl TryFrom<OrderRow> for OrderHeader {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(OrderHeader {
            id: row.id,
            user_id: row.user_id,
            store_id: row.store_id,
            order_date: row.order_date,
            total_amount: row.total_amount,
            status: row.status.parse()?,
            address: row.address,
            pincode: row.pincode,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub store_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub total_amount: BigDecimal,
    pub status: String,
    pub address: String,
    pub pincode: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub item_id: Uuid,
    pub quantity: i32,
    pub price: BigDecimal,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RecipientRow {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<RecipientRow> for Recipient {
    fn from(row: RecipientRow) -> Self {
        Recipient {
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = stores)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StoreContactRow {
    pub name: String,
    pub email: String,
    pub contact_number: String,
}

impl From<StoreContactRow> for StoreContact {
    fn from(row: StoreContactRow) -> Self {
        StoreContact {
            name: row.name,
            email: row.email,
            contact_number: row.contact_number,
        }
    }
}
