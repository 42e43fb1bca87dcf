use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::cart::{self, CartLine, ItemStock};
use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Approved,
    Rejected,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Approved => "Approved",
            OrderStatus::Rejected => "Rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(OrderStatus::Pending),
            "Approved" => Ok(OrderStatus::Approved),
            "Rejected" => Ok(OrderStatus::Rejected),
            other => Err(DomainError::Internal(format!(
                "unknown order status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlaceOrderInput {
    pub store_id: Uuid,
    pub address: String,
    pub pincode: String,
}

impl PlaceOrderInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        let address_len = self.address.trim().chars().count();
        if !(5..=200).contains(&address_len) {
            return Err(DomainError::InvalidInput(
                "Address must be between 5 and 200 characters".to_string(),
            ));
        }
        if self.pincode.len() != 6 || !self.pincode.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::InvalidInput(
                "Pincode must be exactly 6 digits".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order_id: Uuid,
    pub total_amount: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderHeader {
    pub id: Uuid,
    pub user_id: Uuid,
    pub store_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
    pub address: String,
    pub pincode: String,
}

#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity: i32,
    pub price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub header: OrderHeader,
    pub customer_name: String,
    pub store_name: String,
    pub lines: Vec<OrderLineView>,
}

/// Which orders a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    Customer(Uuid),
    Store(Uuid),
    All,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StockDecrement {
    pub item_id: Uuid,
    pub quantity: i32,
    pub remaining: i32,
}

/// Everything the persistence layer has to write to turn a cart into an
/// order. Built only once every line has passed the stock check.
#[derive(Debug, Clone)]
pub struct Placement {
    pub lines: Vec<CartLine>,
    pub decrements: Vec<StockDecrement>,
    pub total: BigDecimal,
}

pub fn ensure_not_empty(lines: &[CartLine]) -> Result<(), DomainError> {
    if lines.is_empty() {
        return Err(DomainError::InvalidState(
            "Cart is empty. Cannot place an order with no items.".to_string(),
        ));
    }
    Ok(())
}

/// Re-checks each cart line against the current stock and computes the
/// order total from the cart's price snapshots.
pub fn plan_placement(lines: Vec<CartLine>, stock: &[ItemStock]) -> Result<Placement, DomainError> {
    ensure_not_empty(&lines)?;

    let mut decrements = Vec::with_capacity(lines.len());
    for line in &lines {
        let item = stock
            .iter()
            .find(|i| i.id == line.item_id)
            .ok_or_else(|| DomainError::NotFound(format!("Item with ID {} not found.", line.item_id)))?;
        cart::ensure_in_stock(item, line.quantity)?;
        decrements.push(StockDecrement {
            item_id: item.id,
            quantity: line.quantity,
            remaining: item.stock - line.quantity,
        });
    }

    let total = cart::cart_total(&lines);
    Ok(Placement {
        lines,
        decrements,
        total,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Apply,
    Unchanged,
}

/// Pending orders move to the requested status; re-applying the current
/// status is a no-op; a decided order cannot flip.
pub fn review(current: OrderStatus, target: OrderStatus) -> Result<Transition, DomainError> {
    if current == target {
        return Ok(Transition::Unchanged);
    }
    if current.is_terminal() {
        return Err(DomainError::InvalidState(format!(
            "Order is already {current}."
        )));
    }
    Ok(Transition::Apply)
}

pub fn render_bill(order: &OrderHeader) -> String {
    format!(
        "Bill for Order ID: {}\nUser ID: {}\nStore ID: {}\nOrder Date: {}\nTotal Amount: {}\n",
        order.id,
        order.user_id,
        order.store_id,
        order.order_date.format("%Y-%m-%d %H:%M"),
        order.total_amount.with_scale(2),
    )
}
