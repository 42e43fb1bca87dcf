use bigdecimal::{BigDecimal, Zero};
use uuid::Uuid;

use super::errors::DomainError;

/// A line as stored in the cart: the price is the snapshot taken when the
/// item was added.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub item_id: Uuid,
    pub quantity: i32,
    pub price: BigDecimal,
}

impl CartLine {
    pub fn line_total(&self) -> BigDecimal {
        &self.price * &BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone)]
pub struct CartLineView {
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity: i32,
    pub price: BigDecimal,
    pub line_total: BigDecimal,
}

/// Current catalogue state of an item, as needed by cart and order checks.
#[derive(Debug, Clone)]
pub struct ItemStock {
    pub id: Uuid,
    pub name: String,
    pub stock: i32,
}

#[derive(Debug, Clone)]
pub struct QuantityUpdate {
    pub item_id: Uuid,
    pub quantity: i32,
    pub price: BigDecimal,
    pub line_total: BigDecimal,
    pub cart_total: BigDecimal,
    pub changed: bool,
}

/// Prices are stored as NUMERIC(18, 2); larger values leave room for order totals.
const MAX_PRICE_DIGITS: i64 = 12;

pub fn validate_new_line(quantity: i32, price: &BigDecimal) -> Result<(), DomainError> {
    if quantity <= 0 || price <= &BigDecimal::zero() {
        return Err(DomainError::InvalidInput(
            "Quantity and Price must be positive.".to_string(),
        ));
    }
    let (digits, scale) = price.normalized().as_bigint_and_exponent();
    let integer_digits = digits.to_string().len() as i64 - scale;
    if scale > 2 || integer_digits > MAX_PRICE_DIGITS {
        return Err(DomainError::InvalidInput(format!(
            "Price must have at most 2 decimal places and {MAX_PRICE_DIGITS} integer digits."
        )));
    }
    Ok(())
}

pub fn ensure_in_stock(item: &ItemStock, requested: i32) -> Result<(), DomainError> {
    if requested > item.stock {
        return Err(DomainError::InsufficientStock {
            item: item.name.clone(),
            available: item.stock,
            requested,
        });
    }
    Ok(())
}

/// One step up, never beyond the available stock.
pub fn incremented(current: i32, stock: i32) -> i32 {
    if current < stock {
        current + 1
    } else {
        current
    }
}

/// One step down, never below one.
pub fn decremented(current: i32) -> i32 {
    if current > 1 {
        current - 1
    } else {
        current
    }
}

/// Clamps to `[1, stock]`. An item that is out of stock cannot be set at all.
pub fn clamp_quantity(item: &ItemStock, requested: i32) -> Result<i32, DomainError> {
    if item.stock < 1 {
        return Err(DomainError::InsufficientStock {
            item: item.name.clone(),
            available: item.stock,
            requested,
        });
    }
    Ok(requested.clamp(1, item.stock))
}

pub fn cart_total<'a>(lines: impl IntoIterator<Item = &'a CartLine>) -> BigDecimal {
    lines
        .into_iter()
        .fold(BigDecimal::zero(), |acc, line| acc + line.line_total())
}
