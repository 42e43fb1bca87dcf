use std::collections::BTreeMap;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;
use super::order::OrderStatus;

/// Inclusive calendar-day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::InvalidInput(
                "startDate must not be after endDate".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    /// Half-open UTC instant bounds `[start 00:00, end+1 00:00)`.
    pub fn bounds(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), DomainError> {
        let end = self
            .end
            .succ_opt()
            .ok_or_else(|| DomainError::InvalidInput("endDate out of range".to_string()))?;
        Ok((
            self.start.and_time(NaiveTime::MIN).and_utc(),
            end.and_time(NaiveTime::MIN).and_utc(),
        ))
    }
}

/// One order as seen by the daily report.
#[derive(Debug, Clone)]
pub struct OrderFact {
    pub order_date: DateTime<Utc>,
    pub store_id: Uuid,
    pub store_name: String,
    pub total_amount: BigDecimal,
}

/// One line of an approved order as seen by the item-sales report.
#[derive(Debug, Clone)]
pub struct SaleFact {
    pub order_date: DateTime<Utc>,
    pub store_id: Uuid,
    pub store_name: String,
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity: i32,
    pub price: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyOrderRow {
    pub date: NaiveDate,
    pub store_id: Uuid,
    pub store_name: String,
    pub total_orders: i64,
    pub total_amount: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyItemSalesRow {
    pub date: NaiveDate,
    pub store_id: Uuid,
    pub store_name: String,
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity_sold: i64,
    pub total_sales: BigDecimal,
}

/// One order listed individually, whatever its status.
#[derive(Debug, Clone, PartialEq)]
pub struct IndividualOrderRow {
    pub order_id: Uuid,
    pub customer_name: String,
    pub store_id: Uuid,
    pub store_name: String,
    pub order_date: DateTime<Utc>,
    pub total_amount: BigDecimal,
    pub status: OrderStatus,
    pub address: String,
    pub pincode: String,
}

pub fn daily_orders(facts: impl IntoIterator<Item = OrderFact>) -> Vec<DailyOrderRow> {
    let mut groups: BTreeMap<(NaiveDate, Uuid), DailyOrderRow> = BTreeMap::new();
    for fact in facts {
        let date = fact.order_date.date_naive();
        let row = groups
            .entry((date, fact.store_id))
            .or_insert_with(|| DailyOrderRow {
                date,
                store_id: fact.store_id,
                store_name: fact.store_name.clone(),
                total_orders: 0,
                total_amount: BigDecimal::zero(),
            });
        row.total_orders += 1;
        row.total_amount += fact.total_amount;
    }
    groups.into_values().collect()
}

pub fn daily_item_sales(facts: impl IntoIterator<Item = SaleFact>) -> Vec<DailyItemSalesRow> {
    let mut groups: BTreeMap<(NaiveDate, Uuid, Uuid), DailyItemSalesRow> = BTreeMap::new();
    for fact in facts {
        let date = fact.order_date.date_naive();
        let sales = &fact.price * &BigDecimal::from(fact.quantity);
        let row = groups
            .entry((date, fact.store_id, fact.item_id))
            .or_insert_with(|| DailyItemSalesRow {
                date,
                store_id: fact.store_id,
                store_name: fact.store_name.clone(),
                item_id: fact.item_id,
                item_name: fact.item_name.clone(),
                quantity_sold: 0,
                total_sales: BigDecimal::zero(),
            });
        row.quantity_sold += i64::from(fact.quantity);
        row.total_sales += sales;
    }
    groups.into_values().collect()
}
