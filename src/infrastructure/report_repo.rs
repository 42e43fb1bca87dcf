use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{OrderHeader, OrderStatus};
use crate::domain::ports::ReportRepository;
use crate::domain::report::{IndividualOrderRow, OrderFact, ReportRange, SaleFact};
use crate::schema::{items, order_items, orders, stores, users};

use super::models::OrderRow;

pub struct DieselReportRepository {
    pool: DbPool,
}

impl DieselReportRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ReportRepository for DieselReportRepository {
    fn order_facts(&self, range: &ReportRange, store_id: Option<Uuid>) -> Result<Vec<OrderFact>, DomainError> {
        let (from, to) = range.bounds()?;
        let mut conn = self.pool.get()?;

        let mut query = orders::table
            .inner_join(stores::table)
            .filter(orders::order_date.ge(from))
            .filter(orders::order_date.lt(to))
            .select((
                orders::order_date,
                orders::store_id,
                stores::name,
                orders::total_amount,
            ))
            .into_boxed();
        if let Some(store_id) = store_id {
            query = query.filter(orders::store_id.eq(store_id));
        }

        Ok(query
            .load::<(DateTime<Utc>, Uuid, String, BigDecimal)>(&mut conn)?
            .into_iter()
            .map(|(order_date, store_id, store_name, total_amount)| OrderFact {
                order_date,
                store_id,
                store_name,
                total_amount,
            })
            .collect())
    }

    fn sale_facts(&self, range: &ReportRange, store_id: Option<Uuid>) -> Result<Vec<SaleFact>, DomainError> {
        let (from, to) = range.bounds()?;
        let mut conn = self.pool.get()?;

        let mut query = order_items::table
            .inner_join(orders::table.inner_join(stores::table))
            .inner_join(items::table)
            .filter(orders::status.eq(OrderStatus::Approved.as_str()))
            .filter(orders::order_date.ge(from))
            .filter(orders::order_date.lt(to))
            .select((
                orders::order_date,
                orders::store_id,
                stores::name,
                order_items::item_id,
                items::name,
                order_items::quantity,
                order_items::price,
            ))
            .into_boxed();
        if let Some(store_id) = store_id {
            query = query.filter(orders::store_id.eq(store_id));
        }

        Ok(query
            .load::<(DateTime<Utc>, Uuid, String, Uuid, String, i32, BigDecimal)>(&mut conn)?
            .into_iter()
            .map(
                |(order_date, store_id, store_name, item_id, item_name, quantity, price)| SaleFact {
                    order_date,
                    store_id,
                    store_name,
                    item_id,
                    item_name,
                    quantity,
                    price,
                },
            )
            .collect())
    }

    fn individual_orders(
        &self,
        range: &ReportRange,
        store_id: Option<Uuid>,
    ) -> Result<Vec<IndividualOrderRow>, DomainError> {
        let (from, to) = range.bounds()?;
        let mut conn = self.pool.get()?;

        let mut query = orders::table
            .inner_join(users::table)
            .inner_join(stores::table)
            .filter(orders::order_date.ge(from))
            .filter(orders::order_date.lt(to))
            .select((
                OrderRow::as_select(),
                users::first_name,
                users::last_name,
                stores::name,
            ))
            .order((orders::order_date.asc(), orders::id.asc()))
            .into_boxed();
        if let Some(store_id) = store_id {
            query = query.filter(orders::store_id.eq(store_id));
        }

        query
            .load::<(OrderRow, String, String, String)>(&mut conn)?
            .into_iter()
            .map(|(row, first_name, last_name, store_name)| {
                let header = OrderHeader::try_from(row)?;
                Ok(IndividualOrderRow {
                    order_id: header.id,
                    customer_name: format!("{first_name} {last_name}"),
                    store_id: header.store_id,
                    store_name,
                    order_date: header.order_date,
                    total_amount: header.total_amount,
                    status: header.status,
                    address: header.address,
                    pincode: header.pincode,
                })
            })
            .collect()
    }
}
