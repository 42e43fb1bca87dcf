use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::caller::Role;
use crate::domain::cart::{CartLine, ItemStock};
use crate::domain::errors::DomainError;
use crate::domain::notification::{OrderSummary, Recipient};
use crate::domain::order::{
    self, OrderHeader, OrderLineView, OrderScope, OrderStatus, OrderView, PlaceOrderInput,
    PlacedOrder,
};
use crate::domain::ports::OrderRepository;
use crate::schema::{cart_items, carts, items, order_items, orders, stores, users};

use super::models::{
    CartItemRow, NewOrderItemRow, NewOrderRow, OrderRow, RecipientRow, StoreContactRow,
};

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

enum ViewFilter {
    Scope(OrderScope),
    Order(Uuid),
}

/// Loads orders with customer name, store name and lines, newest first.
fn load_views(conn: &mut PgConnection, filter: ViewFilter) -> Result<Vec<OrderView>, DomainError> {
    let mut query = orders::table
        .inner_join(users::table)
        .inner_join(stores::table)
        .select((
            OrderRow::as_select(),
            users::first_name,
            users::last_name,
            stores::name,
        ))
        .order(orders::order_date.desc())
        .into_boxed();
    query = match filter {
        ViewFilter::Scope(OrderScope::Customer(user_id)) => query.filter(orders::user_id.eq(user_id)),
        ViewFilter::Scope(OrderScope::Store(store_id)) => query.filter(orders::store_id.eq(store_id)),
        ViewFilter::Scope(OrderScope::All) => query,
        ViewFilter::Order(order_id) => query.filter(orders::id.eq(order_id)),
    };
    let rows = query.load::<(OrderRow, String, String, String)>(conn)?;

    let order_ids: Vec<Uuid> = rows.iter().map(|(o, ..)| o.id).collect();
    let mut lines_by_order: HashMap<Uuid, Vec<OrderLineView>> = HashMap::new();
    for (order_id, item_id, item_name, quantity, price) in order_items::table
        .inner_join(items::table)
        .filter(order_items::order_id.eq_any(order_ids))
        .order(items::name.asc())
        .select((
            order_items::order_id,
            order_items::item_id,
            items::name,
            order_items::quantity,
            order_items::price,
        ))
        .load::<(Uuid, Uuid, String, i32, BigDecimal)>(conn)?
    {
        lines_by_order.entry(order_id).or_default().push(OrderLineView {
            item_id,
            item_name,
            quantity,
            price,
        });
    }

    rows.into_iter()
        .map(|(row, first_name, last_name, store_name)| {
            let lines = lines_by_order.remove(&row.id).unwrap_or_default();
            Ok(OrderView {
                header: OrderHeader::try_from(row)?,
                customer_name: format!("{first_name} {last_name}"),
                store_name,
                lines,
            })
        })
        .collect()
}

fn active_admins(
    conn: &mut PgConnection,
    role: Role,
    store_id: Option<Uuid>,
) -> Result<Vec<Recipient>, DomainError> {
    let mut query = users::table
        .filter(users::is_active.eq(true))
        .filter(users::role.eq(role.as_str()))
        .order(users::email.asc())
        .select(RecipientRow::as_select())
        .into_boxed();
    if let Some(store_id) = store_id {
        query = query.filter(users::store_id.eq(store_id));
    }
    Ok(query
        .load(conn)?
        .into_iter()
        .map(Recipient::from)
        .collect())
}

impl OrderRepository for DieselOrderRepository {
    fn place(&self, user_id: Uuid, input: &PlaceOrderInput) -> Result<PlacedOrder, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let cart_id: Uuid = carts::table
                .filter(carts::user_id.eq(user_id))
                .select(carts::id)
                .for_update()
                .first(conn)
                .optional()?
                .ok_or_else(|| DomainError::not_found("Cart"))?;

            let lines: Vec<CartLine> = cart_items::table
                .filter(cart_items::cart_id.eq(cart_id))
                .select(CartItemRow::as_select())
                .load(conn)?
                .into_iter()
                .map(CartLine::from)
                .collect();
            order::ensure_not_empty(&lines)?;

            let store_exists = stores::table
                .filter(stores::id.eq(input.store_id))
                .select(stores::id)
                .first::<Uuid>(conn)
                .optional()?
                .is_some();
            if !store_exists {
                return Err(DomainError::not_found("Store"));
            }

            // Locks are taken in id order so concurrent checkouts cannot deadlock.
            let item_ids: Vec<Uuid> = lines.iter().map(|l| l.item_id).collect();
            let stock: Vec<ItemStock> = items::table
                .filter(items::id.eq_any(item_ids))
                .filter(items::is_deleted.eq(false))
                .order(items::id.asc())
                .select((items::id, items::name, items::quantity))
                .for_update()
                .load::<(Uuid, String, i32)>(conn)?
                .into_iter()
                .map(|(id, name, stock)| ItemStock { id, name, stock })
                .collect();

            let plan = order::plan_placement(lines, &stock)?;

            for decrement in &plan.decrements {
                let updated = diesel::update(
                    items::table
                        .filter(items::id.eq(decrement.item_id))
                        .filter(items::quantity.ge(decrement.quantity)),
                )
                .set(items::quantity.eq(items::quantity - decrement.quantity))
                .execute(conn)?;
                if updated == 0 {
                    return Err(DomainError::InvalidState(format!(
                        "Stock for item {} changed during checkout.",
                        decrement.item_id
                    )));
                }
            }

            let order_id = Uuid::new_v4();
            diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order_id,
                    user_id,
                    store_id: input.store_id,
                    order_date: Utc::now(),
                    total_amount: plan.total.clone(),
                    status: OrderStatus::Pending.as_str().to_string(),
                    address: input.address.trim().to_string(),
                    pincode: input.pincode.clone(),
                })
                .execute(conn)?;

            let new_lines: Vec<NewOrderItemRow> = plan
                .lines
                .iter()
                .map(|l| NewOrderItemRow {
                    id: Uuid::new_v4(),
                    order_id,
                    item_id: l.item_id,
                    quantity: l.quantity,
                    price: l.price.clone(),
                })
                .collect();
            diesel::insert_into(order_items::table)
                .values(&new_lines)
                .execute(conn)?;

            diesel::delete(cart_items::table.filter(cart_items::cart_id.eq(cart_id))).execute(conn)?;
            diesel::delete(carts::table.filter(carts::id.eq(cart_id))).execute(conn)?;

            Ok(PlacedOrder {
                order_id,
                total_amount: plan.total,
            })
        })
    }

    fn find(&self, order_id: Uuid) -> Result<Option<OrderHeader>, DomainError> {
        let mut conn = self.pool.get()?;
        orders::table
            .filter(orders::id.eq(order_id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(OrderHeader::try_from)
            .transpose()
    }

    fn transition(&self, order_id: Uuid, from: OrderStatus, to: OrderStatus) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(
            orders::table
                .filter(orders::id.eq(order_id))
                .filter(orders::status.eq(from.as_str())),
        )
        .set(orders::status.eq(to.as_str()))
        .execute(&mut conn)?;
        Ok(updated > 0)
    }

    fn delete(&self, order_id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            diesel::delete(order_items::table.filter(order_items::order_id.eq(order_id)))
                .execute(conn)?;
            let removed = diesel::delete(orders::table.filter(orders::id.eq(order_id))).execute(conn)?;
            Ok(removed > 0)
        })
    }

    fn list(&self, scope: OrderScope) -> Result<Vec<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;
        load_views(&mut conn, ViewFilter::Scope(scope))
    }

    fn summary(&self, order_id: Uuid) -> Result<Option<OrderSummary>, DomainError> {
        let mut conn = self.pool.get()?;
        let Some(order) = load_views(&mut conn, ViewFilter::Order(order_id))?.pop() else {
            return Ok(None);
        };

        let customer = users::table
            .filter(users::id.eq(order.header.user_id))
            .select(RecipientRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Recipient::from);
        let store = stores::table
            .filter(stores::id.eq(order.header.store_id))
            .select(StoreContactRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Into::into);

        Ok(Some(OrderSummary {
            order,
            customer,
            store,
        }))
    }

    fn admin_recipients(&self, store_id: Uuid) -> Result<Vec<Recipient>, DomainError> {
        let mut conn = self.pool.get()?;
        let mut recipients = active_admins(&mut conn, Role::StoreAdmin, Some(store_id))?;
        recipients.extend(active_admins(&mut conn, Role::SuperAdmin, None)?);
        Ok(recipients)
    }
}
