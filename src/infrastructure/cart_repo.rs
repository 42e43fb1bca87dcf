use bigdecimal::BigDecimal;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::upsert::excluded;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::{CartLine, CartLineView, ItemStock};
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;
use crate::schema::{cart_items, carts, items};

use super::models::{CartItemRow, NewCartRow};

pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Returns the user's cart id, creating the cart when there is none.
/// Concurrent callers converge on the same row through the unique user_id.
fn ensure_cart(conn: &mut PgConnection, user_id: Uuid) -> Result<Uuid, DomainError> {
    diesel::insert_into(carts::table)
        .values(&NewCartRow {
            id: Uuid::new_v4(),
            user_id,
        })
        .on_conflict(carts::user_id)
        .do_nothing()
        .execute(conn)?;

    Ok(carts::table
        .filter(carts::user_id.eq(user_id))
        .select(carts::id)
        .first(conn)?)
}

impl CartRepository for DieselCartRepository {
    fn find_item(&self, item_id: Uuid) -> Result<Option<ItemStock>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = items::table
            .filter(items::id.eq(item_id))
            .filter(items::is_deleted.eq(false))
            .select((items::id, items::name, items::quantity))
            .first::<(Uuid, String, i32)>(&mut conn)
            .optional()?;
        Ok(row.map(|(id, name, stock)| ItemStock { id, name, stock }))
    }

    fn find_cart(&self, user_id: Uuid) -> Result<Option<Uuid>, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(carts::table
            .filter(carts::user_id.eq(user_id))
            .select(carts::id)
            .first(&mut conn)
            .optional()?)
    }

    fn create_cart(&self, user_id: Uuid) -> Result<Uuid, DomainError> {
        let mut conn = self.pool.get()?;
        let cart_id = Uuid::new_v4();
        let inserted = diesel::insert_into(carts::table)
            .values(&NewCartRow {
                id: cart_id,
                user_id,
            })
            .on_conflict(carts::user_id)
            .do_nothing()
            .execute(&mut conn)?;
        if inserted == 0 {
            return Err(DomainError::Conflict(
                "Cart already exists for this user.".to_string(),
            ));
        }
        Ok(cart_id)
    }

    fn upsert_line(&self, user_id: Uuid, line: CartLine) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let cart_id = ensure_cart(conn, user_id)?;
            diesel::insert_into(cart_items::table)
                .values(&CartItemRow {
                    cart_id,
                    item_id: line.item_id,
                    quantity: line.quantity,
                    price: line.price,
                })
                .on_conflict((cart_items::cart_id, cart_items::item_id))
                .do_update()
                .set((
                    cart_items::quantity.eq(excluded(cart_items::quantity)),
                    cart_items::price.eq(excluded(cart_items::price)),
                ))
                .execute(conn)?;
            Ok(())
        })
    }

    fn find_line(&self, cart_id: Uuid, item_id: Uuid) -> Result<Option<CartLine>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = cart_items::table
            .filter(cart_items::cart_id.eq(cart_id))
            .filter(cart_items::item_id.eq(item_id))
            .select(CartItemRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(CartLine::from))
    }

    fn set_line_quantity(&self, cart_id: Uuid, item_id: Uuid, quantity: i32) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(
            cart_items::table
                .filter(cart_items::cart_id.eq(cart_id))
                .filter(cart_items::item_id.eq(item_id)),
        )
        .set(cart_items::quantity.eq(quantity))
        .execute(&mut conn)?;
        Ok(updated > 0)
    }

    fn remove_line(&self, cart_id: Uuid, item_id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let removed = diesel::delete(
            cart_items::table
                .filter(cart_items::cart_id.eq(cart_id))
                .filter(cart_items::item_id.eq(item_id)),
        )
        .execute(&mut conn)?;
        Ok(removed > 0)
    }

    fn lines(&self, cart_id: Uuid) -> Result<Vec<CartLine>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = cart_items::table
            .filter(cart_items::cart_id.eq(cart_id))
            .select(CartItemRow::as_select())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(CartLine::from).collect())
    }

    fn line_views(&self, cart_id: Uuid) -> Result<Vec<CartLineView>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = cart_items::table
            .inner_join(items::table)
            .filter(cart_items::cart_id.eq(cart_id))
            .order(items::name.asc())
            .select((
                cart_items::item_id,
                items::name,
                cart_items::quantity,
                cart_items::price,
            ))
            .load::<(Uuid, String, i32, BigDecimal)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(item_id, item_name, quantity, price)| {
                let line_total = &price * &BigDecimal::from(quantity);
                CartLineView {
                    item_id,
                    item_name,
                    quantity,
                    price,
                    line_total,
                }
            })
            .collect())
    }
}
