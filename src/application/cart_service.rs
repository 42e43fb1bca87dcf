use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::domain::caller::{CallerContext, Permission};
use crate::domain::cart::{self, CartLine, CartLineView, ItemStock, QuantityUpdate};
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;

pub struct CartService<R> {
    repo: R,
}

impl<R: CartRepository> CartService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_cart(&self, caller: &CallerContext) -> Result<Uuid, DomainError> {
        caller.authorize(Permission::ManageCart)?;
        self.repo.create_cart(caller.user_id)
    }

    pub fn add_or_update_item(
        &self,
        caller: &CallerContext,
        item_id: Uuid,
        quantity: i32,
        price: BigDecimal,
    ) -> Result<(), DomainError> {
        caller.authorize(Permission::ManageCart)?;
        cart::validate_new_line(quantity, &price)?;

        let item = self
            .repo
            .find_item(item_id)?
            .ok_or_else(|| DomainError::not_found("Item"))?;
        cart::ensure_in_stock(&item, quantity)?;

        self.repo.upsert_line(
            caller.user_id,
            CartLine {
                item_id,
                quantity,
                price,
            },
        )
    }

    pub fn remove_item(&self, caller: &CallerContext, item_id: Uuid) -> Result<(), DomainError> {
        caller.authorize(Permission::ManageCart)?;
        let cart_id = self.require_cart(caller)?;
        if !self.repo.remove_line(cart_id, item_id)? {
            return Err(DomainError::not_found("Item in cart"));
        }
        Ok(())
    }

    /// Adds one unit; at the stock limit the line is returned unchanged.
    pub fn increment_quantity(
        &self,
        caller: &CallerContext,
        item_id: Uuid,
    ) -> Result<QuantityUpdate, DomainError> {
        self.adjust_within_stock(caller, item_id, |current, item| {
            Ok(cart::incremented(current, item.stock))
        })
    }

    /// Removes one unit; a line never drops below one.
    pub fn decrement_quantity(
        &self,
        caller: &CallerContext,
        item_id: Uuid,
    ) -> Result<QuantityUpdate, DomainError> {
        caller.authorize(Permission::ManageCart)?;
        let cart_id = self.require_cart(caller)?;
        let line = self.require_line(cart_id, item_id)?;
        self.apply(cart_id, line, |current| Ok(cart::decremented(current)))
    }

    pub fn set_quantity(
        &self,
        caller: &CallerContext,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<QuantityUpdate, DomainError> {
        self.adjust_within_stock(caller, item_id, |_, item| {
            cart::clamp_quantity(item, quantity)
        })
    }

    /// Lines with item names. A user without a cart gets an empty list.
    pub fn list_items(&self, caller: &CallerContext) -> Result<Vec<CartLineView>, DomainError> {
        caller.authorize(Permission::ManageCart)?;
        match self.repo.find_cart(caller.user_id)? {
            Some(cart_id) => self.repo.line_views(cart_id),
            None => Ok(Vec::new()),
        }
    }

    fn adjust_within_stock(
        &self,
        caller: &CallerContext,
        item_id: Uuid,
        next: impl FnOnce(i32, &ItemStock) -> Result<i32, DomainError>,
    ) -> Result<QuantityUpdate, DomainError> {
        caller.authorize(Permission::ManageCart)?;
        let cart_id = self.require_cart(caller)?;
        let line = self.require_line(cart_id, item_id)?;
        let item = self
            .repo
            .find_item(item_id)?
            .ok_or_else(|| DomainError::not_found("Item"))?;
        self.apply(cart_id, line, |current| next(current, &item))
    }

    fn apply(
        &self,
        cart_id: Uuid,
        line: CartLine,
        next: impl FnOnce(i32) -> Result<i32, DomainError>,
    ) -> Result<QuantityUpdate, DomainError> {
        let quantity = next(line.quantity)?;
        let changed = quantity != line.quantity;
        // The cart may have been turned into an order since the line was read.
        if changed && !self.repo.set_line_quantity(cart_id, line.item_id, quantity)? {
            return Err(DomainError::not_found("Item in cart"));
        }

        let updated = CartLine { quantity, ..line };
        let lines = self.repo.lines(cart_id)?;
        Ok(QuantityUpdate {
            item_id: updated.item_id,
            quantity,
            line_total: updated.line_total(),
            cart_total: cart::cart_total(&lines),
            price: updated.price,
            changed,
        })
    }

    fn require_cart(&self, caller: &CallerContext) -> Result<Uuid, DomainError> {
        self.repo
            .find_cart(caller.user_id)?
            .ok_or_else(|| DomainError::not_found("Cart"))
    }

    fn require_line(&self, cart_id: Uuid, item_id: Uuid) -> Result<CartLine, DomainError> {
        self.repo
            .find_line(cart_id, item_id)?
            .ok_or_else(|| DomainError::not_found("Item in cart"))
    }
}
