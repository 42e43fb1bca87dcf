use async_trait::async_trait;
use uuid::Uuid;

use super::cart::{CartLine, CartLineView, ItemStock};
use super::errors::DomainError;
use super::notification::{OrderSummary, Recipient};
use super::order::{OrderHeader, OrderScope, OrderStatus, OrderView, PlaceOrderInput, PlacedOrder};
use super::report::{IndividualOrderRow, OrderFact, ReportRange, SaleFact};

pub trait CartRepository: Send + Sync + 'static {
    fn find_item(&self, item_id: Uuid) -> Result<Option<ItemStock>, DomainError>;
    fn find_cart(&self, user_id: Uuid) -> Result<Option<Uuid>, DomainError>;
    /// Fails with `Conflict` when the user already owns a cart.
    fn create_cart(&self, user_id: Uuid) -> Result<Uuid, DomainError>;
    /// Creates the cart if needed and inserts or replaces the line, atomically.
    fn upsert_line(&self, user_id: Uuid, line: CartLine) -> Result<(), DomainError>;
    fn find_line(&self, cart_id: Uuid, item_id: Uuid) -> Result<Option<CartLine>, DomainError>;
    /// Returns whether a line was updated.
    fn set_line_quantity(&self, cart_id: Uuid, item_id: Uuid, quantity: i32) -> Result<bool, DomainError>;
    /// Returns whether a line was removed.
    fn remove_line(&self, cart_id: Uuid, item_id: Uuid) -> Result<bool, DomainError>;
    fn lines(&self, cart_id: Uuid) -> Result<Vec<CartLine>, DomainError>;
    fn line_views(&self, cart_id: Uuid) -> Result<Vec<CartLineView>, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Runs the whole cart-to-order conversion in one transaction.
    fn place(&self, user_id: Uuid, input: &PlaceOrderInput) -> Result<PlacedOrder, DomainError>;
    fn find(&self, order_id: Uuid) -> Result<Option<OrderHeader>, DomainError>;
    /// Compare-and-set on the status column; `false` when `from` no longer holds.
    fn transition(&self, order_id: Uuid, from: OrderStatus, to: OrderStatus) -> Result<bool, DomainError>;
    fn delete(&self, order_id: Uuid) -> Result<bool, DomainError>;
    fn list(&self, scope: OrderScope) -> Result<Vec<OrderView>, DomainError>;
    fn summary(&self, order_id: Uuid) -> Result<Option<OrderSummary>, DomainError>;
    /// Active StoreAdmins of the store plus every active SuperAdmin.
    fn admin_recipients(&self, store_id: Uuid) -> Result<Vec<Recipient>, DomainError>;
}

pub trait ReportRepository: Send + Sync + 'static {
    fn order_facts(&self, range: &ReportRange, store_id: Option<Uuid>) -> Result<Vec<OrderFact>, DomainError>;
    /// Lines of approved orders only.
    fn sale_facts(&self, range: &ReportRange, store_id: Option<Uuid>) -> Result<Vec<SaleFact>, DomainError>;
    /// Oldest first.
    fn individual_orders(
        &self,
        range: &ReportRange,
        store_id: Option<Uuid>,
    ) -> Result<Vec<IndividualOrderRow>, DomainError>;
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), DomainError>;
}
