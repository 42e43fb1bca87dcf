use uuid::Uuid;

use crate::domain::caller::{CallerContext, Permission};
use crate::domain::errors::DomainError;
use crate::domain::notification::{self, Notice};
use crate::domain::order::{
    self, OrderScope, OrderStatus, OrderView, PlaceOrderInput, PlacedOrder, Transition,
};
use crate::domain::ports::OrderRepository;

/// A committed order plus the mails to send about it.
#[derive(Debug)]
pub struct PlaceOutcome {
    pub order: PlacedOrder,
    pub notices: Vec<Notice>,
}

#[derive(Debug)]
pub struct ReviewOutcome {
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub bill: Option<String>,
    pub notices: Vec<Notice>,
}

pub struct OrderService<R> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn place_order(
        &self,
        caller: &CallerContext,
        input: PlaceOrderInput,
    ) -> Result<PlaceOutcome, DomainError> {
        caller.authorize(Permission::PlaceOrder)?;
        input.validate()?;

        let placed = self.repo.place(caller.user_id, &input)?;
        log::info!(
            "Order {} placed by user {} at store {} (total {})",
            placed.order_id,
            caller.user_id,
            input.store_id,
            placed.total_amount
        );

        let notices = self.prepare_notices(placed.order_id, || {
            let summary = self
                .repo
                .summary(placed.order_id)?
                .ok_or_else(|| DomainError::not_found("Order"))?;
            let admins = self.repo.admin_recipients(input.store_id)?;
            Ok(notification::placed_notices(&summary, &admins))
        });

        Ok(PlaceOutcome {
            order: placed,
            notices,
        })
    }

    pub fn approve(&self, caller: &CallerContext, order_id: Uuid) -> Result<ReviewOutcome, DomainError> {
        self.review(caller, order_id, OrderStatus::Approved)
    }

    pub fn reject(&self, caller: &CallerContext, order_id: Uuid) -> Result<ReviewOutcome, DomainError> {
        self.review(caller, order_id, OrderStatus::Rejected)
    }

    pub fn delete(&self, caller: &CallerContext, order_id: Uuid) -> Result<(), DomainError> {
        caller.authorize(Permission::ReviewOrders)?;
        let order = self
            .repo
            .find(order_id)?
            .ok_or_else(|| DomainError::not_found("Order"))?;
        caller.ensure_store_access(order.store_id)?;

        if !self.repo.delete(order_id)? {
            return Err(DomainError::not_found("Order"));
        }
        log::info!("Order {} deleted by {}", order_id, caller.user_id);
        Ok(())
    }

    pub fn list_for_user(&self, caller: &CallerContext) -> Result<Vec<OrderView>, DomainError> {
        caller.authorize(Permission::ViewOwnOrders)?;
        self.repo.list(OrderScope::Customer(caller.user_id))
    }

    pub fn list_for_store(&self, caller: &CallerContext) -> Result<Vec<OrderView>, DomainError> {
        caller.authorize(Permission::ViewStoreOrders)?;
        let store_id = caller.require_store()?;
        self.repo.list(OrderScope::Store(store_id))
    }

    pub fn list_all(&self, caller: &CallerContext) -> Result<Vec<OrderView>, DomainError> {
        caller.authorize(Permission::ViewAllOrders)?;
        self.repo.list(OrderScope::All)
    }

    fn review(
        &self,
        caller: &CallerContext,
        order_id: Uuid,
        target: OrderStatus,
    ) -> Result<ReviewOutcome, DomainError> {
        caller.authorize(Permission::ReviewOrders)?;
        let mut order = self
            .repo
            .find(order_id)?
            .ok_or_else(|| DomainError::not_found("Order"))?;
        caller.ensure_store_access(order.store_id)?;

        let notices = match order::review(order.status, target)? {
            Transition::Unchanged => Vec::new(),
            Transition::Apply => {
                if !self.repo.transition(order_id, order.status, target)? {
                    return Err(DomainError::InvalidState(
                        "Order status was changed by another request.".to_string(),
                    ));
                }
                log::info!("Order {} {} by {}", order_id, target, caller.user_id);
                self.prepare_notices(order_id, || {
                    let summary = self
                        .repo
                        .summary(order_id)?
                        .ok_or_else(|| DomainError::not_found("Order"))?;
                    Ok(notification::reviewed_notice(&summary).into_iter().collect())
                })
            }
        };
        order.status = target;

        Ok(ReviewOutcome {
            order_id,
            status: target,
            bill: (target == OrderStatus::Approved).then(|| order::render_bill(&order)),
            notices,
        })
    }

    /// Notification content is read after commit; failing to read it must
    /// not fail the request that already succeeded.
    fn prepare_notices(
        &self,
        order_id: Uuid,
        build: impl FnOnce() -> Result<Vec<Notice>, DomainError>,
    ) -> Vec<Notice> {
        build().unwrap_or_else(|e| {
            log::warn!("Could not prepare notifications for order {}: {}", order_id, e);
            Vec::new()
        })
    }
}
