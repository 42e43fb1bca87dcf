//! In-memory implementation of the repository ports, used by the service
//! tests. A single mutex stands in for the database transaction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::caller::Role;
use crate::domain::cart::{CartLine, CartLineView, ItemStock};
use crate::domain::errors::DomainError;
use crate::domain::notification::{OrderSummary, Recipient, StoreContact};
use crate::domain::order::{
    self, OrderHeader, OrderLineView, OrderScope, OrderStatus, OrderView, PlaceOrderInput,
    PlacedOrder,
};
use crate::domain::ports::{CartRepository, OrderRepository, ReportRepository};
use crate::domain::report::{IndividualOrderRow, OrderFact, ReportRange, SaleFact};

struct StoreRecord {
    name: String,
    email: String,
}

struct UserRecord {
    first_name: String,
    email: String,
    role: Role,
    store_id: Option<Uuid>,
    is_active: bool,
}

struct ItemRecord {
    name: String,
    stock: i32,
}

#[derive(Default)]
struct State {
    stores: HashMap<Uuid, StoreRecord>,
    users: HashMap<Uuid, UserRecord>,
    items: HashMap<Uuid, ItemRecord>,
    carts: HashMap<Uuid, Uuid>,
    cart_lines: HashMap<Uuid, Vec<CartLine>>,
    orders: Vec<OrderHeader>,
    order_lines: HashMap<Uuid, Vec<CartLine>>,
}

impl State {
    fn recipient(&self, user_id: Uuid) -> Option<Recipient> {
        self.users.get(&user_id).map(|u| Recipient {
            first_name: u.first_name.clone(),
            last_name: "Test".to_string(),
            email: u.email.clone(),
        })
    }

    fn item_name(&self, item_id: Uuid) -> String {
        self.items
            .get(&item_id)
            .map(|i| i.name.clone())
            .unwrap_or_default()
    }

    fn view(&self, header: &OrderHeader) -> OrderView {
        let lines = self
            .order_lines
            .get(&header.id)
            .map(|lines| {
                lines
                    .iter()
                    .map(|l| OrderLineView {
                        item_id: l.item_id,
                        item_name: self.item_name(l.item_id),
                        quantity: l.quantity,
                        price: l.price.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        OrderView {
            header: header.clone(),
            customer_name: self
                .recipient(header.user_id)
                .map(|r| r.full_name())
                .unwrap_or_else(|| "N/A".to_string()),
            store_name: self
                .stores
                .get(&header.store_id)
                .map(|s| s.name.clone())
                .unwrap_or_else(|| "N/A".to_string()),
            lines,
        }
    }

    fn in_range(header: &OrderHeader, range: &ReportRange, store_id: Option<Uuid>) -> bool {
        let date = header.order_date.date_naive();
        date >= range.start
            && date <= range.end
            && store_id.map_or(true, |s| s == header.store_id)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("state lock poisoned")
    }

    pub fn add_store(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.state().stores.insert(
            id,
            StoreRecord {
                name: name.to_string(),
                email: format!("{}@stores.test", name.to_lowercase().replace(' ', ".")),
            },
        );
        id
    }

    pub fn add_user(&self, first_name: &str, role: Role, store_id: Option<Uuid>) -> Uuid {
        let id = Uuid::new_v4();
        self.state().users.insert(
            id,
            UserRecord {
                first_name: first_name.to_string(),
                email: format!("{}@users.test", first_name.to_lowercase()),
                role,
                store_id,
                is_active: true,
            },
        );
        id
    }

    pub fn deactivate_user(&self, user_id: Uuid) {
        if let Some(user) = self.state().users.get_mut(&user_id) {
            user.is_active = false;
        }
    }

    pub fn add_item(&self, name: &str, stock: i32) -> Uuid {
        let id = Uuid::new_v4();
        self.state().items.insert(
            id,
            ItemRecord {
                name: name.to_string(),
                stock,
            },
        );
        id
    }

    pub fn set_stock(&self, item_id: Uuid, stock: i32) {
        if let Some(item) = self.state().items.get_mut(&item_id) {
            item.stock = stock;
        }
    }

    pub fn stock(&self, item_id: Uuid) -> i32 {
        self.state().items.get(&item_id).map_or(0, |i| i.stock)
    }

    pub fn order_count(&self) -> usize {
        self.state().orders.len()
    }

    pub fn has_cart(&self, user_id: Uuid) -> bool {
        self.state().carts.contains_key(&user_id)
    }

    pub fn cart_line_count(&self, user_id: Uuid) -> usize {
        let state = self.state();
        state
            .carts
            .get(&user_id)
            .and_then(|cart_id| state.cart_lines.get(cart_id))
            .map_or(0, Vec::len)
    }

    pub fn status(&self, order_id: Uuid) -> Option<OrderStatus> {
        self.state()
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .map(|o| o.status)
    }

    pub fn backdate(&self, order_id: Uuid, order_date: DateTime<Utc>) {
        if let Some(order) = self.state().orders.iter_mut().find(|o| o.id == order_id) {
            order.order_date = order_date;
        }
    }
}

impl CartRepository for InMemoryStore {
    fn find_item(&self, item_id: Uuid) -> Result<Option<ItemStock>, DomainError> {
        Ok(self.state().items.get(&item_id).map(|i| ItemStock {
            id: item_id,
            name: i.name.clone(),
            stock: i.stock,
        }))
    }

    fn find_cart(&self, user_id: Uuid) -> Result<Option<Uuid>, DomainError> {
        Ok(self.state().carts.get(&user_id).copied())
    }

    fn create_cart(&self, user_id: Uuid) -> Result<Uuid, DomainError> {
        let mut state = self.state();
        if state.carts.contains_key(&user_id) {
            return Err(DomainError::Conflict(
                "Cart already exists for this user.".to_string(),
            ));
        }
        let cart_id = Uuid::new_v4();
        state.carts.insert(user_id, cart_id);
        Ok(cart_id)
    }

    fn upsert_line(&self, user_id: Uuid, line: CartLine) -> Result<(), DomainError> {
        let mut state = self.state();
        let cart_id = *state.carts.entry(user_id).or_insert_with(Uuid::new_v4);
        let lines = state.cart_lines.entry(cart_id).or_default();
        match lines.iter_mut().find(|l| l.item_id == line.item_id) {
            Some(existing) => *existing = line,
            None => lines.push(line),
        }
        Ok(())
    }

    fn find_line(&self, cart_id: Uuid, item_id: Uuid) -> Result<Option<CartLine>, DomainError> {
        Ok(self
            .state()
            .cart_lines
            .get(&cart_id)
            .and_then(|lines| lines.iter().find(|l| l.item_id == item_id).cloned()))
    }

    fn set_line_quantity(&self, cart_id: Uuid, item_id: Uuid, quantity: i32) -> Result<bool, DomainError> {
        let mut state = self.state();
        let Some(line) = state
            .cart_lines
            .get_mut(&cart_id)
            .and_then(|lines| lines.iter_mut().find(|l| l.item_id == item_id))
        else {
            return Ok(false);
        };
        line.quantity = quantity;
        Ok(true)
    }

    fn remove_line(&self, cart_id: Uuid, item_id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.state();
        let Some(lines) = state.cart_lines.get_mut(&cart_id) else {
            return Ok(false);
        };
        let before = lines.len();
        lines.retain(|l| l.item_id != item_id);
        Ok(lines.len() < before)
    }

    fn lines(&self, cart_id: Uuid) -> Result<Vec<CartLine>, DomainError> {
        Ok(self
            .state()
            .cart_lines
            .get(&cart_id)
            .cloned()
            .unwrap_or_default())
    }

    fn line_views(&self, cart_id: Uuid) -> Result<Vec<CartLineView>, DomainError> {
        let state = self.state();
        Ok(state
            .cart_lines
            .get(&cart_id)
            .map(|lines| {
                lines
                    .iter()
                    .map(|l| CartLineView {
                        item_id: l.item_id,
                        item_name: state.item_name(l.item_id),
                        quantity: l.quantity,
                        price: l.price.clone(),
                        line_total: l.line_total(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

impl OrderRepository for InMemoryStore {
    fn place(&self, user_id: Uuid, input: &PlaceOrderInput) -> Result<PlacedOrder, DomainError> {
        let mut state = self.state();
        let cart_id = *state
            .carts
            .get(&user_id)
            .ok_or_else(|| DomainError::not_found("Cart"))?;
        let lines = state.cart_lines.get(&cart_id).cloned().unwrap_or_default();
        order::ensure_not_empty(&lines)?;
        if !state.stores.contains_key(&input.store_id) {
            return Err(DomainError::not_found("Store"));
        }

        let stock: Vec<ItemStock> = lines
            .iter()
            .filter_map(|l| {
                state.items.get(&l.item_id).map(|i| ItemStock {
                    id: l.item_id,
                    name: i.name.clone(),
                    stock: i.stock,
                })
            })
            .collect();
        let plan = order::plan_placement(lines, &stock)?;

        for decrement in &plan.decrements {
            if let Some(item) = state.items.get_mut(&decrement.item_id) {
                item.stock = decrement.remaining;
            }
        }
        let order_id = Uuid::new_v4();
        state.orders.push(OrderHeader {
            id: order_id,
            user_id,
            store_id: input.store_id,
            order_date: Utc::now(),
            total_amount: plan.total.clone(),
            status: OrderStatus::Pending,
            address: input.address.clone(),
            pincode: input.pincode.clone(),
        });
        state.order_lines.insert(order_id, plan.lines);
        state.cart_lines.remove(&cart_id);
        state.carts.remove(&user_id);

        Ok(PlacedOrder {
            order_id,
            total_amount: plan.total,
        })
    }

    fn find(&self, order_id: Uuid) -> Result<Option<OrderHeader>, DomainError> {
        Ok(self
            .state()
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .cloned())
    }

    fn transition(&self, order_id: Uuid, from: OrderStatus, to: OrderStatus) -> Result<bool, DomainError> {
        let mut state = self.state();
        match state
            .orders
            .iter_mut()
            .find(|o| o.id == order_id && o.status == from)
        {
            Some(order) => {
                order.status = to;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, order_id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.state();
        let before = state.orders.len();
        state.orders.retain(|o| o.id != order_id);
        state.order_lines.remove(&order_id);
        Ok(state.orders.len() < before)
    }

    fn list(&self, scope: OrderScope) -> Result<Vec<OrderView>, DomainError> {
        let state = self.state();
        let mut views: Vec<OrderView> = state
            .orders
            .iter()
            .filter(|o| match scope {
                OrderScope::Customer(user_id) => o.user_id == user_id,
                OrderScope::Store(store_id) => o.store_id == store_id,
                OrderScope::All => true,
            })
            .map(|o| state.view(o))
            .collect();
        views.sort_by(|a, b| b.header.order_date.cmp(&a.header.order_date));
        Ok(views)
    }

    fn summary(&self, order_id: Uuid) -> Result<Option<OrderSummary>, DomainError> {
        let state = self.state();
        Ok(state.orders.iter().find(|o| o.id == order_id).map(|o| OrderSummary {
            order: state.view(o),
            customer: state.recipient(o.user_id),
            store: state.stores.get(&o.store_id).map(|s| StoreContact {
                name: s.name.clone(),
                email: s.email.clone(),
                contact_number: "0000000000".to_string(),
            }),
        }))
    }

    fn admin_recipients(&self, store_id: Uuid) -> Result<Vec<Recipient>, DomainError> {
        let state = self.state();
        let mut ids: Vec<(Role, Uuid)> = state
            .users
            .iter()
            .filter(|(_, u)| u.is_active)
            .filter(|(_, u)| match u.role {
                Role::StoreAdmin => u.store_id == Some(store_id),
                Role::SuperAdmin => true,
                Role::User => false,
            })
            .map(|(id, u)| (u.role, *id))
            .collect();
        ids.sort_by_key(|(role, _)| *role == Role::SuperAdmin);
        Ok(ids
            .into_iter()
            .filter_map(|(_, id)| state.recipient(id))
            .collect())
    }
}

impl ReportRepository for InMemoryStore {
    fn order_facts(&self, range: &ReportRange, store_id: Option<Uuid>) -> Result<Vec<OrderFact>, DomainError> {
        let state = self.state();
        Ok(state
            .orders
            .iter()
            .filter(|o| State::in_range(o, range, store_id))
            .map(|o| OrderFact {
                order_date: o.order_date,
                store_id: o.store_id,
                store_name: state.view(o).store_name,
                total_amount: o.total_amount.clone(),
            })
            .collect())
    }

    fn sale_facts(&self, range: &ReportRange, store_id: Option<Uuid>) -> Result<Vec<SaleFact>, DomainError> {
        let state = self.state();
        let mut facts = Vec::new();
        for o in state
            .orders
            .iter()
            .filter(|o| o.status == OrderStatus::Approved && State::in_range(o, range, store_id))
        {
            let store_name = state.view(o).store_name;
            for line in state.order_lines.get(&o.id).into_iter().flatten() {
                facts.push(SaleFact {
                    order_date: o.order_date,
                    store_id: o.store_id,
                    store_name: store_name.clone(),
                    item_id: line.item_id,
                    item_name: state.item_name(line.item_id),
                    quantity: line.quantity,
                    price: line.price.clone(),
                });
            }
        }
        Ok(facts)
    }

    fn individual_orders(
        &self,
        range: &ReportRange,
        store_id: Option<Uuid>,
    ) -> Result<Vec<IndividualOrderRow>, DomainError> {
        let state = self.state();
        let mut rows: Vec<IndividualOrderRow> = state
            .orders
            .iter()
            .filter(|o| State::in_range(o, range, store_id))
            .map(|o| {
                let view = state.view(o);
                IndividualOrderRow {
                    order_id: o.id,
                    customer_name: view.customer_name,
                    store_id: o.store_id,
                    store_name: view.store_name,
                    order_date: o.order_date,
                    total_amount: o.total_amount.clone(),
                    status: o.status,
                    address: o.address.clone(),
                    pincode: o.pincode.clone(),
                }
            })
            .collect();
        rows.sort_by_key(|r| r.order_date);
        Ok(rows)
    }
}

pub fn price(s: &str) -> BigDecimal {
    s.parse().expect("valid decimal")
}
