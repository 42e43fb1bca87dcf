use uuid::Uuid;

use crate::domain::caller::{CallerContext, Permission, Role};
use crate::domain::errors::DomainError;
use crate::domain::ports::ReportRepository;
use crate::domain::report::{self, DailyItemSalesRow, DailyOrderRow, IndividualOrderRow, ReportRange};

pub struct ReportService<R> {
    repo: R,
}

impl<R: ReportRepository> ReportService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn daily_orders(
        &self,
        caller: &CallerContext,
        range: ReportRange,
        store_id: Option<Uuid>,
    ) -> Result<Vec<DailyOrderRow>, DomainError> {
        let store_id = self.store_filter(caller, store_id)?;
        let facts = self.repo.order_facts(&range, store_id)?;
        Ok(report::daily_orders(facts))
    }

    pub fn item_sales(
        &self,
        caller: &CallerContext,
        range: ReportRange,
        store_id: Option<Uuid>,
    ) -> Result<Vec<DailyItemSalesRow>, DomainError> {
        let store_id = self.store_filter(caller, store_id)?;
        let facts = self.repo.sale_facts(&range, store_id)?;
        Ok(report::daily_item_sales(facts))
    }

    /// Every order in the range regardless of status, oldest first.
    pub fn individual_orders(
        &self,
        caller: &CallerContext,
        range: ReportRange,
        store_id: Option<Uuid>,
    ) -> Result<Vec<IndividualOrderRow>, DomainError> {
        let store_id = self.store_filter(caller, store_id)?;
        self.repo.individual_orders(&range, store_id)
    }

    /// StoreAdmins only ever see their own store.
    fn store_filter(
        &self,
        caller: &CallerContext,
        requested: Option<Uuid>,
    ) -> Result<Option<Uuid>, DomainError> {
        caller.authorize(Permission::ViewReports)?;
        match caller.role {
            Role::StoreAdmin => {
                let own = caller.require_store()?;
                match requested {
                    Some(store_id) if store_id != own => Err(DomainError::Forbidden),
                    _ => Ok(Some(own)),
                }
            }
            _ => Ok(requested),
        }
    }
}
