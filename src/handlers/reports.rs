use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::caller::CallerContext;
use crate::domain::report::{DailyItemSalesRow, DailyOrderRow, IndividualOrderRow, ReportRange};
use crate::errors::AppError;
use crate::AppState;

use super::{blocking, money};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// First day, inclusive (YYYY-MM-DD)
    pub start_date: NaiveDate,
    /// Last day, inclusive (YYYY-MM-DD)
    pub end_date: NaiveDate,
    /// Restrict to one store; store administrators are always pinned to their own
    pub store_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyOrderResponse {
    pub date: NaiveDate,
    pub store_id: Uuid,
    pub store_name: String,
    pub total_orders: i64,
    pub total_amount: String,
}

impl From<DailyOrderRow> for DailyOrderResponse {
    fn from(row: DailyOrderRow) -> Self {
        Self {
            date: row.date,
            store_id: row.store_id,
            store_name: row.store_name,
            total_orders: row.total_orders,
            total_amount: money(&row.total_amount),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemSalesResponse {
    pub date: NaiveDate,
    pub store_id: Uuid,
    pub store_name: String,
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity_sold: i64,
    pub total_sales: String,
}

impl From<DailyItemSalesRow> for ItemSalesResponse {
    fn from(row: DailyItemSalesRow) -> Self {
        Self {
            date: row.date,
            store_id: row.store_id,
            store_name: row.store_name,
            item_id: row.item_id,
            item_name: row.item_name,
            quantity_sold: row.quantity_sold,
            total_sales: money(&row.total_sales),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndividualOrderResponse {
    pub order_id: Uuid,
    pub customer_name: String,
    pub store_id: Uuid,
    pub store_name: String,
    pub order_date: String,
    pub total_amount: String,
    pub status: String,
    pub address: String,
    pub pincode: String,
}

impl From<IndividualOrderRow> for IndividualOrderResponse {
    fn from(row: IndividualOrderRow) -> Self {
        Self {
            order_id: row.order_id,
            customer_name: row.customer_name,
            store_id: row.store_id,
            store_name: row.store_name,
            order_date: row.order_date.to_rfc3339(),
            total_amount: money(&row.total_amount),
            status: row.status.to_string(),
            address: row.address,
            pincode: row.pincode,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/report/daily-orders",
    params(ReportQuery),
    responses(
        (status = 200, description = "Order count and total per day and store", body = [DailyOrderResponse]),
        (status = 400, description = "startDate is after endDate"),
        (status = 403, description = "Not allowed to read this store's reports"),
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn daily_orders(
    state: web::Data<AppState>,
    caller: CallerContext,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let range = ReportRange::new(query.start_date, query.end_date)?;
    let rows = blocking(move || state.reports.daily_orders(&caller, range, query.store_id)).await?;
    let body: Vec<DailyOrderResponse> = rows.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/report/item-sales
///
/// Only approved orders count as sales.
#[utoipa::path(
    get,
    path = "/api/report/item-sales",
    params(ReportQuery),
    responses(
        (status = 200, description = "Quantity and value sold per day, store and item", body = [ItemSalesResponse]),
        (status = 400, description = "startDate is after endDate"),
        (status = 403, description = "Not allowed to read this store's reports"),
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn item_sales(
    state: web::Data<AppState>,
    caller: CallerContext,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let range = ReportRange::new(query.start_date, query.end_date)?;
    let rows = blocking(move || state.reports.item_sales(&caller, range, query.store_id)).await?;
    let body: Vec<ItemSalesResponse> = rows.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

#[utoipa::path(
    get,
    path = "/api/report/individual-orders",
    params(ReportQuery),
    responses(
        (status = 200, description = "Every order placed in the range, oldest first", body = [IndividualOrderResponse]),
        (status = 400, description = "startDate is after endDate"),
        (status = 403, description = "Not allowed to read this store's reports"),
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn individual_orders(
    state: web::Data<AppState>,
    caller: CallerContext,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let range = ReportRange::new(query.start_date, query.end_date)?;
    let rows =
        blocking(move || state.reports.individual_orders(&caller, range, query.store_id)).await?;
    let body: Vec<IndividualOrderResponse> = rows.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}
