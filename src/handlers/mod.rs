pub mod cart;
pub mod orders;
pub mod reports;

use std::str::FromStr;

use actix_web::web;
use bigdecimal::BigDecimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::notifier;
use crate::domain::errors::DomainError;
use crate::domain::notification::Notice;
use crate::errors::AppError;
use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Runs a synchronous service call on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    Ok(web::block(f)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??)
}

/// Hands notices to the mailer on a background task; the response does not
/// wait for delivery.
fn dispatch_in_background(state: &web::Data<AppState>, notices: Vec<Notice>) {
    if notices.is_empty() {
        return;
    }
    let mailer = state.mailer.clone();
    actix_web::rt::spawn(async move {
        let total = notices.len();
        let sent = notifier::dispatch(mailer.as_ref(), notices).await;
        log::debug!("Dispatched {}/{} notification mails", sent, total);
    });
}

fn money(amount: &BigDecimal) -> String {
    amount.with_scale(2).to_string()
}

fn parse_money(field: &str, raw: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(raw.trim())
        .map_err(|_| AppError::BadRequest(format!("Invalid {field} '{raw}'")))
}
