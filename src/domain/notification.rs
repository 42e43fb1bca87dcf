use bigdecimal::BigDecimal;

use super::order::{OrderStatus, OrderView};

/// An e-mail ready to be handed to a [`Mailer`](super::ports::Mailer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Clone)]
pub struct Recipient {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Recipient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone)]
pub struct StoreContact {
    pub name: String,
    pub email: String,
    pub contact_number: String,
}

/// An order together with the people and store it concerns, as rendered in
/// notification mails.
#[derive(Debug, Clone)]
pub struct OrderSummary {
    pub order: OrderView,
    pub customer: Option<Recipient>,
    pub store: Option<StoreContact>,
}

const CELL: &str = "border:1px solid #ddd;padding:8px;";

fn money(amount: &BigDecimal) -> String {
    format!("₹{}", amount.with_scale(2))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&#39;")
        .replace('"', "&quot;")
}

pub fn summary_html(summary: &OrderSummary) -> String {
    let header = &summary.order.header;
    let mut rows = String::new();
    for line in &summary.order.lines {
        let subtotal = &line.price * &BigDecimal::from(line.quantity);
        rows.push_str(&format!(
            "<tr><td style='{CELL}'>{}</td><td style='{CELL}text-align:center;'>{}</td>\
             <td style='{CELL}text-align:right;'>{}</td><td style='{CELL}text-align:right;'>{}</td></tr>",
            escape(&line.item_name),
            line.quantity,
            money(&line.price),
            money(&subtotal),
        ));
    }

    let customer = summary
        .customer
        .as_ref()
        .map(|c| format!("{} ({})", escape(&c.full_name()), escape(&c.email)))
        .unwrap_or_default();
    let store = summary
        .store
        .as_ref()
        .map(|s| {
            format!(
                "{} ({}, {})",
                escape(&s.name),
                escape(&s.email),
                escape(&s.contact_number)
            )
        })
        .unwrap_or_default();

    format!(
        "<div style='font-family:sans-serif;'>\
         <h2 style='color:#2d7ff9;'>Order Summary</h2>\
         <p><b>Order ID:</b> {}<br/><b>Order Date:</b> {}<br/><b>Status:</b> {}<br/>\
         <b>Customer:</b> {}<br/><b>Store:</b> {}<br/><b>Delivery Address:</b> {}, {}</p>\
         <table style='border-collapse:collapse;width:100%;'>\
         <tr style='background:#f2f2f2;'><th style='{CELL}'>Item</th><th style='{CELL}'>Qty</th>\
         <th style='{CELL}'>Price</th><th style='{CELL}'>Subtotal</th></tr>{}\
         <tr style='font-weight:bold;'><td colspan='3' style='{CELL}text-align:right;'>Total</td>\
         <td style='{CELL}text-align:right;'>{}</td></tr></table></div>",
        header.id,
        header.order_date.format("%Y-%m-%d %H:%M"),
        header.status,
        customer,
        store,
        escape(&header.address),
        escape(&header.pincode),
        rows,
        money(&header.total_amount),
    )
}

/// Mails sent once an order has been committed: one per administrator and
/// a confirmation for the customer.
pub fn placed_notices(summary: &OrderSummary, admins: &[Recipient]) -> Vec<Notice> {
    let body = summary_html(summary);
    let mut notices = Vec::with_capacity(admins.len() + 1);

    let placed_by = summary
        .customer
        .as_ref()
        .map(|c| {
            format!(
                "<p>Order placed by: {} ({})</p>",
                escape(&c.full_name()),
                escape(&c.email)
            )
        })
        .unwrap_or_default();
    for admin in admins {
        notices.push(Notice {
            to: admin.email.clone(),
            subject: "New Order Placed".to_string(),
            html: format!("{placed_by}{body}"),
        });
    }

    if let Some(customer) = &summary.customer {
        notices.push(Notice {
            to: customer.email.clone(),
            subject: "Order Placed Successfully".to_string(),
            html: format!(
                "<p>Dear {},</p><p>Your order has been placed successfully. \
                 We will notify you once it is approved or rejected.</p>{body}",
                escape(&customer.first_name)
            ),
        });
    }
    notices
}

pub fn reviewed_notice(summary: &OrderSummary) -> Option<Notice> {
    let customer = summary.customer.as_ref()?;
    let (subject, message) = match summary.order.header.status {
        OrderStatus::Approved => (
            "Your Order Has Been Approved",
            "Your order has been approved. Thank you for shopping with us!",
        ),
        OrderStatus::Rejected => (
            "Your Order Has Been Rejected",
            "Your order has been rejected. Please contact the store for more information.",
        ),
        OrderStatus::Pending => return None,
    };
    Some(Notice {
        to: customer.email.clone(),
        subject: subject.to_string(),
        html: format!(
            "<p>Dear {},</p><p>{message}</p>{}",
            escape(&customer.first_name),
            summary_html(summary)
        ),
    })
}
