use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::domain::order::OrderStatus;
use crate::handlers::orders::OrderResponse;

/// One row of the admin order list, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRowView {
    pub items_summary: String,
    pub customer_name: String,
    pub street_line: String,
    pub locality_line: String,
    pub phone: String,
    pub item_count: usize,
    pub method: String,
    pub payment_label: &'static str,
    pub date_label: String,
    pub amount_label: String,
    /// `(value, label)` for each option of the status control.
    pub status_options: Vec<(&'static str, &'static str)>,
    pub selected_status: OrderStatus,
}

pub fn order_row(order: &OrderResponse, currency: &str, selected: OrderStatus) -> OrderRowView {
    let items_summary = order
        .items
        .iter()
        .map(|item| format!("{} x {} {}", item.name, item.quantity, item.size))
        .collect::<Vec<_>>()
        .join(", ");
    let a = &order.address;

    OrderRowView {
        items_summary,
        customer_name: a.full_name(),
        street_line: format!("{},", a.street),
        locality_line: format!("{}, {}, {}, {}", a.city, a.state, a.country, a.zipcode),
        phone: a.phone.clone(),
        item_count: order.items.len(),
        method: order.payment_method.clone(),
        payment_label: if order.payment { "Done" } else { "Pending" },
        date_label: order
            .created_at()
            .map(|d| d.format("%-m/%-d/%Y").to_string())
            .unwrap_or_default(),
        amount_label: format!("{currency}{}", two_decimals(&order.amount)),
        status_options: OrderStatus::ALL.iter().map(|s| (s.as_str(), s.label())).collect(),
        selected_status: selected,
    }
}

fn two_decimals(amount: &str) -> String {
    match BigDecimal::from_str(amount) {
        Ok(value) => value.round(2).with_scale(2).to_string(),
        Err(_) => amount.to_string(),
    }
}
