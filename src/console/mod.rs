//! The admin order console: fetches the order list, renders rows and submits
//! status changes.
//!
//! The credential is always an explicit parameter. Fetches carry a sequence
//! ticket so that a superseded response can never overwrite newer state, and
//! a status change only becomes the displayed value once a re-fetch confirms
//! it; a failed change rolls the control back to the stored value.

pub mod client;
pub mod render;

use std::collections::HashMap;

use log::{debug, info, warn};
use uuid::Uuid;

use crate::domain::order::OrderStatus;
use crate::handlers::orders::OrderResponse;
use client::{ClientError, OrdersApi};
use render::OrderRowView;

pub const STATUS_UPDATED: &str = "Order status updated successfully.";
pub const FETCH_FAILED_NOTICE: &str = "Failed to fetch orders. Please try again later.";
pub const FETCH_FAILED: &str = "Failed to fetch orders.";
pub const UPDATE_FAILED: &str = "Failed to update order status. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Loading,
    Loaded,
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient toast notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// Proof that a fetch was issued; only the most recent ticket may commit.
#[derive(Debug)]
pub struct FetchTicket {
    seq: u64,
    token: String,
}

impl FetchTicket {
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// A status selection submitted to the service and not yet confirmed.
#[derive(Debug)]
pub struct StatusChange {
    order_id: Uuid,
    status: OrderStatus,
    token: String,
}

impl StatusChange {
    pub fn order_id(&self) -> Uuid {
        self.order_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

pub struct OrdersConsole<A> {
    api: A,
    currency: String,
    credential: Option<String>,
    state: ViewState,
    orders: Vec<OrderResponse>,
    pending: HashMap<Uuid, OrderStatus>,
    latest_fetch: u64,
    notices: Vec<Notice>,
}

impl<A: OrdersApi> OrdersConsole<A> {
    pub fn new(api: A, currency: &str) -> Self {
        Self {
            api,
            currency: currency.to_string(),
            credential: None,
            state: ViewState::Idle,
            orders: Vec::new(),
            pending: HashMap::new(),
            latest_fetch: 0,
            notices: Vec::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn orders(&self) -> &[OrderResponse] {
        &self.orders
    }

    /// The retry control is shown while the view is in the error state.
    pub fn can_retry(&self) -> bool {
        matches!(self.state, ViewState::Error(_))
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Value the status control shows: a pending selection, else the stored status.
    pub fn displayed_status(&self, order_id: Uuid) -> Option<OrderStatus> {
        self.pending.get(&order_id).copied().or_else(|| {
            self.orders
                .iter()
                .find(|o| o.id == order_id)
                .map(|o| o.status)
        })
    }

    pub fn rows(&self) -> Vec<OrderRowView> {
        self.orders
            .iter()
            .map(|o| {
                let selected = self.pending.get(&o.id).copied().unwrap_or(o.status);
                render::order_row(o, &self.currency, selected)
            })
            .collect()
    }

    /// Initial load: fetch when a credential is present, otherwise show nothing.
    pub async fn mount(&mut self, credential: Option<String>) {
        self.credential = normalise(credential);
        if self.credential.is_some() {
            self.refresh().await;
        } else {
            self.clear();
        }
    }

    /// Applies a credential change. Gaining or changing a credential fetches
    /// once; losing it empties the list without any network call.
    pub async fn set_credential(&mut self, credential: Option<String>) {
        let credential = normalise(credential);
        if credential == self.credential {
            return;
        }
        self.credential = credential;
        if self.credential.is_some() {
            self.refresh().await;
        } else {
            debug!("Credential removed; clearing orders");
            self.clear();
        }
    }

    pub async fn refresh(&mut self) {
        if let Some(ticket) = self.begin_fetch() {
            let result = self.api.list_orders(ticket.token()).await;
            self.complete_fetch(ticket, result);
        }
    }

    pub async fn retry(&mut self) {
        self.refresh().await;
    }

    /// Enters `Loading` and issues a new ticket, superseding any fetch in flight.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        let Some(token) = self.credential.clone() else {
            self.notify(NoticeLevel::Error, ClientError::AuthMissing.to_string());
            return None;
        };
        self.latest_fetch += 1;
        self.state = ViewState::Loading;
        Some(FetchTicket { seq: self.latest_fetch, token })
    }

    /// Commits a fetch result. Returns `false` when the ticket was superseded
    /// and the result was discarded.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<OrderResponse>, ClientError>,
    ) -> bool {
        if ticket.seq != self.latest_fetch {
            debug!(
                "Discarding stale order list (ticket {}, latest {})",
                ticket.seq, self.latest_fetch
            );
            return false;
        }
        match result {
            Ok(orders) => {
                debug!("Loaded {} orders", orders.len());
                self.orders = orders;
                self.pending.clear();
                self.state = ViewState::Loaded;
            }
            Err(err) => {
                warn!("Fetching orders failed: {err}");
                self.notify(NoticeLevel::Error, err.message(FETCH_FAILED_NOTICE));
                self.state = ViewState::Error(err.message(FETCH_FAILED));
            }
        }
        true
    }

    /// Records the selection as pending and returns the change to submit.
    /// Until the change is confirmed the row's control shows the selection.
    pub fn begin_status_change(
        &mut self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Option<StatusChange> {
        let Some(token) = self.credential.clone() else {
            self.notify(NoticeLevel::Error, ClientError::AuthMissing.to_string());
            return None;
        };
        self.pending.insert(order_id, status);
        Some(StatusChange { order_id, status, token })
    }

    /// Applies the service's answer to a submitted change. Returns `true` when
    /// the list should be re-fetched to confirm it; on failure the selection
    /// is dropped so the control falls back to the stored value.
    pub fn complete_status_change(
        &mut self,
        change: StatusChange,
        result: Result<(), ClientError>,
    ) -> bool {
        match result {
            Ok(()) => {
                info!("Order {} set to '{}'", change.order_id, change.status);
                self.notify(NoticeLevel::Success, STATUS_UPDATED.to_string());
                true
            }
            Err(err) => {
                warn!("Updating order {} failed: {err}", change.order_id);
                self.drop_pending(change.order_id, change.status);
                self.notify(NoticeLevel::Error, err.message(UPDATE_FAILED));
                false
            }
        }
    }

    /// Submits a status selection. On success the list is re-fetched; on
    /// failure the selection is dropped and the list stays as it was.
    pub async fn change_status(&mut self, order_id: Uuid, status: OrderStatus) {
        let Some(change) = self.begin_status_change(order_id, status) else {
            return;
        };
        let result = self
            .api
            .update_status(change.token(), change.order_id, change.status)
            .await;
        if self.complete_status_change(change, result) {
            self.refresh().await;
            // A failed re-fetch leaves nothing to confirm the selection.
            self.drop_pending(order_id, status);
        }
    }

    /// Forgets a pending selection unless a newer one replaced it.
    fn drop_pending(&mut self, order_id: Uuid, status: OrderStatus) {
        if self.pending.get(&order_id) == Some(&status) {
            self.pending.remove(&order_id);
        }
    }

    fn clear(&mut self) {
        // Invalidate any fetch still in flight for the previous credential.
        self.latest_fetch += 1;
        self.orders.clear();
        self.pending.clear();
        self.state = ViewState::Idle;
    }

    fn notify(&mut self, level: NoticeLevel, text: String) {
        self.notices.push(Notice { level, text });
    }
}

fn normalise(credential: Option<String>) -> Option<String> {
    credential.filter(|c| !c.trim().is_empty())
}
