//! [`ActorEntity`] implementation for [`Order`].
//!
//! Creation validates the submission before anything is stored; updates only move the
//! status along the forward edges of the status machine.

use super::OrderError;
use crate::model::{
    normalize_identity, LineItem, Order, OrderCreate, OrderId, OrderKind, OrderQuery,
    OrderStatus, OrderUpdate,
};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

fn required(field: &str, value: Option<String>) -> Result<String, OrderError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(OrderError::InvalidOrderData(format!("{field} is required"))),
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_line_items(items: &[LineItem]) -> Result<Decimal, OrderError> {
    if items.is_empty() {
        return Err(OrderError::InvalidOrderData(
            "order must contain at least one item".into(),
        ));
    }
    let mut sum = Decimal::ZERO;
    for (idx, item) in items.iter().enumerate() {
        if item.item_id.trim().is_empty() || item.name.trim().is_empty() {
            return Err(OrderError::InvalidOrderData(format!(
                "item {idx} needs an itemId and a name"
            )));
        }
        if item.quantity < 1 {
            return Err(OrderError::InvalidOrderData(format!(
                "item {idx} quantity must be at least 1"
            )));
        }
        if item.unit_price < Decimal::ZERO {
            return Err(OrderError::InvalidOrderData(format!(
                "item {idx} unitPrice must not be negative"
            )));
        }
        sum = item
            .subtotal()
            .and_then(|subtotal| sum.checked_add(subtotal))
            .ok_or_else(|| {
                OrderError::InvalidOrderData(format!("item {idx} amount overflows"))
            })?;
    }
    Ok(sum)
}

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Update = OrderUpdate;
    type Query = OrderQuery;
    type Context = ();
    type Error = OrderError;

    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, Self::Error> {
        let customer_name = required("customerName", Some(params.customer_name))?;

        let (phone_number, address) = match params.kind {
            OrderKind::Parcel => (
                Some(required("phoneNumber", params.phone_number)?),
                Some(required("address", params.address)?),
            ),
            OrderKind::DineIn => (optional(params.phone_number), optional(params.address)),
        };

        let sum = validate_line_items(&params.line_items)?;
        if sum != params.total_amount {
            return Err(OrderError::InvalidOrderData(format!(
                "totalAmount {} does not match items total {}",
                params.total_amount.normalize(),
                sum.normalize()
            )));
        }

        let now = Utc::now();
        Ok(Self {
            id,
            kind: params.kind,
            line_items: params.line_items,
            total_amount: params.total_amount,
            customer_identity: normalize_identity(params.customer_identity.as_deref()),
            customer_name,
            phone_number,
            address,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    fn matches(&self, query: &OrderQuery) -> bool {
        match query {
            OrderQuery::All => true,
            OrderQuery::ByCustomer(identity) => {
                self.customer_identity.as_deref() == Some(identity.as_str())
            }
        }
    }

    async fn on_update(&mut self, update: OrderUpdate, _ctx: &()) -> Result<(), Self::Error> {
        match update {
            OrderUpdate::SetStatus(next) => {
                if !self.status.can_transition_to(next) {
                    return Err(OrderError::InvalidTransition {
                        from: self.status,
                        to: next,
                    });
                }
                self.status = next;
                self.updated_at = Utc::now();
                Ok(())
            }
        }
    }
}
