//! # Order Client
//!
//! High-level API over the Order actor, shaped after the Order Store contract:
//! create, get, update status, delete, list all (newest first), list by customer.
use crate::model::{normalize_identity, Order, OrderCreate, OrderId, OrderQuery, OrderStatus, OrderUpdate};
use crate::order_actor::OrderError;
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the Order actor.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    orders
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    /// Validates and stores a new order. The stored order is always `pending`.
    #[instrument(skip(self, params), fields(kind = ?params.kind))]
    pub async fn create_order(&self, params: OrderCreate) -> Result<Order, OrderError> {
        let order = self.inner.create(params).await?;
        debug!(order_id = %order.id, "Order stored");
        Ok(order)
    }

    /// Loads an order, failing with [`OrderError::NotFound`] when it does not exist.
    #[instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, OrderError> {
        self.inner
            .get(id.clone())
            .await?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }

    /// Read-modify-write of the status inside the actor.
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order, OrderError> {
        Ok(self.inner.update(id, OrderUpdate::SetStatus(status)).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: OrderId) -> Result<(), OrderError> {
        Ok(self.inner.delete(id).await?)
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Order>, OrderError> {
        Ok(newest_first(self.inner.list(OrderQuery::All).await?))
    }

    /// Orders placed under `identity` (normalized before matching), newest first.
    #[instrument(skip(self))]
    pub async fn list_by_customer(&self, identity: &str) -> Result<Vec<Order>, OrderError> {
        let Some(identity) = normalize_identity(Some(identity)) else {
            return Ok(Vec::new());
        };
        Ok(newest_first(
            self.inner.list(OrderQuery::ByCustomer(identity)).await?,
        ))
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        OrderError::from(e)
    }
}
