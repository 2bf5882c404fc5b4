//! Per-customer order listing and single order lookup.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use common::{CustomerId, OrderId, Page};
use domain::{Order, OrderService};
use order_store::{LineItem, OrderStore};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: OrderStore> {
    pub order_service: Arc<OrderService<S>>,
    pub default_page_size: u32,
}

// -- Request types --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

// -- Response types --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerOrdersResponse {
    pub summary: SummaryResponse,
    pub data: Vec<OrderSummaryResponse>,
    pub pagination: PaginationResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub total_on_orders: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummaryResponse {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub total: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponse {
    pub page: u32,
    pub page_size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub items: Vec<OrderItemResponse>,
    pub total: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl From<&Order> for OrderSummaryResponse {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.order_id,
            customer_id: order.customer_id,
            total: order.total,
        }
    }
}

impl From<&Page<Order>> for PaginationResponse {
    fn from(page: &Page<Order>) -> Self {
        Self {
            page: page.page_number,
            page_size: page.page_size,
            total_elements: page.total_elements,
            total_pages: page.total_pages,
        }
    }
}

impl From<LineItem> for OrderItemResponse {
    fn from(item: LineItem) -> Self {
        Self {
            product_name: item.name,
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.order_id,
            customer_id: order.customer_id,
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
            total: order.total,
        }
    }
}

// -- Handlers --

/// GET /api/orders/customer/{customerId}: the customer's total plus one page of orders.
#[tracing::instrument(skip(state, customer_id, params))]
pub async fn list_by_customer<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    customer_id: Result<Path<i64>, PathRejection>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<CustomerOrdersResponse>, ApiError> {
    let Path(customer_id) =
        customer_id.map_err(|e| ApiError::BadRequest(format!("Invalid customer id: {e}")))?;
    let Query(params) =
        params.map_err(|e| ApiError::BadRequest(format!("Invalid page parameters: {e}")))?;
    let customer_id = CustomerId::new(customer_id);
    let page = params.page.unwrap_or(0);
    let page_size = params.page_size.unwrap_or(state.default_page_size);

    let summary = state.order_service.customer_summary(customer_id).await?;
    let orders = state
        .order_service
        .find_orders_by_customer(customer_id, page, page_size)
        .await?;

    tracing::debug!(
        %customer_id,
        page,
        page_size,
        returned = orders.items.len(),
        "customer orders listed"
    );

    Ok(Json(CustomerOrdersResponse {
        summary: SummaryResponse {
            total_on_orders: summary.total_across_orders,
        },
        data: orders.items.iter().map(OrderSummaryResponse::from).collect(),
        pagination: PaginationResponse::from(&orders),
    }))
}

/// GET /api/orders/{orderId}: one order with its items.
#[tracing::instrument(skip(state, order_id))]
pub async fn get<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    order_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<OrderResponse>, ApiError> {
    let Path(order_id) =
        order_id.map_err(|e| ApiError::BadRequest(format!("Invalid order id: {e}")))?;
    let order_id = OrderId::new(order_id);

    let order = state
        .order_service
        .find_order(order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order {order_id} not found")))?;

    Ok(Json(OrderResponse::from(order)))
}
