use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::amortization::DownPayment;
use crate::api::error::ApiError;
use crate::api::AppState;
use crate::decimal::Money;
use crate::orders::{CreateOrder, OrderLine};
use crate::store::Store;
use crate::types::{DeliveryMethod, OrderId, PaymentMethod, PlanId, ProductId, UserId};
use crate::views::{CalculationView, OrderView, PlanView};

/// header carrying the authenticated caller, set by the upstream gateway
pub const USER_ID_HEADER: &str = "x-user-id";

/// success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            data,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineBody {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(default)]
    pub warranty_months: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderBody {
    pub items: Vec<OrderLineBody>,
    pub delivery_method: DeliveryMethod,
    pub delivery_address: Option<String>,
    pub governorate: Option<String>,
    pub pickup_branch: Option<String>,
    pub payment_method: PaymentMethod,
    pub source: Option<String>,
    pub installment_plan_id: Option<PlanId>,
}

impl CreateOrderBody {
    fn into_request(self, user_id: UserId) -> CreateOrder {
        CreateOrder {
            user_id,
            items: self
                .items
                .into_iter()
                .map(|line| OrderLine {
                    product_id: line.product_id,
                    quantity: line.quantity,
                    warranty_months: line.warranty_months,
                })
                .collect(),
            payment_method: self.payment_method,
            delivery_method: self.delivery_method,
            delivery_address: self.delivery_address,
            governorate: self.governorate,
            pickup_branch: self.pickup_branch,
            source: self.source,
            installment_plan_id: self.installment_plan_id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateBody {
    pub amount: Option<Money>,
    pub plan_id: Option<PlanId>,
    pub down_payment: Option<Money>,
}

fn caller(headers: &HeaderMap) -> Result<UserId, ApiError> {
    let value = headers
        .get(USER_ID_HEADER)
        .ok_or_else(|| ApiError::Unauthorized("authentication required".to_string()))?;
    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .ok_or_else(|| ApiError::Unauthorized("invalid caller identity".to_string()))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "saberstore-installments" }))
}

pub async fn create_order<S: Store + 'static>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    payload: Result<Json<CreateOrderBody>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<OrderView>>), ApiError> {
    let user_id = caller(&headers)?;
    let request = body(payload)?.into_request(user_id);

    let details = state.orders.create_order(request, &state.clock.provider())?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Order created successfully",
            OrderView::from_details(&details),
        )),
    ))
}

pub async fn list_orders<S: Store + 'static>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<OrderView>>>, ApiError> {
    let user_id = caller(&headers)?;
    let orders = state.orders.get_user_orders(user_id)?;
    Ok(Json(ApiResponse::ok(orders.iter().map(OrderView::from_details).collect())))
}

pub async fn get_order<S: Store + 'static>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<OrderView>>, ApiError> {
    let user_id = caller(&headers)?;
    let order_id: OrderId = id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid order id: {id}")))?;

    let details = state.orders.get_order_by_id(order_id, Some(user_id))?;
    Ok(Json(ApiResponse::ok(OrderView::from_details(&details))))
}

pub async fn list_plans<S: Store + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<ApiResponse<Vec<PlanView>>>, ApiError> {
    let plans = state.plans.list_active()?;
    Ok(Json(ApiResponse::ok(plans.iter().map(PlanView::from_plan).collect())))
}

pub async fn calculate<S: Store + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<CalculateBody>, JsonRejection>,
) -> Result<Json<ApiResponse<CalculationView>>, ApiError> {
    let CalculateBody {
        amount,
        plan_id,
        down_payment,
    } = body(payload)?;
    let (Some(amount), Some(plan_id)) = (amount, plan_id) else {
        return Err(ApiError::BadRequest("amount and planId are required".to_string()));
    };

    let quote = state.plans.quote(
        amount,
        plan_id,
        DownPayment::from(down_payment),
        &state.clock.provider(),
    )?;
    Ok(Json(ApiResponse::ok(CalculationView::from_quote(&quote))))
}
