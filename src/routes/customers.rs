use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::dto::customer_dto::{
    CustomerEnvelope, CustomerListResponse, CustomerResponse, RegisterCustomerPayload,
};
use crate::dto::user_dto::MessageResponse;
use crate::error::{Error, Result};
use crate::routes::{fields::RequestFields, parse_record_id};
use crate::services::registration::prepare_customer;
use crate::AppState;

#[axum::debug_handler]
pub async fn register_customer(
    State(state): State<AppState>,
    fields: RequestFields,
) -> Result<impl IntoResponse> {
    let payload = RegisterCustomerPayload::from_fields(&fields)?;
    let prepared = prepare_customer(&state.customer_service, payload).await?;
    let customer = state.customer_service.create(prepared).await?;

    Ok((
        StatusCode::CREATED,
        Json(CustomerEnvelope {
            success: true,
            message: Some("Customer created successfully".into()),
            customer: CustomerResponse::from(customer),
        }),
    ))
}

#[axum::debug_handler]
pub async fn list_customers(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let customers: Vec<CustomerResponse> = state
        .customer_service
        .list()
        .await?
        .into_iter()
        .map(CustomerResponse::from)
        .collect();

    Ok(Json(CustomerListResponse {
        success: true,
        count: customers.len(),
        customers,
    }))
}

#[axum::debug_handler]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_record_id(&id, "Customer")?;
    let customer = state
        .customer_service
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound("Customer not found".into()))?;

    Ok(Json(CustomerEnvelope {
        success: true,
        message: None,
        customer: CustomerResponse::from(customer),
    }))
}

#[axum::debug_handler]
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_record_id(&id, "Customer")?;
    state.customer_service.delete(id).await?;
    Ok(Json(MessageResponse::ok("Customer deleted successfully")))
}
