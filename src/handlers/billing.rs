//! Mock subscription endpoint.
//!
//! Payments are only admitted during the payment window (10:00-11:00 IST by
//! default). The invoice amount comes from a fixed plan table; an
//! unrecognized plan is an explicit rejection, never a computed-from-nothing
//! amount. No payment gateway is involved - the flow ends at the invoice
//! email.

use axum::{Json, Router, debug_handler, extract::State, response::IntoResponse, routing::post};
use chrono::{DateTime, Utc};
use garde::Validate;

use crate::{
    api::{SubscribePayload, SubscribeResponse},
    error::AppError,
    models::{Invoice, Plan},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/subscribe", post(subscribe))
}

#[debug_handler]
async fn subscribe(
    State(state): State<AppState>,
    Json(payload): Json<SubscribePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let invoice = gate_subscribe(&state, &payload, Utc::now()).await?;

    Ok(Json(SubscribeResponse { invoice }))
}

async fn gate_subscribe(
    state: &AppState,
    payload: &SubscribePayload,
    now: DateTime<Utc>,
) -> Result<Invoice, AppError> {
    let email = payload.email.trim().to_lowercase();

    if !state.config.payment_window.admits(now) {
        tracing::info!(email = %email, window = %state.config.payment_window, "subscription rejected: window closed");
        return Err(AppError::WindowClosed(
            "Payments allowed only between 10:00 and 11:00 IST",
        ));
    }

    let Some(plan) = Plan::parse(payload.plan.trim()) else {
        tracing::warn!(email = %email, plan = %payload.plan, "subscription rejected: unknown plan");
        return Err(AppError::Validation(format!(
            "unknown plan: {}",
            payload.plan
        )));
    };

    let invoice = Invoice {
        email: email.clone(),
        plan: plan.as_str().to_string(),
        amount: plan.amount(),
        date: now,
    };

    if let Err(err) = state.email.send_invoice(&email, &invoice).await {
        tracing::warn!(email = %email, error = %err, "failed to send invoice email");
    }

    tracing::info!(
        email = %email,
        plan = %invoice.plan,
        amount = invoice.amount,
        "subscription admitted"
    );

    Ok(invoice)
}
