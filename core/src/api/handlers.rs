//! API Handlers
//!
//! Request handlers for the HTTP API.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::{error, warn};
use shade_account::AccountId;

use super::types::*;
use crate::config::RoleIdentities;
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{ControllerRole, ShieldedLedger};
use crate::storage::AccountState;

// ============================================================================
// Shared State
// ============================================================================

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub ledger: Arc<ShieldedLedger>,
    /// Identities the node acts as for privileged calls
    pub identities: RoleIdentities,
    pub verify_timeout: Duration,
    pub admin_api: bool,
    pub start_time: Instant,
}

// ============================================================================
// Health & Status
// ============================================================================

/// Health check endpoint
pub async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let uptime = state.start_time.elapsed().as_secs();

    Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: uptime,
    })
}

pub async fn status(State(state): State<ApiState>) -> Response {
    let ledger = &state.ledger;
    let status = (|| -> LedgerResult<StatusResponse> {
        Ok(StatusResponse {
            owner: ledger.owner()?,
            burn_controller: ledger.role(ControllerRole::Burn)?.holder(),
            mint_controller: ledger.role(ControllerRole::Mint)?.holder(),
            nullifier_count: ledger.nullifier_count()?,
            balance_shift_vk: hex::encode(ledger.verifiers().balance_shift.verification_key_hash()),
            commitment_transition_vk: hex::encode(
                ledger
                    .verifiers()
                    .commitment_transition
                    .verification_key_hash(),
            ),
        })
    })();

    match status {
        Ok(status) => Json(status).into_response(),
        Err(e) => ledger_error(e),
    }
}

// ============================================================================
// Account Operations
// ============================================================================

pub async fn get_balance(
    State(state): State<ApiState>,
    Json(req): Json<BalanceRequest>,
) -> Response {
    match state.ledger.get_balance(&req.account) {
        Ok(account_state) => Json(BalanceResponse::new(req.account, account_state)).into_response(),
        Err(e) => ledger_error(e),
    }
}

/// Runs as the configured owner
pub async fn bootstrap(
    State(state): State<ApiState>,
    Json(req): Json<BootstrapRequest>,
) -> Response {
    let owner = state.identities.owner;
    let result = state
        .ledger
        .bootstrap(
            &owner,
            req.account,
            req.public_balance,
            req.initial_commitment,
        )
        .await;
    transition_response(req.account, result)
}

// ============================================================================
// Transitions
// ============================================================================

/// Runs as the configured burn controller
pub async fn burn(State(state): State<ApiState>, Json(req): Json<BurnRequest>) -> Response {
    let Some(caller) = state.identities.burn_controller else {
        return unconfigured(ControllerRole::Burn);
    };
    let result = with_timeout(
        state.verify_timeout,
        state.ledger.burn(&caller, req.account, req.bundle),
    )
    .await;

    match result {
        Some(result) => transition_response(req.account, result),
        None => timed_out("burn"),
    }
}

/// Runs as the configured mint controller
pub async fn mint(State(state): State<ApiState>, Json(req): Json<MintRequest>) -> Response {
    let Some(caller) = state.identities.mint_controller else {
        return unconfigured(ControllerRole::Mint);
    };
    let result = with_timeout(
        state.verify_timeout,
        state.ledger.mint(
            &caller,
            req.account,
            req.balance_shift,
            req.commitment_transition,
        ),
    )
    .await;

    match result {
        Some(result) => transition_response(req.account, result),
        None => timed_out("mint"),
    }
}

/// `None` when the deadline passed; the dropped transition left no state behind
async fn with_timeout<T>(limit: Duration, fut: impl Future<Output = T>) -> Option<T> {
    tokio::time::timeout(limit, fut).await.ok()
}

// ============================================================================
// Error Mapping
// ============================================================================

fn transition_response(
    account: AccountId,
    result: LedgerResult<AccountState>,
) -> Response {
    match result {
        Ok(account_state) => Json(BalanceResponse::new(account, account_state)).into_response(),
        Err(e) => ledger_error(e),
    }
}

pub fn status_code(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::Authorization { .. } => StatusCode::FORBIDDEN,
        LedgerError::AlreadyInitialized(_)
        | LedgerError::StaleState { .. }
        | LedgerError::Replay(_)
        | LedgerError::RoleAlreadyBound { .. } => StatusCode::CONFLICT,
        LedgerError::InvalidTransition { .. }
        | LedgerError::InvalidAmount { .. }
        | LedgerError::InvalidProof { .. }
        | LedgerError::InconsistentProofs(_) => StatusCode::UNPROCESSABLE_ENTITY,
        LedgerError::Domain(_) => StatusCode::BAD_REQUEST,
        LedgerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn ledger_error(err: LedgerError) -> Response {
    let status = status_code(&err);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Ledger failure: {}", err);
    } else {
        warn!("Rejected: {}", err);
    }
    (status, Json(ErrorResponse::new(err.to_string(), err.code()))).into_response()
}

fn unconfigured(role: ControllerRole) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse::new(
            format!("this node has no {} identity configured", role),
            "ROLE_NOT_CONFIGURED",
        )),
    )
        .into_response()
}

fn timed_out(op: &str) -> Response {
    warn!("{} verification timed out", op);
    (
        StatusCode::GATEWAY_TIMEOUT,
        Json(ErrorResponse::timeout(format!(
            "{} verification exceeded the configured timeout",
            op
        ))),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shade_privacy::{DomainError, FieldElement, Nullifier};

    #[test]
    fn replay_and_staleness_are_conflicts() {
        assert_eq!(
            status_code(&LedgerError::Replay(Nullifier(FieldElement::ZERO))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_code(&LedgerError::StaleState {
                account: AccountId::default(),
                stored: FieldElement::ZERO,
                signalled: FieldElement::from_u64(1),
            }),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn malformed_input_is_bad_request() {
        let err = LedgerError::from(DomainError::Arity {
            expected: 3,
            got: 2,
        });
        assert_eq!(status_code(&err), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn timeout_drops_slow_work() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            1
        };
        assert_eq!(with_timeout(Duration::from_millis(10), slow).await, None);
        assert_eq!(with_timeout(Duration::from_secs(1), async { 2 }).await, Some(2));
    }
}
