// Copyright 2025 Shade Ledger
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use log::{info, warn};
use shade_account::AccountId;
use shade_core::api::{ApiState, create_router};
use shade_core::config::{RoleIdentities, ShadeConfig};
use shade_core::ledger::{ControllerRole, RoleSlot, ShieldedLedger};
use shade_core::storage::{LedgerStore, MemStore, RocksDbStore};
use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    info!("Shade node starting...");

    let config = ShadeConfig::load()?;
    let identities = config.roles.parse()?;
    let verifiers = config.verifier.build()?;

    let store: Arc<dyn LedgerStore> = if config.database.in_memory {
        warn!("In-memory store: state is lost on shutdown");
        Arc::new(MemStore::new())
    } else {
        info!("Opening database at {}", config.database.path);
        Arc::new(RocksDbStore::open(&config.database.path)?)
    };

    let ledger = Arc::new(ShieldedLedger::open(store, identities.owner, verifiers)?);
    bind_configured_roles(&ledger, &identities)?;

    let state = ApiState {
        ledger: Arc::clone(&ledger),
        identities,
        verify_timeout: config.verifier.timeout(),
        admin_api: config.features.admin_api,
        start_time: Instant::now(),
    };

    let addr = format!("{}:{}", config.api.host, config.api.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP API listening on {}", addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Flushing ledger state...");
    ledger.flush()?;
    info!("Shade node stopped");
    Ok(())
}

/// Same holder is a no-op, a different holder is a startup error
fn bind_configured_roles(ledger: &ShieldedLedger, identities: &RoleIdentities) -> Result<()> {
    let wanted: [(ControllerRole, Option<AccountId>); 2] = [
        (ControllerRole::Burn, identities.burn_controller),
        (ControllerRole::Mint, identities.mint_controller),
    ];

    for (role, holder) in wanted {
        let Some(holder) = holder else {
            warn!("No {} configured; its endpoint will reject calls", role);
            continue;
        };
        match ledger.role(role)? {
            RoleSlot::Bound(current) if current == holder => {}
            RoleSlot::Bound(current) => {
                anyhow::bail!(
                    "{} is bound to {} but config names {}; unbind it first",
                    role,
                    current,
                    holder
                );
            }
            RoleSlot::Unbound => ledger.bind_role(&identities.owner, role, holder)?,
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
