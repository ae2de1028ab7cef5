use crate::{auth::auth, models::{ApiError, AuthUser, DiagnosticsResponse}, state::AppState};
use axum::{extract::{State, Extension}, Json};
use std::sync::{Mutex, OnceLock};
use sysinfo::System;
use tracing::info;

static SYSTEM_MONITOR: OnceLock<Mutex<System>> = OnceLock::new();

/// Process and live connection statistics
pub async fn diagnostics(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DiagnosticsResponse>, ApiError> {

    // Admins only
    auth::ensure_admin(&user)?;

    // Live connection counts
    let n_conn = state.registry.len() as u32;
    let n_live_sessions = state.registry.session_count() as u32;
    let n_cached_identities = state.identities.entry_count() as u32;

    // System stats
    let (cpu_usage, memory_alloc, memory_free, memory_total) = {
        let sys_lock = SYSTEM_MONITOR.get_or_init(|| {
            Mutex::new(System::new_all())
        });
        match sys_lock.lock() {
            Ok(mut sys) => {
                sys.refresh_cpu();
                sys.refresh_memory();
                (
                    sys.global_cpu_info().cpu_usage(),
                    sys.used_memory(),
                    sys.free_memory(),
                    sys.total_memory(),
                )
            }
            Err(_) => (0.0, 0, 0, 0)
        }
    };

    info!(
        "Diagnostics: CPU: {:.2}%, Mem: {}/{} MB (Free: {} MB), Conn: {}, Sessions: {}",
        cpu_usage,
        memory_alloc / 1024 / 1024,
        memory_total / 1024 / 1024,
        memory_free / 1024 / 1024,
        n_conn,
        n_live_sessions
    );

    Ok(Json(DiagnosticsResponse {
        n_conn,
        n_live_sessions,
        n_cached_identities,
        cpu_usage,
        memory_alloc,
        memory_total,
        memory_free,
    }))
}
