use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{optional_i64, optional_u64, require_db, required_str};
use crate::ipc::types::{AppState, Request};
use crate::{db, seed};

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(health(state, req)),
        "workspace.select" => Some(select(state, req)),
        "workspace.reset" => Some(reset(state, req)),
        "workspace.seed" => Some(seed_fixture(state, req)),
        _ => None,
    }
}

fn health(state: &AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspace_path": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

/// Opens (or creates) the workspace database. Provisioning is
/// create-if-absent; existing data survives a select.
fn select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let path = match required_str(&req.params, "path") {
        Ok(v) => PathBuf::from(v),
        Err(e) => return e.response(&req.id),
    };
    let default_course_id = match optional_i64(&req.params, "default_course_id") {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };

    match db::open_db(&path) {
        Ok(conn) => {
            state.workspace = Some(path.clone());
            state.db = Some(conn);
            if let Some(course_id) = default_course_id {
                state.config.default_course_id = course_id;
            }
            ok(&req.id, json!({ "workspace_path": path.to_string_lossy() }))
        }
        Err(e) => err(&req.id, "db_open_failed", format!("{e:?}"), None),
    }
}

/// Explicit destructive wipe: drops and recreates the five relations.
fn reset(state: &mut AppState, req: &Request) -> serde_json::Value {
    let conn = match require_db(state) {
        Ok(c) => c,
        Err(e) => return e.response(&req.id),
    };
    match db::reset_db(conn) {
        Ok(()) => ok(&req.id, json!({ "reset": true })),
        Err(e) => err(&req.id, "db_query_failed", format!("{e:?}"), None),
    }
}

/// Reset plus sample fixture rows. Attendance randomization honors the
/// optional `seed` param so callers can reproduce a fixture exactly.
fn seed_fixture(state: &mut AppState, req: &Request) -> serde_json::Value {
    let seed_param = match optional_u64(&req.params, "seed") {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };
    let conn = match require_db(state) {
        Ok(c) => c,
        Err(e) => return e.response(&req.id),
    };

    let result = db::reset_db(conn).and_then(|()| {
        let mut rng = match seed_param {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        seed::seed_sample_data(conn, &mut rng)
    });
    match result {
        Ok(()) => ok(&req.id, json!({ "seeded": true })),
        Err(e) => err(&req.id, "db_query_failed", format!("{e:?}"), None),
    }
}
