use serde_json::json;

use crate::ipc::error::ok;
use crate::ipc::helpers::{require_db, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store;

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "courses.list" => list(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}

fn list(state: &AppState, _req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let courses = store::list_courses(conn)?;
    Ok(json!({ "courses": courses }))
}
