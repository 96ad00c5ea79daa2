use serde_json::json;

use crate::ipc::error::ok;
use crate::ipc::helpers::{optional_bool, optional_str, require_db, required_str, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::store;

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "attendance.mark" => mark(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}

fn mark(state: &AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let student_id = required_str(&req.params, "student_id")?;
    let date = optional_str(&req.params, "date")?;
    let present = optional_bool(&req.params, "present")?.unwrap_or(true);
    store::mark_attendance(conn, &student_id, date, present)?;
    Ok(json!({ "marked": true }))
}
