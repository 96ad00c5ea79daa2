use serde_json::json;

use crate::ipc::error::ok;
use crate::ipc::helpers::{
    optional_i64, optional_str, require_db, required_i64, required_str, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::store::{self, NewAssignment};

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "assignments.add" => add(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}

fn add(state: &AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let new = NewAssignment {
        student_id: required_str(&req.params, "student_id")?,
        subject: required_str(&req.params, "subject")?,
        score: required_i64(&req.params, "score")?,
        max_score: optional_i64(&req.params, "max_score")?,
        assignment_date: optional_str(&req.params, "assignment_date")?,
    };
    store::add_assignment(conn, &new)?;
    Ok(json!({ "added": true }))
}
