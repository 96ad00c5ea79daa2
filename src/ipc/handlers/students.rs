use serde_json::json;

use crate::ipc::error::ok;
use crate::ipc::helpers::{
    optional_i64, optional_str, require_db, required_str, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::store::{self, NewStudent, StudentUpdate};

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "students.list" => list(state, req),
        "students.get" => get(state, req),
        "students.create" => create(state, req),
        "students.update" => update(state, req),
        "students.delete" => delete(state, req),
        "students.search" => search(state, req),
        _ => return None,
    };
    Some(match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => e.response(&req.id),
    })
}

fn list(state: &AppState, _req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let students = store::list_students(conn)?;
    Ok(json!({ "students": students }))
}

fn get(state: &AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let id = required_str(&req.params, "id")?;
    let detail = store::get_student(conn, &id)?;
    Ok(json!(detail))
}

fn create(state: &AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let new = NewStudent {
        id: required_str(&req.params, "id")?,
        name: required_str(&req.params, "name")?,
        email: optional_str(&req.params, "email")?,
        phone: optional_str(&req.params, "phone")?,
        course_id: optional_i64(&req.params, "course_id")?,
        performance: optional_str(&req.params, "performance")?,
    };
    store::create_student(conn, &state.config, &new)?;
    Ok(json!({ "student_id": new.id.trim() }))
}

fn update(state: &AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let id = required_str(&req.params, "id")?;
    let update = StudentUpdate {
        name: required_str(&req.params, "name")?,
        email: optional_str(&req.params, "email")?,
        phone: optional_str(&req.params, "phone")?,
        performance: optional_str(&req.params, "performance")?,
    };
    store::update_student(conn, &id, &update)?;
    Ok(json!({ "updated": true }))
}

fn delete(state: &AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let id = required_str(&req.params, "id")?;
    store::delete_student(conn, &id)?;
    Ok(json!({ "deleted": true }))
}

fn search(state: &AppState, req: &Request) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    // Absent query means match-all, same as the empty string.
    let query = optional_str(&req.params, "q")?.unwrap_or_default();
    let students = store::search_students(conn, &query)?;
    Ok(json!({ "students": students }))
}
