//! Facade over the five relations. Every operation opens no transaction of
//! its own: one call, one statement scope, SQLite serializes writers.
//!
//! Derived metrics are computed with grouped aggregation (GROUP BY plus
//! COUNT/AVG in join subqueries) rather than correlated subqueries, so each
//! aggregate can be read and tested on its own.

use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("student not found: {0}")]
    NotFound(String),
    #[error("student id already exists: {0}")]
    DuplicateKey(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Storage(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Daemon-level knobs. `default_course_id` backs `create_student` when the
/// caller leaves the course out.
#[derive(Debug, Clone)]
pub struct Config {
    pub default_course_id: i64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_course_id: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub course_id: Option<i64>,
    pub performance: Option<String>,
    pub created_at: String,
}

/// One row of `list_students`/`search_students`: the student, its course
/// name (left join, None when the course is absent or was deleted) and the
/// full-precision derived metrics. Both metrics are None rather than an
/// error when the student has no underlying rows.
#[derive(Debug, Clone, Serialize)]
pub struct StudentSummary {
    #[serde(flatten)]
    pub student: Student,
    pub course_name: Option<String>,
    pub avg_score: Option<f64>,
    pub attendance_percentage: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentRow {
    pub id: i64,
    pub student_id: String,
    pub subject: String,
    pub score: i64,
    pub max_score: i64,
    pub assignment_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SemesterRow {
    pub id: i64,
    pub student_id: String,
    pub semester: i64,
    pub cgpa: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceRow {
    pub date: String,
    pub present: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentDetail {
    pub student: Student,
    pub course_name: Option<String>,
    pub assignments: Vec<AssignmentRow>,
    pub semesters: Vec<SemesterRow>,
    pub attendance: Vec<AttendanceRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseCount {
    pub name: String,
    pub student_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentAssignment {
    #[serde(flatten)]
    pub assignment: AssignmentRow,
    pub student_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub total_students: i64,
    pub average_cgpa: f64,
    pub average_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsOverview {
    pub overview: Overview,
    pub course_distribution: Vec<CourseCount>,
    pub recent_activity: Vec<RecentAssignment>,
}

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub course_id: Option<i64>,
    pub performance: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StudentUpdate {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub performance: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub student_id: String,
    pub subject: String,
    pub score: i64,
    pub max_score: Option<i64>,
    pub assignment_date: Option<String>,
}

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

fn required(value: &str, what: &str) -> StoreResult<String> {
    let t = value.trim();
    if t.is_empty() {
        return Err(StoreError::Validation(format!("{} must not be empty", what)));
    }
    Ok(t.to_string())
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(f, _)
            if f.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

// ---- mutations -----------------------------------------------------------

pub fn create_student(conn: &Connection, cfg: &Config, new: &NewStudent) -> StoreResult<()> {
    let id = required(&new.id, "id")?;
    let name = required(&new.name, "name")?;
    let course_id = new.course_id.unwrap_or(cfg.default_course_id);
    let performance = new.performance.clone().unwrap_or_else(|| "Good".to_string());

    // The PRIMARY KEY constraint is the duplicate check: of two concurrent
    // creates one insert wins and the other surfaces here.
    let res = conn.execute(
        "INSERT INTO students(id, name, email, phone, course_id, performance)
         VALUES(?, ?, ?, ?, ?, ?)",
        (
            &id,
            &name,
            new.email.as_deref(),
            new.phone.as_deref(),
            course_id,
            &performance,
        ),
    );
    match res {
        Ok(_) => Ok(()),
        Err(e) if is_constraint_violation(&e) => Err(StoreError::DuplicateKey(id)),
        Err(e) => Err(e.into()),
    }
}

pub fn update_student(conn: &Connection, id: &str, update: &StudentUpdate) -> StoreResult<()> {
    let name = required(&update.name, "name")?;
    let changed = conn.execute(
        "UPDATE students SET name = ?, email = ?, phone = ?, performance = ? WHERE id = ?",
        (
            &name,
            update.email.as_deref(),
            update.phone.as_deref(),
            update.performance.as_deref(),
            id,
        ),
    )?;
    if changed == 0 {
        return Err(StoreError::NotFound(id.to_string()));
    }
    Ok(())
}

/// Removes the student row only. Dependent assignment/semester/attendance
/// rows stay behind as orphans and remain directly queryable.
pub fn delete_student(conn: &Connection, id: &str) -> StoreResult<()> {
    let changed = conn.execute("DELETE FROM students WHERE id = ?", [id])?;
    if changed == 0 {
        return Err(StoreError::NotFound(id.to_string()));
    }
    Ok(())
}

/// Appends one scored submission. The referenced student is not checked for
/// existence, matching delete-side orphaning: a dangling student_id is data,
/// not an error. Score may exceed max_score.
pub fn add_assignment(conn: &Connection, new: &NewAssignment) -> StoreResult<()> {
    let student_id = required(&new.student_id, "student_id")?;
    let subject = required(&new.subject, "subject")?;
    let max_score = new.max_score.unwrap_or(100);
    let date = new.assignment_date.clone().unwrap_or_else(today);
    conn.execute(
        "INSERT INTO assignments(student_id, subject, score, max_score, assignment_date)
         VALUES(?, ?, ?, ?, ?)",
        (&student_id, &subject, new.score, max_score, &date),
    )?;
    Ok(())
}

/// Always inserts, even when a row for that (student, date) already exists;
/// duplicates count as independent samples in the percentage.
pub fn mark_attendance(
    conn: &Connection,
    student_id: &str,
    date: Option<String>,
    present: bool,
) -> StoreResult<()> {
    let student_id = required(student_id, "student_id")?;
    let date = date.unwrap_or_else(today);
    conn.execute(
        "INSERT INTO attendance(student_id, date, present) VALUES(?, ?, ?)",
        (&student_id, &date, present as i64),
    )?;
    Ok(())
}

// ---- queries -------------------------------------------------------------

const SUMMARY_SELECT: &str = "SELECT s.id, s.name, s.email, s.phone, s.course_id, s.performance,
        s.created_at, c.name AS course_name, sc.avg_score, att.attendance_percentage
 FROM students s
 LEFT JOIN courses c ON c.id = s.course_id
 LEFT JOIN (
     SELECT student_id, AVG(score) AS avg_score
     FROM assignments
     GROUP BY student_id
 ) sc ON sc.student_id = s.id
 LEFT JOIN (
     SELECT student_id, SUM(present) * 100.0 / COUNT(*) AS attendance_percentage
     FROM attendance
     GROUP BY student_id
 ) att ON att.student_id = s.id";

fn summary_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StudentSummary> {
    Ok(StudentSummary {
        student: Student {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            course_id: row.get(4)?,
            performance: row.get(5)?,
            created_at: row.get(6)?,
        },
        course_name: row.get(7)?,
        avg_score: row.get(8)?,
        attendance_percentage: row.get(9)?,
    })
}

pub fn list_students(conn: &Connection) -> StoreResult<Vec<StudentSummary>> {
    let sql = format!("{} ORDER BY s.id", SUMMARY_SELECT);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], summary_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Substring match on name or id via LIKE (ASCII case-insensitive). The
/// empty query matches every student.
pub fn search_students(conn: &Connection, query: &str) -> StoreResult<Vec<StudentSummary>> {
    let sql = format!(
        "{} WHERE s.name LIKE ? OR s.id LIKE ? ORDER BY s.id",
        SUMMARY_SELECT
    );
    let pattern = format!("%{}%", query);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([&pattern, &pattern], summary_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_student(conn: &Connection, id: &str) -> StoreResult<StudentDetail> {
    let head = conn
        .query_row(
            "SELECT s.id, s.name, s.email, s.phone, s.course_id, s.performance,
                    s.created_at, c.name AS course_name
             FROM students s
             LEFT JOIN courses c ON c.id = s.course_id
             WHERE s.id = ?",
            [id],
            |row| {
                Ok((
                    Student {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                        phone: row.get(3)?,
                        course_id: row.get(4)?,
                        performance: row.get(5)?,
                        created_at: row.get(6)?,
                    },
                    row.get::<_, Option<String>>(7)?,
                ))
            },
        )
        .optional()?;
    let Some((student, course_name)) = head else {
        return Err(StoreError::NotFound(id.to_string()));
    };

    let mut stmt = conn.prepare(
        "SELECT id, student_id, subject, score, max_score, assignment_date
         FROM assignments
         WHERE student_id = ?
         ORDER BY assignment_date DESC, id DESC",
    )?;
    let assignments = stmt
        .query_map([id], |row| {
            Ok(AssignmentRow {
                id: row.get(0)?,
                student_id: row.get(1)?,
                subject: row.get(2)?,
                score: row.get(3)?,
                max_score: row.get(4)?,
                assignment_date: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT id, student_id, semester, cgpa
         FROM semesters
         WHERE student_id = ?
         ORDER BY semester",
    )?;
    let semesters = stmt
        .query_map([id], |row| {
            Ok(SemesterRow {
                id: row.get(0)?,
                student_id: row.get(1)?,
                semester: row.get(2)?,
                cgpa: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    // Bounded history: latest 30 marks only.
    let mut stmt = conn.prepare(
        "SELECT date, present
         FROM attendance
         WHERE student_id = ?
         ORDER BY date DESC, id DESC
         LIMIT 30",
    )?;
    let attendance = stmt
        .query_map([id], |row| {
            Ok(AttendanceRow {
                date: row.get(0)?,
                present: row.get::<_, i64>(1)? != 0,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(StudentDetail {
        student,
        course_name,
        assignments,
        semesters,
        attendance,
    })
}

pub fn list_courses(conn: &Connection) -> StoreResult<Vec<Course>> {
    let mut stmt = conn.prepare("SELECT id, name, department FROM courses ORDER BY id")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Course {
                id: row.get(0)?,
                name: row.get(1)?,
                department: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Cohort-wide aggregates. The two means are rounded to 2 decimals here and
/// only here; empty relations report 0 instead of failing.
pub fn analytics_overview(conn: &Connection) -> StoreResult<AnalyticsOverview> {
    let total_students: i64 =
        conn.query_row("SELECT COUNT(*) FROM students", [], |r| r.get(0))?;
    let average_cgpa: Option<f64> =
        conn.query_row("SELECT AVG(cgpa) FROM semesters", [], |r| r.get(0))?;
    let average_score: Option<f64> =
        conn.query_row("SELECT AVG(score) FROM assignments", [], |r| r.get(0))?;

    // Left join so a course with no students still shows up with count 0.
    // COUNT(s.id) skips the NULLs the left join produces.
    let mut stmt = conn.prepare(
        "SELECT c.name, COUNT(s.id) AS student_count
         FROM courses c
         LEFT JOIN students s ON s.course_id = c.id
         GROUP BY c.id, c.name
         ORDER BY c.id",
    )?;
    let course_distribution = stmt
        .query_map([], |row| {
            Ok(CourseCount {
                name: row.get(0)?,
                student_count: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    // Inner join: assignments whose student is gone are not activity.
    // id DESC breaks same-day ties by insertion order.
    let mut stmt = conn.prepare(
        "SELECT a.id, a.student_id, a.subject, a.score, a.max_score,
                a.assignment_date, s.name AS student_name
         FROM assignments a
         JOIN students s ON s.id = a.student_id
         ORDER BY a.assignment_date DESC, a.id DESC
         LIMIT 5",
    )?;
    let recent_activity = stmt
        .query_map([], |row| {
            Ok(RecentAssignment {
                assignment: AssignmentRow {
                    id: row.get(0)?,
                    student_id: row.get(1)?,
                    subject: row.get(2)?,
                    score: row.get(3)?,
                    max_score: row.get(4)?,
                    assignment_date: row.get(5)?,
                },
                student_name: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AnalyticsOverview {
        overview: Overview {
            total_students,
            average_cgpa: average_cgpa.map(round2).unwrap_or(0.0),
            average_score: average_score.map(round2).unwrap_or(0.0),
        },
        course_distribution,
        recent_activity,
    })
}
