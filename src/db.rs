use rusqlite::Connection;
use std::path::Path;

/// Open (or create) the records database under `workspace` and make sure
/// the schema exists. Provisioning is create-if-absent; existing rows are
/// never touched here. Destructive wipes go through [`reset_db`] only.
pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join("students.sqlite3");
    let conn = Connection::open(db_path)?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Drop all five relations and recreate them empty. Explicit operation;
/// callers opt in (reset/seed), it is never run on startup.
pub fn reset_db(conn: &Connection) -> anyhow::Result<()> {
    conn.execute("DROP TABLE IF EXISTS attendance", [])?;
    conn.execute("DROP TABLE IF EXISTS semesters", [])?;
    conn.execute("DROP TABLE IF EXISTS assignments", [])?;
    conn.execute("DROP TABLE IF EXISTS students", [])?;
    conn.execute("DROP TABLE IF EXISTS courses", [])?;
    create_schema(conn)?;
    Ok(())
}

fn create_schema(conn: &Connection) -> anyhow::Result<()> {
    // student_id columns on dependent tables are plain data, not enforced
    // foreign keys: deleting a student leaves its assignments, semesters
    // and attendance rows in place. Queries join around the orphans.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS courses(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            department TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT,
            phone TEXT,
            course_id INTEGER,
            performance TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_course ON students(course_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS assignments(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id TEXT NOT NULL,
            subject TEXT NOT NULL,
            score INTEGER NOT NULL,
            max_score INTEGER NOT NULL DEFAULT 100,
            assignment_date TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_assignments_student ON assignments(student_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS semesters(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id TEXT NOT NULL,
            semester INTEGER NOT NULL,
            cgpa REAL NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_semesters_student ON semesters(student_id)",
        [],
    )?;

    // No UNIQUE(student_id, date): marking the same day twice inserts two
    // rows and aggregation counts both.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS attendance(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id TEXT NOT NULL,
            date TEXT NOT NULL,
            present INTEGER NOT NULL DEFAULT 1
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_attendance_student ON attendance(student_id)",
        [],
    )?;

    Ok(())
}
