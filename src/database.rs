//! SQLite-backed storage for users and projects
//!
//! The database is optional at process start: when the connection cannot be
//! established the server keeps running and the demo-mode switch decides
//! whether requests degrade to synthetic data or fail.

use crate::auth::users::UserData;
use crate::auth::{IdentityStore, Role, StoredIdentity};
use crate::models::{Material, Note, Project, ProjectFile, ProjectStatus, ProjectType, Room};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteConnectOptions, Row, SqlitePool};
use tracing::{debug, error, info};

/// Errors surfaced by the storage layer
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("query failed: {0}")]
    Query(String),
    #[error("record corrupt: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Query(err.to_string())
    }
}

/// Filter, sort and page parameters for project listings
#[derive(Debug, Clone)]
pub struct ProjectFilter {
    pub project_type: Option<ProjectType>,
    pub status: Option<ProjectStatus>,
    pub search: Option<String>,
    pub sort_by: String,
    pub sort_desc: bool,
    pub limit: i64,
    pub offset: i64,
}

/// Aggregate user statistics for the admin surface
#[derive(Debug, serde::Serialize)]
pub struct UserStats {
    pub total_users: u64,
    pub admin_users: u64,
    pub recent_users: u64,
}

/// Database user row; nested collections are stored as JSON text
#[derive(Debug)]
struct UserRecord {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: String,
}

impl UserRecord {
    fn to_user_data(&self) -> Result<UserData, StoreError> {
        let role: Role = self
            .role
            .parse()
            .map_err(|e: String| StoreError::Corrupt(e))?;

        let created_at: DateTime<Utc> = self
            .created_at
            .parse()
            .map_err(|_| StoreError::Corrupt(format!("bad timestamp for user {}", self.id)))?;

        Ok(UserData {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            password_hash: self.password_hash.clone(),
            role,
            created_at,
        })
    }

    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: row.try_get("role")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Database project row
#[derive(Debug)]
struct ProjectRecord {
    id: String,
    user_id: String,
    name: String,
    description: String,
    total_area: f64,
    project_type: String,
    main_material: String,
    status: String,
    budget: Option<f64>,
    deadline: Option<String>,
    rooms: String,
    materials: String,
    files: String,
    notes: String,
    created_at: String,
    updated_at: String,
}

impl ProjectRecord {
    fn to_project(&self) -> Result<Project, StoreError> {
        let corrupt = |what: &str| StoreError::Corrupt(format!("bad {} for project {}", what, self.id));

        let rooms: Vec<Room> =
            serde_json::from_str(&self.rooms).map_err(|_| corrupt("rooms"))?;
        let materials: Vec<Material> =
            serde_json::from_str(&self.materials).map_err(|_| corrupt("materials"))?;
        let files: Vec<ProjectFile> =
            serde_json::from_str(&self.files).map_err(|_| corrupt("files"))?;
        let notes: Vec<Note> =
            serde_json::from_str(&self.notes).map_err(|_| corrupt("notes"))?;

        let deadline = match &self.deadline {
            Some(raw) => Some(raw.parse().map_err(|_| corrupt("deadline"))?),
            None => None,
        };

        Ok(Project {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            total_area: self.total_area,
            project_type: self
                .project_type
                .parse()
                .map_err(|_| corrupt("project_type"))?,
            main_material: self.main_material.clone(),
            status: self.status.parse().map_err(|_| corrupt("status"))?,
            budget: self.budget,
            deadline,
            rooms,
            materials,
            files,
            notes,
            created_at: self.created_at.parse().map_err(|_| corrupt("created_at"))?,
            updated_at: self.updated_at.parse().map_err(|_| corrupt("updated_at"))?,
        })
    }

    fn from_project(project: &Project) -> Result<Self, StoreError> {
        let encode = |what: &str, err: serde_json::Error| {
            StoreError::Corrupt(format!("cannot encode {}: {}", what, err))
        };

        Ok(Self {
            id: project.id.clone(),
            user_id: project.user_id.clone(),
            name: project.name.clone(),
            description: project.description.clone(),
            total_area: project.total_area,
            project_type: project.project_type.to_string(),
            main_material: project.main_material.clone(),
            status: project.status.to_string(),
            budget: project.budget,
            deadline: project.deadline.map(|d| d.to_rfc3339()),
            rooms: serde_json::to_string(&project.rooms).map_err(|e| encode("rooms", e))?,
            materials: serde_json::to_string(&project.materials)
                .map_err(|e| encode("materials", e))?,
            files: serde_json::to_string(&project.files).map_err(|e| encode("files", e))?,
            notes: serde_json::to_string(&project.notes).map_err(|e| encode("notes", e))?,
            created_at: project.created_at.to_rfc3339(),
            updated_at: project.updated_at.to_rfc3339(),
        })
    }

    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, StoreError> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            total_area: row.try_get("total_area")?,
            project_type: row.try_get("project_type")?,
            main_material: row.try_get("main_material")?,
            status: row.try_get("status")?,
            budget: row.try_get("budget")?,
            deadline: row.try_get("deadline")?,
            rooms: row.try_get("rooms")?,
            materials: row.try_get("materials")?,
            files: row.try_get("files")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Storage service over a SQLite pool
pub struct DatabaseService {
    pool: SqlitePool,
}

impl DatabaseService {
    /// Connect, create the schema and seed the default admin account
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        info!("Connecting to database: {}", database_url);

        let pool = if database_url.starts_with("sqlite:") && !database_url.contains(":memory:") {
            let db_path = database_url.strip_prefix("sqlite:").unwrap_or(database_url);

            if let Some(parent) = std::path::Path::new(db_path).parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        StoreError::Unavailable(format!("failed to create directory: {}", e))
                    })?;
                }
            }

            let options = SqliteConnectOptions::new()
                .filename(db_path)
                .create_if_missing(true);

            SqlitePool::connect_with(options)
                .await
                .map_err(|e| StoreError::Unavailable(format!("connection failed: {}", e)))?
        } else {
            SqlitePool::connect(database_url)
                .await
                .map_err(|e| StoreError::Unavailable(format!("connection failed: {}", e)))?
        };

        let service = Self { pool };
        service.create_tables().await?;
        service.ensure_default_admin().await?;

        info!("Database connection established");
        Ok(service)
    }

    async fn create_tables(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'user',
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                total_area REAL NOT NULL,
                project_type TEXT NOT NULL,
                main_material TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'in_progress',
                budget REAL,
                deadline TEXT,
                rooms TEXT NOT NULL DEFAULT '[]',
                materials TEXT NOT NULL DEFAULT '[]',
                files TEXT NOT NULL DEFAULT '[]',
                notes TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_projects_user ON projects(user_id)")
            .execute(&self.pool)
            .await?;

        debug!("Database tables ready");
        Ok(())
    }

    /// Seed an admin account on first start so the admin surface is usable
    async fn ensure_default_admin(&self) -> Result<(), StoreError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM users WHERE role = 'admin'")
            .fetch_one(&self.pool)
            .await?;

        let count: i64 = row.try_get("count")?;
        if count > 0 {
            return Ok(());
        }

        let admin = UserData::new(
            "Administrator".to_string(),
            "admin@planfloor.local".to_string(),
            "admin123", // Default password - should be changed in production
            Role::Admin,
        )
        .map_err(|e| StoreError::Corrupt(format!("cannot hash admin password: {}", e)))?;

        self.insert_user(&admin).await?;
        info!("Created default admin user: {}", admin.email);
        Ok(())
    }

    // --- users ---

    pub async fn insert_user(&self, user: &UserData) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .bind(user.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!("User inserted: {}", user.email);
        Ok(())
    }

    pub async fn find_user_by_id(&self, user_id: &str) -> Result<Option<UserData>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(UserRecord::from_row(&row)?.to_user_data()?)),
            None => Ok(None),
        }
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserData>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(UserRecord::from_row(&row)?.to_user_data()?)),
            None => Ok(None),
        }
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        let count: i64 = row.try_get("count")?;
        Ok(count > 0)
    }

    pub async fn update_user(
        &self,
        user_id: &str,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<UserData>, StoreError> {
        let Some(mut user) = self.find_user_by_id(user_id).await? else {
            return Ok(None);
        };

        if let Some(name) = name {
            user.name = name.to_string();
        }
        if let Some(email) = email {
            user.email = email.to_string();
        }

        sqlx::query("UPDATE users SET name = ?, email = ? WHERE id = ?")
            .bind(&user.name)
            .bind(&user.email)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(Some(user))
    }

    pub async fn user_stats(&self) -> Result<UserStats, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) as total_users,
                COUNT(CASE WHEN role = 'admin' THEN 1 END) as admin_users,
                COUNT(CASE WHEN created_at > datetime('now', '-7 days') THEN 1 END) as recent_users
            FROM users
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(UserStats {
            total_users: row.try_get::<i64, _>("total_users")? as u64,
            admin_users: row.try_get::<i64, _>("admin_users")? as u64,
            recent_users: row.try_get::<i64, _>("recent_users")? as u64,
        })
    }

    // --- projects ---

    pub async fn save_project(&self, project: &Project) -> Result<(), StoreError> {
        let record = ProjectRecord::from_project(project)?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO projects
                (id, user_id, name, description, total_area, project_type, main_material,
                 status, budget, deadline, rooms, materials, files, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.user_id)
        .bind(&record.name)
        .bind(&record.description)
        .bind(record.total_area)
        .bind(&record.project_type)
        .bind(&record.main_material)
        .bind(&record.status)
        .bind(record.budget)
        .bind(&record.deadline)
        .bind(&record.rooms)
        .bind(&record.materials)
        .bind(&record.files)
        .bind(&record.notes)
        .bind(&record.created_at)
        .bind(&record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find_project(&self, project_id: &str) -> Result<Option<Project>, StoreError> {
        let row = sqlx::query("SELECT * FROM projects WHERE id = ?")
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(ProjectRecord::from_row(&row)?.to_project()?)),
            None => Ok(None),
        }
    }

    pub async fn delete_project(&self, project_id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(project_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Owner-scoped listing with filters, sorting and pagination.
    /// Returns the page of projects and the total match count.
    pub async fn list_projects(
        &self,
        owner_id: &str,
        filter: &ProjectFilter,
    ) -> Result<(Vec<Project>, i64), StoreError> {
        let mut conditions = vec!["user_id = ?".to_string()];
        if filter.project_type.is_some() {
            conditions.push("project_type = ?".to_string());
        }
        if filter.status.is_some() {
            conditions.push("status = ?".to_string());
        }
        if filter.search.is_some() {
            conditions
                .push("(name LIKE ? OR description LIKE ? OR main_material LIKE ?)".to_string());
        }
        let where_clause = conditions.join(" AND ");

        // sort column is taken from a fixed whitelist, never from raw input
        let sort_column = match filter.sort_by.as_str() {
            "name" => "name",
            "updated_at" => "updated_at",
            "total_area" => "total_area",
            "budget" => "budget",
            _ => "created_at",
        };
        let sort_dir = if filter.sort_desc { "DESC" } else { "ASC" };

        let count_sql = format!("SELECT COUNT(*) as count FROM projects WHERE {}", where_clause);
        let count_row = bind_project_filters(sqlx::query(&count_sql), owner_id, filter)
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = count_row.try_get("count")?;

        let list_sql = format!(
            "SELECT * FROM projects WHERE {} ORDER BY {} {} LIMIT ? OFFSET ?",
            where_clause, sort_column, sort_dir
        );
        let rows = bind_project_filters(sqlx::query(&list_sql), owner_id, filter)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .await?;

        let mut projects = Vec::with_capacity(rows.len());
        for row in rows {
            projects.push(ProjectRecord::from_row(&row)?.to_project()?);
        }

        Ok((projects, total))
    }
}

/// Bind the shared filter parameters in the same order the WHERE clause
/// lists them; values are bound owned so the query string lifetime is the
/// only borrow.
fn bind_project_filters<'q>(
    mut q: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    owner_id: &str,
    filter: &ProjectFilter,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    q = q.bind(owner_id.to_string());
    if let Some(project_type) = filter.project_type {
        q = q.bind(project_type.to_string());
    }
    if let Some(status) = filter.status {
        q = q.bind(status.to_string());
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        q = q.bind(pattern.clone()).bind(pattern.clone()).bind(pattern);
    }
    q
}

#[async_trait]
impl IdentityStore for DatabaseService {
    async fn find_identity(&self, id: &str) -> Result<Option<StoredIdentity>, StoreError> {
        let user = self.find_user_by_id(id).await?;
        Ok(user.map(|u| StoredIdentity {
            id: u.id,
            name: u.name,
            role: u.role,
        }))
    }
}
