use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use thiserror::Error;

use crate::{
    events::{EventRelay, TodoMutation},
    format,
};

pub const MAX_TEXT_LEN: usize = 255;

const TODO_COLUMNS: &str = "id, title, assignee, due_date, time_tracked, status, priority, \
                            task_type, estimated_sp, actual_sp, created_at, updated_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Open,
    InProgress,
    Stuck,
    Completed,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Pending,
        Status::Open,
        Status::InProgress,
        Status::Stuck,
        Status::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Open => "open",
            Status::InProgress => "in_progress",
            Status::Stuck => "stuck",
            Status::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
    BestEffort,
}

impl Priority {
    pub const ALL: [Priority; 5] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
        Priority::BestEffort,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
            Priority::BestEffort => "best_effort",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TaskType {
    FeatureEnhancements,
    Bug,
    Other,
}

impl TaskType {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskType::FeatureEnhancements => "feature_enhancements",
            TaskType::Bug => "bug",
            TaskType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    pub id: i64,
    pub title: Option<String>,
    pub assignee: String,
    pub due_date: NaiveDate,
    pub time_tracked: i64,
    pub status: Status,
    pub priority: Option<Priority>,
    #[serde(rename = "type")]
    pub task_type: Option<TaskType>,
    pub estimated_sp: Option<i64>,
    pub actual_sp: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Assignees as an ordered list, split from the delimited column.
    pub fn assignees(&self) -> Vec<String> {
        format::split_assignees(&self.assignee)
    }
}

/// List-endpoint projection of a [`Todo`], using the public API field names.
#[derive(Debug, Serialize)]
pub struct TodoListItem {
    pub id: i64,
    pub task: Option<String>,
    pub developer: Vec<String>,
    pub date: String,
    pub time_tracked: i64,
    pub status: String,
    pub status_raw: Status,
    pub priority: Option<String>,
    #[serde(rename = "type")]
    pub task_type: Option<String>,
    pub estimated_sp: Option<i64>,
    pub actual_sp: Option<i64>,
}

impl From<Todo> for TodoListItem {
    fn from(todo: Todo) -> Self {
        Self {
            id: todo.id,
            developer: todo.assignees(),
            date: format::format_display_date(todo.due_date),
            time_tracked: todo.time_tracked,
            status: format::humanize(todo.status.as_str()),
            status_raw: todo.status,
            priority: todo.priority.map(|priority| format::humanize(priority.as_str())),
            task_type: todo.task_type.map(|task_type| format::humanize(task_type.as_str())),
            estimated_sp: todo.estimated_sp,
            actual_sp: todo.actual_sp,
            task: todo.title,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTodo {
    pub task: Option<String>,
    pub developer: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub time_tracked: Option<i64>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    #[serde(rename = "type")]
    pub task_type: Option<TaskType>,
    pub estimated_sp: Option<i64>,
    pub actual_sp: Option<i64>,
}

/// Assignees arrive either as the delimited text form or as a list of names;
/// a list is re-joined into the delimited form before storage.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AssigneeInput {
    Names(Vec<String>),
    Text(String),
}

impl AssigneeInput {
    fn into_column(self) -> String {
        match self {
            AssigneeInput::Names(names) => format::join_assignees(&names),
            AssigneeInput::Text(text) => text,
        }
    }

    fn text_len(&self) -> usize {
        match self {
            AssigneeInput::Names(names) => format::join_assignees(names).chars().count(),
            AssigneeInput::Text(text) => text.chars().count(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodo {
    pub task: Option<String>,
    pub developer: Option<AssigneeInput>,
    pub date: Option<NaiveDate>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    #[serde(rename = "type")]
    pub task_type: Option<TaskType>,
    pub estimated_sp: Option<i64>,
    pub actual_sp: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn describe_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

const PAST_DUE_DATE: &str =
    "Due date cannot be in the past. Please choose today or a future date.";

fn check_text_len(violations: &mut Vec<FieldViolation>, field: &'static str, len: usize) {
    if len > MAX_TEXT_LEN {
        violations.push(FieldViolation::new(
            field,
            format!("must be at most {MAX_TEXT_LEN} characters"),
        ));
    }
}

fn check_non_negative(violations: &mut Vec<FieldViolation>, field: &'static str, value: Option<i64>) {
    if let Some(value) = value
        && value < 0
    {
        violations.push(FieldViolation::new(field, "must not be negative"));
    }
}

impl CreateTodo {
    /// Field-level validation; `today` is the server's current calendar date.
    pub fn validate(&self, today: NaiveDate) -> Result<(), Vec<FieldViolation>> {
        let mut violations = Vec::new();

        if let Some(task) = &self.task {
            check_text_len(&mut violations, "task", task.chars().count());
        }
        if let Some(developer) = &self.developer {
            check_text_len(&mut violations, "developer", developer.chars().count());
        }
        if let Some(due_date) = self.due_date
            && due_date < today
        {
            violations.push(FieldViolation::new("due_date", PAST_DUE_DATE));
        }
        check_non_negative(&mut violations, "time_tracked", self.time_tracked);
        check_non_negative(&mut violations, "estimated_sp", self.estimated_sp);
        check_non_negative(&mut violations, "actual_sp", self.actual_sp);

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

impl UpdateTodo {
    pub fn validate(&self, today: NaiveDate) -> Result<(), Vec<FieldViolation>> {
        let mut violations = Vec::new();

        if let Some(task) = &self.task {
            check_text_len(&mut violations, "task", task.chars().count());
        }
        if let Some(developer) = &self.developer {
            check_text_len(&mut violations, "developer", developer.text_len());
        }
        if let Some(date) = self.date
            && date < today
        {
            violations.push(FieldViolation::new("date", PAST_DUE_DATE));
        }
        check_non_negative(&mut violations, "estimated_sp", self.estimated_sp);
        check_non_negative(&mut violations, "actual_sp", self.actual_sp);

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Title,
    DueDate,
    Status,
    Priority,
    Type,
    EstimatedSp,
    ActualSp,
}

impl SortField {
    fn column(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Title => "title",
            SortField::DueDate => "due_date",
            SortField::Status => "status",
            SortField::Priority => "priority",
            SortField::Type => "task_type",
            SortField::EstimatedSp => "estimated_sp",
            SortField::ActualSp => "actual_sp",
        }
    }
}

impl FromStr for SortField {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "id" => Ok(SortField::Id),
            "title" => Ok(SortField::Title),
            "due_date" => Ok(SortField::DueDate),
            "status" => Ok(SortField::Status),
            "priority" => Ok(SortField::Priority),
            "type" => Ok(SortField::Type),
            "estimated_sp" => Ok(SortField::EstimatedSp),
            "actual_sp" => Ok(SortField::ActualSp),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn sql(self) -> &'static str {
        match self {
            SortDirection::Asc => " ASC",
            SortDirection::Desc => " DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub search: Option<String>,
    pub sort_by: Option<SortField>,
    pub order_direction: Option<SortDirection>,
}

impl ListParams {
    /// Parse raw query parameters, enforcing the sort allow-list.
    pub fn parse(
        search: Option<String>,
        sort_by: Option<&str>,
        order_direction: Option<&str>,
    ) -> Result<Self, Vec<FieldViolation>> {
        let mut violations = Vec::new();

        let sort_by = match sort_by {
            Some(raw) => match raw.parse::<SortField>() {
                Ok(field) => Some(field),
                Err(()) => {
                    violations.push(FieldViolation::new(
                        "sort_by",
                        "must be one of: id, title, due_date, status, priority, type, \
                         estimated_sp, actual_sp",
                    ));
                    None
                }
            },
            None => None,
        };

        let order_direction = match order_direction {
            Some(raw) => match raw.parse::<SortDirection>() {
                Ok(direction) => Some(direction),
                Err(()) => {
                    violations.push(FieldViolation::new(
                        "order_direction",
                        "must be one of: asc, desc",
                    ));
                    None
                }
            },
            None => None,
        };

        if violations.is_empty() {
            Ok(Self {
                search,
                sort_by,
                order_direction,
            })
        } else {
            Err(violations)
        }
    }
}

#[derive(Debug, Error)]
pub enum TodoStoreError {
    #[error("Todo list not found")]
    NotFound,
    #[error("No todo lists found to delete")]
    NothingDeleted,
    #[error("{}", describe_violations(.0))]
    Validation(Vec<FieldViolation>),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// CRUD owner for task records. The store is the sole writer; every committed
/// mutation is published to the relay after the persistence write.
pub struct TodoStore<'a> {
    pool: &'a SqlitePool,
    relay: &'a EventRelay,
}

impl<'a> TodoStore<'a> {
    pub fn new(pool: &'a SqlitePool, relay: &'a EventRelay) -> Self {
        Self { pool, relay }
    }

    pub async fn create(
        &self,
        data: CreateTodo,
        today: NaiveDate,
    ) -> Result<Todo, TodoStoreError> {
        data.validate(today).map_err(TodoStoreError::Validation)?;

        let title = data.task.unwrap_or_else(|| "New Task".to_string());
        let assignee = data.developer.unwrap_or_default();
        let due_date = data.due_date.unwrap_or(today);
        let time_tracked = data.time_tracked.unwrap_or(0);
        let status = data.status.unwrap_or(Status::Pending);

        let todo = sqlx::query_as::<_, Todo>(&format!(
            "INSERT INTO todos (title, assignee, due_date, time_tracked, status, priority, \
                                task_type, estimated_sp, actual_sp)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {TODO_COLUMNS}"
        ))
        .bind(title)
        .bind(assignee)
        .bind(due_date)
        .bind(time_tracked)
        .bind(status)
        .bind(data.priority)
        .bind(data.task_type)
        .bind(data.estimated_sp)
        .bind(data.actual_sp)
        .fetch_one(self.pool)
        .await?;

        self.relay.publish(TodoMutation::Created { todo: todo.clone() });
        Ok(todo)
    }

    pub async fn list(&self, params: &ListParams) -> Result<Vec<Todo>, TodoStoreError> {
        let sort = params.sort_by.unwrap_or(SortField::Id);
        let direction = params.order_direction.unwrap_or(SortDirection::Desc);

        let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {TODO_COLUMNS} FROM todos"));
        if let Some(search) = params.search.as_deref().filter(|search| !search.is_empty()) {
            // The needle is wrapped in LIKE wildcards and not escaped, so
            // `%` and `_` in the input act as wildcards too.
            query.push(" WHERE title LIKE ");
            query.push_bind(format!("%{search}%"));
        }
        query.push(" ORDER BY ");
        query.push(sort.column());
        query.push(direction.sql());

        let todos = query
            .build_query_as::<Todo>()
            .fetch_all(self.pool)
            .await?;
        Ok(todos)
    }

    pub async fn get(&self, id: i64) -> Result<Todo, TodoStoreError> {
        sqlx::query_as::<_, Todo>(&format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(TodoStoreError::NotFound)
    }

    /// Partial update: only the fields present in `data` are applied. The
    /// read-then-write pair runs inside one transaction so concurrent writes
    /// to the same id serialize.
    pub async fn update(
        &self,
        id: i64,
        data: UpdateTodo,
        today: NaiveDate,
    ) -> Result<Todo, TodoStoreError> {
        data.validate(today).map_err(TodoStoreError::Validation)?;

        let mut tx = self.pool.begin().await?;

        let existing =
            sqlx::query_as::<_, Todo>(&format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = $1"))
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(TodoStoreError::NotFound)?;

        let title = data.task.or(existing.title);
        let assignee = match data.developer {
            Some(input) => input.into_column(),
            None => existing.assignee,
        };
        let due_date = data.date.unwrap_or(existing.due_date);
        let status = data.status.unwrap_or(existing.status);
        let priority = data.priority.or(existing.priority);
        let task_type = data.task_type.or(existing.task_type);
        let estimated_sp = data.estimated_sp.or(existing.estimated_sp);
        let actual_sp = data.actual_sp.or(existing.actual_sp);

        let todo = sqlx::query_as::<_, Todo>(&format!(
            "UPDATE todos
             SET title = $2, assignee = $3, due_date = $4, status = $5, priority = $6,
                 task_type = $7, estimated_sp = $8, actual_sp = $9,
                 updated_at = CURRENT_TIMESTAMP
             WHERE id = $1
             RETURNING {TODO_COLUMNS}"
        ))
        .bind(id)
        .bind(title)
        .bind(assignee)
        .bind(due_date)
        .bind(status)
        .bind(priority)
        .bind(task_type)
        .bind(estimated_sp)
        .bind(actual_sp)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        self.relay.publish(TodoMutation::Updated { todo: todo.clone() });
        Ok(todo)
    }

    pub async fn delete(&self, id: i64) -> Result<i64, TodoStoreError> {
        let mut tx = self.pool.begin().await?;

        let existing =
            sqlx::query_as::<_, Todo>(&format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = $1"))
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(TodoStoreError::NotFound)?;

        sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.relay.publish(TodoMutation::Deleted {
            id,
            title: existing.title,
        });
        Ok(id)
    }

    /// Delete every record whose id is in `ids`. A partial match succeeds;
    /// zero deleted rows is an error even if some ids were valid-looking.
    pub async fn bulk_delete(&self, ids: &[i64]) -> Result<u64, TodoStoreError> {
        if ids.is_empty() {
            return Err(TodoStoreError::NothingDeleted);
        }

        let mut query = QueryBuilder::<Sqlite>::new("DELETE FROM todos WHERE id IN (");
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        query.push(")");

        let deleted = query.build().execute(self.pool).await?.rows_affected();
        if deleted == 0 {
            return Err(TodoStoreError::NothingDeleted);
        }

        self.relay.publish(TodoMutation::BulkDeleted {
            ids: ids.to_vec(),
            count: deleted,
        });
        Ok(deleted)
    }
}
