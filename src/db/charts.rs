use std::collections::HashMap;

use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::todos::{Priority, Status},
    format,
};

/// Group-by counts with every declared status present, zero-filled.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub pending: i64,
    pub open: i64,
    pub in_progress: i64,
    pub stuck: i64,
    pub completed: i64,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct PrioritySummary {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
    pub critical: i64,
    pub best_effort: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssigneeStats {
    pub total_todos: i64,
    pub total_pending_todos: i64,
    pub total_timetracked_todos: i64,
}

pub struct ChartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ChartRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn status_summary(&self) -> Result<StatusSummary, sqlx::Error> {
        let rows: Vec<(Status, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM todos GROUP BY status")
                .fetch_all(self.pool)
                .await?;

        let mut summary = StatusSummary::default();
        for (status, count) in rows {
            match status {
                Status::Pending => summary.pending = count,
                Status::Open => summary.open = count,
                Status::InProgress => summary.in_progress = count,
                Status::Stuck => summary.stuck = count,
                Status::Completed => summary.completed = count,
            }
        }
        Ok(summary)
    }

    /// Records with a null priority are excluded from every bucket.
    pub async fn priority_summary(&self) -> Result<PrioritySummary, sqlx::Error> {
        let rows: Vec<(Priority, i64)> = sqlx::query_as(
            "SELECT priority, COUNT(*) FROM todos WHERE priority IS NOT NULL GROUP BY priority",
        )
        .fetch_all(self.pool)
        .await?;

        let mut summary = PrioritySummary::default();
        for (priority, count) in rows {
            match priority {
                Priority::Low => summary.low = count,
                Priority::Medium => summary.medium = count,
                Priority::High => summary.high = count,
                Priority::Critical => summary.critical = count,
                Priority::BestEffort => summary.best_effort = count,
            }
        }
        Ok(summary)
    }

    /// Per-assignee rollups. Counting is by substring containment against the
    /// raw delimited column, so a name that is a substring of another
    /// assignee's name counts that assignee's rows too.
    pub async fn assignee_summary(
        &self,
    ) -> Result<Vec<HashMap<String, AssigneeStats>>, sqlx::Error> {
        let fields: Vec<String> =
            sqlx::query_scalar("SELECT assignee FROM todos WHERE assignee <> ''")
                .fetch_all(self.pool)
                .await?;

        let mut assignees: Vec<String> = Vec::new();
        for field in &fields {
            for name in format::split_assignees(field) {
                if !assignees.contains(&name) {
                    assignees.push(name);
                }
            }
        }

        let mut summary = Vec::with_capacity(assignees.len());
        for name in assignees {
            let pattern = format!("%{name}%");
            let (total, pending, time_tracked): (i64, i64, i64) = sqlx::query_as(
                "SELECT COUNT(*),
                        COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0),
                        COALESCE(SUM(time_tracked), 0)
                 FROM todos
                 WHERE assignee LIKE $1",
            )
            .bind(&pattern)
            .fetch_one(self.pool)
            .await?;

            summary.push(HashMap::from([(
                name,
                AssigneeStats {
                    total_todos: total,
                    total_pending_todos: pending,
                    total_timetracked_todos: time_tracked,
                },
            )]));
        }
        Ok(summary)
    }
}
