use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite};

use crate::format;

/// Optional report criteria, parsed straight from the export/preview query.
/// Every dimension is independent; present dimensions combine with AND, the
/// assignee needles combine internally with OR. Malformed tokens are treated
/// as plain substrings and never error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportFilter {
    pub title: Option<String>,
    pub assigne: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn csv_tokens(value: &str) -> Vec<String> {
    format::split_assignees(value)
}

impl ReportFilter {
    /// Push this filter's WHERE clause onto `query`. A range with only one
    /// bound present is ignored, not treated as one-sided.
    pub fn push_conditions(&self, query: &mut QueryBuilder<'_, Sqlite>) {
        let mut first = true;
        let mut sep = |query: &mut QueryBuilder<'_, Sqlite>| {
            query.push(if std::mem::take(&mut first) {
                " WHERE "
            } else {
                " AND "
            });
        };

        if let Some(title) = non_empty(&self.title) {
            sep(query);
            query.push("LOWER(title) LIKE ");
            query.push_bind(format!("%{}%", title.to_lowercase()));
        }

        if let Some(assigne) = non_empty(&self.assigne) {
            let needles = csv_tokens(assigne);
            if !needles.is_empty() {
                sep(query);
                query.push("(");
                for (i, needle) in needles.iter().enumerate() {
                    if i > 0 {
                        query.push(" OR ");
                    }
                    query.push("LOWER(assignee) LIKE ");
                    query.push_bind(format!("%{}%", needle.to_lowercase()));
                }
                query.push(")");
            }
        }

        if let (Some(start), Some(end)) = (self.start, self.end) {
            sep(query);
            query.push("due_date >= ");
            query.push_bind(start);
            query.push(" AND due_date <= ");
            query.push_bind(end);
        }

        if let (Some(min), Some(max)) = (self.min, self.max) {
            sep(query);
            query.push("time_tracked >= ");
            query.push_bind(min);
            query.push(" AND time_tracked <= ");
            query.push_bind(max);
        }

        if let Some(status) = non_empty(&self.status) {
            let tokens = csv_tokens(status);
            if !tokens.is_empty() {
                sep(query);
                query.push("status IN (");
                let mut separated = query.separated(", ");
                for token in tokens {
                    separated.push_bind(token);
                }
                query.push(")");
            }
        }

        if let Some(priority) = non_empty(&self.priority) {
            let tokens = csv_tokens(priority);
            if !tokens.is_empty() {
                sep(query);
                query.push("priority IN (");
                let mut separated = query.separated(", ");
                for token in tokens {
                    separated.push_bind(token);
                }
                query.push(")");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sql_for(filter: &ReportFilter) -> String {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM todos");
        filter.push_conditions(&mut query);
        query.into_sql()
    }

    #[test]
    fn empty_filter_adds_no_conditions() {
        assert_eq!(sql_for(&ReportFilter::default()), "SELECT * FROM todos");
    }

    #[test]
    fn title_filter_is_case_insensitive_substring() {
        let filter = ReportFilter {
            title: Some("Ship".to_string()),
            ..ReportFilter::default()
        };
        let sql = sql_for(&filter);
        assert!(sql.contains("WHERE LOWER(title) LIKE"));
    }

    #[test]
    fn assignee_needles_combine_with_or() {
        let filter = ReportFilter {
            assigne: Some("Ana, Ben".to_string()),
            ..ReportFilter::default()
        };
        let sql = sql_for(&filter);
        assert!(sql.contains("(LOWER(assignee) LIKE"));
        assert!(sql.contains(" OR LOWER(assignee) LIKE"));
    }

    #[test]
    fn a_single_range_bound_is_ignored() {
        let filter = ReportFilter {
            start: Some(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()),
            min: Some(10),
            ..ReportFilter::default()
        };
        assert_eq!(sql_for(&filter), "SELECT * FROM todos");
    }

    #[test]
    fn both_range_bounds_constrain_inclusively() {
        let filter = ReportFilter {
            start: Some(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()),
            end: Some(NaiveDate::from_ymd_opt(2026, 12, 31).unwrap()),
            min: Some(0),
            max: Some(120),
            ..ReportFilter::default()
        };
        let sql = sql_for(&filter);
        assert!(sql.contains("due_date >= "));
        assert!(sql.contains(" AND due_date <= "));
        assert!(sql.contains("time_tracked >= "));
        assert!(sql.contains(" AND time_tracked <= "));
    }

    #[test]
    fn status_and_priority_lists_become_in_clauses() {
        let filter = ReportFilter {
            status: Some("pending, completed".to_string()),
            priority: Some("high".to_string()),
            ..ReportFilter::default()
        };
        let sql = sql_for(&filter);
        assert!(sql.contains("status IN ("));
        assert!(sql.contains(" AND priority IN ("));
    }

    #[test]
    fn dimensions_combine_with_and() {
        let filter = ReportFilter {
            title: Some("report".to_string()),
            status: Some("pending".to_string()),
            ..ReportFilter::default()
        };
        let sql = sql_for(&filter);
        assert!(sql.contains("WHERE LOWER(title) LIKE"));
        assert!(sql.contains(" AND status IN ("));
    }
}
