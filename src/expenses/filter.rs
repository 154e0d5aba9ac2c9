use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;
use crate::validation::parse_datetime;

/// Raw query parameters of GET /user/expenses. All independently optional;
/// a non-numeric cost bound is rejected by the extractor before this point.
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseQuery {
    pub costgt: Option<i64>,
    pub costlt: Option<i64>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub category: Option<String>,
}

/// Parsed conjunctive predicate over one owner's expenses. Owner scoping is
/// not part of the filter; the repository always supplies it as the leading
/// conjunct, so no parameter combination can widen a query past the owner.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub cost_gt: Option<i64>,
    pub cost_lt: Option<i64>,
    pub after: Option<OffsetDateTime>,
    pub before: Option<OffsetDateTime>,
    pub category_id: Option<Uuid>,
}

impl ExpenseFilter {
    /// Parses the date bounds; an unparsable value is a client error. The
    /// category name is resolved separately since it needs the store.
    pub fn from_query(query: &ExpenseQuery) -> Result<Self, ApiError> {
        Ok(Self {
            cost_gt: query.costgt,
            cost_lt: query.costlt,
            after: query.after.as_deref().map(parse_datetime).transpose()?,
            before: query.before.as_deref().map(parse_datetime).transpose()?,
            category_id: None,
        })
    }

    /// Appends the present predicates, ANDed, to a query that already has an
    /// owner conjunct in place.
    pub fn push_conditions(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(cost_gt) = self.cost_gt {
            qb.push(" AND e.cost > ");
            qb.push_bind(cost_gt);
        }
        if let Some(cost_lt) = self.cost_lt {
            qb.push(" AND e.cost < ");
            qb.push_bind(cost_lt);
        }
        if let Some(after) = self.after {
            qb.push(" AND e.date > ");
            qb.push_bind(after);
        }
        if let Some(before) = self.before {
            qb.push(" AND e.date < ");
            qb.push_bind(before);
        }
        if let Some(category_id) = self.category_id {
            qb.push(" AND e.category_id = ");
            qb.push_bind(category_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(filter: &ExpenseFilter) -> String {
        let mut qb = QueryBuilder::new("SELECT * FROM expenses e WHERE e.user_id = ");
        qb.push_bind(Uuid::new_v4());
        filter.push_conditions(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn empty_filter_adds_no_conditions() {
        let sql = rendered(&ExpenseFilter::default());
        assert_eq!(sql, "SELECT * FROM expenses e WHERE e.user_id = $1");
    }

    #[test]
    fn each_parameter_contributes_one_conjunct() {
        let filter = ExpenseFilter {
            cost_gt: Some(10),
            cost_lt: Some(100),
            after: Some(OffsetDateTime::UNIX_EPOCH),
            before: Some(OffsetDateTime::UNIX_EPOCH),
            category_id: Some(Uuid::new_v4()),
        };
        let sql = rendered(&filter);
        assert!(sql.contains(" AND e.cost > $2"));
        assert!(sql.contains(" AND e.cost < $3"));
        assert!(sql.contains(" AND e.date > $4"));
        assert!(sql.contains(" AND e.date < $5"));
        assert!(sql.contains(" AND e.category_id = $6"));
    }

    #[test]
    fn conjunction_is_independent_of_parameter_order() {
        // The same set of parameters renders the same SQL no matter how the
        // query struct was populated.
        let a = ExpenseFilter::from_query(&ExpenseQuery {
            costgt: Some(10),
            before: Some("2024-01-01T00:00:00".into()),
            ..Default::default()
        })
        .unwrap();
        let b = ExpenseFilter::from_query(&ExpenseQuery {
            before: Some("2024-01-01T00:00:00".into()),
            costgt: Some(10),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(a, b);
        assert_eq!(rendered(&a), rendered(&b));
    }

    #[test]
    fn bad_date_bound_is_a_client_error() {
        let err = ExpenseFilter::from_query(&ExpenseQuery {
            after: Some("yesterday".into()),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn cost_bounds_are_strict() {
        let filter = ExpenseFilter {
            cost_gt: Some(10),
            ..Default::default()
        };
        let sql = rendered(&filter);
        assert!(sql.contains("e.cost > "));
        assert!(!sql.contains("e.cost >= "));
    }
}
