use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;
use crate::expenses::repo::{ExpenseRecord, ExpenseView};
use crate::validation::{double_option, parse_datetime};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateExpenseRequest {
    pub cost: Option<i64>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl CreateExpenseRequest {
    pub fn validated(self) -> Result<ValidExpense, ApiError> {
        let cost = self.cost.ok_or_else(ApiError::invalid_data)?;
        let date = self.date.as_deref().map(parse_datetime).transpose()?;
        Ok(ValidExpense {
            cost,
            date,
            description: self.description,
            category: self.category,
        })
    }
}

#[derive(Debug)]
pub struct ValidExpense {
    pub cost: i64,
    pub date: Option<OffsetDateTime>,
    pub description: Option<String>,
    /// Category by name; the handler resolves or auto-creates it.
    pub category: Option<String>,
}

/// Partial expense edit. Absent fields stay as they are; `null` clears the
/// nullable ones. The category arrives as a name and is resolved to an id
/// before the merge.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpensePatch {
    pub cost: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
}

impl ExpensePatch {
    /// Parses the date bound up front so a malformed payload is rejected
    /// before the handler touches the store (category auto-creation included).
    pub fn validated(self) -> Result<ValidExpensePatch, ApiError> {
        let date = match self.date {
            None => None,
            Some(None) => Some(None),
            Some(Some(raw)) => Some(Some(parse_datetime(&raw)?)),
        };
        Ok(ValidExpensePatch {
            cost: self.cost,
            date,
            description: self.description,
            category: self.category,
        })
    }
}

/// Fully-parsed patch; merging it can no longer fail.
#[derive(Debug)]
pub struct ValidExpensePatch {
    pub cost: Option<i64>,
    pub date: Option<Option<OffsetDateTime>>,
    pub description: Option<Option<String>>,
    pub category: Option<Option<String>>,
}

impl ValidExpensePatch {
    /// Merges into the record, with the category already resolved to
    /// `Some(new_link)` or left `None` when untouched.
    pub fn apply_to(&self, record: &mut ExpenseRecord, category_id: Option<Option<Uuid>>) {
        if let Some(cost) = self.cost {
            record.cost = cost;
        }
        if let Some(date) = self.date {
            record.date = date;
        }
        if let Some(description) = &self.description {
            record.description = description.clone();
        }
        if let Some(link) = category_id {
            record.category_id = link;
        }
    }
}

/// Public projection; `category` is the referenced category's name.
#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    pub expense_id: Uuid,
    pub cost: i64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl From<&ExpenseView> for ExpenseResponse {
    fn from(view: &ExpenseView) -> Self {
        Self {
            expense_id: view.expense_id,
            cost: view.cost,
            date: view.date,
            description: view.description.clone(),
            category: view.category.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExpensesEnvelope {
    pub expenses: Vec<ExpenseResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::decode;
    use serde_json::json;

    fn sample_record() -> ExpenseRecord {
        ExpenseRecord {
            expense_id: Uuid::new_v4(),
            cost: 23,
            date: Some(OffsetDateTime::UNIX_EPOCH),
            description: Some("bus ticket".into()),
            user_id: Uuid::new_v4(),
            category_id: Some(Uuid::new_v4()),
        }
    }

    #[test]
    fn create_requires_cost() {
        let missing: CreateExpenseRequest = decode(json!({ "description": "x" })).unwrap();
        assert!(missing.validated().is_err());

        let ok: CreateExpenseRequest = decode(json!({ "cost": 23 })).unwrap();
        let valid = ok.validated().unwrap();
        assert_eq!(valid.cost, 23);
        assert!(valid.date.is_none());
    }

    #[test]
    fn create_rejects_bad_date() {
        let req: CreateExpenseRequest =
            decode(json!({ "cost": 23, "date": "next tuesday" })).unwrap();
        assert!(req.validated().is_err());
    }

    #[test]
    fn patch_with_only_cost_leaves_the_rest_alone() {
        let mut record = sample_record();
        let before = record.clone();
        let patch: ExpensePatch = decode(json!({ "cost": 50 })).unwrap();
        patch.validated().unwrap().apply_to(&mut record, None);
        assert_eq!(record.cost, 50);
        assert_eq!(record.date, before.date);
        assert_eq!(record.description, before.description);
        assert_eq!(record.category_id, before.category_id);
    }

    #[test]
    fn patch_null_clears_nullable_fields() {
        let mut record = sample_record();
        let patch: ExpensePatch = decode(json!({ "date": null, "description": null })).unwrap();
        patch.validated().unwrap().apply_to(&mut record, Some(None));
        assert_eq!(record.date, None);
        assert_eq!(record.description, None);
        assert_eq!(record.category_id, None);
    }

    #[test]
    fn patch_rejects_bad_date_before_any_merge() {
        // A malformed date must fail at validation, ahead of category
        // resolution or any write the handler would otherwise perform.
        let patch: ExpensePatch =
            decode(json!({ "date": "garbage", "category": "brand-new" })).unwrap();
        let err = patch.validated().unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn response_serializes_missing_optionals_as_null() {
        let view = ExpenseView {
            expense_id: Uuid::new_v4(),
            cost: 23,
            date: None,
            description: None,
            category: None,
        };
        let body = serde_json::to_value(ExpenseResponse::from(&view)).unwrap();
        assert_eq!(body["cost"], 23);
        assert!(body["date"].is_null());
        assert!(body["description"].is_null());
        assert!(body["category"].is_null());
    }

    #[test]
    fn response_date_is_rfc3339() {
        let view = ExpenseView {
            expense_id: Uuid::new_v4(),
            cost: 1,
            date: Some(OffsetDateTime::UNIX_EPOCH),
            description: None,
            category: Some("transportation".into()),
        };
        let body = serde_json::to_value(ExpenseResponse::from(&view)).unwrap();
        assert_eq!(body["date"], "1970-01-01T00:00:00Z");
        assert_eq!(body["category"], "transportation");
    }
}
