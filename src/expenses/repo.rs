use sqlx::{FromRow, PgPool, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::expenses::filter::ExpenseFilter;

/// Expense as stored; the category is a nullable reference by id.
#[derive(Debug, Clone, FromRow)]
pub struct ExpenseRecord {
    pub expense_id: Uuid,
    pub cost: i64,
    pub date: Option<OffsetDateTime>,
    pub description: Option<String>,
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
}

/// Read model with the category name joined in, matching the public shape.
#[derive(Debug, Clone, FromRow)]
pub struct ExpenseView {
    pub expense_id: Uuid,
    pub cost: i64,
    pub date: Option<OffsetDateTime>,
    pub description: Option<String>,
    pub category: Option<String>,
}

const VIEW_SELECT: &str = "SELECT e.expense_id, e.cost, e.date, e.description, \
                           c.name AS category \
                           FROM expenses e \
                           LEFT JOIN categories c ON c.category_id = e.category_id \
                           WHERE e.user_id = ";

pub async fn list(
    db: &PgPool,
    user_id: Uuid,
    filter: &ExpenseFilter,
) -> Result<Vec<ExpenseView>, sqlx::Error> {
    let mut qb = QueryBuilder::new(VIEW_SELECT);
    qb.push_bind(user_id);
    filter.push_conditions(&mut qb);
    qb.push(" ORDER BY e.created_at");
    qb.build_query_as::<ExpenseView>().fetch_all(db).await
}

pub async fn fetch(
    db: &PgPool,
    user_id: Uuid,
    expense_id: Uuid,
) -> Result<Option<ExpenseView>, sqlx::Error> {
    let mut qb = QueryBuilder::new(VIEW_SELECT);
    qb.push_bind(user_id);
    qb.push(" AND e.expense_id = ");
    qb.push_bind(expense_id);
    qb.build_query_as::<ExpenseView>().fetch_optional(db).await
}

pub async fn find_record(
    db: &PgPool,
    user_id: Uuid,
    expense_id: Uuid,
) -> Result<Option<ExpenseRecord>, sqlx::Error> {
    sqlx::query_as::<_, ExpenseRecord>(
        "SELECT expense_id, cost, date, description, user_id, category_id \
         FROM expenses WHERE expense_id = $1 AND user_id = $2",
    )
    .bind(expense_id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn insert(db: &PgPool, record: &ExpenseRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO expenses (expense_id, cost, date, description, user_id, category_id) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(record.expense_id)
    .bind(record.cost)
    .bind(record.date)
    .bind(&record.description)
    .bind(record.user_id)
    .bind(record.category_id)
    .execute(db)
    .await?;
    Ok(())
}

/// Writes back every mutable column of an already-merged record.
pub async fn save(db: &PgPool, record: &ExpenseRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE expenses SET cost = $2, date = $3, description = $4, category_id = $5 \
         WHERE expense_id = $1 AND user_id = $6",
    )
    .bind(record.expense_id)
    .bind(record.cost)
    .bind(record.date)
    .bind(&record.description)
    .bind(record.category_id)
    .bind(record.user_id)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn delete(db: &PgPool, user_id: Uuid, expense_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM expenses WHERE expense_id = $1 AND user_id = $2")
        .bind(expense_id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
