//! Run parsed queries against any Sea-ORM entity.
//!
//! Condition and order trees address fields by name. A name matches a
//! column when it equals the column name or its snake_case form, so both
//! `createdAt` and `created_at` reach `created_at`. Conditions that cannot
//! be expressed on a single table (unknown columns, relation paths, odd
//! value shapes) are skipped with a warning.
//!
//! Date strings compared against date or timestamp columns are parsed and
//! bound as timestamps, so bounds compare chronologically on every backend.

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, IdenStatic, Iterable, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
    sea_query::{ColumnType, Expr, Func, LikeExpr, SimpleExpr},
};
use serde_json::{Map, Value};
use std::marker::PhantomData;

use crate::{
    filtering::{
        ConditionTree, OrderTree, SortOrder,
        conditions::{INSENSITIVE_MODE, MODE_KEY, OR_KEY},
        values::parse_date,
    },
    query::{FindManyArgs, QueryExecutor},
};

const AND_KEY: &str = "AND";
const NOT_KEY: &str = "NOT";
const LIKE_ESCAPE: char = '\\';

/// [`QueryExecutor`] over a Sea-ORM entity.
pub struct SeaOrmStore<E> {
    db: DatabaseConnection,
    entity: PhantomData<fn() -> E>,
}

impl<E> SeaOrmStore<E> {
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            entity: PhantomData,
        }
    }

    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl<E> Clone for SeaOrmStore<E> {
    fn clone(&self) -> Self {
        Self::new(self.db.clone())
    }
}

fn to_snake_case(name: &str) -> String {
    let mut snake = String::with_capacity(name.len() + 4);
    for (index, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if index > 0 {
                snake.push('_');
            }
            snake.push(ch.to_ascii_lowercase());
        } else {
            snake.push(ch);
        }
    }
    snake
}

fn find_column<E: EntityTrait>(name: &str) -> Option<E::Column> {
    let snake = to_snake_case(name);
    E::Column::iter().find(|column| column.as_str() == name || column.as_str() == snake)
}

/// Escape LIKE wildcards so user input matches literally
fn escape_like_wildcards(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn json_to_db_value(value: &Value) -> Option<sea_orm::Value> {
    match value {
        Value::String(text) => Some(sea_orm::Value::from(text.clone())),
        Value::Bool(flag) => Some(sea_orm::Value::from(*flag)),
        Value::Number(number) => number
            .as_i64()
            .map(sea_orm::Value::from)
            .or_else(|| number.as_f64().map(sea_orm::Value::from)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Bind date strings as timestamps on temporal columns so they compare as
/// dates rather than text.
fn temporal_value(column_type: &ColumnType, text: &str) -> Option<sea_orm::Value> {
    match column_type {
        ColumnType::TimestampWithTimeZone => parse_date(text).map(sea_orm::Value::from),
        ColumnType::DateTime | ColumnType::Timestamp => {
            parse_date(text).map(|date| sea_orm::Value::from(date.naive_utc()))
        }
        ColumnType::Date => parse_date(text).map(|date| sea_orm::Value::from(date.date_naive())),
        _ => None,
    }
}

fn to_db_value<C: ColumnTrait>(column: C, value: &Value) -> Option<sea_orm::Value> {
    if let Value::String(text) = value
        && let Some(temporal) = temporal_value(column.def().get_column_type(), text)
    {
        return Some(temporal);
    }
    json_to_db_value(value)
}

fn to_db_values<C: ColumnTrait>(column: C, value: &Value) -> Option<Vec<sea_orm::Value>> {
    match value {
        Value::Array(items) => items.iter().map(|item| to_db_value(column, item)).collect(),
        _ => None,
    }
}

fn pattern_expr<C: ColumnTrait>(column: C, text: &str, pattern: &str, insensitive: bool) -> SimpleExpr {
    let escaped = pattern.replace("{}", &escape_like_wildcards(text));
    if insensitive {
        Expr::expr(Func::upper(Expr::col(column)))
            .like(LikeExpr::new(escaped.to_uppercase()).escape(LIKE_ESCAPE))
    } else {
        Expr::col(column).like(LikeExpr::new(escaped).escape(LIKE_ESCAPE))
    }
}

fn equality_expr<C: ColumnTrait>(column: C, value: &Value) -> Option<SimpleExpr> {
    match value {
        Value::Null => Some(column.is_null()),
        Value::Array(_) => to_db_values(column, value).map(|values| column.is_in(values)),
        other => to_db_value(column, other).map(|db_value| column.eq(db_value)),
    }
}

fn operator_expr<C: ColumnTrait>(
    column: C,
    operator: &str,
    operand: &Value,
    insensitive: bool,
) -> Option<SimpleExpr> {
    match (operator, operand) {
        ("equals", _) => equality_expr(column, operand),
        ("not", Value::Null) => Some(column.is_not_null()),
        ("not", _) => to_db_value(column, operand).map(|value| column.ne(value)),
        ("gt", _) => to_db_value(column, operand).map(|value| column.gt(value)),
        ("gte", _) => to_db_value(column, operand).map(|value| column.gte(value)),
        ("lt", _) => to_db_value(column, operand).map(|value| column.lt(value)),
        ("lte", _) => to_db_value(column, operand).map(|value| column.lte(value)),
        ("in", _) => to_db_values(column, operand).map(|values| column.is_in(values)),
        ("notIn", _) => to_db_values(column, operand).map(|values| column.is_not_in(values)),
        ("contains", Value::String(text)) => Some(pattern_expr(column, text, "%{}%", insensitive)),
        ("startsWith", Value::String(text)) => Some(pattern_expr(column, text, "{}%", insensitive)),
        ("endsWith", Value::String(text)) => Some(pattern_expr(column, text, "%{}", insensitive)),
        _ => None,
    }
}

fn field_condition<E: EntityTrait>(field: &str, value: &Value) -> Option<Condition> {
    let Some(column) = find_column::<E>(field) else {
        tracing::warn!(field = %field, "Skipping filter on unknown column");
        return None;
    };

    let Value::Object(operators) = value else {
        let expr = equality_expr(column, value);
        if expr.is_none() {
            tracing::warn!(field = %field, "Skipping filter with unsupported value");
        }
        return expr.map(|expr| Condition::all().add(expr));
    };

    let insensitive = operators.get(MODE_KEY).and_then(Value::as_str) == Some(INSENSITIVE_MODE);
    let mut condition = Condition::all();
    for (operator, operand) in operators {
        if operator == MODE_KEY {
            continue;
        }
        match operator_expr(column, operator, operand, insensitive) {
            Some(expr) => condition = condition.add(expr),
            None => tracing::warn!(
                field = %field,
                operator = %operator,
                "Skipping unsupported filter operator"
            ),
        }
    }
    (!condition.is_empty()).then_some(condition)
}

/// Matches no row; stands in for an `OR` whose alternatives were all skipped.
fn never() -> Condition {
    Condition::all().add(Expr::val(1).eq(0))
}

fn group_condition<E: EntityTrait>(key: &str, value: &Value) -> Option<Condition> {
    let Value::Array(items) = value else {
        tracing::warn!(key = %key, "Expected a list of conditions");
        return None;
    };
    let is_any = key == OR_KEY;
    let mut group = if is_any {
        Condition::any()
    } else {
        Condition::all()
    };
    for item in items {
        let Value::Object(nested) = item else {
            tracing::warn!(key = %key, "Skipping non-object condition");
            continue;
        };
        // An empty branch would render as TRUE and widen an OR to every row
        let branch = condition_from_tree::<E>(nested);
        if !branch.is_empty() {
            group = group.add(branch);
        }
    }

    if !group.is_empty() {
        return Some(group);
    }
    if is_any && !items.is_empty() {
        tracing::warn!(key = %key, "No alternative could be translated, matching nothing");
        return Some(never());
    }
    None
}

/// Translate a condition tree into a Sea-ORM condition for entity `E`.
///
/// Fields combine with AND. `OR`/`AND` hold lists of nested trees and `NOT`
/// holds one nested tree. Skipped parts are left out entirely; an `OR`
/// whose alternatives were all skipped matches nothing.
#[must_use]
pub fn condition_from_tree<E: EntityTrait>(tree: &Map<String, Value>) -> Condition {
    let mut condition = Condition::all();
    for (key, value) in tree {
        let part = match key.as_str() {
            OR_KEY | AND_KEY => group_condition::<E>(key, value),
            NOT_KEY => match value {
                Value::Object(nested) => {
                    let inner = condition_from_tree::<E>(nested);
                    (!inner.is_empty()).then(|| inner.not())
                }
                _ => {
                    tracing::warn!("Expected a condition object under NOT");
                    None
                }
            },
            field => field_condition::<E>(field, value),
        };
        if let Some(part) = part {
            condition = condition.add(part);
        }
    }
    condition
}

/// Apply an order tree to a select, one `ORDER BY` term per flat entry.
///
/// Relation paths (nested entries) cannot be ordered on a single table and
/// are skipped.
#[must_use]
pub fn apply_order<E: EntityTrait>(mut select: Select<E>, order: &OrderTree) -> Select<E> {
    for entry in order.entries() {
        for (field, direction) in entry {
            let Value::String(direction) = direction else {
                tracing::warn!(field = %field, "Skipping sort on related field");
                continue;
            };
            let Some(column) = find_column::<E>(field) else {
                tracing::warn!(field = %field, "Skipping sort on unknown column");
                continue;
            };
            let order = match SortOrder::parse(direction) {
                SortOrder::Asc => Order::Asc,
                SortOrder::Desc => Order::Desc,
            };
            select = select.order_by(column, order);
        }
    }
    select
}

#[async_trait]
impl<E> QueryExecutor for SeaOrmStore<E>
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    type Record = E::Model;
    type Error = DbErr;

    async fn find_many(&self, args: &FindManyArgs) -> Result<Vec<E::Model>, DbErr> {
        let select = E::find().filter(condition_from_tree::<E>(&args.condition));
        apply_order(select, &args.order_by)
            .offset(args.skip)
            .limit(args.take)
            .all(&self.db)
            .await
    }

    async fn count(&self, condition: &ConditionTree) -> Result<u64, DbErr> {
        let query = E::find().filter(condition_from_tree::<E>(condition));
        PaginatorTrait::count(query, &self.db).await
    }
}
