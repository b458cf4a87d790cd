#![allow(dead_code)]

use axum::{Json, Router, extract::State, response::Response, routing::get};
use chrono::{DateTime, Utc};
use querycrate::{
    ApiError, Paginated, ParsedQuery, QueryConfig, RawParams, SeaOrmStore, SortOrder,
    execute_query, parse_query,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ConnectionTrait, Database, DatabaseConnection, DbErr,
    Schema, Set,
};

pub mod product {
    use sea_orm::entity::prelude::*;
    use serde::Serialize;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
    #[sea_orm(table_name = "products")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
        pub category: String,
        pub status: String,
        pub price: f64,
        pub stock: i32,
        pub active: bool,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// (name, category, status, price, stock, active, created_at), inserted with ids 1..=6
pub const PRODUCTS: [(&str, &str, &str, f64, i32, bool, &str); 6] = [
    ("Alpha Widget", "tools", "active", 10.0, 5, true, "2024-01-01T00:00:00Z"),
    ("Beta Gadget", "tools", "archived", 25.5, 0, false, "2024-01-01T12:00:00Z"),
    ("Gamma Widget", "garden", "active", 50.0, 12, true, "2023-12-31T12:00:00Z"),
    ("Delta Gizmo", "garden", "pending", 75.0, 3, true, "2024-02-15T08:30:00Z"),
    ("Epsilon Widget", "kitchen", "active", 100.0, 8, false, "2024-03-01T00:00:00Z"),
    ("Zeta 100% Cotton", "kitchen", "active", 120.0, 1, true, "2023-06-30T00:00:00Z"),
];

/// Route library events to the test output; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub async fn setup_empty_db() -> Result<DatabaseConnection, DbErr> {
    init_tracing();
    Database::connect("sqlite::memory:").await
}

pub async fn setup_product_db() -> Result<DatabaseConnection, DbErr> {
    let db = setup_empty_db().await?;
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    db.execute(backend.build(&schema.create_table_from_entity(product::Entity)))
        .await?;

    for (name, category, status, price, stock, active, created_at) in PRODUCTS {
        let created_at = DateTime::parse_from_rfc3339(created_at)
            .map_err(|err| DbErr::Custom(err.to_string()))?
            .with_timezone(&Utc);
        product::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            category: Set(category.to_string()),
            status: Set(status.to_string()),
            price: Set(price),
            stock: Set(stock),
            active: Set(active),
            created_at: Set(created_at),
        }
        .insert(&db)
        .await?;
    }

    Ok(db)
}

pub async fn setup_product_store() -> SeaOrmStore<product::Entity> {
    let db = setup_product_db()
        .await
        .expect("Failed to setup test database");
    SeaOrmStore::new(db)
}

/// Config used by the product tests: stable id ordering by default.
pub fn product_config() -> QueryConfig {
    QueryConfig::default()
        .with_search_fields(["name", "category"])
        .with_range_fields(["price"])
        .with_default_sort("id", SortOrder::Asc)
}

pub async fn list_products(
    State(store): State<SeaOrmStore<product::Entity>>,
    params: RawParams,
) -> Result<Paginated<product::Model>, ApiError> {
    Ok(execute_query(&store, &params, &product_config()).await?)
}

pub async fn list_products_with_range(
    State(store): State<SeaOrmStore<product::Entity>>,
    params: RawParams,
) -> Result<Response, ApiError> {
    let page = execute_query(&store, &params, &product_config()).await?;
    Ok(page.into_response_with_range("products"))
}

pub async fn echo_query(params: RawParams) -> Json<ParsedQuery> {
    Json(parse_query(&params, &product_config()))
}

pub fn setup_product_app(store: SeaOrmStore<product::Entity>) -> Router {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/query", get(echo_query))
        .route("/products/ranged", get(list_products_with_range))
        .with_state(store)
}
