/*!
# Query Benchmarks

Benchmarks for query-string parsing and execution against SQLite.

## Usage

```bash
# Run all benchmarks
cargo bench --bench query_benchmarks

# Run one group
cargo bench --bench query_benchmarks -- "Query Parsing"

# Quick benchmark with fewer samples
cargo bench --bench query_benchmarks -- --quick
```

HTML reports are generated in `target/criterion/report/index.html`.
*/

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use querycrate::{QueryConfig, RawParams, SeaOrmStore, SortOrder, execute_query, parse_query};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ConnectionTrait, Database, DatabaseConnection, DbErr,
    Schema, Set,
};
use std::hint::black_box;
use std::time::Duration;

mod item {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "items")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub name: String,
        pub status: String,
        pub price: f64,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

const STATUSES: [&str; 3] = ["active", "pending", "archived"];

fn bench_config() -> QueryConfig {
    QueryConfig::default()
        .with_search_fields(["name", "status"])
        .with_range_fields(["price"])
        .with_number_fields(["stock"])
        .with_boolean_fields(["active"])
        .with_default_sort("id", SortOrder::Asc)
}

fn simple_params() -> RawParams {
    RawParams::from_pairs([("page", "2"), ("limit", "20")])
}

fn complex_params() -> RawParams {
    RawParams::from_pairs([
        ("page", "3"),
        ("limit", "25"),
        ("search", "widget"),
        ("priceRange", "10,500"),
        ("status[in]", "active,pending"),
        ("name[contains]", "pro"),
        ("price[gte]", "5"),
        ("active", "true"),
        ("stock", "12"),
        ("sortBy", "status,price"),
        ("sortOrder", "asc,desc"),
    ])
}

fn operator_params(count: usize) -> RawParams {
    (0..count)
        .map(|index| (format!("field{index}[gte]"), index.to_string()))
        .collect()
}

async fn setup_benchmark_db(size: usize) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    db.execute(backend.build(&schema.create_table_from_entity(item::Entity)))
        .await?;

    for index in 0..size {
        item::ActiveModel {
            id: NotSet,
            name: Set(format!("Item {index}")),
            status: Set(STATUSES[index % STATUSES.len()].to_string()),
            price: Set(f64::from(u32::try_from(index % 1000).unwrap_or(0))),
        }
        .insert(&db)
        .await?;
    }

    Ok(db)
}

fn bench_parsing(c: &mut Criterion) {
    let config = bench_config();
    let mut group = c.benchmark_group("Query Parsing");

    let simple = simple_params();
    group.bench_function("simple", |b| {
        b.iter(|| parse_query(black_box(&simple), black_box(&config)));
    });

    let complex = complex_params();
    group.bench_function("complex", |b| {
        b.iter(|| parse_query(black_box(&complex), black_box(&config)));
    });

    for count in [5, 50, 200] {
        let params = operator_params(count);
        group.bench_with_input(BenchmarkId::new("operators", count), &params, |b, params| {
            b.iter(|| parse_query(black_box(params), black_box(&config)));
        });
    }

    group.finish();
}

fn bench_execution(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let config = QueryConfig::default()
        .with_search_fields(["name"])
        .with_range_fields(["price"])
        .with_default_sort("id", SortOrder::Asc);

    for size in [100, 1000] {
        let db = rt.block_on(setup_benchmark_db(size)).unwrap();
        let store: SeaOrmStore<item::Entity> = SeaOrmStore::new(db);

        let mut group = c.benchmark_group(format!("Query Execution SQLite ({size} records)"));

        let page = simple_params();
        group.bench_with_input(BenchmarkId::new("page", size), &page, |b, params| {
            b.iter(|| rt.block_on(black_box(execute_query(&store, params, &config))));
        });

        let filtered = RawParams::from_pairs([
            ("search", "1"),
            ("priceRange", "100,600"),
            ("status[in]", "active,pending"),
            ("sortBy", "price"),
            ("sortOrder", "desc"),
        ]);
        group.bench_with_input(BenchmarkId::new("filtered", size), &filtered, |b, params| {
            b.iter(|| rt.block_on(black_box(execute_query(&store, params, &config))));
        });

        group.finish();
    }
}

fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(30)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets = bench_parsing, bench_execution
}
criterion_main!(benches);
