//! Data store implementations of [`QueryExecutor`](crate::QueryExecutor).

pub mod sea_orm;

pub use self::sea_orm::{SeaOrmStore, apply_order, condition_from_tree};
