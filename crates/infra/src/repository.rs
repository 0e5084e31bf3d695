//! # リポジトリ実装
//!
//! - **データベース抽象化**: sqlx を使用し、PostgreSQL 固有の処理をカプセル化
//! - **テスタビリティ**: トレイト経由でインメモリ実装に差し替え可能

pub mod product_repository;

pub use product_repository::{PostgresProductRepository, ProductRepository};
