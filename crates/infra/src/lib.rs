//! # Catalog インフラ層
//!
//! 商品ストア（Record Store）の具体実装を提供する。
//!
//! ## 依存関係
//!
//! ```text
//! web → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL 接続プールとマイグレーション
//! - [`error`] - インフラ層エラー定義
//! - [`repository`] - リポジトリトレイトと PostgreSQL 実装
//! - [`memory`] - インメモリ実装
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use catalog_infra::{db, repository::PostgresProductRepository};
//!
//! async fn setup() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = db::create_pool("postgres://localhost/catalog").await?;
//!     db::run_migrations(&pool).await?;
//!     let repository = PostgresProductRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
pub mod memory;
pub mod repository;

pub use error::InfraError;
pub use memory::InMemoryProductRepository;
