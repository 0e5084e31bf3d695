//! # ProductRepository
//!
//! 商品の永続化を担当するリポジトリ。
//!
//! ## 保存のセマンティクス
//!
//! - ID を持たない商品は INSERT し、ID はストアが採番する
//! - ID を持つ商品は UPSERT する（未知の ID でもその ID で保存される）
//! - 一覧はストアへの挿入順で返す

use async_trait::async_trait;
use catalog_domain::product::{Price, Product, ProductId, ProductName};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::InfraError;

/// 商品リポジトリトレイト
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// 全商品を挿入順で取得する
    async fn find_all(&self) -> Result<Vec<Product>, InfraError>;

    /// ID で商品を検索する
    ///
    /// 存在しない場合は `Ok(None)` を返す（エラーではない）。
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, InfraError>;

    /// 商品を保存し、ID が採番された状態の商品を返す
    async fn save(&self, product: &Product) -> Result<Product, InfraError>;

    /// 商品を削除する。存在しない場合は何もしない
    async fn delete(&self, id: &ProductId) -> Result<(), InfraError>;
}

/// `productos` テーブルの行
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id:        String,
    nombre:    String,
    precio:    f64,
    create_at: Option<DateTime<Utc>>,
    foto:      Option<String>,
}

impl TryFrom<ProductRow> for Product {
    type Error = InfraError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product::from_db(
            ProductId::new(row.id)?,
            ProductName::new(row.nombre)?,
            Price::new(row.precio)?,
            row.create_at,
            row.foto,
        ))
    }
}

/// PostgreSQL 実装の ProductRepository
#[derive(Debug, Clone)]
pub struct PostgresProductRepository {
    pool: PgPool,
}

impl PostgresProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PostgresProductRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<Product>, InfraError> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, nombre, precio, create_at, foto
            FROM productos
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, InfraError> {
        let row: Option<ProductRow> = sqlx::query_as(
            r#"
            SELECT id, nombre, precio, create_at, foto
            FROM productos
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = ?product.id()))]
    async fn save(&self, product: &Product) -> Result<Product, InfraError> {
        let row: ProductRow = match product.id() {
            None => {
                sqlx::query_as(
                    r#"
                    INSERT INTO productos (nombre, precio, create_at, foto)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id, nombre, precio, create_at, foto
                    "#,
                )
                .bind(product.name().as_str())
                .bind(product.price().value())
                .bind(product.created_at())
                .bind(product.photo())
                .fetch_one(&self.pool)
                .await?
            }
            Some(id) => {
                sqlx::query_as(
                    r#"
                    INSERT INTO productos (id, nombre, precio, create_at, foto)
                    VALUES ($1, $2, $3, $4, $5)
                    ON CONFLICT (id) DO UPDATE
                    SET nombre = EXCLUDED.nombre,
                        precio = EXCLUDED.precio,
                        create_at = EXCLUDED.create_at,
                        foto = EXCLUDED.foto
                    RETURNING id, nombre, precio, create_at, foto
                    "#,
                )
                .bind(id.as_str())
                .bind(product.name().as_str())
                .bind(product.price().value())
                .bind(product.created_at())
                .bind(product.photo())
                .fetch_one(&self.pool)
                .await?
            }
        };

        Product::try_from(row)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn delete(&self, id: &ProductId) -> Result<(), InfraError> {
        sqlx::query("DELETE FROM productos WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
