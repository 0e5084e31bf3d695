//! # インメモリ商品リポジトリ
//!
//! プロセス内の `Vec` に商品を保持する [`ProductRepository`] 実装。
//! `STORE_BACKEND=memory` での起動と、ハンドラ・ユースケースのテストで使用する。
//!
//! ID は UUID v7 文字列で採番する。一覧は挿入順。

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use catalog_domain::product::{Product, ProductId};

use crate::{error::InfraError, repository::ProductRepository};

#[derive(Debug, Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<Mutex<Vec<Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存済みの商品で初期化する
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        Self {
            products: Arc::new(Mutex::new(products.into_iter().collect())),
        }
    }

    /// 保持している商品数
    pub fn len(&self) -> usize {
        self.products.lock().map(|p| p.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Product>>, InfraError> {
        self.products
            .lock()
            .map_err(|_| InfraError::unexpected("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_all(&self) -> Result<Vec<Product>, InfraError> {
        Ok(self.lock()?.clone())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, InfraError> {
        Ok(self.lock()?.iter().find(|p| p.id() == Some(id)).cloned())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = ?product.id()))]
    async fn save(&self, product: &Product) -> Result<Product, InfraError> {
        let mut products = self.lock()?;

        let Some(id) = product.id() else {
            let saved = product.clone().with_id(ProductId::generate())?;
            products.push(saved.clone());
            return Ok(saved);
        };

        match products.iter_mut().find(|p| p.id() == Some(id)) {
            Some(existing) => *existing = product.clone(),
            None => products.push(product.clone()),
        }
        Ok(product.clone())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%id))]
    async fn delete(&self, id: &ProductId) -> Result<(), InfraError> {
        self.lock()?.retain(|p| p.id() != Some(id));
        Ok(())
    }
}
