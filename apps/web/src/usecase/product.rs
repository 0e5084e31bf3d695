//! # 商品ユースケース
//!
//! 商品ストアをラップし、一覧の各バリエーションと保存・削除・ID 検索を提供する。
//!
//! ## 一覧は遅延ストリーム
//!
//! 一覧系の操作は [`ProductStream`] を返す。ストリームを生成した時点ではストアに
//! 問い合わせず、最初にポーリングされた時点で問い合わせる。同じ操作を再度呼べば
//! 新しい問い合わせから始まる（再開可能）。
//!
//! 大文字化などの変換は要素ごとにストリーム上で適用され、一括では行わない。

use std::sync::Arc;

use catalog_domain::{
    clock::Clock,
    product::{Product, ProductId},
};
use catalog_infra::repository::ProductRepository;
use futures::{
    StreamExt,
    TryStreamExt,
    stream::{self, BoxStream},
};

use crate::error::WebError;

/// 商品の遅延ストリーム
pub type ProductStream = BoxStream<'static, Result<Product, WebError>>;

/// 商品ユースケースの実装
#[derive(Clone)]
pub struct ProductUseCaseImpl {
    repository: Arc<dyn ProductRepository>,
    clock:      Arc<dyn Clock>,
}

impl ProductUseCaseImpl {
    pub fn new(repository: Arc<dyn ProductRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// 全商品をストアの順序で返す（変換なし）
    pub fn find_all(&self) -> ProductStream {
        let repository = self.repository.clone();
        stream::once(async move { repository.find_all().await })
            .map_err(WebError::from)
            .map_ok(|products| stream::iter(products.into_iter().map(Ok::<_, WebError>)))
            .try_flatten()
            .boxed()
    }

    /// 全商品を名前を大文字化して返す
    pub fn find_all_uppercased(&self) -> ProductStream {
        self.find_all()
            .map_ok(|product| product.with_uppercased_name())
            .boxed()
    }

    /// 大文字化した一覧を `1 + extra` 回連結して返す
    ///
    /// 各回はストアへの新しい問い合わせになる。
    pub fn find_all_uppercased_repeated(&self, extra: usize) -> ProductStream {
        let usecase = self.clone();
        stream::iter(0..=extra)
            .map(move |_| usecase.find_all_uppercased())
            .flatten()
            .boxed()
    }

    /// ID で商品を検索する
    ///
    /// 見つからない場合は `Ok(None)`。
    pub async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, WebError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// 商品を保存し、ID が付与された商品を返す
    ///
    /// 作成日時が未設定なら現在時刻を設定する。
    pub async fn save(&self, product: Product) -> Result<Product, WebError> {
        let product = match product.created_at() {
            Some(_) => product,
            None => product.with_created_at(self.clock.now()),
        };
        Ok(self.repository.save(&product).await?)
    }

    /// 商品を削除する
    ///
    /// 未保存の商品（ID なし）の場合は何もしない。
    pub async fn delete(&self, product: &Product) -> Result<(), WebError> {
        let Some(id) = product.id() else {
            return Ok(());
        };
        Ok(self.repository.delete(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use catalog_domain::{
        clock::FixedClock,
        product::{Price, ProductName},
    };
    use catalog_infra::{InMemoryProductRepository, InfraError};
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;

    use super::*;

    // --- スタブ ---

    /// find_all の呼び出し回数を記録するリポジトリ
    #[derive(Default)]
    struct CountingRepository {
        inner:     InMemoryProductRepository,
        find_alls: AtomicUsize,
    }

    #[async_trait]
    impl ProductRepository for CountingRepository {
        async fn find_all(&self) -> Result<Vec<Product>, InfraError> {
            self.find_alls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_all().await
        }

        async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, InfraError> {
            self.inner.find_by_id(id).await
        }

        async fn save(&self, product: &Product) -> Result<Product, InfraError> {
            self.inner.save(product).await
        }

        async fn delete(&self, id: &ProductId) -> Result<(), InfraError> {
            self.inner.delete(id).await
        }
    }

    struct FailingRepository;

    #[async_trait]
    impl ProductRepository for FailingRepository {
        async fn find_all(&self) -> Result<Vec<Product>, InfraError> {
            Err(InfraError::unexpected("store unavailable"))
        }

        async fn find_by_id(&self, _id: &ProductId) -> Result<Option<Product>, InfraError> {
            Err(InfraError::unexpected("store unavailable"))
        }

        async fn save(&self, _product: &Product) -> Result<Product, InfraError> {
            Err(InfraError::unexpected("store unavailable"))
        }

        async fn delete(&self, _id: &ProductId) -> Result<(), InfraError> {
            Err(InfraError::unexpected("store unavailable"))
        }
    }

    // --- ヘルパー ---

    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn product(name: &str, price: f64) -> Product {
        Product::new(ProductName::new(name).unwrap(), Price::new(price).unwrap())
    }

    fn saved(id: &str, name: &str, price: f64) -> Product {
        product(name, price)
            .with_id(ProductId::new(id).unwrap())
            .unwrap()
    }

    fn create_sut(repository: Arc<dyn ProductRepository>) -> ProductUseCaseImpl {
        ProductUseCaseImpl::new(repository, Arc::new(FixedClock::new(fixed_now())))
    }

    async fn names(stream: ProductStream) -> Vec<String> {
        stream
            .map_ok(|p| p.name().to_string())
            .try_collect()
            .await
            .unwrap()
    }

    // --- 一覧 ---

    #[tokio::test]
    async fn test_find_allはポーリングされるまでストアに問い合わせない() {
        // Given
        let repository = Arc::new(CountingRepository::default());
        let sut = create_sut(repository.clone());

        // When
        let stream = sut.find_all();

        // Then
        assert_eq!(repository.find_alls.load(Ordering::SeqCst), 0);
        let _ = names(stream).await;
        assert_eq!(repository.find_alls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_find_allはストアの順序で変換せずに返す() {
        let repository = InMemoryProductRepository::with_products([
            saved("1", "TV Panasonic Pantalla LCD", 456.89),
            saved("2", "Sony Camara HD Digital", 177.89),
        ]);
        let sut = create_sut(Arc::new(repository));

        let result = names(sut.find_all()).await;

        assert_eq!(
            result,
            vec!["TV Panasonic Pantalla LCD", "Sony Camara HD Digital"]
        );
    }

    #[tokio::test]
    async fn test_find_all_uppercasedは名前を大文字化し保存値は変えない() {
        // Given
        let repository = InMemoryProductRepository::with_products([saved("1", "foo", 1.0)]);
        let sut = create_sut(Arc::new(repository.clone()));

        // When
        let result = names(sut.find_all_uppercased()).await;

        // Then
        assert_eq!(result, vec!["FOO"]);
        let stored = repository
            .find_by_id(&ProductId::new("1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.name().as_str(), "foo");
    }

    #[tokio::test]
    async fn test_find_all_uppercased_repeatedは一覧を追加回数分連結する() {
        // Given
        let repository = Arc::new(CountingRepository {
            inner:     InMemoryProductRepository::with_products([
                saved("1", "a", 1.0),
                saved("2", "b", 2.0),
            ]),
            find_alls: AtomicUsize::new(0),
        });
        let sut = create_sut(repository.clone());

        // When
        let result = names(sut.find_all_uppercased_repeated(2)).await;

        // Then
        assert_eq!(result, vec!["A", "B", "A", "B", "A", "B"]);
        assert_eq!(repository.find_alls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_find_allはストアのエラーをストリームの要素として返す() {
        let sut = create_sut(Arc::new(FailingRepository));

        let result: Result<Vec<Product>, WebError> = sut.find_all().try_collect().await;

        assert!(matches!(result, Err(WebError::Database(_))));
    }

    // --- 単一レコード ---

    #[tokio::test]
    async fn test_find_by_idは存在しないidでnoneを返す() {
        let sut = create_sut(Arc::new(InMemoryProductRepository::new()));

        let result = sut.find_by_id(&ProductId::new("missing").unwrap()).await;

        assert_eq!(result.unwrap(), None);
    }

    #[tokio::test]
    async fn test_saveは採番されたidで検索できる商品を返す() {
        // Given
        let sut = create_sut(Arc::new(InMemoryProductRepository::new()));

        // When
        let result = sut.save(product("TV", 300.0)).await.unwrap();

        // Then
        let id = result.id().cloned().unwrap();
        assert!(!id.as_str().is_empty());
        assert_eq!(result.created_at(), Some(fixed_now()));
        assert_eq!(sut.find_by_id(&id).await.unwrap(), Some(result));
    }

    #[tokio::test]
    async fn test_saveは既存の作成日時を保持する() {
        let created_at = DateTime::from_timestamp(1_600_000_000, 0).unwrap();
        let sut = create_sut(Arc::new(InMemoryProductRepository::new()));

        let result = sut
            .save(saved("1", "TV", 300.0).with_created_at(created_at))
            .await
            .unwrap();

        assert_eq!(result.created_at(), Some(created_at));
    }

    #[tokio::test]
    async fn test_deleteは保存済みの商品を削除する() {
        // Given
        let repository = InMemoryProductRepository::with_products([saved("1", "TV", 300.0)]);
        let sut = create_sut(Arc::new(repository.clone()));

        // When
        sut.delete(&saved("1", "TV", 300.0)).await.unwrap();
        sut.delete(&product("unsaved", 1.0)).await.unwrap();

        // Then
        assert!(repository.is_empty());
    }
}
