//! PostgresProductRepository 統合テスト
//!
//! sqlx::test マクロがテストごとに使い捨てのデータベースを作成し、
//! マイグレーションを適用する。`DATABASE_URL` が必要なため `#[ignore]` 付き。
//!
//! 実行方法:
//! ```bash
//! DATABASE_URL=postgres://localhost/catalog cargo test -p catalog-infra -- --ignored
//! ```

use catalog_domain::product::{Price, Product, ProductId, ProductName};
use catalog_infra::repository::{PostgresProductRepository, ProductRepository};
use chrono::DateTime;
use pretty_assertions::assert_eq;
use sqlx::PgPool;

fn product(name: &str, price: f64) -> Product {
    Product::new(ProductName::new(name).unwrap(), Price::new(price).unwrap())
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_idのない商品を保存するとidが採番され検索できる(pool: PgPool) {
    // Given
    let sut = PostgresProductRepository::new(pool);
    let created_at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    let new_product = product("TV", 300.0).with_created_at(created_at);

    // When
    let saved = sut.save(&new_product).await.unwrap();

    // Then
    let id = saved.id().cloned().unwrap();
    let found = sut.find_by_id(&id).await.unwrap().unwrap();
    assert_eq!(found.name().as_str(), "TV");
    assert_eq!(found.price().value(), 300.0);
    assert_eq!(found.created_at(), Some(created_at));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_idのある商品の保存は上書きになる(pool: PgPool) {
    // Given
    let sut = PostgresProductRepository::new(pool);
    let id = ProductId::new("1").unwrap();
    sut.save(&product("TV", 300.0).with_id(id.clone()).unwrap())
        .await
        .unwrap();

    // When
    sut.save(&product("Television", 350.0).with_id(id.clone()).unwrap())
        .await
        .unwrap();

    // Then
    let all = sut.find_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name().as_str(), "Television");
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_find_allは挿入順で返す(pool: PgPool) {
    // Given
    let sut = PostgresProductRepository::new(pool);
    for name in ["Sony", "Bianchi", "Mica"] {
        sut.save(&product(name, 10.0)).await.unwrap();
    }

    // When
    let all = sut.find_all().await.unwrap();

    // Then
    let names: Vec<&str> = all.iter().map(|p| p.name().as_str()).collect();
    assert_eq!(names, vec!["Sony", "Bianchi", "Mica"]);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_存在しないidの検索と削除はエラーにならない(pool: PgPool) {
    // Given
    let sut = PostgresProductRepository::new(pool);
    let missing = ProductId::new("missing").unwrap();

    // When
    let found = sut.find_by_id(&missing).await.unwrap();
    let deleted = sut.delete(&missing).await;

    // Then
    assert_eq!(found, None);
    assert!(deleted.is_ok());
}
