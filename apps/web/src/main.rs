//! # Catalog Web サーバー
//!
//! 商品カタログをサーバーサイドテンプレートで表示・編集する Web アプリケーション。
//!
//! ## アーキテクチャ
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   Browser    │────▶│  catalog-web │────▶│ Record Store │
//! │   (HTML)     │     │  port: 8080  │     │ (PostgreSQL) │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! 環境変数は [`catalog_web::config`] を参照。
//!
//! ## 起動方法
//!
//! ```bash
//! # インメモリストア（デモデータ付き）
//! STORE_BACKEND=memory cargo run -p catalog-web
//!
//! # PostgreSQL
//! DATABASE_URL=postgres://... cargo run -p catalog-web --release
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use catalog_domain::{
    clock::SystemClock,
    product::{Price, Product, ProductName},
};
use catalog_infra::{
    InMemoryProductRepository,
    db,
    repository::{PostgresProductRepository, ProductRepository},
};
use catalog_shared::observability::TracingConfig;
use catalog_web::{
    build_app,
    config::{StoreConfig, WebConfig},
    handler::ProductState,
    usecase::ProductUseCaseImpl,
    view::ViewRenderer,
};
use tokio::net::TcpListener;

/// インメモリストアに投入するデモデータ
const DEMO_PRODUCTS: [(&str, f64); 8] = [
    ("TV Panasonic Pantalla LCD", 456.89),
    ("Sony Camara HD Digital", 177.89),
    ("Apple iPod", 46.89),
    ("Sony Notebook", 846.89),
    ("Hewlett Packard Multifuncional", 200.89),
    ("Bianchi Bicicleta", 70.89),
    ("HP Notebook Omen 17", 2500.89),
    ("Mica Cómoda 5 Cajones", 150.89),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    catalog_shared::observability::init_tracing(TracingConfig::from_env("web"));
    let _tracing_guard = tracing::info_span!("app", service = "web").entered();

    let config = WebConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        backend = %config.store.backend(),
        "Catalog Web サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    let repository = create_repository(&config.store).await?;
    let usecase = ProductUseCaseImpl::new(repository, Arc::new(SystemClock));
    let renderer = ViewRenderer::new(config.render.clone())
        .context("テンプレートの読み込みに失敗しました")?;

    let state = Arc::new(ProductState {
        usecase,
        renderer,
        listing: config.listing.clone(),
    });
    let app = build_app(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("バインドアドレスが不正です")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("{addr} にバインドできません"))?;
    tracing::info!("Catalog Web サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// 設定に応じて商品ストアを作成する
async fn create_repository(store: &StoreConfig) -> anyhow::Result<Arc<dyn ProductRepository>> {
    match store {
        StoreConfig::Postgres { database_url } => {
            let pool = db::create_pool(database_url)
                .await
                .context("データベース接続に失敗しました")?;
            tracing::info!("データベースに接続しました");

            db::run_migrations(&pool)
                .await
                .context("マイグレーションの実行に失敗しました")?;

            Ok(Arc::new(PostgresProductRepository::new(pool)))
        }
        StoreConfig::Memory => {
            let repository = InMemoryProductRepository::new();
            for (name, price) in DEMO_PRODUCTS {
                let product = Product::new(ProductName::new(name)?, Price::new(price)?);
                repository.save(&product).await?;
            }
            tracing::info!(count = repository.len(), "インメモリストアを初期化しました");

            Ok(Arc::new(repository))
        }
    }
}
