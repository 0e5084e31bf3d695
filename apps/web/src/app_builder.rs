//! # アプリケーション構築
//!
//! ルーター定義とミドルウェアの組み立てを担当する。
//! `main.rs` はストアの初期化とサーバー起動に集中する。

use std::sync::Arc;

use axum::{Router, routing::get};
use catalog_shared::{
    canonical_log::CanonicalLogLineLayer,
    observability::{MakeRequestUuidV7, make_request_span},
};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::handler::{
    ProductState,
    create_form,
    delete_product,
    edit_form,
    edit_form_v2,
    health_check,
    list_products,
    list_products_chunked,
    list_products_data_driver,
    list_products_full,
    save_product,
};

/// ルーターを構築する
pub fn build_app(state: Arc<ProductState>) -> Router {
    Router::new()
        .route("/", get(list_products))
        .route("/listar", get(list_products))
        .route("/form", get(create_form).post(save_product))
        .route("/form/{id}", get(edit_form))
        .route("/formv2/{id}", get(edit_form_v2))
        .route("/eliminar/{id}", get(delete_product))
        .route("/listar-datadriver", get(list_products_data_driver))
        .route("/listar-full", get(list_products_full))
        .route("/listar-chunked", get(list_products_chunked))
        .with_state(state)
        .route("/health", get(health_check))
        // Request ID レイヤー（レイヤー順序が重要: 下に書いたものが外側）
        // 1. SetRequestIdLayer（最外）: リクエスト受信時に UUID v7 を生成（またはクライアント提供値を使用）
        // 2. TraceLayer: カスタムスパンに request_id を含め、全ログに自動注入
        // 3. CanonicalLogLineLayer: リクエスト完了時に1行サマリログを出力（スパン内）
        // 4. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(CanonicalLogLineLayer)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
