//! # Web アプリケーションエラー定義
//!
//! ハンドラ・ユースケース・ビューで発生するエラーと、HTTP レスポンスへの変換を定義する。
//!
//! 「商品が見つからない」は多くのルートでエラーではなく `Option::None` として扱う。
//! ここで定義するのは、呼び出し元に失敗として伝播させるものだけ。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use catalog_domain::DomainError;
use catalog_infra::InfraError;
use catalog_shared::{
    ErrorResponse,
    event_log::error::{category, kind},
};
use thiserror::Error;

/// Web アプリケーションで発生するエラー
#[derive(Debug, Error)]
pub enum WebError {
    /// リソースが見つからない
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 不正なリクエスト
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),

    /// ストアのエラー
    #[error("データベースエラー: {0}")]
    Database(#[from] InfraError),

    /// テンプレートのレンダリング失敗
    #[error("テンプレートエラー: {0}")]
    Template(#[from] tera::Error),

    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl From<DomainError> for WebError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::Validation(msg) => Self::BadRequest(msg),
            not_found @ DomainError::NotFound { .. } => Self::NotFound(not_found.to_string()),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            WebError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorResponse::not_found(msg)),
            WebError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg)),
            WebError::Database(e) => {
                tracing::error!(
                    error.category = category::INFRASTRUCTURE,
                    error.kind = kind::DATABASE,
                    span_trace = %e.span_trace(),
                    "データベースエラー: {}",
                    e
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::internal_error(),
                )
            }
            WebError::Template(e) => {
                tracing::error!(
                    error.category = category::INFRASTRUCTURE,
                    error.kind = kind::TEMPLATE,
                    "テンプレートエラー: {:?}",
                    e
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::internal_error(),
                )
            }
            WebError::Internal(msg) => {
                tracing::error!(
                    error.category = category::INFRASTRUCTURE,
                    error.kind = kind::INTERNAL,
                    "内部エラー: {}",
                    msg
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::internal_error(),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
