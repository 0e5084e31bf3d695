//! # ドメイン層エラー定義
//!
//! ビジネスルール違反やドメイン固有の例外状態を表現するエラー型。
//!
//! | エラー種別 | HTTP ステータス | 用途 |
//! |-----------|----------------|------|
//! | `Validation` | 400 Bad Request | 入力値の検証失敗 |
//! | `NotFound` | 404 Not Found | エンティティが存在しない |
//!
//! ```rust
//! use catalog_domain::DomainError;
//!
//! let error = DomainError::NotFound {
//!     entity_type: "Product",
//!     id:          "42".to_string(),
//! };
//! assert_eq!(error.to_string(), "Product が見つかりません: 42");
//! ```

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    /// 入力値がビジネスルールに違反している
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// 指定された ID のエンティティが存在しない
    #[error("{entity_type} が見つかりません: {id}")]
    NotFound {
        /// エンティティの種類（"Product" など）
        entity_type: &'static str,
        /// 検索に使用した識別子
        id:          String,
    },
}
