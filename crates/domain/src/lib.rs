//! # Catalog ドメイン層
//!
//! 商品カタログのドメインモデルを定義する。
//!
//! ## 依存関係の方向
//!
//! ```text
//! web → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB、テンプレート、HTTP）には一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`product`] - 商品エンティティと値オブジェクト
//! - [`clock`] - 時刻プロバイダ
//! - [`error`] - ドメイン層で発生するエラーの定義

#[macro_use]
mod macros;

pub mod clock;
pub mod error;
pub mod product;

pub use error::DomainError;
