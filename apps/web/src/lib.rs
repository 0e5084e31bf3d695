//! # Catalog Web ライブラリ
//!
//! 商品カタログ Web アプリケーションの設定・ユースケース・ハンドラ・ビューを公開する。
//! バイナリ（`main.rs`）と結合テストの両方から利用する。

pub mod app_builder;
pub mod config;
pub mod error;
pub mod form;
pub mod handler;
pub mod usecase;
pub mod view;

pub use app_builder::build_app;
