//! # ユースケース層
//!
//! - **依存性注入**: リポジトリを `Arc<dyn Trait>` で外部から注入
//! - **薄いハンドラ**: ハンドラは薄く保ち、ストアへの問い合わせはユースケースに集約

pub mod product;

pub use product::{ProductStream, ProductUseCaseImpl};
