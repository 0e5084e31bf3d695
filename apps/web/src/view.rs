//! # ビュー層
//!
//! ハンドラは [`View`]（ビュー名 + ビューモデル、またはリダイレクト）を組み立て、
//! [`ViewRenderer`] が HTTP レスポンスに変換する。
//!
//! 一覧ページは [`RenderStrategy`] に応じて、一括レンダリング・データ駆動
//! （バッチごとのストリーミング）・チャンク（固定サイズでのフラッシュ）のいずれかで返す。

pub mod model;
pub mod renderer;
pub mod strategy;

pub use model::{Listing, ProductView, View, ViewModel};
pub use renderer::ViewRenderer;
pub use strategy::RenderStrategy;
