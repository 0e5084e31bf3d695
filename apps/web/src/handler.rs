//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、ストアへの問い合わせはユースケースに委譲する

pub mod health;
pub mod product;

pub use health::health_check;
pub use product::{
    ProductState,
    create_form,
    delete_product,
    edit_form,
    edit_form_v2,
    list_products,
    list_products_chunked,
    list_products_data_driver,
    list_products_full,
    save_product,
};
