//! # ビューモデル
//!
//! テンプレートに渡す値の組み立て。
//!
//! | キー | 内容 |
//! |------|------|
//! | `titulo` | ページタイトル |
//! | `productos` | 一覧（[`Listing`] として別枠で保持し、レンダリング時に展開） |
//! | `producto` | フォームに表示する商品 |
//! | `boton` | フォームのボタンラベル（`crear` / `editar`） |
//! | `errores` | フィールドごとの検証エラー |
//! | `error` / `success` | 一覧ページの通知メッセージ |

use std::fmt;

use catalog_domain::product::Product;
use serde::Serialize;
use tera::Context;

use crate::usecase::ProductStream;

/// 一覧の1行分の表示用データ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductView {
    pub id:        String,
    pub nombre:    String,
    pub precio:    String,
    pub create_at: String,
    pub foto:      String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id:        product
                .id()
                .map(|id| id.as_str().to_string())
                .unwrap_or_default(),
            nombre:    product.name().to_string(),
            precio:    format!("{:.2}", product.price().value()),
            create_at: product
                .created_at()
                .map(|at| at.format("%d/%m/%Y").to_string())
                .unwrap_or_default(),
            foto:      product.photo().unwrap_or_default().to_string(),
        }
    }
}

/// ビューモデルに載せる一覧
pub enum Listing {
    /// 通常の一覧（戦略はビュー名から決まる）
    Sequence(ProductStream),

    /// データ駆動レンダリングを要求する一覧
    DataDriven {
        source:      ProductStream,
        buffer_size: usize,
    },
}

impl Listing {
    pub fn into_source(self) -> ProductStream {
        match self {
            Self::Sequence(source) | Self::DataDriven { source, .. } => source,
        }
    }
}

impl fmt::Debug for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequence(_) => f.debug_tuple("Sequence").finish_non_exhaustive(),
            Self::DataDriven { buffer_size, .. } => f
                .debug_struct("DataDriven")
                .field("buffer_size", buffer_size)
                .finish_non_exhaustive(),
        }
    }
}

/// テンプレートに渡す値の集合
#[derive(Debug, Default)]
pub struct ViewModel {
    context: Context,
    listing: Option<Listing>,
}

impl ViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// 値を追加する
    pub fn insert<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.context.insert(key, value);
        self
    }

    /// `productos` として一覧を設定する
    pub fn with_listing(mut self, listing: Listing) -> Self {
        self.listing = Some(listing);
        self
    }

    pub fn listing(&self) -> Option<&Listing> {
        self.listing.as_ref()
    }

    pub(crate) fn into_parts(self) -> (Context, Option<Listing>) {
        (self.context, self.listing)
    }
}

/// ハンドラの結果
#[derive(Debug)]
pub enum View {
    /// テンプレートを描画する
    Page { name: String, model: ViewModel },

    /// `303 See Other` でリダイレクトする
    Redirect(String),
}

impl View {
    pub fn page(name: impl Into<String>, model: ViewModel) -> Self {
        Self::Page {
            name: name.into(),
            model,
        }
    }

    pub fn redirect(location: impl Into<String>) -> Self {
        Self::Redirect(location.into())
    }
}
