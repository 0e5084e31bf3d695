//! # 商品
//!
//! カタログで管理する商品レコードのドメインモデル。
//!
//! ## 識別子のライフサイクル
//!
//! - 作成フォームで生成された商品は ID を持たない（未保存）
//! - ID はストアが保存時に採番する
//! - 一度付与された ID は変更できない
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use catalog_domain::product::{Price, Product, ProductId, ProductName};
//!
//! let product = Product::new(ProductName::new("Sony Notebook")?, Price::new(846.89)?);
//! assert!(product.id().is_none());
//!
//! let saved = product.with_id(ProductId::new("42")?)?;
//! assert_eq!(saved.id().map(ProductId::as_str), Some("42"));
//! assert_eq!(saved.with_uppercased_name().name().as_str(), "SONY NOTEBOOK");
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::DomainError;

// =========================================================================
// ProductId（商品 ID）
// =========================================================================

/// 商品の識別子
///
/// ストアが採番する不透明な文字列。空文字列は許容しない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct ProductId(String);

impl ProductId {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(DomainError::Validation("idは必須です".to_string()));
        }
        Ok(Self(value))
    }

    /// UUID v7 文字列で新しい ID を採番する
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// =========================================================================
// ProductName（商品名）
// =========================================================================

/// 商品名の最大文字数（DB: `VARCHAR(100)`）
pub const MAX_PRODUCT_NAME_LENGTH: usize = 100;

define_validated_string! {
    /// 商品名（値オブジェクト）
    ///
    /// 前後の空白を除去した 1〜100 文字の文字列。
    pub struct ProductName {
        label: "nombre",
        max_length: MAX_PRODUCT_NAME_LENGTH,
    }
}

impl ProductName {
    /// 大文字化した商品名を返す
    ///
    /// 大文字化で文字数が増える場合（`ß` → `SS` など）も最大長チェックは行わない。
    /// 表示用の変換であり、保存対象にはならない。
    pub fn to_uppercase(&self) -> Self {
        Self(self.0.to_uppercase())
    }
}

// =========================================================================
// Price（価格）
// =========================================================================

/// 価格（値オブジェクト）
///
/// 有限かつ 0 以上の数値。
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct Price(f64);

impl Price {
    pub fn new(value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() {
            return Err(DomainError::Validation(
                "precioは数値である必要があります".to_string(),
            ));
        }
        if value < 0.0 {
            return Err(DomainError::Validation(
                "precioは 0 以上である必要があります".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

// =========================================================================
// Product（商品）
// =========================================================================

/// 商品エンティティ
///
/// # 不変条件
///
/// - 名前と価格は常に有効（値オブジェクトで保証）
/// - `id` は一度 `Some` になったら別の値に置き換わらない
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    id:         Option<ProductId>,
    name:       ProductName,
    price:      Price,
    created_at: Option<DateTime<Utc>>,
    photo:      Option<String>,
}

impl Product {
    /// 未保存の商品を作成する
    pub fn new(name: ProductName, price: Price) -> Self {
        Self {
            id: None,
            name,
            price,
            created_at: None,
            photo: None,
        }
    }

    /// 既存のデータから復元する
    pub fn from_db(
        id: ProductId,
        name: ProductName,
        price: Price,
        created_at: Option<DateTime<Utc>>,
        photo: Option<String>,
    ) -> Self {
        Self {
            id: Some(id),
            name,
            price,
            created_at,
            photo,
        }
    }

    // --- ゲッター ---

    pub fn id(&self) -> Option<&ProductId> {
        self.id.as_ref()
    }

    pub fn name(&self) -> &ProductName {
        &self.name
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn photo(&self) -> Option<&str> {
        self.photo.as_deref()
    }

    // --- 状態遷移 ---

    /// ID を付与した新しいインスタンスを返す
    ///
    /// 同じ ID の再付与は許容する。別の ID への置き換えはエラー。
    pub fn with_id(self, id: ProductId) -> Result<Self, DomainError> {
        if let Some(current) = self.id.as_ref().filter(|current| **current != id) {
            return Err(DomainError::Validation(format!(
                "idは変更できません: {current} -> {id}"
            )));
        }
        Ok(Self {
            id: Some(id),
            ..self
        })
    }

    /// 作成日時を設定した新しいインスタンスを返す
    pub fn with_created_at(self, created_at: DateTime<Utc>) -> Self {
        Self {
            created_at: Some(created_at),
            ..self
        }
    }

    /// 画像参照を設定した新しいインスタンスを返す
    ///
    /// 空白のみの値は「画像なし」として扱う。
    pub fn with_photo(self, photo: Option<String>) -> Self {
        let photo = photo
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        Self { photo, ..self }
    }

    /// 名前を大文字化したコピーを返す（元の商品は変更しない）
    pub fn with_uppercased_name(&self) -> Self {
        Self {
            name: self.name.to_uppercase(),
            ..self.clone()
        }
    }
}
