//! # 商品フォーム
//!
//! `POST /form` のフォームバインディングと入力検証。
//!
//! ## 編集中レコードの受け渡し
//!
//! 編集中の商品はサーバー側セッションに保持しない。フォームの hidden フィールド
//! （`id`, `create_at`, `foto`）としてクライアントとの間を往復させる。
//! 保存成功後のリダイレクトにはフォームを含めないため、次のリクエストは
//! 編集中レコードを持たない状態から始まる。
//!
//! 全フィールドを文字列として受け取り、検証エラー時は入力値をそのまま再表示する。

use std::{borrow::Cow, collections::BTreeMap};

use catalog_domain::product::{MAX_PRODUCT_NAME_LENGTH, Price, Product, ProductId, ProductName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::WebError;

/// フィールド名 → エラーメッセージ一覧
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// 検証対象のフィールド
pub const VALIDATED_FIELDS: [&str; 3] = ["nombre", "precio", "create_at"];

/// 全ての検証対象フィールドにエントリを持つエラーマップを返す
///
/// テンプレートは `errores.<field>` を常に配列として参照できる。
pub fn errors_for_view(errors: FieldErrors) -> FieldErrors {
    let mut all: FieldErrors = VALIDATED_FIELDS
        .iter()
        .map(|field| (field.to_string(), Vec::new()))
        .collect();
    all.extend(errors);
    all
}

/// 商品フォーム（作成・編集共通）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProductForm {
    #[serde(default)]
    pub id:        String,
    #[serde(default)]
    #[validate(custom(function = "validate_nombre"))]
    pub nombre:    String,
    #[serde(default)]
    #[validate(custom(function = "validate_precio"))]
    pub precio:    String,
    #[serde(default)]
    #[validate(custom(function = "validate_create_at"))]
    pub create_at: String,
    #[serde(default)]
    pub foto:      String,
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self {
            id:        product
                .id()
                .map(|id| id.as_str().to_string())
                .unwrap_or_default(),
            nombre:    product.name().to_string(),
            precio:    product.price().value().to_string(),
            create_at: product
                .created_at()
                .map(|at| at.to_rfc3339())
                .unwrap_or_default(),
            foto:      product.photo().unwrap_or_default().to_string(),
        }
    }
}

impl ProductForm {
    /// 入力を検証し、エラーをフィールドごとのメッセージにまとめる
    pub fn check(&self) -> Result<(), FieldErrors> {
        self.validate().map_err(|errors| field_errors(&errors))
    }

    /// 検証済みのフォームから商品を組み立てる
    ///
    /// `id` が空なら未保存の商品になる。
    pub fn to_product(&self) -> Result<Product, WebError> {
        let price = parse_price(&self.precio)
            .ok_or_else(|| WebError::BadRequest(format!("precio: {:?}", self.precio)))?;
        let product = Product::new(ProductName::new(&self.nombre)?, Price::new(price)?)
            .with_photo(Some(self.foto.clone()));

        let product = match parse_created_at(&self.create_at) {
            Some(Ok(created_at)) => product.with_created_at(created_at),
            Some(Err(_)) => {
                return Err(WebError::BadRequest(format!(
                    "create_at: {:?}",
                    self.create_at
                )));
            }
            None => product,
        };

        match self.id.trim() {
            "" => Ok(product),
            id => Ok(product.with_id(ProductId::new(id)?)?),
        }
    }
}

fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|error| {
                    error
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| error.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

fn parse_price(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_created_at(value: &str) -> Option<Result<DateTime<Utc>, chrono::ParseError>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some(DateTime::parse_from_rfc3339(value).map(|at| at.with_timezone(&Utc)))
}

// --- カスタムバリデータ ---

fn validate_nombre(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(error("required", "el nombre es obligatorio"));
    }
    if value.chars().count() > MAX_PRODUCT_NAME_LENGTH {
        return Err(error("length", "el nombre es demasiado largo"));
    }
    Ok(())
}

fn validate_precio(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("required", "el precio es obligatorio"));
    }
    match parse_price(value) {
        None => Err(error("number", "el precio debe ser un número")),
        Some(price) if price < 0.0 => Err(error("range", "el precio no puede ser negativo")),
        Some(_) => Ok(()),
    }
}

fn validate_create_at(value: &str) -> Result<(), ValidationError> {
    match parse_created_at(value) {
        Some(Err(_)) => Err(error("format", "la fecha no es válida")),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn form(nombre: &str, precio: &str) -> ProductForm {
        ProductForm {
            nombre: nombre.to_string(),
            precio: precio.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_有効なフォームは検証を通過する() {
        assert_eq!(form("TV", "300.00").check(), Ok(()));
    }

    #[rstest]
    #[case("", "300", "nombre", "el nombre es obligatorio")]
    #[case("   ", "300", "nombre", "el nombre es obligatorio")]
    #[case("TV", "", "precio", "el precio es obligatorio")]
    #[case("TV", "abc", "precio", "el precio debe ser un número")]
    #[case("TV", "NaN", "precio", "el precio debe ser un número")]
    #[case("TV", "-1", "precio", "el precio no puede ser negativo")]
    fn test_不正な入力はフィールドごとのエラーになる(
        #[case] nombre: &str,
        #[case] precio: &str,
        #[case] field: &str,
        #[case] message: &str,
    ) {
        let errors = form(nombre, precio).check().unwrap_err();

        assert_eq!(errors.get(field), Some(&vec![message.to_string()]));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_不正な作成日時はエラーになる() {
        let sut = ProductForm {
            create_at: "yesterday".to_string(),
            ..form("TV", "300")
        };

        let errors = sut.check().unwrap_err();

        assert_eq!(
            errors.get("create_at"),
            Some(&vec!["la fecha no es válida".to_string()])
        );
    }

    #[test]
    fn test_ビュー用のエラーマップは全フィールドを含む() {
        let errors = form("", "300").check().unwrap_err();

        let sut = errors_for_view(errors);

        assert_eq!(sut.keys().collect::<Vec<_>>(), vec!["create_at", "nombre", "precio"]);
        assert_eq!(sut["nombre"], vec!["el nombre es obligatorio".to_string()]);
        assert!(sut["precio"].is_empty());
    }

    #[test]
    fn test_idが空のフォームは未保存の商品になる() {
        let product = form("TV", "300").to_product().unwrap();

        assert_eq!(product.id(), None);
        assert_eq!(product.name().as_str(), "TV");
        assert_eq!(product.price().value(), 300.0);
    }

    #[test]
    fn test_hiddenフィールドの値は商品に引き継がれる() {
        let created_at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let sut = ProductForm {
            id: "1".to_string(),
            create_at: created_at.to_rfc3339(),
            foto: "tv.jpg".to_string(),
            ..form("Television", "350.00")
        };

        let product = sut.to_product().unwrap();

        assert_eq!(product.id().map(ProductId::as_str), Some("1"));
        assert_eq!(product.created_at(), Some(created_at));
        assert_eq!(product.photo(), Some("tv.jpg"));
    }

    #[test]
    fn test_商品からフォームへの変換は表示用の文字列にする() {
        let product = form("TV", "300").to_product().unwrap();
        let product = product.with_id(ProductId::new("1").unwrap()).unwrap();

        let sut = ProductForm::from(&product);

        assert_eq!(
            sut,
            ProductForm {
                id:        "1".to_string(),
                nombre:    "TV".to_string(),
                precio:    "300".to_string(),
                create_at: String::new(),
                foto:      String::new(),
            }
        );
    }
}
