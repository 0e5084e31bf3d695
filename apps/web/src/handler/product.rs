//! # 商品ハンドラ
//!
//! 一覧・作成フォーム・編集フォーム・保存・削除のルート。
//!
//! ## エンドポイント
//!
//! | ルート | ビュー |
//! |--------|--------|
//! | `GET /`, `GET /listar` | `listar` |
//! | `GET /form` | `form`（作成） |
//! | `GET /form/{id}` | `form`（編集、見つからなければ空の商品） |
//! | `GET /formv2/{id}` | `form`（編集、見つからなければ一覧へリダイレクト） |
//! | `POST /form` | 検証エラーなら `form`、成功なら一覧へリダイレクト |
//! | `GET /eliminar/{id}` | 一覧へリダイレクト |
//! | `GET /listar-datadriver` | `listar`（要素ごとに遅延、データ駆動レンダリング） |
//! | `GET /listar-full` | `listar`（繰り返し一覧、一括レンダリング） |
//! | `GET /listar-chunked` | `listar-chunked`（繰り返し一覧、チャンクレンダリング） |
//!
//! 「見つからない」はユースケースから `Option::None` として返り、
//! ルートごとに空の商品かリダイレクトかを明示的に選ぶ。

use std::sync::Arc;

use axum::{
    Form,
    extract::{Path, Query, State},
    response::Response,
};
use catalog_domain::product::{Product, ProductId};
use catalog_shared::{event_log::event, log_business_event};
use futures::{StreamExt, TryStreamExt};

use crate::{
    config::ListingConfig,
    error::WebError,
    form::{FieldErrors, ProductForm, errors_for_view},
    usecase::{ProductStream, ProductUseCaseImpl},
    view::{Listing, View, ViewModel, ViewRenderer},
};

const LISTING_PATH: &str = "/listar";
const LISTING_TITLE: &str = "Listado de productos";
const CREATE_TITLE: &str = "Formulario de producto";
const EDIT_TITLE: &str = "Editar Producto";
const CREATE_LABEL: &str = "crear";
const EDIT_LABEL: &str = "editar";

const NOT_FOUND_ERROR: &str = "no+existe+el+producto";
const DELETE_NOT_FOUND_ERROR: &str = "no+existe+el+producto+a+eliminar";
const DELETE_SUCCESS: &str = "producto+eliminado+con+exito";

/// 商品ハンドラの State
pub struct ProductState {
    pub usecase:  ProductUseCaseImpl,
    pub renderer: ViewRenderer,
    pub listing:  ListingConfig,
}

/// 一覧ページの通知メッセージ
#[derive(Debug, Default, PartialEq)]
pub struct ListingNotice {
    pub error:   Option<String>,
    pub success: Option<String>,
}

impl ListingNotice {
    /// クエリパラメータから組み立てる
    ///
    /// 同じキーが複数回現れた場合は最初の値を使う。
    pub fn from_query(params: Vec<(String, String)>) -> Self {
        let mut notice = Self::default();
        for (key, value) in params {
            let slot = match key.as_str() {
                "error" => &mut notice.error,
                "success" => &mut notice.success,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        notice
    }
}

// --- ビューの組み立て ---

fn listing_page(name: &str, listing: Listing, notice: &ListingNotice) -> View {
    let mut model = ViewModel::new().insert("titulo", LISTING_TITLE);
    if let Some(error) = &notice.error {
        model = model.insert("error", error);
    }
    if let Some(success) = &notice.success {
        model = model.insert("success", success);
    }
    View::page(name, model.with_listing(listing))
}

fn form_page(title: &str, label: &str, form: &ProductForm, errors: FieldErrors) -> View {
    let model = ViewModel::new()
        .insert("titulo", title)
        .insert("boton", label)
        .insert("producto", form)
        .insert("errores", &errors_for_view(errors));
    View::page("form", model)
}

fn edit_page(product: &Product) -> View {
    form_page(
        EDIT_TITLE,
        EDIT_LABEL,
        &ProductForm::from(product),
        FieldErrors::new(),
    )
}

fn redirect_with(key: &str, message: &str) -> View {
    View::redirect(format!("{LISTING_PATH}?{key}={message}"))
}

/// 一覧の各要素の名前をログに出す
fn logged(source: ProductStream) -> ProductStream {
    source
        .inspect_ok(|product| tracing::info!(nombre = %product.name(), "{}", product.name()))
        .boxed()
}

/// パス上の ID で商品を検索する
///
/// ID として不正な文字列（空白のみ等）は「見つからない」として扱う。
async fn find_product(state: &ProductState, raw_id: &str) -> Result<Option<Product>, WebError> {
    match ProductId::new(raw_id) {
        Ok(id) => state.usecase.find_by_id(&id).await,
        Err(_) => Ok(None),
    }
}

// --- 一覧 ---

/// 商品一覧（名前は大文字化）
///
/// `GET /`, `GET /listar`
#[tracing::instrument(skip_all)]
pub async fn list_products(
    State(state): State<Arc<ProductState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, WebError> {
    let notice = ListingNotice::from_query(params);
    let source = logged(state.usecase.find_all_uppercased());
    let view = listing_page("listar", Listing::Sequence(source), &notice);
    state.renderer.render(view).await
}

/// 要素ごとに遅延を挟む一覧（データ駆動レンダリング）
///
/// `GET /listar-datadriver`
#[tracing::instrument(skip_all, fields(delay_ms = state.listing.delay.as_millis() as u64))]
pub async fn list_products_data_driver(
    State(state): State<Arc<ProductState>>,
) -> Result<Response, WebError> {
    let delay = state.listing.delay;
    let source = state
        .usecase
        .find_all_uppercased()
        .then(move |item| async move {
            tokio::time::sleep(delay).await;
            item
        })
        .boxed();

    let listing = Listing::DataDriven {
        source:      logged(source),
        buffer_size: state.listing.buffer_size,
    };
    let view = listing_page("listar", listing, &ListingNotice::default());
    state.renderer.render(view).await
}

/// 繰り返し一覧（一括レンダリング）
///
/// `GET /listar-full`
#[tracing::instrument(skip_all, fields(repeat = state.listing.repeat))]
pub async fn list_products_full(
    State(state): State<Arc<ProductState>>,
) -> Result<Response, WebError> {
    let source = state
        .usecase
        .find_all_uppercased_repeated(state.listing.repeat);
    let view = listing_page("listar", Listing::Sequence(source), &ListingNotice::default());
    state.renderer.render(view).await
}

/// 繰り返し一覧（チャンクレンダリング）
///
/// `GET /listar-chunked`
#[tracing::instrument(skip_all, fields(repeat = state.listing.repeat))]
pub async fn list_products_chunked(
    State(state): State<Arc<ProductState>>,
) -> Result<Response, WebError> {
    let source = state
        .usecase
        .find_all_uppercased_repeated(state.listing.repeat);
    let view = listing_page(
        "listar-chunked",
        Listing::Sequence(source),
        &ListingNotice::default(),
    );
    state.renderer.render(view).await
}

// --- フォーム ---

/// 作成フォーム
///
/// `GET /form`
#[tracing::instrument(skip_all)]
pub async fn create_form(State(state): State<Arc<ProductState>>) -> Result<Response, WebError> {
    let view = form_page(
        CREATE_TITLE,
        CREATE_LABEL,
        &ProductForm::default(),
        FieldErrors::new(),
    );
    state.renderer.render(view).await
}

/// 編集フォーム
///
/// 商品が見つからなければ空のフォームを表示する。
///
/// `GET /form/{id}`
#[tracing::instrument(skip_all, fields(%id))]
pub async fn edit_form(
    State(state): State<Arc<ProductState>>,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let view = match find_product(&state, &id).await? {
        Some(product) => edit_page(&product),
        None => form_page(
            EDIT_TITLE,
            EDIT_LABEL,
            &ProductForm::default(),
            FieldErrors::new(),
        ),
    };
    state.renderer.render(view).await
}

/// 編集フォーム（見つからなければ一覧へリダイレクト）
///
/// `GET /formv2/{id}`
#[tracing::instrument(skip_all, fields(%id))]
pub async fn edit_form_v2(
    State(state): State<Arc<ProductState>>,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let view = match find_product(&state, &id).await? {
        Some(product) => edit_page(&product),
        None => {
            tracing::info!("商品が見つからないため一覧へリダイレクトします");
            redirect_with("error", NOT_FOUND_ERROR)
        }
    };
    state.renderer.render(view).await
}

/// 商品の保存
///
/// 検証エラーの場合は何も保存せずフォームを再表示する。
/// 成功した場合は編集中の状態を持たずに一覧へリダイレクトする。
///
/// `POST /form`
#[tracing::instrument(skip_all, fields(id = %form.id))]
pub async fn save_product(
    State(state): State<Arc<ProductState>>,
    Form(form): Form<ProductForm>,
) -> Result<Response, WebError> {
    if let Err(errors) = form.check() {
        tracing::debug!(?errors, "フォームの検証に失敗しました");
        let view = form_page(EDIT_TITLE, EDIT_LABEL, &form, errors);
        return state.renderer.render(view).await;
    }

    let saved = state.usecase.save(form.to_product()?).await?;
    let saved_id = saved.id().map(ProductId::as_str).unwrap_or_default();

    log_business_event!(
        event.category = event::category::PRODUCT,
        event.action = event::action::PRODUCT_SAVED,
        event.entity_type = event::entity_type::PRODUCT,
        event.entity_id = %saved_id,
        event.result = event::result::SUCCESS,
        "Producto guardado: {} {}",
        saved_id,
        saved.name()
    );

    state.renderer.render(View::redirect(LISTING_PATH)).await
}

/// 商品の削除
///
/// `GET /eliminar/{id}`
#[tracing::instrument(skip_all, fields(%id))]
pub async fn delete_product(
    State(state): State<Arc<ProductState>>,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    let Some(product) = find_product(&state, &id).await? else {
        return state
            .renderer
            .render(redirect_with("error", DELETE_NOT_FOUND_ERROR))
            .await;
    };

    state.usecase.delete(&product).await?;

    log_business_event!(
        event.category = event::category::PRODUCT,
        event.action = event::action::PRODUCT_DELETED,
        event.entity_type = event::entity_type::PRODUCT,
        event.entity_id = %id,
        event.result = event::result::SUCCESS,
        "Producto eliminado: {} {}",
        id,
        product.name()
    );

    state
        .renderer
        .render(redirect_with("success", DELETE_SUCCESS))
        .await
}
