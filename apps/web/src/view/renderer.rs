//! # ビューレンダラ
//!
//! [`View`] を axum のレスポンスに変換する。
//!
//! ## テンプレート構成
//!
//! 一覧ページ `{name}` は次のテンプレートで構成する。
//!
//! - `{name}.html`: 一括レンダリング用のページ全体（`productos` を配列として受け取る）
//! - `{name}/head.html`, `{name}/row.html`, `{name}/tail.html`: ストリーミング用の断片
//!
//! `row.html` は `producto` 1件だけを受け取る。
//!
//! ## ストリーミング中のエラー
//!
//! ステータス行を送った後に発生したエラーはボディを途中で打ち切る。
//! ヘッダ断片の描画はレスポンス開始前に行うため、テンプレートの誤りは 500 になる。

use std::sync::Arc;

use axum::{
    body::Body,
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
};
use bytes::{Bytes, BytesMut};
use catalog_domain::product::Product;
use catalog_shared::event_log::error::{category, kind};
use futures::{
    Stream,
    StreamExt,
    TryStreamExt,
    future,
    stream::{self, BoxStream},
};
use tera::{Context, Tera};

use super::{
    model::{Listing, ProductView, View},
    strategy::RenderStrategy,
};
use crate::{config::RenderConfig, error::WebError};

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// 埋め込みテンプレート
const TEMPLATES: [(&str, &str); 9] = [
    ("layout/head.html", include_str!("../../templates/layout/head.html")),
    ("layout/tail.html", include_str!("../../templates/layout/tail.html")),
    ("listar.html", include_str!("../../templates/listar.html")),
    ("listar/head.html", include_str!("../../templates/listar/head.html")),
    ("listar/row.html", include_str!("../../templates/listar/row.html")),
    ("listar/tail.html", include_str!("../../templates/listar/tail.html")),
    ("listar-chunked/head.html", include_str!("../../templates/listar-chunked/head.html")),
    ("listar-chunked/row.html", include_str!("../../templates/listar-chunked/row.html")),
    ("listar-chunked/tail.html", include_str!("../../templates/listar-chunked/tail.html")),
];

const FORM_TEMPLATE: (&str, &str) = ("form.html", include_str!("../../templates/form.html"));

type PieceStream = BoxStream<'static, Result<String, WebError>>;

/// テンプレートエンジンとレンダリング設定を保持するレンダラ
#[derive(Clone)]
pub struct ViewRenderer {
    tera:   Arc<Tera>,
    config: RenderConfig,
}

impl ViewRenderer {
    /// 埋め込みテンプレートを読み込んでレンダラを作成する
    pub fn new(config: RenderConfig) -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.into_iter().chain([FORM_TEMPLATE]))?;
        tera.autoescape_on(vec![".html"]);

        Ok(Self {
            tera: Arc::new(tera),
            config,
        })
    }

    /// ビュー名と一覧の種類からレンダリング戦略を決める
    pub fn strategy_for(&self, name: &str, listing: Option<&Listing>) -> RenderStrategy {
        match listing {
            Some(Listing::DataDriven { buffer_size, .. }) => RenderStrategy::DataDriven {
                buffer_size: (*buffer_size).max(1),
            },
            Some(Listing::Sequence(_)) if self.config.chunked_views.iter().any(|v| v == name) => {
                RenderStrategy::Chunked {
                    max_chunk_size: self.config.max_chunk_size.max(1),
                }
            }
            _ => RenderStrategy::Full,
        }
    }

    /// ビューをレスポンスに変換する
    pub async fn render(&self, view: View) -> Result<Response, WebError> {
        let (name, model) = match view {
            View::Redirect(location) => return Ok(Redirect::to(&location).into_response()),
            View::Page { name, model } => (name, model),
        };

        let strategy = self.strategy_for(&name, model.listing());
        tracing::debug!(
            view = %name,
            %strategy,
            streaming = strategy.is_streaming(),
            "ビューを描画します"
        );

        let (context, listing) = model.into_parts();
        let Some(listing) = listing else {
            return Ok(Html(self.tera.render(&format!("{name}.html"), &context)?).into_response());
        };

        match strategy {
            RenderStrategy::Full => self.render_full(&name, context, listing).await,
            RenderStrategy::DataDriven { buffer_size } => {
                let pieces = self.pieces(&name, context, listing, buffer_size)?;
                Ok(streaming_response(pieces.map_ok(Bytes::from)))
            }
            RenderStrategy::Chunked { max_chunk_size } => {
                let pieces = self.pieces(&name, context, listing, 1)?;
                Ok(streaming_response(chunked(pieces, max_chunk_size)))
            }
        }
    }

    async fn render_full(
        &self,
        name: &str,
        mut context: Context,
        listing: Listing,
    ) -> Result<Response, WebError> {
        let productos: Vec<ProductView> = listing
            .into_source()
            .map_ok(|product| ProductView::from(&product))
            .try_collect()
            .await?;
        context.insert("productos", &productos);

        Ok(Html(self.tera.render(&format!("{name}.html"), &context)?).into_response())
    }

    /// ヘッダ・行・フッタの断片を順に生成するストリームを作る
    ///
    /// ヘッダはこの時点で描画する。行はソースが `batch_size` 件生成するごとに描画する。
    fn pieces(
        &self,
        name: &str,
        context: Context,
        listing: Listing,
        batch_size: usize,
    ) -> Result<PieceStream, WebError> {
        let head = self.tera.render(&format!("{name}/head.html"), &context)?;

        let tera = self.tera.clone();
        let row_template = format!("{name}/row.html");
        let rows = listing
            .into_source()
            .try_chunks(batch_size.max(1))
            .map_err(|error| error.1)
            .and_then(move |batch| future::ready(render_rows(&tera, &row_template, &batch)));

        let tera = self.tera.clone();
        let tail_template = format!("{name}/tail.html");
        let tail = stream::once(async move {
            tera.render(&tail_template, &context)
                .map_err(WebError::from)
        });

        Ok(stream::once(future::ready(Ok::<_, WebError>(head)))
            .chain(rows)
            .chain(tail)
            .boxed())
    }
}

fn render_rows(
    tera: &Tera,
    template: &str,
    batch: &[Product],
) -> Result<String, WebError> {
    let mut out = String::new();
    for product in batch {
        let mut context = Context::new();
        context.insert("producto", &ProductView::from(product));
        out.push_str(&tera.render(template, &context)?);
    }
    Ok(out)
}

fn streaming_response<S>(body: S) -> Response
where
    S: Stream<Item = Result<Bytes, WebError>> + Send + 'static,
{
    let body = body.inspect_err(|e| {
        tracing::error!(
            error.category = category::INFRASTRUCTURE,
            error.kind = kind::INTERNAL,
            "ストリーミング中にエラーが発生したためボディを打ち切ります: {}",
            e
        );
    });
    ([(header::CONTENT_TYPE, HTML_CONTENT_TYPE)], Body::from_stream(body)).into_response()
}

struct ChunkState {
    pieces:   PieceStream,
    buffer:   BytesMut,
    finished: bool,
}

/// 断片を連結し、`max_chunk_size` バイトごとのチャンクに区切る
///
/// 最後のチャンクだけは `max_chunk_size` 未満になりうる。
/// 断片ストリームがエラーを返した時点で、未送信のバッファを捨ててエラーを1つ返し終了する。
pub(crate) fn chunked(
    pieces: PieceStream,
    max_chunk_size: usize,
) -> impl Stream<Item = Result<Bytes, WebError>> + Send + 'static {
    let max_chunk_size = max_chunk_size.max(1);
    let state = ChunkState {
        pieces,
        buffer: BytesMut::with_capacity(max_chunk_size),
        finished: false,
    };

    stream::unfold(state, move |mut state| async move {
        loop {
            if state.buffer.len() >= max_chunk_size {
                let chunk = state.buffer.split_to(max_chunk_size).freeze();
                return Some((Ok(chunk), state));
            }
            if state.finished {
                if state.buffer.is_empty() {
                    return None;
                }
                let chunk = state.buffer.split().freeze();
                return Some((Ok(chunk), state));
            }
            match state.pieces.next().await {
                Some(Ok(piece)) => state.buffer.extend_from_slice(piece.as_bytes()),
                Some(Err(e)) => {
                    state.finished = true;
                    state.buffer.clear();
                    return Some((Err(e), state));
                }
                None => state.finished = true,
            }
        }
    })
}
