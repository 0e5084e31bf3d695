//! # レンダリング戦略

use derive_more::Display;

/// 一覧ページのレンダリング戦略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RenderStrategy {
    /// ストリームを全て読み切ってから1つのボディとして返す
    #[display("full")]
    Full,

    /// ヘッダを先に送り、ソースが `buffer_size` 件生成するごとに行を送る
    #[display("data-driven({buffer_size})")]
    DataDriven { buffer_size: usize },

    /// 出力を `max_chunk_size` バイトごとに区切って送る
    #[display("chunked({max_chunk_size})")]
    Chunked { max_chunk_size: usize },
}

impl RenderStrategy {
    /// ボディをストリーミングするか
    pub fn is_streaming(self) -> bool {
        !matches!(self, Self::Full)
    }
}
