use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrandDetectError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("CSV読み込みエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("列構成が不正: {path} {line}行目: {detail}")]
    SchemaMismatch {
        path: String,
        line: u64,
        detail: String,
    },

    #[error("実行パラメータが不正: {0}")]
    InvalidParameter(String),

    #[error("チャンク{index}の処理に失敗: {message}")]
    ChunkFailed { index: usize, message: String },

    #[error("処理が中断されました（完了チャンク数: {completed}）")]
    Cancelled { completed: usize },

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("辞書エラー: {0}")]
    Lexicon(#[from] brand_detect_common::Error),
}

pub type Result<T> = std::result::Result<T, BrandDetectError>;
