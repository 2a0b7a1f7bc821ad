//! 動画メタデータの読み込み
//!
//! ヘッダーなし・12列固定のCSVを読む。列数が合わない行があれば
//! その時点でエラーにする（列ずれのまま処理を続けない）。

mod writer;

pub use writer::{read_results_gz, write_results_gz};

use crate::error::{BrandDetectError, Result};
use brand_detect_common::{VideoRecord, VIDEO_COLUMNS};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// 読み込み範囲
#[derive(Debug, Clone, Copy)]
pub struct VideoReadOptions {
    /// 先頭から読み飛ばす行数
    pub skip_rows: usize,
    /// 読み込む最大行数
    pub max_rows: usize,
}

impl Default for VideoReadOptions {
    fn default() -> Self {
        Self {
            skip_rows: 0,
            max_rows: 1_000_000,
        }
    }
}

pub fn load_videos(path: &Path, options: VideoReadOptions) -> Result<Vec<VideoRecord>> {
    if !path.exists() {
        return Err(BrandDetectError::FileNotFound(path.display().to_string()));
    }
    let file = File::open(path)?;
    read_videos(file, &path.display().to_string(), options)
}

/// CSVリーダーから読み込み（`source` はエラーメッセージ用）
pub fn read_videos<R: Read>(
    reader: R,
    source: &str,
    options: VideoReadOptions,
) -> Result<Vec<VideoRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut videos = Vec::new();

    for record in reader
        .records()
        .skip(options.skip_rows)
        .take(options.max_rows)
    {
        let record = record?;
        if record.len() != VIDEO_COLUMNS.len() {
            return Err(BrandDetectError::SchemaMismatch {
                path: source.to_string(),
                line: record.position().map(|p| p.line()).unwrap_or(0),
                detail: format!("{}列を想定、{}列でした", VIDEO_COLUMNS.len(), record.len()),
            });
        }

        let field = |i: usize| record.get(i).unwrap_or_default().to_string();
        videos.push(VideoRecord {
            categories: field(0),
            channel_id: field(1),
            crawl_date: field(2),
            description: field(3),
            dislike_count: field(4),
            display_id: field(5),
            duration: field(6),
            like_count: field(7),
            tags: field(8),
            title: field(9),
            upload_date: field(10),
            view_count: field(11),
        });
    }

    debug!(source, rows = videos.len(), skip = options.skip_rows, "メタデータ読み込み完了");
    Ok(videos)
}
