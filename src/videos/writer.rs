//! 照合結果の出力（gzip圧縮CSV）

use crate::error::{BrandDetectError, Result};
use brand_detect_common::{MatchResult, VideoRecord, MATCH_COLUMNS, VIDEO_COLUMNS};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// メタデータ12列 + 照合結果4列をgzip圧縮CSVで保存
///
/// 検出なしは空セル、検出ありは `|` 区切りのブランド名。
pub fn write_results_gz(path: &Path, videos: &[VideoRecord], results: &[MatchResult]) -> Result<()> {
    if videos.len() != results.len() {
        return Err(BrandDetectError::InvalidParameter(format!(
            "行数が一致しません: メタデータ{}行, 結果{}行",
            videos.len(),
            results.len()
        )));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = BufWriter::new(File::create(path)?);
    let encoder = GzEncoder::new(file, Compression::default());
    let mut writer = csv::Writer::from_writer(encoder);

    writer.write_record(VIDEO_COLUMNS.iter().chain(MATCH_COLUMNS.iter()))?;

    for (video, result) in videos.iter().zip(results) {
        let cells = result.to_cells();
        writer.write_record(
            video
                .fields()
                .into_iter()
                .chain(cells.iter().map(String::as_str)),
        )?;
    }

    writer.flush()?;
    let encoder = writer.into_inner().map_err(|e| e.into_error())?;
    encoder.finish()?.flush()?;
    Ok(())
}

/// `write_results_gz` で保存したファイルを読み戻す
pub fn read_results_gz(path: &Path) -> Result<Vec<(VideoRecord, MatchResult)>> {
    if !path.exists() {
        return Err(BrandDetectError::FileNotFound(path.display().to_string()));
    }

    let decoder = GzDecoder::new(BufReader::new(File::open(path)?));
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(decoder);

    let expected = VIDEO_COLUMNS.len() + MATCH_COLUMNS.len();
    let headers = reader.headers()?;
    if headers.len() != expected {
        return Err(BrandDetectError::SchemaMismatch {
            path: path.display().to_string(),
            line: 1,
            detail: format!("{}列を想定、{}列でした", expected, headers.len()),
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let f = |i: usize| record.get(i).unwrap_or_default();
        let video = VideoRecord {
            categories: f(0).to_string(),
            channel_id: f(1).to_string(),
            crawl_date: f(2).to_string(),
            description: f(3).to_string(),
            dislike_count: f(4).to_string(),
            display_id: f(5).to_string(),
            duration: f(6).to_string(),
            like_count: f(7).to_string(),
            tags: f(8).to_string(),
            title: f(9).to_string(),
            upload_date: f(10).to_string(),
            view_count: f(11).to_string(),
        };
        let result = MatchResult::from_cells([f(12), f(13), f(14), f(15)]);
        rows.push((video, result));
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brand_detect_common::BrandSet;
    use tempfile::tempdir;

    #[test]
    fn test_write_and_read_back() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("out").join("videos_with_brands.csv.gz");

        let videos = vec![
            VideoRecord::with_text("Galaxy S10, finally", "line1\nline2", ""),
            VideoRecord::with_text("cooking", "", ""),
        ];
        let samsung: BrandSet = ["Samsung"].into_iter().collect();
        let results = vec![
            MatchResult {
                title_brands: Some(samsung.clone()),
                union: Some(samsung),
                ..Default::default()
            },
            MatchResult::default(),
        ];

        write_results_gz(&path, &videos, &results).expect("書き込み失敗");
        let rows = read_results_gz(&path).expect("読み込み失敗");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, videos[0]);
        assert_eq!(rows[0].1, results[0]);
        assert_eq!(rows[1].1, MatchResult::default());
    }

    #[test]
    fn test_output_is_gzip() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("out.csv.gz");
        write_results_gz(&path, &[], &[]).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn test_length_mismatch() {
        let dir = tempdir().expect("Failed to create temp dir");
        let result = write_results_gz(&dir.path().join("x.csv.gz"), &[VideoRecord::default()], &[]);
        assert!(matches!(result, Err(BrandDetectError::InvalidParameter(_))));
    }
}
