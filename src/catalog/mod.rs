//! 端末カタログの読み込みと絞り込み
//!
//! CSV（ヘッダーあり）から `Brand`, `Name`, `released_at` 列を読み、
//! 発売年を取り出せない行は捨てる。発売年の範囲で絞り込んだ後、
//! ブランドごとに重複のない機種名リストを返す。

pub mod release;

pub use release::{capture_year, parse_release_date, ReleaseDate, ReleasePrecision};

use crate::error::{BrandDetectError, Result};
use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// ブランド列名
pub const BRAND_COLUMN: &str = "Brand";
/// 機種名列名
pub const NAME_COLUMN: &str = "Name";
/// 発売日テキスト列名
pub const RELEASE_COLUMN: &str = "released_at";

/// カタログ1行
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCatalogEntry {
    pub brand: String,
    pub model_name: String,
    pub release_text: String,
    pub release_year: i32,
    pub parsed_release_date: Option<ReleaseDate>,
}

/// ブランドと機種名リスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandModels {
    pub brand: String,
    pub models: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<DeviceCatalogEntry>,
    /// 発売年が取れず捨てた行数
    dropped: usize,
}

impl Catalog {
    /// CSVファイルから読み込み
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BrandDetectError::FileNotFound(path.display().to_string()));
        }
        let file = File::open(path)?;
        Self::from_reader(file, &path.display().to_string())
    }

    /// CSVリーダーから読み込み
    ///
    /// `source` はエラーメッセージ用の名前
    pub fn from_reader<R: Read>(reader: R, source: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| BrandDetectError::SchemaMismatch {
                    path: source.to_string(),
                    line: 1,
                    detail: format!("必須列がありません: {}", name),
                })
        };
        let brand_idx = column(BRAND_COLUMN)?;
        let name_idx = column(NAME_COLUMN)?;
        let release_idx = column(RELEASE_COLUMN)?;

        let mut entries = Vec::new();
        let mut dropped = 0;

        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let field = |idx: usize| {
                record.get(idx).ok_or_else(|| BrandDetectError::SchemaMismatch {
                    path: source.to_string(),
                    line,
                    detail: format!("列数が不足しています（{}列）", record.len()),
                })
            };

            let brand = field(brand_idx)?.trim();
            let model_name = field(name_idx)?.trim();
            let release_text = field(release_idx)?;

            let Some(release_year) = capture_year(release_text) else {
                dropped += 1;
                continue;
            };

            entries.push(DeviceCatalogEntry {
                brand: brand.to_string(),
                model_name: model_name.to_string(),
                release_text: release_text.to_string(),
                release_year,
                parsed_release_date: parse_release_date(release_text, release_year),
            });
        }

        debug!(source, rows = entries.len(), dropped, "カタログ読み込み完了");
        Ok(Self { entries, dropped })
    }

    pub fn entries(&self) -> &[DeviceCatalogEntry] {
        &self.entries
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// 発売年が範囲内（両端含む）の行
    pub fn filter_by_year(&self, min_year: i32, max_year: i32) -> Vec<&DeviceCatalogEntry> {
        self.entries
            .iter()
            .filter(|e| e.release_year >= min_year && e.release_year <= max_year)
            .collect()
    }

    /// 指定ブランドごとに、範囲内の機種名を重複なし・出現順で返す
    ///
    /// カタログにないブランドも空リストとして返す。
    pub fn models_by_brand(&self, brands: &[String], min_year: i32, max_year: i32) -> Vec<BrandModels> {
        let filtered = self.filter_by_year(min_year, max_year);

        brands
            .iter()
            .map(|brand| {
                let mut seen = HashSet::new();
                let models = filtered
                    .iter()
                    .filter(|e| &e.brand == brand && !e.model_name.is_empty())
                    .filter(|e| seen.insert(e.model_name.as_str()))
                    .map(|e| e.model_name.clone())
                    .collect();
                BrandModels { brand: brand.clone(), models }
            })
            .collect()
    }

    /// 範囲内の行の発売日精度ごとの件数（解析不能は None）
    pub fn precision_counts(
        &self,
        min_year: i32,
        max_year: i32,
    ) -> BTreeMap<Option<ReleasePrecision>, usize> {
        let mut counts = BTreeMap::new();
        for entry in self.filter_by_year(min_year, max_year) {
            *counts
                .entry(entry.parsed_release_date.map(|d| d.precision))
                .or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Brand,Name,released_at,extra
Samsung,Galaxy S10,\"Released 2019, March 08\",x
Samsung,Galaxy S10,\"Released 2019, March 08\",x
Samsung,Galaxy S20,\"Released 2020, March 06\",x
Samsung,Galaxy S,\"Released 2010, June\",x
Apple,iPhone 3G,Released 2008,x
Apple,iPhone,Released 2004,x
Apple,iPhone 12 Mini,Not released,x
Huawei,P9,\"2016, Q2\",x
Huawei,Mate X,\"2019, Exp\",x
";

    fn catalog() -> Catalog {
        Catalog::from_reader(CSV.as_bytes(), "test.csv").unwrap()
    }

    fn brands(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_rows_without_year_dropped() {
        let catalog = catalog();
        assert_eq!(catalog.dropped(), 1);
        assert_eq!(catalog.entries().len(), 8);
    }

    #[test]
    fn test_year_window_excludes_boundaries() {
        let catalog = catalog();
        let filtered = catalog.filter_by_year(2005, 2019);
        assert!(filtered.iter().all(|e| e.release_year > 2004 && e.release_year < 2020));
        assert!(!filtered.iter().any(|e| e.model_name == "Galaxy S20"));
        assert!(!filtered.iter().any(|e| e.model_name == "iPhone"));
    }

    #[test]
    fn test_models_by_brand_unique_in_order() {
        let catalog = catalog();
        let grouped = catalog.models_by_brand(&brands(&["Samsung", "Apple", "Oppo"]), 2005, 2019);

        assert_eq!(grouped[0].brand, "Samsung");
        assert_eq!(grouped[0].models, vec!["Galaxy S10", "Galaxy S"]);
        assert_eq!(grouped[1].models, vec!["iPhone 3G"]);
        assert_eq!(grouped[2].brand, "Oppo");
        assert!(grouped[2].models.is_empty());
    }

    #[test]
    fn test_unparseable_date_keeps_model() {
        let catalog = catalog();
        let mate = catalog
            .entries()
            .iter()
            .find(|e| e.model_name == "Mate X")
            .unwrap();
        assert_eq!(mate.release_year, 2019);
        assert!(mate.parsed_release_date.is_none());

        let grouped = catalog.models_by_brand(&brands(&["Huawei"]), 2005, 2019);
        assert_eq!(grouped[0].models, vec!["P9", "Mate X"]);
    }

    #[test]
    fn test_precision_counts() {
        let counts = catalog().precision_counts(2005, 2019);
        assert_eq!(counts.get(&Some(ReleasePrecision::Day)), Some(&2));
        assert_eq!(counts.get(&Some(ReleasePrecision::Quarter)), Some(&1));
        assert_eq!(counts.get(&Some(ReleasePrecision::Month)), Some(&1));
        assert_eq!(counts.get(&Some(ReleasePrecision::Year)), Some(&1));
        assert_eq!(counts.get(&None), Some(&1));
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let csv = "Brand,Model,released_at\nApple,iPhone X,2017\n";
        let result = Catalog::from_reader(csv.as_bytes(), "bad.csv");
        match result {
            Err(BrandDetectError::SchemaMismatch { detail, .. }) => assert!(detail.contains("Name")),
            other => panic!("unexpected: {:?}", other.map(|c| c.entries().len())),
        }
    }

    #[test]
    fn test_short_row_is_schema_error() {
        let csv = "Brand,Name,released_at\nApple,iPhone X\n";
        let result = Catalog::from_reader(csv.as_bytes(), "short.csv");
        assert!(matches!(result, Err(BrandDetectError::SchemaMismatch { line: 2, .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = Catalog::from_path(Path::new("/nonexistent/catalog.csv"));
        assert!(matches!(result, Err(BrandDetectError::FileNotFound(_))));
    }
}
