//! 動画メタデータと照合結果の型定義
//!
//! - VideoRecord: 入力メタデータ1行（12列固定）
//! - BrandSet: 検出されたブランドの集合（設定順を保持）
//! - MatchResult: 項目別・和集合の検出結果

use serde::{Deserialize, Serialize};

/// 入力メタデータの列名（ヘッダーなしCSVの列順）
pub const VIDEO_COLUMNS: [&str; 12] = [
    "categories",
    "channel_id",
    "crawl_date",
    "description",
    "dislike_count",
    "display_id",
    "duration",
    "like_count",
    "tags",
    "title",
    "upload_date",
    "view_count",
];

/// 出力で追加される照合結果の列名
pub const MATCH_COLUMNS: [&str; 4] = ["title_brands", "description_brands", "tags_brands", "union"];

/// 動画メタデータ1行
///
/// 数値列も含めて文字列のまま保持し、出力時にそのまま書き戻す。
/// 欠損値は空文字列になる。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoRecord {
    pub categories: String,
    pub channel_id: String,
    pub crawl_date: String,
    pub description: String,
    pub dislike_count: String,
    pub display_id: String,
    pub duration: String,
    pub like_count: String,
    pub tags: String,
    pub title: String,
    pub upload_date: String,
    pub view_count: String,
}

impl VideoRecord {
    /// タイトル・説明・タグだけを持つレコードを作成
    pub fn with_text(title: &str, description: &str, tags: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            tags: tags.to_string(),
            ..Default::default()
        }
    }

    /// 列順（VIDEO_COLUMNS）でフィールドを返す
    pub fn fields(&self) -> [&str; 12] {
        [
            &self.categories,
            &self.channel_id,
            &self.crawl_date,
            &self.description,
            &self.dislike_count,
            &self.display_id,
            &self.duration,
            &self.like_count,
            &self.tags,
            &self.title,
            &self.upload_date,
            &self.view_count,
        ]
    }
}

/// ブランドラベルの集合
///
/// 挿入順を保持し、重複は追加しない。照合器はLexiconのブランド順に
/// 挿入するため、結果は常に設定されたブランド順に並ぶ。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrandSet(Vec<String>);

impl BrandSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// ブランドを追加（既存なら何もしない）
    pub fn insert(&mut self, brand: &str) -> bool {
        if self.contains(brand) {
            return false;
        }
        self.0.push(brand.to_string());
        true
    }

    pub fn contains(&self, brand: &str) -> bool {
        self.0.iter().any(|b| b == brand)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }

    /// 空集合は「検出なし」としてNoneに変換する
    pub fn into_option(self) -> Option<Self> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }

    /// `|`区切りの文字列に変換（CSV出力用）
    pub fn to_cell(&self) -> String {
        self.0.join("|")
    }

    /// `|`区切りの文字列から復元（空文字列は検出なし）
    pub fn from_cell(cell: &str) -> Option<Self> {
        let mut set = Self::new();
        for brand in cell.split('|').map(str::trim).filter(|b| !b.is_empty()) {
            set.insert(brand);
        }
        set.into_option()
    }
}

impl<'a> FromIterator<&'a str> for BrandSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = Self::new();
        for brand in iter {
            set.insert(brand);
        }
        set
    }
}

/// 1レコード分の照合結果
///
/// 検出なしは空集合ではなく`None`で表す。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub title_brands: Option<BrandSet>,
    pub description_brands: Option<BrandSet>,
    pub tags_brands: Option<BrandSet>,
    pub union: Option<BrandSet>,
}

impl MatchResult {
    /// いずれかの項目でブランドが検出されたか
    pub fn is_detected(&self) -> bool {
        self.union.is_some()
    }

    /// 出力列順（MATCH_COLUMNS）で返す
    pub fn columns(&self) -> [Option<&BrandSet>; 4] {
        [
            self.title_brands.as_ref(),
            self.description_brands.as_ref(),
            self.tags_brands.as_ref(),
            self.union.as_ref(),
        ]
    }

    /// CSVセル文字列に変換（検出なしは空セル）
    pub fn to_cells(&self) -> [String; 4] {
        self.columns()
            .map(|col| col.map(BrandSet::to_cell).unwrap_or_default())
    }

    /// CSVセル文字列から復元
    pub fn from_cells(cells: [&str; 4]) -> Self {
        let [title, description, tags, union] = cells.map(BrandSet::from_cell);
        Self {
            title_brands: title,
            description_brands: description,
            tags_brands: tags,
            union,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_set_dedup_keeps_order() {
        let mut set = BrandSet::new();
        assert!(set.insert("Samsung"));
        assert!(set.insert("Apple"));
        assert!(!set.insert("Samsung"));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["Samsung", "Apple"]);
    }

    #[test]
    fn test_empty_brand_set_is_none() {
        assert!(BrandSet::new().into_option().is_none());
        assert_eq!(BrandSet::from_cell(""), None);
    }

    #[test]
    fn test_match_result_cells() {
        let result = MatchResult {
            title_brands: Some(["Samsung", "Apple"].into_iter().collect()),
            description_brands: None,
            tags_brands: Some(["Apple"].into_iter().collect()),
            union: Some(["Samsung", "Apple"].into_iter().collect()),
        };

        let cells = result.to_cells();
        assert_eq!(cells[0], "Samsung|Apple");
        assert_eq!(cells[1], "");
        assert_eq!(cells[2], "Apple");
        assert_eq!(cells[3], "Samsung|Apple");

        let restored = MatchResult::from_cells([
            cells[0].as_str(),
            cells[1].as_str(),
            cells[2].as_str(),
            cells[3].as_str(),
        ]);
        assert_eq!(restored, result);
    }

    #[test]
    fn test_video_record_fields_order() {
        let record = VideoRecord {
            categories: "Science & Technology".into(),
            title: "t".into(),
            view_count: "10".into(),
            ..Default::default()
        };
        let fields = record.fields();
        assert_eq!(fields[0], "Science & Technology");
        assert_eq!(fields[VIDEO_COLUMNS.iter().position(|c| *c == "title").unwrap()], "t");
        assert_eq!(fields[11], "10");
    }
}
