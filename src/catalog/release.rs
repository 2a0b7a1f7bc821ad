//! 発売日テキストの解析
//!
//! カタログの `released_at` は「Released 2019, March 08」「2018, Q3」
//! 「2017, November」「2015」など表記がばらばら。
//! 最初にパターンが一致した段階で結果を確定し、その段階の検証に失敗しても
//! より粗い段階には進まない。

use chrono::NaiveDate;
use regex::Regex;

/// 月名（英語）
pub const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August",
    "September", "October", "November", "December",
];

/// 解析できた日付の精度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReleasePrecision {
    Day,
    Quarter,
    Month,
    Year,
}

impl std::fmt::Display for ReleasePrecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleasePrecision::Day => write!(f, "日"),
            ReleasePrecision::Quarter => write!(f, "四半期"),
            ReleasePrecision::Month => write!(f, "月"),
            ReleasePrecision::Year => write!(f, "年"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseDate {
    pub date: NaiveDate,
    pub precision: ReleasePrecision,
}

/// 最初に現れる4桁の数字を発売年として取り出す
pub fn capture_year(text: &str) -> Option<i32> {
    lazy_static::lazy_static! {
        static ref YEAR_RE: Regex = Regex::new(r"[0-9]{4}").unwrap();
    }

    YEAR_RE.find(text).and_then(|m| m.as_str().parse().ok())
}

/// 発売日テキストを段階的に解析する
///
/// 1. `YYYY, 月名 DD` → その日
/// 2. `YYYY, Qn` → `release_year` の (n-1)*3+1 番目の月（0始まり）の1日
/// 3. `YYYY, 月名` → 月名が全月名を連結した文字列の部分文字列なら、その月の1日
/// 4. `YYYY` → その年の1月1日
pub fn parse_release_date(release_text: &str, release_year: i32) -> Option<ReleaseDate> {
    lazy_static::lazy_static! {
        static ref RELEASED_RE: Regex = Regex::new(r"(?i)\s*Released\s*").unwrap();
        static ref FULL_RE: Regex = Regex::new(r"(?i)([0-9]{4}), ([a-z]+)\s([0-9]{2})").unwrap();
        static ref QUARTER_RE: Regex = Regex::new(r"(?i)[0-9]{4}, [a-z]([1-4])").unwrap();
        static ref MONTH_RE: Regex = Regex::new(r"(?i)([0-9]{4}), ([a-z]+)").unwrap();
        static ref BARE_YEAR_RE: Regex = Regex::new(r"[0-9]{4}").unwrap();
    }

    let release = RELEASED_RE.replace_all(release_text, "");

    if let Some(cap) = FULL_RE.captures(&release) {
        let year: i32 = cap[1].parse().ok()?;
        let month = month_from_name(&cap[2])?;
        let day: u32 = cap[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day).map(|date| ReleaseDate {
            date,
            precision: ReleasePrecision::Day,
        });
    }

    if let Some(cap) = QUARTER_RE.captures(&release) {
        let quarter: u32 = cap[1].parse().ok()?;
        // 0始まりの月インデックス (q-1)*3+1 → Q1は2月
        let month = (quarter - 1) * 3 + 2;
        return NaiveDate::from_ymd_opt(release_year, month, 1).map(|date| ReleaseDate {
            date,
            precision: ReleasePrecision::Quarter,
        });
    }

    if let Some(cap) = MONTH_RE.captures(&release) {
        let year: i32 = cap[1].parse().ok()?;
        let token = cap[2].to_lowercase();
        if !month_list_lower().contains(&token) {
            return None;
        }
        let month = month_from_name(&token)?;
        return NaiveDate::from_ymd_opt(year, month, 1).map(|date| ReleaseDate {
            date,
            precision: ReleasePrecision::Month,
        });
    }

    if let Some(m) = BARE_YEAR_RE.find(&release) {
        let year: i32 = m.as_str().parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1).map(|date| ReleaseDate {
            date,
            precision: ReleasePrecision::Year,
        });
    }

    None
}

/// 全月名を小文字で連結した文字列（部分一致判定用）
fn month_list_lower() -> &'static str {
    lazy_static::lazy_static! {
        static ref MONTH_LIST: String = MONTH_NAMES.join(", ").to_lowercase();
    }
    &MONTH_LIST
}

/// 月名（完全名または3文字以上の先頭一致）から月番号を得る
fn month_from_name(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    if name.len() < 3 {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|m| m.to_lowercase().starts_with(&name))
        .map(|i| i as u32 + 1)
}
