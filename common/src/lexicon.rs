//! 機種名キーワード辞書（Lexicon）
//!
//! カタログの機種名をトークンに分割し、ノイズ語を除去した基本キーワードと、
//! (k-1)語の並べ替えキーワードを生成する。
//!
//! ## 処理フロー
//! 1. 非スマートフォン語（ipad, tab, tv 等）を含む機種は除外
//! 2. 除去語（括弧、通信規格等）を含むトークンを削除し、空白で再結合
//! 3. 残りトークン数 k > 2 なら k-1 語の順列をすべて追加
//!
//! 「S21 Galaxy」のような語順違い・省略表記の言及を拾うため。

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashSet;

/// 除去語のデフォルト（部分一致・大文字小文字無視）
pub const DEFAULT_REMOVAL_TOKENS: &[&str] = &[
    "(", ")", ".", "wi-fi", "+", "cellular", "lte", "cdma", "4g", "3g",
];

/// 非スマートフォン語のデフォルト（部分一致・大文字小文字無視）
pub const DEFAULT_NON_PHONE_MARKERS: &[&str] = &["ipad", "pad", "tab", "tv"];

/// 順列を生成する最大トークン数のデフォルト
pub const DEFAULT_MAX_PERMUTATION_TOKENS: usize = 6;

/// キーワード生成オプション
#[derive(Debug, Clone)]
pub struct LexiconOptions {
    /// 除去語（このいずれかを含むトークンを削除）
    pub removal_tokens: Vec<String>,
    /// 非スマートフォン語（このいずれかを含むトークンがあれば機種ごと除外）
    pub non_phone_markers: Vec<String>,
    /// これを超えるトークン数の機種は基本キーワードのみ登録
    pub max_permutation_tokens: usize,
}

impl Default for LexiconOptions {
    fn default() -> Self {
        Self {
            removal_tokens: DEFAULT_REMOVAL_TOKENS.iter().map(|s| s.to_string()).collect(),
            non_phone_markers: DEFAULT_NON_PHONE_MARKERS.iter().map(|s| s.to_string()).collect(),
            max_permutation_tokens: DEFAULT_MAX_PERMUTATION_TOKENS,
        }
    }
}

impl LexiconOptions {
    /// 比較用に除去語・非スマートフォン語を小文字化する
    fn lowercased(&self) -> Self {
        Self {
            removal_tokens: self.removal_tokens.iter().map(|s| s.to_lowercase()).collect(),
            non_phone_markers: self.non_phone_markers.iter().map(|s| s.to_lowercase()).collect(),
            max_permutation_tokens: self.max_permutation_tokens,
        }
    }
}

/// 1機種のキーワード生成結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelKeywords {
    /// タブレット・TV等として除外
    NonPhone,
    /// 除去後にトークンが残らなかった
    Empty,
    /// 基本キーワード + 順列キーワード（重複除去済み）
    Keywords {
        keywords: Vec<String>,
        /// トークン数が上限を超え、順列生成を省略した
        truncated: bool,
    },
}

impl ModelKeywords {
    pub fn keywords(&self) -> &[String] {
        match self {
            ModelKeywords::Keywords { keywords, .. } => keywords.as_slice(),
            _ => &[],
        }
    }
}

/// 機種名1件からキーワードを生成する
pub fn model_keywords(model: &str, options: &LexiconOptions) -> ModelKeywords {
    let options = options.lowercased();
    keywords_for_model(model, &options)
}

/// `options`は小文字化済みであること
fn keywords_for_model(model: &str, options: &LexiconOptions) -> ModelKeywords {
    let tokens: Vec<&str> = model.split_whitespace().collect();

    let lowered: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
    if lowered
        .iter()
        .any(|t| contains_any(t, &options.non_phone_markers))
    {
        return ModelKeywords::NonPhone;
    }

    let surviving: Vec<&str> = tokens
        .iter()
        .zip(&lowered)
        .filter(|(_, lower)| !contains_any(lower, &options.removal_tokens))
        .map(|(token, _)| *token)
        .collect();

    if surviving.is_empty() {
        return ModelKeywords::Empty;
    }

    let mut seen = HashSet::new();
    let mut keywords = Vec::new();
    push_unique(&mut keywords, &mut seen, surviving.join(" "));

    let k = surviving.len();
    let truncated = k > options.max_permutation_tokens;
    if k > 2 && !truncated {
        for perm in permutations(&surviving, k - 1) {
            push_unique(&mut keywords, &mut seen, perm.join(" "));
        }
    }

    ModelKeywords::Keywords { keywords, truncated }
}

fn contains_any(token: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| !n.is_empty() && token.contains(n.as_str()))
}

fn push_unique(keywords: &mut Vec<String>, seen: &mut HashSet<String>, keyword: String) {
    if !keyword.is_empty() && seen.insert(keyword.clone()) {
        keywords.push(keyword);
    }
}

/// `items`から`r`個を選ぶ順列を辞書式（インデックス順）で列挙する
///
/// 同じ値のトークンがあれば重複した順列も返す。重複除去は呼び出し側で行う。
pub fn permutations<T: Clone>(items: &[T], r: usize) -> Vec<Vec<T>> {
    let mut out = Vec::new();
    if r > items.len() {
        return out;
    }
    let mut used = vec![false; items.len()];
    let mut current = Vec::with_capacity(r);
    permute(items, r, &mut used, &mut current, &mut out);
    out
}

fn permute<T: Clone>(
    items: &[T],
    r: usize,
    used: &mut [bool],
    current: &mut Vec<T>,
    out: &mut Vec<Vec<T>>,
) {
    if current.len() == r {
        out.push(current.clone());
        return;
    }
    for i in 0..items.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        current.push(items[i].clone());
        permute(items, r, used, current, out);
        current.pop();
        used[i] = false;
    }
}

/// 1ブランド分のキーワード
#[derive(Debug, Clone)]
pub struct BrandKeywords {
    brand: String,
    keywords: Vec<String>,
    /// 照合用の小文字版（keywordsと同じ並び）
    lowered: Vec<String>,
}

impl BrandKeywords {
    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub(crate) fn lowered(&self) -> &[String] {
        &self.lowered
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// 構築時の統計情報
#[derive(Debug, Clone, Default)]
pub struct LexiconStats {
    /// 処理した機種数
    pub models: usize,
    /// 非スマートフォンとして除外した機種数
    pub non_phone: usize,
    /// 除去後に空になった機種数
    pub empty: usize,
    /// 順列生成を省略した機種名
    pub truncated: Vec<String>,
}

/// ブランド→キーワード列の辞書
///
/// 構築後は変更不可。全ワーカーで読み取り専用として共有する。
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    brands: Vec<BrandKeywords>,
    stats: LexiconStats,
}

impl Lexicon {
    /// ブランド順に走査
    pub fn brands(&self) -> impl Iterator<Item = &BrandKeywords> {
        self.brands.iter()
    }

    pub fn get(&self, brand: &str) -> Option<&BrandKeywords> {
        self.brands.iter().find(|b| b.brand == brand)
    }

    pub fn brand_names(&self) -> Vec<&str> {
        self.brands.iter().map(|b| b.brand.as_str()).collect()
    }

    /// 全ブランドのキーワード総数
    pub fn keyword_count(&self) -> usize {
        self.brands.iter().map(BrandKeywords::len).sum()
    }

    pub fn stats(&self) -> &LexiconStats {
        &self.stats
    }

    pub fn to_json_pretty(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// JSONファイルに保存
    pub fn write_json(&self, path: &std::path::Path) -> crate::Result<()> {
        let file = std::io::BufWriter::new(std::fs::File::create(path)?);
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

/// `{ブランド: [キーワード...]}` をブランド順で出力する
impl Serialize for Lexicon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.brands.len()))?;
        for brand in &self.brands {
            map.serialize_entry(&brand.brand, &brand.keywords)?;
        }
        map.end()
    }
}

/// Lexiconのビルダー
pub struct LexiconBuilder {
    options: LexiconOptions,
    brands: Vec<(String, Vec<String>, HashSet<String>)>,
    stats: LexiconStats,
}

impl LexiconBuilder {
    pub fn new(options: &LexiconOptions) -> Self {
        Self {
            options: options.lowercased(),
            brands: Vec::new(),
            stats: LexiconStats::default(),
        }
    }

    /// ブランドを登録（機種がなくても空のエントリとして残す）
    pub fn brand(&mut self, brand: &str) -> &mut Self {
        self.slot(brand);
        self
    }

    /// ブランドの機種名リストを追加
    ///
    /// 同じブランドを複数回追加した場合は既存のキーワードに続けて登録する。
    pub fn add_models<I, S>(&mut self, brand: &str, models: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for model in models {
            let model = model.as_ref();
            self.stats.models += 1;
            match keywords_for_model(model, &self.options) {
                ModelKeywords::NonPhone => self.stats.non_phone += 1,
                ModelKeywords::Empty => self.stats.empty += 1,
                ModelKeywords::Keywords { keywords, truncated } => {
                    if truncated {
                        self.stats.truncated.push(model.to_string());
                    }
                    let idx = self.slot(brand);
                    let (_, list, seen) = &mut self.brands[idx];
                    for keyword in keywords {
                        push_unique(list, seen, keyword);
                    }
                }
            }
        }
        self
    }

    fn slot(&mut self, brand: &str) -> usize {
        if let Some(idx) = self.brands.iter().position(|(b, _, _)| b == brand) {
            return idx;
        }
        self.brands.push((brand.to_string(), Vec::new(), HashSet::new()));
        self.brands.len() - 1
    }

    pub fn build(self) -> Lexicon {
        let brands = self
            .brands
            .into_iter()
            .map(|(brand, keywords, _)| {
                let lowered = keywords.iter().map(|k| k.to_lowercase()).collect();
                BrandKeywords { brand, keywords, lowered }
            })
            .collect();

        Lexicon { brands, stats: self.stats }
    }
}
