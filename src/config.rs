use crate::error::{BrandDetectError, Result};
use brand_detect_common::lexicon::{
    LexiconOptions, DEFAULT_MAX_PERMUTATION_TOKENS, DEFAULT_NON_PHONE_MARKERS,
    DEFAULT_REMOVAL_TOKENS,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// 解析対象ブランドのデフォルト
pub const DEFAULT_BRANDS: &[&str] = &["Samsung", "Apple", "Huawei", "Xiaomi", "Oppo"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 解析対象ブランド（この順で出力される）
    pub brands: Vec<String>,
    /// 発売年の下限（含む）
    pub min_year: i32,
    /// 発売年の上限（含む）
    pub max_year: i32,
    /// 機種名から除去するトークン
    pub removal_tokens: Vec<String>,
    /// 非スマートフォン判定語
    pub non_phone_markers: Vec<String>,
    /// 順列キーワードを生成する最大トークン数
    pub max_permutation_tokens: usize,
    /// ワーカー数
    pub workers: usize,
    /// チャンク数
    pub chunks: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            brands: DEFAULT_BRANDS.iter().map(|s| s.to_string()).collect(),
            min_year: 2005,
            max_year: 2019,
            removal_tokens: DEFAULT_REMOVAL_TOKENS.iter().map(|s| s.to_string()).collect(),
            non_phone_markers: DEFAULT_NON_PHONE_MARKERS.iter().map(|s| s.to_string()).collect(),
            max_permutation_tokens: DEFAULT_MAX_PERMUTATION_TOKENS,
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            chunks: 100,
        }
    }
}

impl Config {
    /// 設定ファイルを読み込む（なければデフォルト）
    ///
    /// `path`省略時は `~/.config/brand-detect/config.json`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else if path.is_some() {
            Err(BrandDetectError::FileNotFound(config_path.display().to_string()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(config_path)
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| BrandDetectError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("brand-detect").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.brands.is_empty() {
            return Err(BrandDetectError::Config("ブランドが1つも指定されていません".into()));
        }

        let mut seen = HashSet::new();
        for brand in &self.brands {
            if brand.trim().is_empty() {
                return Err(BrandDetectError::Config("空のブランド名があります".into()));
            }
            if !seen.insert(brand.as_str()) {
                return Err(BrandDetectError::Config(format!("ブランドが重複しています: {}", brand)));
            }
        }

        if self.min_year > self.max_year {
            return Err(BrandDetectError::Config(format!(
                "発売年の範囲が不正です: {}-{}",
                self.min_year, self.max_year
            )));
        }

        if self.workers == 0 {
            return Err(BrandDetectError::Config("ワーカー数は1以上を指定してください".into()));
        }
        if self.chunks == 0 {
            return Err(BrandDetectError::Config("チャンク数は1以上を指定してください".into()));
        }

        if self
            .removal_tokens
            .iter()
            .chain(&self.non_phone_markers)
            .any(|t| t.is_empty())
        {
            return Err(BrandDetectError::Config("除去語・除外語に空文字列があります".into()));
        }

        Ok(())
    }

    pub fn lexicon_options(&self) -> LexiconOptions {
        LexiconOptions {
            removal_tokens: self.removal_tokens.clone(),
            non_phone_markers: self.non_phone_markers.clone(),
            max_permutation_tokens: self.max_permutation_tokens,
        }
    }
}
