//! ブランド検出の実行
//!
//! 辞書を一度だけ構築し、読み取り専用で全ワーカーに渡す。

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::Result;
use crate::runner::{ChunkedRunner, RunnerOptions};
use brand_detect_common::{match_record, Lexicon, LexiconBuilder, MatchResult, VideoRecord};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, warn};

/// カタログから辞書を構築する
pub fn build_lexicon(catalog: &Catalog, config: &Config) -> Lexicon {
    let mut builder = LexiconBuilder::new(&config.lexicon_options());

    for group in catalog.models_by_brand(&config.brands, config.min_year, config.max_year) {
        debug!(brand = %group.brand, models = group.models.len(), "機種名を登録");
        builder.brand(&group.brand).add_models(&group.brand, &group.models);
    }

    let lexicon = builder.build();
    for model in &lexicon.stats().truncated {
        warn!(model = %model, limit = config.max_permutation_tokens, "トークン数が多いため順列キーワードを省略");
    }
    lexicon
}

/// 全レコードを並列に照合し、入力順の結果を返す
pub fn detect_brands(
    videos: Arc<Vec<VideoRecord>>,
    lexicon: Arc<Lexicon>,
    options: RunnerOptions,
) -> Result<Vec<MatchResult>> {
    let runner = ChunkedRunner::new(options)?;
    let matcher = Arc::new(move |record: &VideoRecord| {
        Ok::<_, Infallible>(match_record(&lexicon, record))
    });
    runner.run(videos, matcher)
}

/// 照合結果の集計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// 処理行数
    pub rows: usize,
    /// いずれかのブランドを検出した行数
    pub detected: usize,
    /// ブランドごとの検出行数（和集合ベース、辞書のブランド順）
    pub per_brand: Vec<(String, usize)>,
}

impl RunSummary {
    pub fn from_results(lexicon: &Lexicon, results: &[MatchResult]) -> Self {
        let per_brand = lexicon
            .brand_names()
            .into_iter()
            .map(|brand| {
                let count = results
                    .iter()
                    .filter(|r| r.union.as_ref().is_some_and(|u| u.contains(brand)))
                    .count();
                (brand.to_string(), count)
            })
            .collect();

        Self {
            rows: results.len(),
            detected: results.iter().filter(|r| r.is_detected()).count(),
            per_brand,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brand_detect_common::match_fields;

    const CATALOG: &str = "\
Brand,Name,released_at
Samsung,Galaxy S 21,\"Released 2019, March 08\"
Samsung,Galaxy Tab S4,\"Released 2018, August\"
Apple,iPhone XR,\"Released 2018, October 26\"
Apple,iPhone 11,Released 2020
Huawei,P20 Pro,\"2018, Q2\"
";

    fn lexicon() -> Lexicon {
        let catalog = Catalog::from_reader(CATALOG.as_bytes(), "catalog.csv").unwrap();
        build_lexicon(&catalog, &Config::default())
    }

    #[test]
    fn test_build_lexicon_from_catalog() {
        let lexicon = lexicon();
        assert_eq!(lexicon.brand_names(), vec!["Samsung", "Apple", "Huawei", "Xiaomi", "Oppo"]);

        let samsung = lexicon.get("Samsung").unwrap().keywords();
        assert_eq!(samsung.len(), 7);
        assert_eq!(samsung[0], "Galaxy S 21");

        // 2020年発売は範囲外
        let apple = lexicon.get("Apple").unwrap().keywords();
        assert_eq!(apple, &["iPhone XR".to_string()]);
        assert!(lexicon.get("Xiaomi").unwrap().is_empty());
    }

    #[test]
    fn test_parallel_equals_sequential() {
        let lexicon = Arc::new(lexicon());
        let titles = ["Galaxy S review", "iphone xr vs p20 pro", "cooking", "21 galaxy", ""];
        let videos: Vec<VideoRecord> = (0..103)
            .map(|i| VideoRecord::with_text(titles[i % titles.len()], titles[(i + 1) % titles.len()], ""))
            .collect();

        let expected: Vec<MatchResult> = videos
            .iter()
            .map(|v| match_fields(&lexicon, &v.title, &v.description, &v.tags))
            .collect();

        let videos = Arc::new(videos);
        for (workers, chunks) in [(1, 1), (2, 10), (4, 103), (3, 500)] {
            let options = RunnerOptions { workers, chunks, progress: false };
            let results = detect_brands(Arc::clone(&videos), Arc::clone(&lexicon), options).unwrap();
            assert_eq!(results, expected, "workers={} chunks={}", workers, chunks);
        }
    }

    #[test]
    fn test_summary() {
        let lexicon = lexicon();
        let results = vec![
            match_fields(&lexicon, "Galaxy S 21", "", ""),
            match_fields(&lexicon, "iPhone XR", "P20 Pro", ""),
            match_fields(&lexicon, "nothing", "", ""),
        ];
        let summary = RunSummary::from_results(&lexicon, &results);

        assert_eq!(summary.rows, 3);
        assert_eq!(summary.detected, 2);
        assert_eq!(summary.per_brand[0], ("Samsung".to_string(), 1));
        assert_eq!(summary.per_brand[1], ("Apple".to_string(), 1));
        assert_eq!(summary.per_brand[2], ("Huawei".to_string(), 1));
        assert_eq!(summary.per_brand[3], ("Xiaomi".to_string(), 0));
    }
}
