//! ブランド照合
//!
//! タイトル・説明・タグの各項目について、Lexiconのキーワードが
//! 部分文字列として含まれるか（大文字小文字無視）を判定する。

use crate::lexicon::Lexicon;
use crate::types::{BrandSet, MatchResult, VideoRecord};

/// レコード1件を照合する
pub fn match_record(lexicon: &Lexicon, record: &VideoRecord) -> MatchResult {
    match_fields(lexicon, &record.title, &record.description, &record.tags)
}

/// 3項目を照合する
///
/// 全項目で未検出なら4列すべて`None`を返す。
pub fn match_fields(lexicon: &Lexicon, title: &str, description: &str, tags: &str) -> MatchResult {
    let fields = [title.to_lowercase(), description.to_lowercase(), tags.to_lowercase()];
    let mut detected = [BrandSet::new(), BrandSet::new(), BrandSet::new()];

    for brand in lexicon.brands() {
        for (field, found) in fields.iter().zip(detected.iter_mut()) {
            // ヒットした時点でこのブランド・項目の走査を打ち切る
            if brand.lowered().iter().any(|k| field.contains(k.as_str())) {
                found.insert(brand.brand());
            }
        }
    }

    // 和集合もLexiconのブランド順で作る
    let union: BrandSet = lexicon
        .brands()
        .map(|b| b.brand())
        .filter(|b| detected.iter().any(|set| set.contains(b)))
        .collect();

    let [title_brands, description_brands, tags_brands] = detected.map(BrandSet::into_option);
    MatchResult {
        title_brands,
        description_brands,
        tags_brands,
        union: union.into_option(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::{LexiconBuilder, LexiconOptions};

    fn lexicon() -> Lexicon {
        let mut builder = LexiconBuilder::new(&LexiconOptions::default());
        builder
            .add_models("Samsung", ["Galaxy S21", "Galaxy Note 9"])
            .add_models("Apple", ["iPhone XR"])
            .add_models("Huawei", ["P30 Pro"])
            .brand("Oppo");
        builder.build()
    }

    fn set(brands: &[&str]) -> Option<BrandSet> {
        Some(brands.iter().copied().collect())
    }

    #[test]
    fn test_title_only_match() {
        let result = match_fields(&lexicon(), "New Galaxy S21 Review", "", "");
        assert_eq!(result.title_brands, set(&["Samsung"]));
        assert_eq!(result.description_brands, None);
        assert_eq!(result.tags_brands, None);
        assert_eq!(result.union, set(&["Samsung"]));
    }

    #[test]
    fn test_no_match_all_none() {
        let result = match_fields(&lexicon(), "Cooking pasta", "how to boil water", "food,kitchen");
        assert_eq!(result, MatchResult::default());
        assert!(!result.is_detected());
    }

    #[test]
    fn test_case_insensitive() {
        let result = match_fields(&lexicon(), "IPHONE xr unboxing", "", "");
        assert_eq!(result.title_brands, set(&["Apple"]));
    }

    #[test]
    fn test_permutation_keyword_matches() {
        // "Note Galaxy" は "Galaxy Note 9" の順列キーワード
        let result = match_fields(&lexicon(), "", "my note galaxy broke", "");
        assert_eq!(result.description_brands, set(&["Samsung"]));
        assert_eq!(result.union, set(&["Samsung"]));
    }

    #[test]
    fn test_multiple_fields_and_brands() {
        let result = match_fields(
            &lexicon(),
            "P30 Pro vs Galaxy S21",
            "compared with iphone xr",
            "huawei,p30 pro",
        );
        assert_eq!(result.title_brands, set(&["Samsung", "Huawei"]));
        assert_eq!(result.description_brands, set(&["Apple"]));
        assert_eq!(result.tags_brands, set(&["Huawei"]));
        assert_eq!(result.union, set(&["Samsung", "Apple", "Huawei"]));
    }

    #[test]
    fn test_empty_fields() {
        let record = VideoRecord::default();
        assert_eq!(match_record(&lexicon(), &record), MatchResult::default());
    }

    #[test]
    fn test_match_record_uses_text_fields() {
        let record = VideoRecord {
            channel_id: "Galaxy S21".into(),
            tags: "galaxy s21".into(),
            ..Default::default()
        };
        let result = match_record(&lexicon(), &record);
        assert_eq!(result.title_brands, None);
        assert_eq!(result.tags_brands, set(&["Samsung"]));
    }
}
