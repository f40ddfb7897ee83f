//! Extraction against the shipped origin catalog.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use collectionbox::origins::{OriginCatalog, UrlExtractor, NO_SUPPORTED_ORIGIN, NO_URL_FOUND};

fn shipped_extractor() -> UrlExtractor {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("resource/origin.json");
    let catalog = OriginCatalog::from_path(&path).expect("shipped catalog loads");
    UrlExtractor::new(Arc::new(catalog))
}

const SAMPLES: &[&str] = &[
    "https://www.bilibili.com/video/BV15j1EBWEA7/?spm_id_from=333.1007.tianma.1-2-2.click&vd_source=xhttps://www.bilibili.com/video/BV19qxNzXEWT/?spm_id_from=333.1007.tianma.1-1-1.click&vd_source=x",
    "收藏这个链接：www.bilibili.com/video/BV1xx411c7mD",
    "see https://example.com/x and https://bilibili.com/y",
    "https://m.bilibili.com/foo",
    "watch https://youtu.be/dQw4w9WgXcQ, then https://www.youtube.com/watch?v=dQw4w9WgXcQ!",
    "repo: github.com/rust-lang/rust (mirror: https://github.com/rust-lang/rust)",
    "dup https://x.com/a http://x.com/a www.x.com/a x.com/a",
    "http://localhost:8080/dev and localhost/other",
    "【推荐】https://www.zhihu.com/question/1】 https://b23.tv/abc。",
];

#[test]
fn every_origin_comes_from_the_catalog() {
    let ex = shipped_extractor();
    let labels = ex.catalog().labels();
    for text in SAMPLES {
        for pair in ex.extract_all(text).unwrap() {
            assert!(labels.contains(pair.origin.as_str()), "{pair:?} from {text:?}");
        }
    }
}

#[test]
fn no_two_pairs_share_a_normalization_key() {
    let ex = shipped_extractor();
    for text in SAMPLES {
        let pairs = ex.extract_all(text).unwrap();
        let mut keys = HashSet::new();
        for pair in &pairs {
            let resolved = ex.resolve(&pair.url).unwrap();
            assert!(keys.insert(resolved.key.clone()), "duplicate {pair:?} in {text:?}");
        }
    }
}

#[test]
fn text_without_catalog_hosts_is_rejected() {
    let ex = shipped_extractor();
    for text in [
        "https://example.com/a",
        "visit rust-lang.org or docs.rs/serde today",
        "ftp://bilibili.com/x",
        "mailto:someone@example.org",
    ] {
        let err = ex.extract_all(text).unwrap_err();
        assert!(err.is_invalid_argument(), "{text:?}: {err}");
        assert!(
            [NO_SUPPORTED_ORIGIN, NO_URL_FOUND].contains(&err.message()),
            "{text:?}: {err}"
        );
    }
}

#[test]
fn mixed_input_keeps_only_supported_urls() {
    let pairs = shipped_extractor()
        .extract_all("see https://example.com/x and https://bilibili.com/y")
        .unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].url, "https://bilibili.com/y");
    assert_eq!(pairs[0].origin, "Bilibili");
}

#[test]
fn scheme_variants_of_one_url_collapse() {
    let pairs = shipped_extractor()
        .extract_all("dup https://x.com/a http://x.com/a www.x.com/a x.com/a")
        .unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].url, "https://x.com/a");
    assert_eq!(pairs[0].origin, "Twitter");
}

#[test]
fn pasted_text_samples() {
    let ex = shipped_extractor();

    let pairs = ex.extract_all(SAMPLES[0]).unwrap();
    assert_eq!(pairs.len(), 2);
    assert!(pairs.iter().all(|p| p.origin == "Bilibili"));
    assert_ne!(pairs[0].url, pairs[1].url);

    let pairs = ex.extract_all(SAMPLES[1]).unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].url, "www.bilibili.com/video/BV1xx411c7mD");

    let pairs = ex.extract_all(SAMPLES[3]).unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].origin, "Bilibili");

    assert_eq!(ex.extract_all("").unwrap_err().message(), "url cannot be empty");
}
