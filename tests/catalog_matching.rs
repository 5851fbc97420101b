use std::sync::Arc;

use webanalyze::{
    load_catalog, match_headers, Catalog, CatalogLoader, Evidence, FieldSet, TechDetector, WebAnalyzeError,
};

const CATALOG: &str = r#"{
    "technologies": {
        "WordPress": {
            "cats": ["1", "11"],
            "meta": {"generator": ["wordpress", "wp"]},
            "html": ["<link[^>]+wp-content", "(?<broken", "wp-emoji-release\\.min\\.js(?:\\?ver=([\\d.]+))?\\;version:\\1", "<!-- wp:"],
            "implies": "PHP",
            "website": "https://wordpress.org"
        },
        "PHP": {
            "cats": 27,
            "headers": {"X-Powered-By": "php/?([\\d.]+)?\\;version:\\1"}
        },
        "Express": {
            "cats": "18",
            "headers": {"X-Powered-By": "^Express$"}
        },
        "Drupal": {
            "cats": [1, 999],
            "headers": {"X-Generator": "", "X-Drupal-Cache": ""}
        }
    },
    "categories": {
        "1": {"name": "CMS"},
        "11": {"name": "Blogs"},
        "18": {"name": "Web frameworks"},
        "27": {"name": "Programming languages"}
    }
}"#;

fn catalog() -> Catalog {
    load_catalog(CATALOG.replace("\"cats\": 27", "\"cats\": [27]").as_bytes()).unwrap()
}

#[test]
fn scalar_integer_category_is_rejected() {
    match load_catalog(CATALOG.as_bytes()) {
        Err(WebAnalyzeError::Format { field, raw }) => {
            assert_eq!(field, "PHP.cats");
            assert_eq!(raw, "27");
        }
        other => panic!("expected format error, got {other:?}"),
    }
}

#[test]
fn invalid_regex_is_dropped_and_others_load() {
    let catalog = catalog();
    let wordpress = catalog.get("WordPress").unwrap();

    assert_eq!(wordpress.raw_patterns().html.len(), 4);
    assert_eq!(wordpress.patterns().html.len(), 3);
    assert_eq!(catalog.len(), 4);
}

#[test]
fn category_names_resolve_and_unknown_ids_are_dropped() {
    let catalog = catalog();

    assert_eq!(catalog.get("WordPress").unwrap().category_names, ["CMS", "Blogs"]);
    assert_eq!(catalog.get("PHP").unwrap().category_names, ["Programming languages"]);
    assert_eq!(catalog.get("Drupal").unwrap().category_names, ["CMS"]);
}

#[test]
fn meta_alternatives_compile_to_one_alternation() {
    let catalog = catalog();
    let meta = &catalog.get("WordPress").unwrap().patterns().meta;

    assert_eq!(meta.len(), 1);
    assert_eq!(meta[0].regex.as_str(), "wordpress|wp");
}

#[test]
fn header_matching_is_case_insensitive_on_field_name() {
    let catalog = catalog();
    let php = catalog.get("PHP").unwrap();

    let lower: FieldSet = [("x-powered-by", "PHP/8.3.1")].into_iter().collect();
    let result = match_headers(php, &lower);
    assert!(result.is_match());
    assert_eq!(result.version, "8.3.1");
    assert_eq!(result.matches[0], ["PHP/8.3.1", "8.3.1"]);

    let other: FieldSet = [("X-Other", "PHP/8.3.1")].into_iter().collect();
    assert!(!match_headers(php, &other).is_match());
}

#[test]
fn empty_named_pattern_matches_any_value() {
    let catalog = catalog();
    let drupal = catalog.get("Drupal").unwrap();

    let headers: FieldSet = [("X-Drupal-Cache", "MISS")].into_iter().collect();
    assert!(match_headers(drupal, &headers).is_match());

    let headers: FieldSet = [("X-Drupal-Cache", "")].into_iter().collect();
    assert!(!match_headers(drupal, &headers).is_match());
}

#[test]
fn loading_twice_gives_identical_results() {
    let first = TechDetector::new(catalog());
    let second = TechDetector::new(catalog());
    let evidence = Evidence::new()
        .with_header("X-Powered-By", "PHP/7.4.33")
        .with_header("X-Powered-By", "Express")
        .with_header("X-Generator", "Drupal 10")
        .with_html(
            r#"<meta name="generator" content="WordPress 6.5">
            <script src="/wp-includes/js/wp-emoji-release.min.js?ver=6.5.2"></script>"#,
        );

    let a = first.detect(&evidence);
    let b = second.detect(&evidence);
    assert_eq!(a, b);

    let names: Vec<&str> = a.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["Drupal", "Express", "PHP", "WordPress"]);

    let wordpress = a.iter().find(|d| d.name == "WordPress").unwrap();
    assert_eq!(wordpress.version.as_deref(), Some("6.5.2"));
    assert_eq!(wordpress.categories, ["CMS", "Blogs"]);

    let php = a.iter().find(|d| d.name == "PHP").unwrap();
    assert_eq!(php.version.as_deref(), Some("7.4.33"));
}

#[test]
fn loader_reads_from_any_reader() {
    let bytes = CATALOG.replace("\"cats\": 27", "\"cats\": [27]").into_bytes();
    let from_reader = CatalogLoader::load(std::io::Cursor::new(bytes.clone())).unwrap();
    let from_slice = CatalogLoader::load_slice(&bytes).unwrap();

    assert_eq!(
        from_reader.technologies.keys().collect::<Vec<_>>(),
        from_slice.technologies.keys().collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn catalog_is_shared_across_tasks() {
    let detector = TechDetector::with_shared(Arc::new(catalog()));

    let mut handles = Vec::new();
    for i in 0..8 {
        let detector = detector.clone();
        handles.push(tokio::spawn(async move {
            let evidence = Evidence::new().with_header("X-Powered-By", format!("PHP/8.{i}"));
            detector.detect(&evidence)
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let detections = handle.await.unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].version, Some(format!("8.{i}")));
    }
}

#[tokio::test]
async fn load_file_round_trip() {
    let path = std::env::temp_dir().join(format!("webanalyze-it-{}.json", std::process::id()));
    tokio::fs::write(&path, CATALOG.replace("\"cats\": 27", "\"cats\": [27]")).await.unwrap();

    let catalog = CatalogLoader::load_file(&path).await.unwrap();
    assert_eq!(catalog.len(), 4);

    tokio::fs::remove_file(&path).await.unwrap();
    assert!(matches!(CatalogLoader::load_file(&path).await, Err(WebAnalyzeError::Io(_))));
}
