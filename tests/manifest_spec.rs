use feature_signals::catalog::{Browser, Catalog};
use feature_signals::config::Config;
use feature_signals::manifest::Manifest;
use feature_signals::models::*;
use feature_signals::positions::StaticPositionSource;
use feature_signals::sync::sync;
use feature_signals::tracker::InMemoryTracker;
use speculate2::speculate;

const ISSUES_URL: &str = "https://github.com/acme/signals/issues";

fn test_catalog() -> Catalog {
    let mut grid = FeatureRecord::new("grid", "Grid");
    grid.support.insert("chrome".to_string(), "57".to_string());
    let mut bluetooth = FeatureRecord::new("web-bluetooth", "Web Bluetooth");
    bluetooth.support.insert("chrome".to_string(), "56".to_string());

    Catalog::new()
        .with_browser(
            "chrome",
            Browser::new("Chrome")
                .with_release("56", "2017-01-25")
                .with_release("57", "2017-03-09"),
        )
        .with_feature(grid)
        .with_feature(FeatureRecord::new("dialog", "Dialog"))
        .with_feature(bluetooth)
}

fn opposed_feed() -> StaticPositionSource {
    let mut feed = PositionFeed::new();
    feed.insert(
        "web-bluetooth".to_string(),
        vec![StandardsPosition {
            organization: "mozilla".to_string(),
            position: "negative".to_string(),
            url: "https://mozilla.example/95".to_string(),
        }],
    );
    StaticPositionSource(feed)
}

speculate! {
    describe "manifest" {
        it "serializes entries sorted by identity" {
            let mut manifest = Manifest::new();
            manifest.insert("zoom", "https://example.com/3", 1);
            manifest.insert("abs", "https://example.com/1", 7);

            let json = manifest.to_json().expect("Serialize failed");
            let abs = json.find("\"abs\"").expect("abs missing");
            let zoom = json.find("\"zoom\"").expect("zoom missing");
            assert!(abs < zoom);
            assert!(json.contains("\"url\": \"https://example.com/1\""));
            assert!(json.contains("\"votes\": 7"));
            assert!(json.ends_with("}\n"));
        }

        it "reports added and removed identities" {
            let mut previous = Manifest::new();
            previous.insert("grid", "https://example.com/1", 2);
            previous.insert("marquee", "https://example.com/9", 0);
            let mut current = Manifest::new();
            current.insert("grid", "https://example.com/1", 3);
            current.insert("dialog", "https://example.com/2", 0);

            let diff = current.diff(&previous);
            assert_eq!(diff.added, vec!["dialog".to_string()]);
            assert_eq!(diff.removed, vec!["marquee".to_string()]);
        }

        describe "on disk" {
            before {
                let dir = tempfile::tempdir().expect("Failed to create temp dir");
                let path = dir.path().join("out").join("manifest.json");
            }

            it "writes and loads the same entries" {
                let mut manifest = Manifest::new();
                manifest.insert("grid", "https://example.com/1", 2);

                manifest.write(&path).expect("Write failed");
                let loaded = Manifest::load(&path).expect("Load failed");

                assert_eq!(loaded, manifest);
            }

            it "replaces the previous file instead of merging" {
                let mut first = Manifest::new();
                first.insert("grid", "https://example.com/1", 2);
                first.write(&path).expect("Write failed");

                let mut second = Manifest::new();
                second.insert("dialog", "https://example.com/2", 0);
                second.write(&path).expect("Write failed");

                let loaded = Manifest::load(&path).expect("Load failed");
                assert!(loaded.get("grid").is_none());
                assert_eq!(loaded.len(), 1);
            }

            it "loads a missing file as empty" {
                let loaded = Manifest::load(&path).expect("Load failed");
                assert!(loaded.is_empty());
            }
        }
    }

    describe "full sync" {
        before {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("out").join("manifest.json");
        }

        it "writes the manifest after a live run" {
            let config = Config {
                manifest_path: path.clone(),
                ..Config::default()
            };
            let tracker = InMemoryTracker::new(ISSUES_URL);

            let report = tokio_test::block_on(sync(&config, &test_catalog(), &opposed_feed(), &tracker, false))
                .expect("Sync failed");

            assert_eq!(report.created(), 2);
            let manifest = Manifest::load(&path).expect("Load failed");
            assert_eq!(manifest.len(), 2);
            assert_eq!(manifest.get("grid").map(|e| e.url.clone()), Some(format!("{}/1", ISSUES_URL)));
            assert_eq!(manifest.get("dialog").map(|e| e.url.clone()), Some(format!("{}/2", ISSUES_URL)));
            assert!(manifest.get("web-bluetooth").is_none());
        }

        it "replaces an unreadable manifest after a live run" {
            let config = Config {
                manifest_path: path.clone(),
                ..Config::default()
            };
            std::fs::create_dir_all(path.parent().expect("No parent")).expect("Failed to create dir");
            std::fs::write(&path, "[\"legacy format\"]").expect("Failed to write legacy manifest");
            let tracker = InMemoryTracker::new(ISSUES_URL);

            let report = tokio_test::block_on(sync(&config, &test_catalog(), &opposed_feed(), &tracker, false))
                .expect("Sync failed");

            assert_eq!(report.created(), 2);
            let manifest = Manifest::load(&path).expect("Load failed");
            assert_eq!(manifest, report.manifest);
            assert_eq!(manifest.get("grid").map(|e| e.url.clone()), Some(format!("{}/1", ISSUES_URL)));

            let again = tokio_test::block_on(sync(&config, &test_catalog(), &opposed_feed(), &tracker, false))
                .expect("Second sync failed");
            assert_eq!(again.created(), 0);
            assert_eq!(Manifest::load(&path).expect("Load failed"), manifest);
        }

        it "does not write the manifest on a dry run" {
            let config = Config {
                manifest_path: path.clone(),
                ..Config::default()
            };
            let tracker = InMemoryTracker::new(ISSUES_URL);

            let report = tokio_test::block_on(sync(&config, &test_catalog(), &opposed_feed(), &tracker, true))
                .expect("Sync failed");

            assert_eq!(report.created(), 2);
            assert!(tracker.is_empty());
            assert!(!path.exists());
        }

        it "writes only existing issues on a dry run when asked to" {
            let config = Config {
                manifest_path: path.clone(),
                write_manifest_in_dry_run: true,
                ..Config::default()
            };
            let tracker = InMemoryTracker::new(ISSUES_URL);
            tracker.seed("Grid", "<!-- web-features:grid -->", "feature", 6);

            tokio_test::block_on(sync(&config, &test_catalog(), &opposed_feed(), &tracker, true))
                .expect("Sync failed");

            let manifest = Manifest::load(&path).expect("Load failed");
            assert_eq!(manifest.len(), 1);
            assert_eq!(manifest.get("grid").map(|e| e.votes), Some(6));
        }

        it "leaves the manifest alone when the run fails" {
            let config = Config {
                manifest_path: path.clone(),
                ..Config::default()
            };
            let mut previous = Manifest::new();
            previous.insert("grid", "https://example.com/1", 2);
            previous.write(&path).expect("Write failed");

            let tracker = InMemoryTracker::new(ISSUES_URL);
            tracker.seed("Grid", "<!-- web-features:grid -->", "feature", 0);
            tracker.seed("Grid", "<!-- web-features:grid -->", "feature", 0);

            let result = tokio_test::block_on(sync(&config, &test_catalog(), &opposed_feed(), &tracker, false));

            assert!(result.is_err());
            assert_eq!(Manifest::load(&path).expect("Load failed"), previous);
        }
    }
}
