//! Creation order for features that do not have an issue yet.
//!
//! Older, more widely shipped features come first. Each feature gets a key
//! made of the release dates of every browser that supports it, sorted and
//! joined with `+`, followed by a sentinel that is greater than any real
//! date:
//!
//! ```text
//! 2019-06-01+2020-01-01+9999-99-99
//! ```
//!
//! Comparing keys as strings puts the feature with the earliest first date
//! first, and among equal prefixes the one with more early dates. A feature
//! with no support at all has the bare sentinel as its key and sorts last.

use crate::catalog::Catalog;
use crate::models::{FeatureKind, FeatureRecord};

/// Greater than any `YYYY-MM-DD` date.
pub const SENTINEL: &str = "9999-99-99";

const SEPARATOR: &str = "+";

/// Ranking key for one feature.
pub fn rank_key(feature: &FeatureRecord, catalog: &Catalog) -> String {
    let mut dates: Vec<&str> = match feature.kind {
        FeatureKind::Normal => feature
            .support
            .iter()
            .filter_map(|(browser, version)| catalog.release_date(browser, version))
            .collect(),
        _ => Vec::new(),
    };
    dates.push(SENTINEL);
    dates.sort_unstable();
    dates.join(SEPARATOR)
}

/// Every catalog identity in creation order.
///
/// Equal keys fall back to identity order so the result never depends on
/// iteration order.
pub fn rank(catalog: &Catalog) -> Vec<String> {
    let mut keyed: Vec<(String, &str)> = catalog
        .features()
        .map(|f| (rank_key(f, catalog), f.id.as_str()))
        .collect();
    keyed.sort_unstable();
    keyed.into_iter().map(|(_, id)| id.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Browser;

    fn catalog() -> Catalog {
        Catalog::new()
            .with_browser(
                "chrome",
                Browser::new("Chrome")
                    .with_release("80", "2020-01-01")
                    .with_release("90", "2021-04-14"),
            )
            .with_browser(
                "firefox",
                Browser::new("Firefox")
                    .with_release("68", "2019-06-01")
                    .with_release("100", "2022-05-03"),
            )
    }

    fn feature(id: &str, support: &[(&str, &str)]) -> FeatureRecord {
        let mut f = FeatureRecord::new(id, id);
        for (browser, version) in support {
            f.support.insert(browser.to_string(), version.to_string());
        }
        f
    }

    #[test]
    fn test_key_sorts_dates_and_appends_sentinel() {
        let f = feature("a", &[("chrome", "80"), ("firefox", "68")]);
        assert_eq!(
            rank_key(&f, &catalog()),
            "2019-06-01+2020-01-01+9999-99-99"
        );
    }

    #[test]
    fn test_key_discards_unknown_releases() {
        let f = feature("a", &[("chrome", "81"), ("safari", "14"), ("firefox", "≤68")]);
        assert_eq!(rank_key(&f, &catalog()), "2019-06-01+9999-99-99");
    }

    #[test]
    fn test_unsupported_feature_has_bare_sentinel() {
        let f = feature("a", &[]);
        assert_eq!(rank_key(&f, &catalog()), SENTINEL);
    }

    #[test]
    fn test_redirects_have_bare_sentinel() {
        let f = FeatureRecord::moved("old", "new");
        assert_eq!(rank_key(&f, &catalog()), SENTINEL);
    }

    #[test]
    fn test_rank_orders_oldest_first_and_unsupported_last() {
        let c = catalog()
            .with_feature(feature("none", &[]))
            .with_feature(feature("new", &[("firefox", "100")]))
            .with_feature(feature("both", &[("chrome", "80"), ("firefox", "68")]))
            .with_feature(feature("old", &[("firefox", "68")]));

        assert_eq!(rank(&c), vec!["both", "old", "new", "none"]);
    }

    #[test]
    fn test_rank_breaks_ties_by_identity() {
        let c = catalog()
            .with_feature(feature("zeta", &[("chrome", "90")]))
            .with_feature(feature("alpha", &[("chrome", "90")]))
            .with_feature(feature("beta", &[]))
            .with_feature(feature("aaa", &[]));

        assert_eq!(rank(&c), vec!["alpha", "zeta", "aaa", "beta"]);
    }
}
