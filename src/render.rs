//! Markdown rendering of tracking issues.
//!
//! Output depends only on catalog data, so rendering an unchanged feature
//! twice yields byte-identical text and no update.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::catalog::Catalog;
use crate::marker::Marker;
use crate::models::{Baseline, FeatureRecord, IssueUpdate};

const EXPLORER_URL: &str = "https://web-platform-dx.github.io/web-features-explorer/features";
const CANIUSE_URL: &str = "https://caniuse.com";

pub struct IssueRenderer<'a> {
    catalog: &'a Catalog,
    marker: &'a Marker,
}

impl<'a> IssueRenderer<'a> {
    pub fn new(catalog: &'a Catalog, marker: &'a Marker) -> Self {
        Self { catalog, marker }
    }

    /// Title and body the issue for `feature` should have.
    pub fn render(&self, feature: &FeatureRecord) -> IssueUpdate {
        IssueUpdate {
            title: feature.name.clone(),
            body: self.body(feature),
        }
    }

    fn body(&self, feature: &FeatureRecord) -> String {
        let mut out = String::new();

        if !feature.description.is_empty() {
            out.push_str(feature.description.trim());
            out.push_str("\n\n");
        }

        out.push_str("## Browser support\n\n");
        out.push_str(&baseline_line(&feature.baseline));
        out.push_str("\n\n");
        self.support_list(&mut out, feature);

        if !feature.spec.is_empty() {
            out.push_str("\n## Specifications\n\n");
            for url in &feature.spec {
                out.push_str(&format!("- <{}>\n", url));
            }
        }

        if !feature.caniuse.is_empty() {
            out.push_str("\n## Can I use\n\n");
            for id in &feature.caniuse {
                out.push_str(&format!("- <{}/{}>\n", CANIUSE_URL, id));
            }
        }

        out.push_str("\n## Your signal\n\n");
        out.push_str(
            "If you would use this feature once it works in every browser, \
             add a 👍 reaction to this issue. Comments describing your use case \
             are welcome too.\n\n",
        );
        out.push_str(&format!(
            "More details: [{} on web-features explorer]({}/{}/)\n",
            feature.name, EXPLORER_URL, feature.id
        ));

        out.push('\n');
        out.push_str(&self.marker.render(&feature.id));
        out.push('\n');
        out
    }

    fn support_list(&self, out: &mut String, feature: &FeatureRecord) {
        let browsers: BTreeSet<&str> = self
            .catalog
            .browser_keys()
            .chain(feature.support.keys().map(String::as_str))
            .collect();

        for key in browsers {
            let name = self
                .catalog
                .browser(key)
                .map(|b| b.name.as_str())
                .unwrap_or(key);
            match feature.support.get(key) {
                Some(version) => match self.catalog.release_date(key, version) {
                    Some(date) => out.push_str(&format!(
                        "- {}: {} (released {})\n",
                        name,
                        version,
                        month_year(date)
                    )),
                    None => out.push_str(&format!("- {}: {}\n", name, version)),
                },
                None => out.push_str(&format!("- {}: not supported\n", name)),
            }
        }
    }
}

fn baseline_line(baseline: &Baseline) -> String {
    match baseline {
        Baseline::None => "Baseline: limited availability".to_string(),
        Baseline::Low { since: Some(date) } => {
            format!("Baseline: newly available since {}", month_year(date))
        }
        Baseline::Low { since: None } => "Baseline: newly available".to_string(),
        Baseline::High { since: Some(date) } => {
            format!("Baseline: widely available since {}", month_year(date))
        }
        Baseline::High { since: None } => "Baseline: widely available".to_string(),
    }
}

/// `2022-03-29` → `March 2022`. Approximate dates keep their `≤` prefix;
/// anything unparseable is returned as is.
fn month_year(date: &str) -> String {
    let (prefix, plain) = match date.strip_prefix('≤') {
        Some(rest) => ("≤", rest),
        None => ("", date),
    };
    match NaiveDate::parse_from_str(plain, "%Y-%m-%d") {
        Ok(parsed) => format!("{}{}", prefix, parsed.format("%B %Y")),
        Err(_) => date.to_string(),
    }
}
