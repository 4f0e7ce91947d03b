use crate::dataset::Dataset;
use crate::model::{CategoryResult, SearchResult};

/// Filters the dataset by a case-insensitive substring match on entry
/// labels. An empty query returns the whole dataset. Categories without a
/// matching entry are left out; everything else keeps dataset order.
///
/// The query is used as typed, whitespace included.
pub fn filter(dataset: &Dataset, query: &str) -> SearchResult {
    if query.is_empty() {
        let groups = dataset
            .categories()
            .iter()
            .map(|c| CategoryResult {
                category: c.name.clone(),
                items: c.entries.clone(),
            })
            .collect();
        return SearchResult { groups };
    }

    let needle = query.to_lowercase();
    let groups = dataset
        .categories()
        .iter()
        .filter_map(|c| {
            let items: Vec<_> = c
                .entries
                .iter()
                .filter(|e| e.label.to_lowercase().contains(&needle))
                .cloned()
                .collect();
            (!items.is_empty()).then(|| CategoryResult {
                category: c.name.clone(),
                items,
            })
        })
        .collect();

    SearchResult { groups }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset;
    use crate::model::{Category, Entry};

    fn sample() -> Dataset {
        Dataset::from_categories([
            Category::new(
                "Documentation",
                vec![Entry::new("Readme", "/readme"), Entry::new("Guide", "/guide")],
            ),
            Category::new("Links", vec![Entry::new("Repo", "/repo")]),
        ])
    }

    fn shape(result: &SearchResult) -> Vec<(&str, Vec<&str>)> {
        result
            .groups
            .iter()
            .map(|g| {
                (
                    g.category.as_str(),
                    g.items.iter().map(|e| e.label.as_str()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn empty_query_returns_everything() {
        let ds = sample();
        let result = filter(&ds, "");
        assert_eq!(
            shape(&result),
            vec![("Documentation", vec!["Readme", "Guide"]), ("Links", vec!["Repo"])]
        );
    }

    #[test]
    fn empty_query_keeps_empty_categories() {
        let ds = Dataset::from_categories([
            Category::new("Drafts", vec![]),
            Category::new("Links", vec![Entry::new("Repo", "/repo")]),
        ]);
        let result = filter(&ds, "");
        assert_eq!(shape(&result), vec![("Drafts", vec![]), ("Links", vec!["Repo"])]);
        assert_eq!(shape(&filter(&ds, "re")), vec![("Links", vec!["Repo"])]);
    }

    #[test]
    fn substring_match_is_case_insensitive() {
        let ds = sample();
        let result = filter(&ds, "re");
        assert_eq!(
            shape(&result),
            vec![("Documentation", vec!["Readme"]), ("Links", vec!["Repo"])]
        );
        assert_eq!(filter(&ds, "RE"), result);
    }

    #[test]
    fn no_match_yields_no_groups() {
        assert!(filter(&sample(), "zzz").is_empty());
    }

    #[test]
    fn link_text_is_not_searched() {
        assert!(filter(&sample(), "/guide").is_empty());
    }

    #[test]
    fn whitespace_is_matched_literally() {
        let ds = dataset::builtin();
        let result = filter(&ds, " ");
        let labels: Vec<_> = result.flat_items().map(|(_, e)| e.label.as_str()).collect();
        assert!(labels.iter().all(|l| l.contains(' ')));
        assert!(labels.contains(&"Github Repository"));
        assert!(!labels.contains(&"LinkedIn"));
    }

    #[test]
    fn groups_follow_dataset_order_and_items_keep_relative_order() {
        let ds = dataset::builtin();
        for query in ["", "i", "in", "ShadCN", "installation", "git", "x"] {
            let result = filter(&ds, query);
            let positions: Vec<_> = result
                .groups
                .iter()
                .map(|g| ds.categories().iter().position(|c| c.name == g.category).unwrap())
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]), "query {query:?}");

            for group in &result.groups {
                let source = &ds.get(&group.category).unwrap().entries;
                let indices: Vec<_> = group
                    .items
                    .iter()
                    .map(|item| source.iter().position(|e| e == item).unwrap())
                    .collect();
                assert!(indices.windows(2).all(|w| w[0] < w[1]), "query {query:?}");
            }
        }
    }

    #[test]
    fn category_present_iff_some_label_matches() {
        let ds = dataset::builtin();
        for query in ["a", "hub", "INSTALL", "Radix", "nothing-here"] {
            let result = filter(&ds, query);
            for category in ds.categories() {
                let expected = category
                    .entries
                    .iter()
                    .any(|e| e.label.to_lowercase().contains(&query.to_lowercase()));
                let present = result.groups.iter().any(|g| g.category == category.name);
                assert_eq!(expected, present, "{} / {query:?}", category.name);
            }
        }
    }

    #[test]
    fn repeated_calls_agree() {
        let ds = dataset::builtin();
        assert_eq!(filter(&ds, "in"), filter(&ds, "in"));
    }
}
