use crate::model::{Category, Entry};
use log::warn;

/// Static category -> entries mapping. Category order is the declaration
/// order and is what every search result follows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    categories: Vec<Category>,
}

impl Dataset {
    /// Builds a dataset from categories in declaration order. A name seen
    /// twice is folded into its first occurrence so names stay unique keys.
    pub fn from_categories(categories: impl IntoIterator<Item = Category>) -> Self {
        let mut merged: Vec<Category> = Vec::new();
        for category in categories {
            match merged.iter_mut().find(|c| c.name == category.name) {
                Some(existing) => {
                    warn!(
                        "Dataset: category '{}' declared more than once, merging {} entries",
                        category.name,
                        category.entries.len()
                    );
                    existing.entries.extend(category.entries);
                }
                None => merged.push(category),
            }
        }
        Self { categories: merged }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.categories.iter().map(|c| c.entries.len()).sum()
    }
}

/// The links the overlay ships with when no config file provides any.
pub fn builtin() -> Dataset {
    Dataset::from_categories([
        Category::new(
            "Documentation",
            vec![
                Entry::new("Github Repository", "https://github.com/Gabrielzouad/Global-Seach-component"),
                Entry::new("Github Profile", "https://github.com/Gabrielzouad"),
                Entry::new("LinkedIn", "https://www.linkedin.com/in/gabrielzouad/"),
                Entry::new("Personal Website", "https://gabrielzouad.no"),
            ],
        ),
        Category::new(
            "Inspiration",
            vec![
                Entry::new("ShadCN", "https://ui.shadcn.com"),
                Entry::new("AceternityUI", "https://ui.shadcn.com"),
                Entry::new("TailwindCSS", "https://tailwindcss.com"),
                Entry::new("Radix Icons", "https://icons.radix-ui.com"),
            ],
        ),
        Category::new(
            "Guides",
            vec![
                Entry::new("Readme", "https://github.com/your-repository/blob/main/README.md"),
                Entry::new("ShadCN installation", "https://ui.shadcn.com/docs"),
                Entry::new("AceternityUI installation", "https://ui.aceternity.com/docs/install-nextjs"),
                Entry::new("TailwindUI installation", "https://tailwindcss.com/docs/installation"),
            ],
        ),
    ])
}
