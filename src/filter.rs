use typed_builder::TypedBuilder;

use crate::catalog::Publisher;

/// The search box, category select and social toggle of the publisher list
#[derive(Debug, Clone, Default, PartialEq, Eq, TypedBuilder)]
pub struct Filter {
    #[builder(default, setter(into))]
    pub term: String,
    /// Exact category to keep, empty for any
    #[builder(default, setter(into))]
    pub category: String,
    #[builder(default)]
    pub social_only: bool,
}

impl Filter {
    pub fn matches(&self, publisher: &Publisher) -> bool {
        self.matches_term(publisher, &self.term.trim().to_lowercase())
    }

    fn matches_term(&self, publisher: &Publisher, term: &str) -> bool {
        if !self.category.is_empty() && publisher.category.as_deref().unwrap_or("") != self.category
        {
            return false;
        }
        if self.social_only && !publisher.has_social() {
            return false;
        }
        term.is_empty() || haystack(publisher).contains(term)
    }

    /// Matching publishers, in catalog order
    pub fn apply<'a>(&self, sites: &'a [Publisher]) -> Vec<&'a Publisher> {
        let term = self.term.trim().to_lowercase();
        sites
            .iter()
            .filter(|s| self.matches_term(s, &term))
            .collect()
    }
}

fn haystack(publisher: &Publisher) -> String {
    let mut fields = vec![
        publisher.name.as_str(),
        publisher.url.as_str(),
        publisher.slug.as_str(),
        publisher.category.as_deref().unwrap_or(""),
    ];
    fields.extend(publisher.descriptions());
    fields.join(" ").to_lowercase()
}
