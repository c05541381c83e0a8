use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::EnrichedMovie;

/// Catalog listing selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Category {
    /// Trending this week
    Trending,
    /// Discover by origin country, optionally narrowed to an original language
    Region {
        country: String,
        language: Option<String>,
    },
    Upcoming,
    TopRated,
    /// Free-text title search
    Search { query: String },
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Trending => write!(f, "trending"),
            Category::Region {
                country,
                language: Some(language),
            } => write!(f, "region:{}:{}", country, language),
            Category::Region {
                country,
                language: None,
            } => write!(f, "region:{}", country),
            Category::Upcoming => write!(f, "upcoming"),
            Category::TopRated => write!(f, "top_rated"),
            Category::Search { query } => write!(f, "search:{}", query),
        }
    }
}

/// A section of the landing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeSection {
    pub key: &'static str,
    pub title: &'static str,
    pub category: Category,
}

/// Sections shown on the landing page, in display order
pub fn home_sections() -> Vec<HomeSection> {
    vec![
        HomeSection {
            key: "trending",
            title: "Trending Movies This Week",
            category: Category::Trending,
        },
        HomeSection {
            key: "bollywood",
            title: "Bollywood Movies",
            category: Category::Region {
                country: "IN".to_string(),
                language: None,
            },
        },
        HomeSection {
            key: "south-indian",
            title: "South Indian Movies",
            category: Category::Region {
                country: "IN".to_string(),
                language: Some("ta".to_string()),
            },
        },
        HomeSection {
            key: "upcoming",
            title: "Upcoming Movies",
            category: Category::Upcoming,
        },
        HomeSection {
            key: "top-rated",
            title: "Top Rated Movies",
            category: Category::TopRated,
        },
    ]
}

/// One loaded landing-page section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryListing {
    pub key: String,
    pub title: String,
    pub category: Category,
    pub movies: Vec<EnrichedMovie>,
}

impl CategoryListing {
    pub fn new(section: &HomeSection, movies: Vec<EnrichedMovie>) -> Self {
        Self {
            key: section.key.to_string(),
            title: section.title.to_string(),
            category: section.category.clone(),
            movies,
        }
    }
}
