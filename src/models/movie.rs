use serde::{Deserialize, Serialize};

/// Catalog identifier of a movie
pub type MovieId = u64;

const YOUTUBE_EMBED_BASE: &str = "https://www.youtube.com/embed";

/// Movie record as listed by the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
}

impl Movie {
    /// Year component of the release date, when the catalog provided one
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse().ok())
    }

    /// Poster URL at the `w500` size
    pub fn poster_url(&self, image_base: &str) -> Option<String> {
        self.poster_path
            .as_deref()
            .map(|path| format!("{}/w500{}", image_base, path))
    }
}

/// A movie augmented with its external rating.
///
/// The rating is kept exactly as the ratings provider returned it. Enrichment
/// never filters: every listed movie has exactly one `EnrichedMovie`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichedMovie {
    #[serde(flatten)]
    pub movie: Movie,
    pub imdb_rating: Option<String>,
}

impl EnrichedMovie {
    pub fn new(movie: Movie, imdb_rating: Option<String>) -> Self {
        Self {
            movie,
            imdb_rating: imdb_rating.filter(|rating| !rating.is_empty()),
        }
    }

    /// Rating on a 0-5 scale for star widgets.
    ///
    /// Returns `None` when the rating is absent or not numeric (e.g. "N/A").
    /// No clamping is applied.
    pub fn star_rating(&self) -> Option<f64> {
        self.imdb_rating
            .as_deref()
            .and_then(|rating| rating.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite())
            .map(|value| value / 2.0)
    }
}

/// Extended catalog detail for a single movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    #[serde(flatten)]
    pub movie: Movie,
    /// Cross-reference identifier in the ratings provider's namespace
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub revenue: Option<u64>,
}

impl MovieDetails {
    /// IMDb id, ignoring the empty string the catalog sometimes returns
    pub fn cross_reference_id(&self) -> Option<&str> {
        self.imdb_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

/// Cast entry from the credits endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    #[serde(default)]
    pub cast_id: Option<u64>,
    #[serde(default)]
    pub credit_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

impl CastMember {
    /// Profile image URL at the `w185` size
    pub fn profile_url(&self, image_base: &str) -> Option<String> {
        self.profile_path
            .as_deref()
            .map(|path| format!("{}/w185{}", image_base, path))
    }
}

/// Video entry from the videos endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Video {
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl Video {
    pub fn is_youtube_trailer(&self) -> bool {
        self.site == "YouTube" && self.video_type == "Trailer"
    }
}

/// Embed URL of the first YouTube trailer, if any
pub fn trailer_embed_url(videos: &[Video]) -> Option<String> {
    videos
        .iter()
        .find(|video| video.is_youtube_trailer())
        .map(|video| format!("{}/{}", YOUTUBE_EMBED_BASE, video.key))
}

/// Everything shown on a movie's detail page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub details: MovieDetails,
    pub imdb_rating: Option<String>,
    pub cast: Vec<CastMember>,
    pub trailer_url: Option<String>,
}
