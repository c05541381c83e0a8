pub mod category;
pub mod comment;
pub mod movie;
pub mod user;

pub use category::{home_sections, Category, CategoryListing, HomeSection};
pub use comment::{Comment, NewComment};
pub use movie::{
    trailer_embed_url, CastMember, EnrichedMovie, Movie, MovieDetail, MovieDetails, MovieId,
    Video,
};
pub use user::{expiry_after, AuthState, Session, TokenGrant, User};
