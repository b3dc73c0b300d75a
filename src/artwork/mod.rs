pub mod cache;
pub mod effects;
pub mod giantbomb;
pub mod handler;

pub use cache::CoverCache;
pub use giantbomb::GiantBombClient;
pub use handler::{ArtworkHandler, ArtworkStatus};
