pub mod catalog;
pub mod epic;
pub mod platform;
pub mod scan;
pub mod steam;

pub use catalog::{Catalog, CatalogBuilder, SubCatalog};
pub use platform::{GameEntry, LaunchTarget, Platform};
