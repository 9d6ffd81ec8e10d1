mod shelf;
mod surface;

pub use shelf::ShelfAllocator;
pub use surface::AtlasSurface;
