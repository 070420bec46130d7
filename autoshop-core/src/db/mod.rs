//! Store gateway and identifier allocation

mod allocator;
mod store;

pub use allocator::next_id;
pub use store::Store;
