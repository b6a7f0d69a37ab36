pub mod slice;
pub mod store;
