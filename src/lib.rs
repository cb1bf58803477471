pub mod error;
pub mod extract;
pub mod log;
pub mod normalize;
pub mod serializer;
pub mod tree;
pub mod visitor;
