mod entity;
mod field;
mod relation;

pub use entity::*;
pub use field::*;
pub use relation::*;
