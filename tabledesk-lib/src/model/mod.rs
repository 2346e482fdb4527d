//! Row and value models

mod row;
mod row_serde;
mod value;

pub use row::*;
pub use value::*;
