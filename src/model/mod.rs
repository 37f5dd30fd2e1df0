//! 数据模型

mod point;
mod value;

pub use point::*;
pub use value::*;
