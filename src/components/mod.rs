pub mod bracket;
pub mod palette;
