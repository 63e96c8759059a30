pub mod keywords;
pub mod rank;
