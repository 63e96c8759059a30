pub mod business;
pub mod history;
