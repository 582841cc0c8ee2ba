pub mod category;
pub mod history;
pub mod reading;
