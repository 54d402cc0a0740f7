pub mod catalog;
pub mod entry;
pub mod locale;
pub mod project;
