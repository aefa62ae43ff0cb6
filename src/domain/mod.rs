pub mod breakdown;
pub mod color;
pub mod content;
pub mod page;
