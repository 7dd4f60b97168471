pub mod charts;
pub mod colors;
pub mod map;
pub mod panels;
pub mod popup;
