pub mod kind;
pub mod views;
