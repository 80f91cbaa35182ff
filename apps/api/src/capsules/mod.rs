pub mod filter;
pub mod form;
pub mod handlers;
pub mod lifecycle;
pub mod view;
