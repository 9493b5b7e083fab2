pub mod handlers;
pub mod request;
pub mod service;
pub mod splitter;
