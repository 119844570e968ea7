pub mod context;
pub mod handlers;
pub mod request;
pub mod response;
pub mod settings;
