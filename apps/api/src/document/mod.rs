pub mod demo;
pub mod edit;
pub mod handlers;
pub mod model;
pub mod store;
pub mod validation;
