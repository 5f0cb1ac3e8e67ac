pub mod model;
pub mod repo;
pub mod resolver;
pub mod service;
pub mod slug;
