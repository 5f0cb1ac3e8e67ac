pub mod model;
pub mod password;
pub mod repo;
pub mod resolver;
pub mod service;
