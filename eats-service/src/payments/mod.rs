pub mod model;
pub mod promotion;
pub mod repo;
pub mod resolver;
pub mod service;
