pub mod model;
pub mod policy;
pub mod pricing;
pub mod repo;
pub mod resolver;
pub mod service;
