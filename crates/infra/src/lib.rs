//! Infrastructure layer: storage adapters and seed data.

pub mod seed;
pub mod store;

pub use store::{
    InMemoryStore, NavigationMenuRepository, PageRepository, PostgresStore, Store, UserRepository,
};
