pub mod archive;
pub mod audit;
pub mod cascade;
pub mod config;
pub mod line;
pub mod lock;
pub mod paths;
pub mod store;
pub mod tree;
pub mod warn;
