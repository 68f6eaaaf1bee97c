pub mod command;
pub mod context;
pub mod controller;
pub mod domain;
pub mod library;
pub mod repository;
pub mod transaction;
