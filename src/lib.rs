#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

pub mod cache;
pub mod configuration;
pub mod controller;
pub mod dao;
pub mod error;
pub mod handler;
pub mod helpers;
pub mod model;
pub mod provider;
pub mod server;
pub mod types;

#[cfg(test)]
mod testing;
