//! RentMoldova - car rental backend
//!
//! Catalog, price quotes, bookings and site content behind a JSON API, with
//! phone/password and external-identity sign-in.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
