//! relay-server: a chat gateway in front of a hosted inference endpoint.
//!
//! Questions arrive on `POST /chat`, are answered by an [`inference`] client,
//! streamed back, and logged through an [`entities`] store. Ratings arrive
//! later on `POST /feedback` and are reconciled against that log.

pub mod config;
pub mod entities;
pub mod error;
pub mod inference;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
