//! API service for the streamtube backend
//!
//! Accounts and sessions, video upload backed by object storage, comments,
//! likes, subscriptions, playlists, tweets, and the channel dashboard.

pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod ownership;
pub mod repositories;
pub mod response;
pub mod routes;
pub mod state;
pub mod storage;
pub mod validation;
