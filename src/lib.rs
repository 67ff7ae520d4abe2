//! Lead intake & WhatsApp relay API library
//!
//! Backs a consultancy marketing site: a contact form that scores and upserts leads,
//! a WhatsApp Business webhook relay answering inbound text with canned replies, and
//! static privacy-policy responders.
//!
//! # Modules
//!
//! - `api`: HTTP-facing handlers.
//! - `core`: Domain logic (scoring, intake, dispatch) and shared errors/models.
//! - `integrations`: WhatsApp Cloud API client and webhook payload models.
//! - `config`: Configuration management.
//! - `db`: Database connection and migrations.
//! - `dispatcher`: Keyword router for inbound WhatsApp text.
//! - `errors`: Error handling types.
//! - `handlers`: Application state, health check and contact intake handler.
//! - `intake`: Contact-form validation and lead construction.
//! - `lead_scoring`: Lead score and priority rules.
//! - `lead_store`: Lead storage trait with Postgres and in-memory backends.
//! - `models`: Lead and company data models.
//! - `normalize`: Text normalisation helpers.
//! - `privacy`: Privacy policy responders.
//! - `routes`: Router and middleware.
//! - `webhook_handler`: WhatsApp webhook handlers.
//! - `webhook_models`: WhatsApp webhook payload models.
//! - `webhook_verifier`: Handshake and signature verification.
//! - `whatsapp_client`: WhatsApp Cloud API client.

pub mod api;
pub mod core;
pub mod integrations;

pub mod config;
pub mod db;
pub mod dispatcher;
pub mod errors;
pub mod handlers;
pub mod intake;
pub mod lead_scoring;
pub mod lead_store;
pub mod models;
pub mod normalize;
pub mod privacy;
pub mod routes;
pub mod webhook_handler;
pub mod webhook_models;
pub mod webhook_verifier;
pub mod whatsapp_client;
