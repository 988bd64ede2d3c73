//! Call analytics over a hosted `transcriptions` table: fetches call records,
//! aggregates them into dashboard metrics and series, and projects them into a
//! sortable, searchable table. Change notifications trigger full refetches.

pub mod cli;
pub mod commands;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
