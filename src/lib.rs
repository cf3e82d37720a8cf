//! BaitBlock: heuristic phishing risk scoring
//!
//! [`service::RiskAggregator`] combines lexical cues, URL heuristics, an
//! optional semantic classifier and sender reputation into a 0-100 score with
//! a short list of human-readable reasons.

pub mod api;
pub mod app;
pub mod model;
pub mod service;
