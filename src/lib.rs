//! Prize tracking for an ESPN fantasy football league: weekly award
//! aggregation, standings with a median bonus, simulated playoff odds, and a
//! cash ledger with payout projections.

pub mod awards;
pub mod config;
pub mod dashboard;
pub mod espn_fetch;
pub mod export;
pub mod history;
pub mod http_client;
pub mod ledger;
pub mod matchups;
pub mod pipeline;
pub mod playoff_sim;
pub mod snapshot;
pub mod standings;
