pub mod analytics;
pub mod bootstrap;
pub mod forecast;
pub mod ledger_service;
