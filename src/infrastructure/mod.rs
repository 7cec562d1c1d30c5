pub mod http_client_factory;
pub mod persistence;
pub mod repositories;
pub mod webhook;

pub use http_client_factory::HttpClientFactory;
pub use repositories::{
    InMemoryBudgetRepository, InMemoryExpenseRepository, InMemoryLivestockRepository,
    InMemoryRevenueRepository, InMemoryUserRepository,
};
