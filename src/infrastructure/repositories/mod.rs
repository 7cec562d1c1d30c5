mod in_memory;

pub use in_memory::{
    InMemoryBudgetRepository, InMemoryExpenseRepository, InMemoryLivestockRepository,
    InMemoryRevenueRepository, InMemoryUserRepository,
};
