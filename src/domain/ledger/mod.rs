pub mod password;
pub mod types;

pub use types::{
    AnalyticsSummary, Budget, BudgetPeriod, Expense, ExpenseUpdate, Livestock, NewBudget,
    NewExpense, NewLivestock, NewRevenue, NewUser, Revenue, RevenueUpdate, User,
};
