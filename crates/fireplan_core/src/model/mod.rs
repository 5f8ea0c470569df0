mod items;
mod profile;
mod results;
mod settings;

pub use items::{IncomeExpenseItem, ItemFrequency, Override, TimeUnit};
pub use profile::{AssetClass, LiquidityLevel, PortfolioConfiguration, UserProfile};
pub use results::{
    FireCalculationResult, PlannerResults, Recommendation, RecommendationKind, YearlyState,
};
pub use settings::SimulationSettings;
