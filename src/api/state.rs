use std::sync::Arc;
use crate::services::portfolio::PortfolioService;

pub type AppState = Arc<PortfolioService>;
