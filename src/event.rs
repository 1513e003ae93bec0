use std::sync::Arc;

use crate::error::FetchError;
use crate::model::series::Series;

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The periodic refresh timer fired.
    RefreshDue,
    FetchCompleted(Result<Arc<Series>, FetchError>),
}
