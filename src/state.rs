use std::sync::Arc;

use crate::config::Config;
use crate::fetcher::ListFetcher;
use crate::store::SharedStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub store: SharedStore,
    pub fetcher: ListFetcher,
    pub config: Config,
}
