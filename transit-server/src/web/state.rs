//! Application state for the web layer.

use std::sync::Arc;

use crate::contact::ContactMailer;
use crate::datasets::Datasets;
use crate::fares::FareSource;
use crate::ratelimit::RateLimiter;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Bus stops, train stations and timetables
    pub datasets: Arc<Datasets>,

    /// Current fare table
    pub fares: Arc<FareSource>,

    /// Per-client request limiter
    pub limiter: Arc<RateLimiter>,

    /// Contact form delivery
    pub mailer: Arc<ContactMailer>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        datasets: Datasets,
        fares: FareSource,
        limiter: RateLimiter,
        mailer: ContactMailer,
    ) -> Self {
        Self {
            datasets: Arc::new(datasets),
            fares: Arc::new(fares),
            limiter: Arc::new(limiter),
            mailer: Arc::new(mailer),
        }
    }
}
