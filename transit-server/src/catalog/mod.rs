//! Bus and train route catalog.
//!
//! Static timetables for major Sri Lankan bus and rail routes, with the
//! origin/destination filters used by the finder pages.

mod bus;
mod query;
mod train;

pub use bus::{BusRoute, BusServiceType, search_buses};
pub use query::{SearchQuery, SearchQueryError};
pub use train::{
    NearbyTrainSearch, TrainFare, TrainRoute, TrainServiceType, search_trains, search_trains_near,
};
