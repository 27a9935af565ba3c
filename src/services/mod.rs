//! Aggregation and view orchestration

pub mod dashboard;
pub mod decode;
pub mod poller;
pub mod realtime;
pub mod sales;
pub mod traffic;
pub mod window;

pub use dashboard::{AnalyticsView, DashboardService, OrdersRequest, SalesView, SectionFailure};
pub use poller::RealtimePoller;
pub use realtime::RealtimeAggregator;
pub use sales::SalesAggregator;
pub use traffic::TrafficAggregator;
pub use window::DateWindowResolver;
