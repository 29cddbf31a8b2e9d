pub mod match_order_info;
pub mod responses;

pub use match_order_info::{match_order_info, MatchOrderInfo, QuickStats};
pub use responses::{AutoScheduleResponse, CalculateMatchOrderResponse, StandingsResponse};
