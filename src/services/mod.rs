pub mod chart_service;
pub mod convert_service;
pub mod export_service;
pub mod loader_service;
pub mod partition_service;
pub mod rate_service;
pub mod report_service;
pub mod stats_service;
pub mod table_service;
