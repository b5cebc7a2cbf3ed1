pub mod stats_query;
pub mod table_query;
