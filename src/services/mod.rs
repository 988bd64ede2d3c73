pub mod aggregation;
pub mod change_feed;
pub mod record_store;
pub mod supabase;
pub mod table_view;
pub mod views;
