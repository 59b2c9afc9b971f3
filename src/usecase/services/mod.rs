pub mod export_service;
pub mod table_session;
