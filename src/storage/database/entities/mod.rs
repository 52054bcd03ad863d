/// API key entity module
pub mod api_key;
/// Managed model entity module
pub mod managed_model;
/// Request log entity module
pub mod request_log;

pub use api_key::Entity as ApiKey;
pub use managed_model::Entity as ManagedModel;
pub use request_log::Entity as RequestLog;
