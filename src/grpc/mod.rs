pub mod cleaner_service;
pub mod server;

pub use cleaner_service::CleanerServiceImpl;
pub use server::GrpcServer;
