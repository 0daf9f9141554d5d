pub mod config;
pub mod error;
pub mod grpc;
pub mod node;
pub mod pool;
pub mod scheduler;
pub mod shutdown;

// Re-export generated protobuf types
pub mod proto {
    tonic::include_proto!("cleaner");

    pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("cleaner_descriptor");
}
