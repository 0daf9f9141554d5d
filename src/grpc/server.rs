use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::GrpcConfig;
use crate::error::Result;
use crate::grpc::cleaner_service::CleanerServiceImpl;
use crate::proto::cleaner_service_server::CleanerServiceServer;
use crate::proto::FILE_DESCRIPTOR_SET;
use crate::scheduler::CleaningScheduler;

pub struct GrpcServer {
    config: GrpcConfig,
    scheduler: CleaningScheduler,
}

impl GrpcServer {
    pub fn new(config: GrpcConfig, scheduler: CleaningScheduler) -> Self {
        Self { config, scheduler }
    }

    /// Bind the configured address and serve until `shutdown` is cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        let listener = TcpListener::bind(self.config.listen_addr).await?;
        self.run_with_listener(listener, shutdown).await
    }

    /// Serve on an already bound listener. In-flight RPCs are drained on
    /// shutdown; pending completions are not waited for.
    ///
    /// Besides the cleaner service the server exposes gRPC reflection and
    /// logs every call with its method, status and latency.
    pub async fn run_with_listener(
        self,
        listener: TcpListener,
        shutdown: CancellationToken,
    ) -> Result<()> {
        let local_addr = listener.local_addr().ok();
        let service = CleanerServiceServer::new(CleanerServiceImpl::new(self.scheduler))
            .max_decoding_message_size(self.config.max_receive_size)
            .max_encoding_message_size(self.config.max_send_size);

        let reflection = tonic_reflection::server::Builder::configure()
            .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
            .build_v1()?;

        let trace = TraceLayer::new_for_grpc()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO))
            .on_failure(DefaultOnFailure::new().level(Level::WARN));

        tracing::info!(addr = ?local_addr, "Starting gRPC server");

        Server::builder()
            .timeout(self.config.timeout)
            .http2_keepalive_interval(Some(self.config.keepalive_interval))
            .http2_keepalive_timeout(Some(self.config.timeout))
            .layer(trace)
            .add_service(reflection)
            .add_service(service)
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown.cancelled())
            .await?;

        tracing::info!("gRPC server stopped");
        Ok(())
    }
}
