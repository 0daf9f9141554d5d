use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tonic::transport::Channel;
use tracing_subscriber::EnvFilter;

use cleaner::config::{CleanerConfig, GrpcConfig, ENV_BASE_SPEED, ENV_TEAMS_AMOUNT};
use cleaner::node::CleanerNode;
use cleaner::proto::cleaner_service_client::CleanerServiceClient;
use cleaner::proto::{
    GetAvailableTeamsIn, GetTeamsStatsIn, ProceedCleaningIn, Request as ProtoRequest, Speed,
};
use cleaner::shutdown::install_shutdown_handler;

#[derive(Parser, Debug)]
#[command(name = "cleaner")]
#[command(version)]
#[command(about = "Assigns cleaning requests to a pool of cleaning teams")]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the cleaner gRPC server
    Server(ServerArgs),

    /// Submit a cleaning request to a team
    Submit {
        #[command(flatten)]
        client: ClientArgs,

        #[command(flatten)]
        request: SubmitArgs,
    },

    /// Team queries
    Teams {
        #[command(flatten)]
        client: ClientArgs,

        #[command(subcommand)]
        command: TeamsCommands,
    },
}

// =============================================================================
// Server Arguments
// =============================================================================

#[derive(Parser, Debug)]
struct ServerArgs {
    /// Number of cleaning teams in the pool
    #[arg(long, env = ENV_TEAMS_AMOUNT)]
    teams_amount: u64,

    /// Mean cleaning time of a slow team, in seconds
    #[arg(long, env = ENV_BASE_SPEED)]
    base_speed: u64,

    /// Address to listen on for gRPC
    #[arg(long, env = "GRPC_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on for gRPC
    #[arg(long, env = "GRPC_PORT", default_value = "50051")]
    port: u16,

    /// Request and keepalive timeout, in seconds
    #[arg(long, env = "GRPC_TIMEOUT", default_value = "15")]
    timeout: u64,

    /// Interval between HTTP/2 keepalive pings on idle connections, in seconds
    #[arg(long, env = "GRPC_KEEPALIVE_INTERVAL", default_value = "7200")]
    keepalive_interval: u64,

    /// Maximum inbound message size, in bytes
    #[arg(long, env = "GRPC_MAX_RECEIVE_SIZE", default_value = "4194304")]
    max_receive_size: usize,

    /// Maximum outbound message size, in bytes
    #[arg(long, env = "GRPC_MAX_SEND_SIZE", default_value = "4194304")]
    max_send_size: usize,
}

// =============================================================================
// Client Arguments
// =============================================================================

#[derive(Parser, Debug)]
struct ClientArgs {
    /// Server address
    #[arg(long, short = 'a', default_value = "http://127.0.0.1:50051")]
    addr: String,

    /// Output format
    #[arg(long, short = 'o', default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Parser, Debug)]
struct SubmitArgs {
    /// Team that should take the request
    #[arg(long)]
    team_id: u64,

    #[arg(long, default_value = "0")]
    request_id: u64,

    #[arg(long, default_value = "0")]
    client_id: u64,

    #[arg(long, default_value = "0")]
    cleaning_type: u32,

    /// Carried with the request; does not affect scheduling
    #[arg(long, default_value = "0")]
    priority: u32,
}

#[derive(clap::Subcommand, Debug)]
enum TeamsCommands {
    /// List teams that are free right now
    Available,
    /// Show per-team utilization
    Stats,
}

// =============================================================================
// JSON Output Types
// =============================================================================

#[derive(Serialize)]
struct SubmitOutput {
    team_id: u64,
    duration_ms: u64,
    request_id: u64,
    client_id: u64,
    time_in_cleaner_ms: u64,
}

#[derive(Serialize)]
struct AvailableOutput {
    teams_ids: Vec<u64>,
}

#[derive(Serialize)]
struct TeamStatsItem {
    id: u64,
    speed: String,
    processed_requests: u64,
    total_busy_time_ms: u64,
}

#[derive(Serialize)]
struct StatsOutput {
    stats: Vec<TeamStatsItem>,
}

fn speed_to_string(speed: i32) -> String {
    match Speed::try_from(speed) {
        Ok(Speed::Fast) => "FAST".to_string(),
        Ok(Speed::Mid) => "MID".to_string(),
        Ok(Speed::Slow) => "SLOW".to_string(),
        _ => "UNKNOWN".to_string(),
    }
}

fn format_duration_ms(ms: u64) -> String {
    format!("{:.3}s", Duration::from_millis(ms).as_secs_f64())
}

// =============================================================================
// Server Implementation
// =============================================================================

async fn run_server(args: ServerArgs) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = CleanerConfig {
        teams_amount: args.teams_amount,
        base_speed: args.base_speed,
        grpc: GrpcConfig {
            listen_addr: SocketAddr::new(args.host, args.port),
            timeout: Duration::from_secs(args.timeout),
            keepalive_interval: Duration::from_secs(args.keepalive_interval),
            max_receive_size: args.max_receive_size,
            max_send_size: args.max_send_size,
        },
    };

    let node = CleanerNode::new(config)?;
    let shutdown = install_shutdown_handler();
    node.run(shutdown).await?;

    Ok(())
}

// =============================================================================
// Client Command Handlers
// =============================================================================

async fn handle_submit(
    client: &mut CleanerServiceClient<Channel>,
    args: SubmitArgs,
    output_format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = client
        .proceed_cleaning(ProceedCleaningIn {
            team_id: args.team_id,
            req: Some(ProtoRequest {
                id: args.request_id,
                client_id: args.client_id,
                team_id: 0,
                cleaning_type: args.cleaning_type,
                priority: args.priority,
                time_in_cleaner_ms: 0,
            }),
        })
        .await;

    let resp = match response {
        Ok(r) => r.into_inner(),
        Err(status) => {
            eprintln!("Error: Cleaning request rejected: {}", status.message());
            if status.code() == tonic::Code::FailedPrecondition {
                eprintln!("Hint: run `cleaner teams available` to find a free team");
            }
            std::process::exit(1);
        }
    };
    let req = resp.req.unwrap_or_default();

    match output_format {
        OutputFormat::Json => {
            let output = SubmitOutput {
                team_id: resp.team_id,
                duration_ms: resp.duration_ms,
                request_id: req.id,
                client_id: req.client_id,
                time_in_cleaner_ms: req.time_in_cleaner_ms,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            println!("Cleaning accepted!");
            println!("Team:     {}", resp.team_id);
            println!("Request:  {}", req.id);
            println!("Duration: {}", format_duration_ms(resp.duration_ms));
        }
    }
    Ok(())
}

async fn handle_available(
    client: &mut CleanerServiceClient<Channel>,
    output_format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = client
        .get_available_teams(GetAvailableTeamsIn {})
        .await?
        .into_inner();

    match output_format {
        OutputFormat::Json => {
            let output = AvailableOutput {
                teams_ids: response.teams_ids,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            if response.teams_ids.is_empty() {
                println!("No teams available.");
            } else {
                let ids: Vec<String> = response.teams_ids.iter().map(u64::to_string).collect();
                println!("Available teams: {}", ids.join(", "));
            }
        }
    }
    Ok(())
}

async fn handle_stats(
    client: &mut CleanerServiceClient<Channel>,
    output_format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = client
        .get_teams_stats(GetTeamsStatsIn {})
        .await?
        .into_inner();

    match output_format {
        OutputFormat::Json => {
            let output = StatsOutput {
                stats: response
                    .stats
                    .into_iter()
                    .map(|s| TeamStatsItem {
                        id: s.id,
                        speed: speed_to_string(s.speed),
                        processed_requests: s.processed_requests,
                        total_busy_time_ms: s.total_busy_time_ms,
                    })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            println!("{:<8} {:<8} {:<12} BUSY TIME", "TEAM", "SPEED", "PROCESSED");
            println!("{}", "-".repeat(42));
            for s in response.stats {
                println!(
                    "{:<8} {:<8} {:<12} {}",
                    s.id,
                    speed_to_string(s.speed),
                    s.processed_requests,
                    format_duration_ms(s.total_busy_time_ms)
                );
            }
        }
    }
    Ok(())
}

// =============================================================================
// Main Entry Point
// =============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    match args.command {
        Commands::Server(server_args) => {
            run_server(server_args).await?;
        }
        Commands::Submit { client, request } => {
            let channel = Channel::from_shared(client.addr.clone())?.connect().await?;
            let mut grpc_client = CleanerServiceClient::new(channel);
            handle_submit(&mut grpc_client, request, &client.output).await?;
        }
        Commands::Teams { client, command } => {
            let channel = Channel::from_shared(client.addr.clone())?.connect().await?;
            let mut grpc_client = CleanerServiceClient::new(channel);

            match command {
                TeamsCommands::Available => {
                    handle_available(&mut grpc_client, &client.output).await?;
                }
                TeamsCommands::Stats => {
                    handle_stats(&mut grpc_client, &client.output).await?;
                }
            }
        }
    }

    Ok(())
}
