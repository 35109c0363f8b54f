//! memograph MCP server binary.
//!
//! Communicates via stdio transport, which is the standard for local MCP
//! servers. Logs go to stderr and default to errors only; set `RUST_LOG` for more.
//!
//! # Usage with Claude Desktop
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "memograph": {
//!       "command": "/path/to/memograph-mcp",
//!       "env": {
//!         "NEO4J_URI": "bolt://localhost:7687",
//!         "NEO4J_USER": "neo4j",
//!         "NEO4J_PASSWORD": "password"
//!       }
//!     }
//!   }
//! }
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::{transport::stdio, ServiceExt};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use memograph_core::{KnowledgeGraphManager, ManagerConfig};
use memograph_graph_stores::ConfiguredConnector;
use memograph_mcp::KnowledgeGraphServer;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing to stderr (stdout is used for MCP transport)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .init();

    let config = ManagerConfig::from_env().context("Failed to load configuration")?;
    let connector = Arc::new(ConfiguredConnector::new(config.graph_store.clone()));
    let manager = Arc::new(KnowledgeGraphManager::new(connector, config));

    manager.initialize().await.inspect_err(|e| {
        tracing::error!(error = %e, "Failed to start server");
    })?;

    let server = KnowledgeGraphServer::new(Arc::clone(&manager));

    // Serve via stdio transport
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Server error: {:?}", e);
    })?;

    tracing::info!("Knowledge graph MCP server running on stdio");

    let outcome = service.waiting().await;

    if let Err(e) = manager.close().await {
        tracing::warn!(error = %e, "Error while closing knowledge graph manager");
    }

    outcome?;
    Ok(())
}
