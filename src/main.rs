//! UNO Table Server
//!
//! Process bootstrap: logging, configuration, the one shared table, and
//! the TCP front end. Restarting the process resets the table; nothing is
//! persisted.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use uno_table::game::table::{GameTable, TableConfig};
use uno_table::network::dispatcher::Dispatcher;
use uno_table::network::server::{GameServer, ServerConfig};
use uno_table::VERSION;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging (RUST_LOG overrides, defaults to info)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("UNO Table Server v{}", VERSION);

    let table_config = table_config_from_env();
    if table_config.strict_wild_draw_four {
        info!("strict wild-draw-four rule is on");
    }

    let table = GameTable::new(table_config).context("failed to set up the table")?;
    let dispatcher = Dispatcher::new(table);

    let server = GameServer::new(ServerConfig::from_env(), dispatcher);
    server.run().await.context("server failed")?;
    Ok(())
}

/// Table rules from the environment: `UNO_STRICT_DRAW_FOUR=1` enables the
/// strict Wild Draw Four rule, `UNO_DECK_SEED` pins the shuffle.
fn table_config_from_env() -> TableConfig {
    let strict = std::env::var("UNO_STRICT_DRAW_FOUR")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let seed = std::env::var("UNO_DECK_SEED")
        .ok()
        .and_then(|v| v.parse().ok());

    TableConfig {
        strict_wild_draw_four: strict,
        rng_seed: seed,
        ..TableConfig::default()
    }
}
