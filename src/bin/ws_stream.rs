//! Upbit WebSocket stream viewer
//!
//! Usage: `ws_stream [--type ticker|trade|orderbook] [--simple] KRW-BTC KRW-ETH ...`
//!
//! Subscribes to the public stream for the given markets and logs each
//! frame until Ctrl+C. With `--private`, subscribes to `myOrder` and
//! `myAsset` instead (requires credentials).

use anyhow::{bail, Context};
use tokio::signal;
use tracing::{error, info};
use upbit_client::adapters::upbit::{
    build_subscription, StreamFormat, SubscriptionType, UpbitClient, DEFAULT_PING_INTERVAL,
};
use upbit_client::config::logging::init_logging;

const DEFAULT_MARKETS: &[&str] = &["KRW-BTC"];

struct Args {
    kind: String,
    format: StreamFormat,
    private: bool,
    markets: Vec<String>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        kind: "ticker".to_string(),
        format: StreamFormat::Default,
        private: false,
        markets: Vec::new(),
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--type" => args.kind = iter.next().context("--type needs a value")?,
            "--simple" => args.format = StreamFormat::Simple,
            "--private" => args.private = true,
            flag if flag.starts_with("--") => bail!("unknown flag {}", flag),
            market => args.markets.push(market.to_uppercase()),
        }
    }

    if args.markets.is_empty() {
        args.markets = DEFAULT_MARKETS.iter().map(|m| m.to_string()).collect();
    }
    Ok(args)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let args = parse_args()?;
    let client = UpbitClient::from_env()?;

    let (ws, types) = if args.private {
        (
            client.ws_private()?,
            vec![SubscriptionType::my_order(), SubscriptionType::my_asset()],
        )
    } else {
        (
            client.ws_public(),
            vec![SubscriptionType::new(args.kind.as_str()).with_codes(args.markets.iter().cloned())],
        )
    };
    let subscription = build_subscription(&types, None, args.format)?;
    info!(url = %ws.url(), subscription = %subscription, "📡 Subscribing");

    let mut frames: u64 = 0;
    let stream = ws.run(
        &subscription,
        |frame| {
            frames += 1;
            info!(frame = frames, payload = %String::from_utf8_lossy(frame), "Frame");
        },
        DEFAULT_PING_INTERVAL,
    );

    tokio::select! {
        result = stream => {
            if let Err(e) = result {
                error!(error = %e, "Stream ended with error");
                return Err(e.into());
            }
            info!("Stream closed by server");
        }
        _ = signal::ctrl_c() => {
            info!("[SHUTDOWN] Ctrl+C received");
        }
    }

    Ok(())
}
