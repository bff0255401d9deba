// Copyright 2025 lalog contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lalog_agent::{loadavg, report::Reporter, timer};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Collector base URL (e.g., "http://collector:8080")
    #[arg(env = "LALOG_COLLECTOR_URL")]
    collector_url: String,

    /// Report under this name instead of the OS short hostname
    #[arg(long, env = "LALOG_HOSTNAME")]
    hostname: Option<String>,

    /// Seconds between reports
    #[arg(long, env = "LALOG_INTERVAL_SECS", default_value_t = 60)]
    interval_secs: u64,
}

/// OS hostname truncated at the first dot.
fn short_hostname() -> Result<String> {
    let name = hostname::get()?
        .into_string()
        .map_err(|raw| anyhow::anyhow!("hostname is not valid UTF-8: {raw:?}"))?;
    Ok(name.split('.').next().unwrap_or(&name).to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lalog_agent=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let hostname = match args.hostname {
        Some(name) => name,
        None => short_hostname()?,
    };
    let interval = Duration::from_secs(args.interval_secs.max(1));
    let reporter = Arc::new(Reporter::new(&args.collector_url, &hostname)?);

    info!(
        endpoint = reporter.endpoint(),
        interval_secs = interval.as_secs(),
        "Starting lalog agent"
    );

    loop {
        match loadavg::read() {
            Ok(load) => {
                // Fire-and-forget: a slow or down collector must never
                // delay the next cycle. Failures are logged and dropped.
                let reporter = reporter.clone();
                tokio::spawn(async move {
                    if let Err(e) = reporter.send(load).await {
                        warn!("report dropped: {e}");
                    }
                });
            }
            Err(e) => warn!("skipping cycle: {e}"),
        }

        tokio::time::sleep(timer::delay_to_next_tick(Utc::now(), interval)).await;
    }
}
