// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

use clap::Parser;
use std::net::SocketAddr;
use tokio::signal;

use http_dump::{config, server, Dump};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "http-dump")]
struct Args {
    /// Listen address, e.g. 127.0.0.1:3000 (overrides the config file)
    #[arg(long)]
    listen: Option<String>,

    /// Optional config TOML path
    #[arg(long)]
    config: Option<String>,

    /// Also print raw bodies before the formatted ones
    #[arg(long)]
    raw: bool,

    /// Truncate string values longer than this many characters (0 = never)
    #[arg(long)]
    max_string_length: Option<usize>,
}

async fn load_config(args: &Args) -> config::Config {
    let mut cfg = if let Some(ref p) = args.config {
        config::Config::load_from_path(p).await.unwrap_or_else(|e| {
            warn!(%p, %e, "failed to load config, using defaults");
            config::Config::default()
        })
    } else {
        config::Config::default()
    };

    if let Some(ref listen) = args.listen {
        cfg.general.listen = listen.clone();
    }
    if args.raw {
        cfg.dump.show_raw = true;
    }
    if let Some(max) = args.max_string_length {
        cfg.layout.max_string_length = max;
    }
    cfg
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let cfg = load_config(&args).await;
    let addr: SocketAddr = cfg.general.listen.parse()?;
    let dump = Dump::from_options(cfg.dump_options());

    let server = server::run_server(addr, dump);

    tokio::select! {
        res = server => {
            if let Err(e) = res {
                error!(%e, "server error");
            }
        }
        _ = signal::ctrl_c() => {
            info!("shutting down");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::fs;

    fn args(config: Option<String>) -> Args {
        Args {
            listen: None,
            config,
            raw: false,
            max_string_length: None,
        }
    }

    #[tokio::test]
    async fn cli_flags_override_config_file() -> anyhow::Result<()> {
        let tmp = std::env::temp_dir().join(format!("http_dump_main_cfg_{}.toml", std::process::id()));
        fs::write(&tmp, "[general]\nlisten = \"127.0.0.1:4000\"\n[layout]\nmax_string_length = 3\n").await?;

        let mut a = args(Some(tmp.to_string_lossy().into_owned()));
        a.raw = true;
        a.max_string_length = Some(10);
        let cfg = load_config(&a).await;

        assert_eq!(cfg.general.listen, "127.0.0.1:4000");
        assert!(cfg.dump.show_raw);
        assert_eq!(cfg.layout.max_string_length, 10);

        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn unreadable_config_falls_back_to_defaults() {
        let a = args(Some("/nonexistent/http-dump.toml".to_string()));
        let cfg = load_config(&a).await;
        assert_eq!(cfg.general.listen, "127.0.0.1:3000");
        assert!(!cfg.dump.show_raw);
    }

    #[test]
    fn args_parse_from_command_line() {
        let a = Args::parse_from(["http-dump", "--listen", "0.0.0.0:9000", "--raw"]);
        assert_eq!(a.listen.as_deref(), Some("0.0.0.0:9000"));
        assert!(a.raw);
        assert!(a.config.is_none());
    }
}
