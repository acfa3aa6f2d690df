// SPDX-License-Identifier: MPL-2.0

//! Polling example.
//!
//! Connects to a `WattBox`, prints a refresh every polling interval and
//! optionally switches one outlet first.
//!
//! Log output is controlled with `RUST_LOG`.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example poll -- <host> [username] [password] [outlet=on|off]
//! ```
//!
//! # Example
//!
//! ```bash
//! RUST_LOG=wattbox_lib=debug cargo run --example poll -- 192.168.1.34
//! cargo run --example poll -- 192.168.1.34 wattbox wattbox 3=on
//! ```

use std::env;

use tracing_subscriber::EnvFilter;
use wattbox_lib::entity::{BinarySensorKind, SensorKind};
use wattbox_lib::{Coordinator, OutletIndex, PowerState, WattboxConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <host> [username] [password] [outlet=on|off]", args[0]);
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  cargo run --example poll -- 192.168.1.34");
        eprintln!("  cargo run --example poll -- 192.168.1.34 wattbox wattbox 3=on");
        std::process::exit(1);
    }

    let mut config = WattboxConfig::new(&args[1]);
    if args.len() >= 4 {
        config.username.clone_from(&args[2]);
        config.password.clone_from(&args[3]);
    }
    let coordinator = Coordinator::from_config(&config)?;

    println!("=== WattBox Monitor ===");
    println!("Host: {}", config.host);
    println!("Polling every {}s (enter to stop)", config.polling_interval);
    println!();

    let snapshot = coordinator.refresh().await?;
    println!("{}", snapshot.to_json()?);
    println!();

    coordinator.view(|view| {
        for kind in SensorKind::ALL {
            let value = view
                .sensor(kind)
                .map_or_else(|| "unknown".to_string(), |v| v.to_string());
            let unit = kind.unit().unwrap_or_default();
            println!("{:<14} {value} {unit}", kind.name());
        }
        for kind in BinarySensorKind::ALL {
            println!("{:<14} {:?}", kind.name(), view.binary_sensor(kind));
        }
    });

    if let Some((outlet, state)) = args.get(4).and_then(|arg| arg.split_once('=')) {
        let outlet = OutletIndex::new(outlet.parse()?)?;
        let state: PowerState = state.parse()?;
        coordinator.set_outlet_state(outlet, state).await?;
        println!("Outlet {outlet} switched {state}");
    }

    let mut updates = coordinator.subscribe();
    let printer = async {
        while updates.changed().await.is_ok() {
            let line = match updates.borrow_and_update().as_ref() {
                Some(s) if s.is_connected() => s
                    .outlets()
                    .iter()
                    .map(|o| format!("{}:{}", o.index, o.state))
                    .collect::<Vec<_>>()
                    .join(" "),
                _ => "unavailable".to_string(),
            };
            println!("{line}");
        }
    };

    let stop = async {
        let mut line = String::new();
        // Stop on enter; no signal handling needed for a demo.
        let _ = tokio::task::spawn_blocking(move || std::io::stdin().read_line(&mut line)).await;
    };

    tokio::select! {
        () = coordinator.run(stop) => {}
        () = printer => {}
    }
    Ok(())
}
