// ABOUTME: End-to-end loopback demo
// ABOUTME: Client and skewed server talk JSON over in-process channels while the offset converges

use clap::Parser;
use clocksy::protocol::to_json;
use clocksy::{Clock, Estimator, EstimatorConfig, Request, Responder, SystemClock};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

/// Clocksy loopback demo
#[derive(Parser, Debug)]
#[command(name = "loopback")]
#[command(about = "Estimate the offset of a simulated skewed server", long_about = None)]
struct Args {
    /// How far ahead the server clock runs, in milliseconds
    #[arg(long, default_value_t = 1500.0)]
    skew: f64,

    /// One-way link latency, in milliseconds
    #[arg(long, default_value_t = 40)]
    latency: u64,

    /// Smoothing factor
    #[arg(short, long, default_value_t = 0.2)]
    alpha: f64,

    /// Sampling period, in milliseconds
    #[arg(short, long, default_value_t = 500)]
    period: u64,

    /// Number of responses to process before exiting
    #[arg(short, long, default_value_t = 20)]
    samples: usize,
}

/// Wall clock shifted by a fixed amount
struct SkewedClock {
    skew: f64,
}

impl Clock for SkewedClock {
    fn now_millis(&self) -> f64 {
        SystemClock.now_millis() + self.skew
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let latency = Duration::from_millis(args.latency);

    let (req_tx, mut req_rx) = mpsc::unbounded_channel::<String>();
    let (rsp_tx, mut rsp_rx) = mpsc::unbounded_channel::<String>();

    // Server: stamp each request as it arrives, answer over the slow link
    let responder = Responder::with_clock(SkewedClock { skew: args.skew });
    tokio::spawn(async move {
        while let Some(text) = req_rx.recv().await {
            let responder = responder.clone();
            let rsp_tx = rsp_tx.clone();
            tokio::spawn(async move {
                sleep(latency).await;
                let req: Value = match serde_json::from_str(&text) {
                    Ok(v) => v,
                    Err(e) => {
                        log::warn!("Bad request: {}", e);
                        return;
                    }
                };
                let rsp = responder.process_value(&req);
                sleep(latency).await;
                if let Err(e) = rsp_tx.send(rsp.to_string()) {
                    log::warn!("Dropping response, client gone: {}", e);
                }
            });
        }
    });

    let config = EstimatorConfig::default()
        .with_alpha(args.alpha)
        .with_update_period(Duration::from_millis(args.period));

    let mut clocksy = Estimator::new(config, move |req: Request| match to_json(&req) {
        Ok(text) => {
            if let Err(e) = req_tx.send(text) {
                log::warn!("Dropping request, server gone: {}", e);
            }
        }
        Err(e) => log::warn!("Failed to encode request: {}", e),
    })?;

    println!(
        "Server clock is {:.0}ms ahead, link latency {}ms each way",
        args.skew, args.latency
    );
    clocksy.start()?;

    for n in 1..=args.samples {
        let Some(text) = rsp_rx.recv().await else {
            break;
        };
        let rsp: Value = serde_json::from_str(&text)?;
        let delta = clocksy.process_value(&rsp);
        println!(
            "#{:>3} delta={:>9.2}ms rtt={:>6.1}ms quality={:?}",
            n,
            delta,
            clocksy.rtt().unwrap_or(f64::NAN),
            clocksy.quality()
        );
    }

    clocksy.stop();
    Ok(())
}
