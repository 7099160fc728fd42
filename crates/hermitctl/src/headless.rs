//! Headless host: start immediately, wait for one result, print it

use crate::config::HermitConfig;
use crate::errors::{EXIT_CANCELLED, EXIT_SCAN_FAILED, EXIT_SUCCESS};
use crate::host::{build_session, HostSession, PayloadSlot};
use crate::interaction::Payload;
use anyhow::{anyhow, Context, Result};
use hermit_common::{CaptureAdapter, DeliveryReceiver, ScanMode};
use owo_colors::OwoColorize;
use std::future::Future;
use std::io::IsTerminal;
use tracing::warn;

/// How a headless scan ended
#[derive(Debug, Clone, PartialEq)]
pub enum ScanReport {
    Success(Payload),
    Failed(String),
    Cancelled,
}

impl ScanReport {
    pub fn exit_code(&self) -> i32 {
        match self {
            ScanReport::Success(_) => EXIT_SUCCESS,
            ScanReport::Failed(_) => EXIT_SCAN_FAILED,
            ScanReport::Cancelled => EXIT_CANCELLED,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ScanReport::Success(payload) => {
                serde_json::json!({ "status": "success", "payload": payload.to_json() })
            }
            ScanReport::Failed(message) => {
                serde_json::json!({ "status": "error", "error": message })
            }
            ScanReport::Cancelled => serde_json::json!({ "status": "cancelled" }),
        }
    }
}

/// Drive one scan to completion. `cancel` resolving cancels the capture.
pub async fn scan_once<A, F>(
    session: &mut HostSession<A>,
    rx: &mut DeliveryReceiver,
    slot: &PayloadSlot,
    cancel: F,
) -> ScanReport
where
    A: CaptureAdapter,
    F: Future<Output = ()>,
{
    tokio::pin!(cancel);
    session.start();

    loop {
        match session.mode() {
            ScanMode::Success => {
                return match slot.take() {
                    Some(payload) => ScanReport::Success(payload),
                    None => ScanReport::Failed("result was not delivered to the host".to_string()),
                };
            }
            ScanMode::Error => return ScanReport::Failed(session.last_error().to_string()),
            ScanMode::Pending => return ScanReport::Failed("scan did not start".to_string()),
            ScanMode::Active => {}
        }

        tokio::select! {
            _ = &mut cancel => {
                session.cancel();
                return ScanReport::Cancelled;
            }
            delivery = rx.recv() => match delivery {
                Some(delivery) => {
                    session.deliver(delivery);
                }
                None => {
                    session.cancel();
                    return ScanReport::Failed("capture channel closed".to_string());
                }
            }
        }
    }
}

/// Resolves when `signal` fires. If the handler cannot be installed, never resolves.
pub async fn until_signal<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        warn!("Cannot listen for Ctrl+C, scan can only end with a result: {}", e);
        std::future::pending::<()>().await;
    }
}

pub async fn run<A: CaptureAdapter>(config: &HermitConfig, adapter: A, json: bool) -> Result<i32> {
    let (mut session, mut rx, slot) = build_session(config, adapter);

    let prompt = session
        .instructions()
        .map_err(|e| anyhow!(e))
        .context("Cannot show the Hermit command")?;

    // Prompt on stderr keeps stdout for the result
    if !json {
        let color = std::io::stderr().is_terminal();
        eprintln!("{}", prompt.instructions);
        eprintln!();
        if color {
            eprintln!("    {}", prompt.prompt_line().bold());
        } else {
            eprintln!("    {}", prompt.prompt_line());
        }
        eprintln!();
        eprintln!("When you are ready, scan the QR code produced by Hermit (Ctrl+C to cancel)");
    }

    let cancel = until_signal(tokio::signal::ctrl_c());
    let report = scan_once(&mut session, &mut rx, &slot, cancel).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report.to_json())?);
    } else {
        match &report {
            ScanReport::Success(payload) => println!("{}", payload.render()),
            ScanReport::Failed(message) => {
                if std::io::stderr().is_terminal() {
                    eprintln!("{} {}", "scan failed:".red(), message);
                } else {
                    eprintln!("scan failed: {}", message);
                }
            }
            ScanReport::Cancelled => eprintln!("cancelled"),
        }
    }

    Ok(report.exit_code())
}
