//! Configuration session demonstration
//!
//! Runs the full SA818 configuration sequence against a scripted mock
//! module, so no radio hardware is needed.

use std::time::Duration;

use sa818::api::{SessionReport, TextFormatter};
use sa818::core::{ConfigurationProfile, FilterConfig};
use sa818::hardware::MockChannel;
use sa818::session::{query_rssi, query_version, run_session, RunOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== SA818 Configuration Session Demo ===\n");

    let options = RunOptions::default().with_settle_delay(Duration::ZERO);
    let profile = ConfigurationProfile {
        tx_frequency: "145.525".parse()?,
        rx_frequency: "145.525".parse()?,
        scan_frequency: "145.525".parse()?,
        volume: 5,
        filter: FilterConfig::new(true, true, true),
        ..Default::default()
    };

    demo_healthy_module(&profile, &options)?;
    demo_rejected_volume(&profile, &options)?;
    demo_silent_module(&profile, &options)?;
    demo_dry_run(&profile)?;
    demo_queries(&options)?;

    println!("Session demo completed successfully!");
    Ok(())
}

fn report(device: &str, profile: &ConfigurationProfile, result: &sa818::session::SessionResult) {
    let text = TextFormatter::with_replies().format_report(&SessionReport {
        device,
        profile,
        result,
    });
    println!("{}", text);
}

fn demo_healthy_module(
    profile: &ConfigurationProfile,
    options: &RunOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Healthy Module ---");

    let mut mock = MockChannel::new();
    let result = run_session(Some(&mut mock), profile, options)?;
    report("mock", profile, &result);

    println!("Commands on the wire:");
    for command in mock.sent_commands() {
        println!("  {}", command.trim_end());
    }
    println!();
    Ok(())
}

fn demo_rejected_volume(
    profile: &ConfigurationProfile,
    options: &RunOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Rejected Volume ---");

    let mut mock = MockChannel::new();
    mock.push_reply("+DMOCONNECT:0")
        .push_reply("+DMOSETGROUP:0")
        .push_reply("S=1")
        .push_reply("+DMOSETVOLUME:1");
    let result = run_session(Some(&mut mock), profile, options)?;
    report("mock", profile, &result);
    Ok(())
}

fn demo_silent_module(
    profile: &ConfigurationProfile,
    options: &RunOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Silent Module ---");

    let mut mock = MockChannel::silent();
    let result = run_session(Some(&mut mock), profile, options)?;
    report("mock", profile, &result);
    println!("Commands sent after failed handshake: {}\n", mock.get_sent_messages().len() - 1);
    Ok(())
}

fn demo_dry_run(profile: &ConfigurationProfile) -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Dry Run ---");

    let result = run_session(None, profile, &RunOptions::dry_run())?;
    report("dry run", profile, &result);
    Ok(())
}

fn demo_queries(options: &RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    println!("--- Module Queries ---");

    let mut mock = MockChannel::new();
    mock.set_rssi(87);
    mock.set_firmware_version("SA818_V5.0");

    if let Some(version) = query_version(Some(&mut mock), options)? {
        println!("Firmware: {}", version);
    }
    if let Some(rssi) = query_rssi(Some(&mut mock), options)? {
        println!("RSSI: {}", rssi);
    }
    println!();
    Ok(())
}
