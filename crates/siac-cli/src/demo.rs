//! Scripted session against the mock reader.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Days, Local, Months, NaiveDate};
use siac_core::CardReading;
use siac_hardware::mock::MockReader;
use siac_hardware::{ConfigurationOutcome, DeviceEndpoint, ProductFamily, StationConfiguration};
use siac_monitor::{Monitor, MonitorConfig};
use tokio::time::sleep;
use tracing::info;

use crate::console::ConsoleSink;

/// Pause between scripted readouts.
const READOUT_INTERVAL: Duration = Duration::from_millis(1500);

/// Battery date `months` months and `days` days before `today`.
fn battery_date(today: NaiveDate, months: u32, days: u64) -> NaiveDate {
    today
        .checked_sub_months(Months::new(months))
        .and_then(|date| date.checked_sub_days(Days::new(days)))
        .unwrap_or(today)
}

/// Readings covering each verdict a card can get.
fn scripted_readings(today: NaiveDate) -> Vec<CardReading> {
    let due_in_30_days = today
        .checked_sub_months(Months::new(36))
        .and_then(|date| date.checked_add_days(Days::new(30)))
        .unwrap_or(today);

    vec![
        CardReading::new("8001234", 3.05, 2.5, battery_date(today, 12, 0)),
        CardReading::new("8004711", 2.65, 2.5, due_in_30_days),
        CardReading::new("2001122", 2.41, 2.5, battery_date(today, 36, 1)),
    ]
}

/// Run the demo session.
pub async fn run(json: bool, clear_after: Duration) -> Result<()> {
    let (reader, device) = MockReader::new();
    device.set_endpoints(vec![
        DeviceEndpoint::serial(0, "/dev/ttyUSB0").with_display_name("SPORTident BSM8-USB"),
    ]);
    device.set_configuration(ConfigurationOutcome::Read(StationConfiguration::master(
        ProductFamily::Bs8SiMaster,
        501_234,
    )));

    let config = MonitorConfig::default().with_clear_after(clear_after);
    let handle = Monitor::builder(reader, ConsoleSink::new(json))
        .config(config)
        .build()?
        .start();

    let endpoint = handle
        .snapshot()
        .await?
        .default_endpoint
        .context("simulated station lists no endpoint")?;
    handle.connect(endpoint).await?;
    info!("Demo connected, replaying readouts");

    for reading in scripted_readings(Local::now().date_naive()) {
        sleep(READOUT_INTERVAL).await;
        device.read_card(reading).await?;
    }

    sleep(clear_after + Duration::from_millis(100)).await;
    device.unplug().await?;

    // The snapshot reply is queued behind the unplug, so the disconnect has
    // been handled once it arrives.
    let snapshot = handle.snapshot().await?;
    info!(
        "Demo finished: connection {:?}, verdict on display: {}",
        snapshot.connection_state,
        snapshot.current_verdict.is_some()
    );

    handle.shutdown().await?;
    Ok(())
}
