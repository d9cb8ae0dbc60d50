//! Wi-Fi association and DHCP
//!
//! Joining the network happens once at boot. Failure is fatal: the caller
//! shows the error and restarts the board.

use embassy_net::{Runner, Stack};
use embassy_time::{Duration, Timer, with_timeout};
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiDevice};
use feedclock_core::app_state::AppError;
use feedclock_core::config::InternetConfig;
use log::info;

/// Time allowed for association
const CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

/// Time allowed for link-up plus a DHCP lease
const DHCP_TIMEOUT: Duration = Duration::from_secs(20);

const LINK_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Start the station interface and join the configured network.
pub async fn connect_wifi(
    controller: &mut WifiController<'static>,
    config: &InternetConfig<'_>,
) -> Result<(), AppError> {
    let client_config = ModeConfig::Client(
        ClientConfig::default()
            .with_ssid(config.ssid.into())
            .with_password(config.password.into()),
    );
    controller
        .set_config(&client_config)
        .map_err(|e| AppError::network(format_args!("{:?}", e)))?;

    info!("Starting WiFi");
    controller
        .start_async()
        .await
        .map_err(|e| AppError::network(format_args!("start: {:?}", e)))?;

    info!("Connecting to {}", config.ssid);
    match with_timeout(CONNECT_TIMEOUT, controller.connect_async()).await {
        Ok(Ok(())) => {
            info!("WiFi connected");
            Ok(())
        }
        Ok(Err(e)) => Err(AppError::network(format_args!("connect: {:?}", e))),
        Err(_) => Err(AppError::network("connect timed out")),
    }
}

/// Wait for the link to come up and DHCP to hand out an address.
pub async fn wait_for_ip(stack: Stack<'static>) -> Result<(), AppError> {
    let wait = async {
        while !stack.is_link_up() {
            Timer::after(LINK_POLL_INTERVAL).await;
        }
        loop {
            if let Some(config) = stack.config_v4() {
                info!("Got IP: {}", config.address);
                return;
            }
            Timer::after(LINK_POLL_INTERVAL).await;
        }
    };

    with_timeout(DHCP_TIMEOUT, wait)
        .await
        .map_err(|_| AppError::network("no DHCP lease"))
}

#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}
