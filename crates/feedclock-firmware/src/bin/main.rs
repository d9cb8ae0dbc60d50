#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_net::dns::DnsSocket;
use embassy_net::tcp::client::{TcpClient, TcpClientState};
use embassy_net::{Stack, StackResources};
use embassy_time::{Delay, Duration, Timer};
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::rng::Rng;
use esp_hal::timer::timg::TimerGroup;
use log::{error, info};

// Display-LCD panel specific imports
use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::spi::master::{Config as SpiConfig, Spi};
use mipidsi::interface::SpiInterface;
use mipidsi::{Builder as MipidsiBuilder, models::ILI9342CRgb565};

use feedclock_core::app::{FeedClockApp, TICK_INTERVAL_MS};
use feedclock_core::app_state::{AppError, error_message};
use feedclock_core::display_manager::DisplayManager;
use feedclock_core::peripherals::{Backlight, FeedDisplay};
use feedclock_core::ui::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX, MAX_BRIGHTNESS};
use feedclock_firmware::aio_client::{AioClient, HttpBuffers, TCP_BUFFER_SIZE};
use feedclock_firmware::ambient::Bh1750Ambient;
use feedclock_firmware::backlight::AxpBacklight;
use feedclock_firmware::clock::EmbassyClock;
use feedclock_firmware::hardware::{create_i2c_bus, init_i2c_hardware};
use feedclock_firmware::network::{connect_wifi, net_task, wait_for_ip};
use feedclock_firmware::secrets;
use feedclock_firmware::touch::Ft6336uTouch;

/// How long the error screen stays up before the board restarts
const RESTART_DELAY: Duration = Duration::from_secs(10);

macro_rules! mk_static {
    ($t:ty,$val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write(($val));
        x
    }};
}

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 73744);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Embassy initialized");

    // I2C: power rails first, the panel and touch controller hang off them
    let board = match create_i2c_bus(peripherals.I2C0, peripherals.GPIO12, peripherals.GPIO11) {
        Ok(bus) => init_i2c_hardware(bus).await,
        Err(e) => Err(e),
    };
    let board = match board {
        Ok(board) => board,
        Err(e) => {
            // Without the power rails there is no panel to report on
            error!("Board bring-up failed: {}", e);
            restart().await
        }
    };

    // 1. Configure SPI bus
    let spi_bus = Spi::new(peripherals.SPI2, SpiConfig::default())
        .expect("Failed to create SPI bus")
        .with_sck(peripherals.GPIO36)
        .with_mosi(peripherals.GPIO37);

    // 2. Create a dummy CS pin (we don't use hardware CS for this display)
    let cs = Output::new(peripherals.GPIO35, Level::High, OutputConfig::default());

    // 3. Wrap the SPI bus as a SPI device (required by embedded-hal traits)
    let spi_device = ExclusiveDevice::new_no_delay(spi_bus, cs).expect("Failed to wrap SPI bus");

    // 4. Set up DC (Data/Command) pin
    let dc = Output::new(peripherals.GPIO34, Level::Low, OutputConfig::default());

    // 5. Create a buffer for SPI batching (larger = faster, uses more RAM)
    let spi_buffer = mk_static!([u8; 512], [0u8; 512]);

    // 6. Create display interface
    let di = SpiInterface::new(spi_device, dc, spi_buffer);

    // 7. Build and initialize the display driver
    let panel = MipidsiBuilder::new(ILI9342CRgb565, di)
        .display_size(DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX)
        .init(&mut Delay)
        .expect("Failed to initialize display");
    info!("Display initialized");

    let mut backlight = AxpBacklight::new(board.power_mgmt);
    if let Err(e) = backlight.set_brightness(MAX_BRIGHTNESS).await {
        error!("Backlight init failed: {:?}", e);
    }
    let ambient = Bh1750Ambient::new(board.light);
    let mut display = DisplayManager::new(panel, backlight, ambient, Delay);

    match connect(spawner, peripherals.WIFI).await {
        Ok(stack) => {
            let tcp_state = mk_static!(
                TcpClientState<1, TCP_BUFFER_SIZE, TCP_BUFFER_SIZE>,
                TcpClientState::new()
            );
            let tcp_client = mk_static!(
                TcpClient<'static, 1, TCP_BUFFER_SIZE, TCP_BUFFER_SIZE>,
                TcpClient::new(stack, tcp_state)
            );
            let dns_socket = mk_static!(DnsSocket<'static>, DnsSocket::new(stack));
            let buffers = mk_static!(HttpBuffers, HttpBuffers::new());

            let config = secrets::config();
            let mut aio =
                AioClient::new(tcp_client, dns_socket, &config.cloud, buffers, Rng::new());

            match aio.fetch_time().await {
                Ok(now) => {
                    let clock = EmbassyClock::synced_now(&now);
                    let touch = Ft6336uTouch::new(board.touch);
                    let mut app = FeedClockApp::new(clock, touch, display, aio);
                    // The app has already put its own error on screen
                    if let Err(e) = app.run(&mut Delay, TICK_INTERVAL_MS).await {
                        error!("Feed clock stopped: {}", e);
                    }
                }
                Err(e) => report(&mut display, e).await,
            }
        }
        Err(e) => report(&mut display, e).await,
    }

    restart().await
}

/// Validate the credentials, join Wi-Fi and wait for an address.
async fn connect(
    spawner: Spawner,
    wifi: esp_hal::peripherals::WIFI<'static>,
) -> Result<Stack<'static>, AppError> {
    let config = secrets::config();
    config.validate().map_err(AppError::network)?;

    let radio = mk_static!(
        esp_radio::Controller<'static>,
        esp_radio::init().map_err(|e| AppError::network(format_args!("{:?}", e)))?
    );
    let (mut controller, interfaces) = esp_radio::wifi::new(radio, wifi, Default::default())
        .map_err(|e| AppError::network(format_args!("{:?}", e)))?;

    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;
    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        embassy_net::Config::dhcpv4(Default::default()),
        mk_static!(StackResources<3>, StackResources::<3>::new()),
        seed,
    );
    spawner
        .spawn(net_task(runner))
        .map_err(|_| AppError::network("net task already running"))?;

    // The controller has to outlive this function for the link to stay up
    let controller = mk_static!(esp_radio::wifi::WifiController<'static>, controller);
    connect_wifi(controller, &config.internet).await?;
    wait_for_ip(stack).await?;
    Ok(stack)
}

/// Put a boot-time failure on the error screen.
async fn report<D: FeedDisplay>(display: &mut D, err: AppError) {
    error!("Startup failed: {}", err);
    if let Err(e) = display.show_error(&error_message(&err)).await {
        error!("Could not show error screen: {:?}", e);
    }
}

async fn restart() -> ! {
    info!("Restarting in {} s", RESTART_DELAY.as_secs());
    Timer::after(RESTART_DELAY).await;
    esp_hal::system::software_reset()
}
