use led_remote::domain::controller::Controller;
use led_remote::domain::error::LifecycleError;
use led_remote::domain::presenter::Presenter;
use led_remote::domain::settings::SettingsService;
use led_remote::infrastructure::bridge::btleplug::BtleplugBridge;
use led_remote::infrastructure::logging;
use led_remote::presentation::console::ConsolePresenter;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings_service = SettingsService::new()?;
    let settings = settings_service.get().clone();
    let _logging_guard = logging::init_logger(&settings.log_settings)?;
    info!("starting led-remote");

    let mut presenter = ConsolePresenter::new();
    let bridge = match BtleplugBridge::new(settings.selection_config()?).await {
        Ok(bridge) => bridge,
        Err(err) => {
            let err = LifecycleError::Init(err);
            presenter.show_error(err.code(), err.message(), false);
            return Err(err.into());
        }
    };

    let (controller, handle) = Controller::new(bridge, presenter, settings.controller_config()?);

    // Command loop: `led` toggles, `reconnect` restarts the lifecycle,
    // `quit` exits.
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match line.trim() {
                "led" => handle.toggle_led(),
                "reconnect" => handle.reconnect(),
                "quit" | "exit" => {
                    handle.shutdown();
                    break;
                }
                "" => {}
                other => eprintln!("unknown command: {other} (led | reconnect | quit)"),
            }
        }
    });

    controller.run().await?;
    Ok(())
}
