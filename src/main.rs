use std::sync::Arc;
use tracing::{error, info, warn};
use winit::event_loop::EventLoop;
use roomcast::app::RoomApp;
use roomcast::assets::ModelLoader;
use roomcast::audio::VolumeMixer;
use roomcast::config::{load_room_settings, RoomSettings};
use roomcast::networking::{presence_channel, pump_lines};
use roomcast::rendering::FirstPersonViewpoint;
use roomcast::room::Room;
use roomcast::utils::logging::{init_logging, log_system_info};

fn main() -> anyhow::Result<()> {
    init_logging()?;
    log_system_info();

    // An explicit settings file wins over the saved one
    let settings = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading settings from {}", path);
            RoomSettings::from_toml_file(&path)?
        }
        None => load_room_settings().unwrap_or_else(|| {
            warn!("No saved settings, using defaults");
            RoomSettings::default()
        }),
    };
    settings.validate()?;

    let runtime = tokio::runtime::Runtime::new()?;
    let (sender, receiver) = presence_channel();
    runtime.spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        if let Err(e) = pump_lines(stdin, sender).await {
            error!("Presence feed failed: {}", e);
        }
    });

    let loader = Arc::new(ModelLoader::new(settings.assets.root.clone()));
    let mut room = Room::new(
        &settings,
        FirstPersonViewpoint::from_settings(&settings.camera),
        VolumeMixer::new(&settings.audio),
        receiver,
    )
    .with_assets(loader, runtime.handle().clone());
    room.furnish(&settings.furniture);

    let event_loop = EventLoop::new()?;
    let mut app = RoomApp::new(room, format!("{} {}", roomcast::APP_NAME, roomcast::VERSION));
    event_loop.run_app(&mut app)?;

    info!("Shutting down");
    // The stdin reader sits on a blocking thread; don't wait for it
    runtime.shutdown_background();
    Ok(())
}
