use std::time::Duration;

use tikmap_api::Entity;
use tikmap_api::executor::CommandExecutor;
use tikmap_engine::load_with_duration;

use crate::cmd::print_entity;
use crate::config::{EntityKind, ReplayConfig, WatchArgs};
use crate::entities::{Interface, IpAddress, SystemResource};
use crate::error::ReplayError;
use crate::executor::ReplayExecutor;

pub async fn run(args: WatchArgs) -> Result<(), ReplayError> {
    let config = ReplayConfig::load(&args.fixture.config)?;
    tracing::info!(
        config = %args.fixture.config,
        command = %config.command,
        seconds = args.seconds,
        "watching replay"
    );

    let executor = ReplayExecutor::from_config(&config);
    let duration = Duration::from_secs(args.seconds);

    match args.fixture.entity {
        EntityKind::Interface => watch::<Interface>(executor, duration).await,
        EntityKind::Address => watch::<IpAddress>(executor, duration).await,
        EntityKind::Resource => watch::<SystemResource>(executor, duration).await,
    }
}

async fn watch<T: Entity>(executor: ReplayExecutor, duration: Duration) -> Result<(), ReplayError> {
    let command = executor.command().to_string();
    let entities: Vec<T> =
        tokio::task::spawn_blocking(move || load_with_duration::<T>(&executor, duration)).await??;

    for entity in &entities {
        print_entity(entity, &command)?;
    }
    tracing::info!(command = %command, count = entities.len(), "watch finished");
    Ok(())
}
