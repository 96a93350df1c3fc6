use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tikmap_api::Entity;
use tikmap_api::executor::CommandExecutor;
use tikmap_engine::{AsyncLoad, StreamOutcome};

use crate::cmd::print_entity;
use crate::config::{EntityKind, ReplayConfig, StreamArgs};
use crate::entities::{Interface, IpAddress, SystemResource};
use crate::error::ReplayError;
use crate::executor::ReplayExecutor;

pub async fn run(args: StreamArgs) -> Result<(), ReplayError> {
    let config = ReplayConfig::load(&args.fixture.config)?;
    tracing::info!(config = %args.fixture.config, command = %config.command, "streaming replay");

    let executor = Arc::new(ReplayExecutor::from_config(&config));

    let outcome = match args.fixture.entity {
        EntityKind::Interface => stream::<Interface>(executor, args.cancel_after).await?,
        EntityKind::Address => stream::<IpAddress>(executor, args.cancel_after).await?,
        EntityKind::Resource => stream::<SystemResource>(executor, args.cancel_after).await?,
    };
    tracing::info!(outcome = ?outcome, "stream finished");
    Ok(())
}

async fn stream<T: Entity>(
    executor: Arc<ReplayExecutor>,
    cancel_after: Option<usize>,
) -> Result<StreamOutcome, ReplayError> {
    let command = executor.command().to_string();
    let load = AsyncLoad::<T>::new();
    let canceller = load.canceller();
    let received = Arc::new(AtomicUsize::new(0));

    let item_command = command.clone();
    let item_count = received.clone();
    let handle = load
        .executor(executor)
        .on_item(move |entity: T| {
            if let Err(e) = print_entity(&entity, &item_command) {
                tracing::error!(error = %e, "failed to print entity");
            }
            let n = item_count.fetch_add(1, Ordering::SeqCst) + 1;
            if cancel_after.is_some_and(|limit| n >= limit) {
                tracing::info!(items = n, "item limit reached, cancelling");
                canceller.cancel();
            }
        })
        .on_error(|e| tracing::warn!(error = %e, "stream error"))
        .on_done(|| tracing::debug!("device reported done"))
        .start()?;

    let stop = handle.canceller();
    let join = handle.join();
    tokio::pin!(join);

    let outcome = tokio::select! {
        outcome = &mut join => outcome,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("interrupt received, cancelling");
            stop.cancel();
            join.await
        }
    };

    tracing::info!(command = %command, items = received.load(Ordering::SeqCst), "stream closed");
    Ok(outcome)
}
