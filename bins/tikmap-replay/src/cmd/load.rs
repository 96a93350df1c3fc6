use tikmap_api::Entity;
use tikmap_api::executor::CommandExecutor;
use tikmap_engine::{load_list, load_single, load_single_or_default};

use crate::cmd::print_entity;
use crate::config::{EntityKind, LoadArgs, ReplayConfig};
use crate::entities::{Interface, IpAddress, SystemResource};
use crate::error::ReplayError;
use crate::executor::ReplayExecutor;

#[derive(Debug, Clone, Copy)]
enum Cardinality {
    Any,
    Single,
    SingleOrDefault,
}

pub async fn run(args: LoadArgs) -> Result<(), ReplayError> {
    let config = ReplayConfig::load(&args.fixture.config)?;
    tracing::info!(config = %args.fixture.config, command = %config.command, "loaded replay");

    let executor = ReplayExecutor::from_config(&config);
    let cardinality = if args.single {
        Cardinality::Single
    } else if args.single_or_default {
        Cardinality::SingleOrDefault
    } else {
        Cardinality::Any
    };

    match args.fixture.entity {
        EntityKind::Interface => load::<Interface>(executor, cardinality).await,
        EntityKind::Address => load::<IpAddress>(executor, cardinality).await,
        EntityKind::Resource => load::<SystemResource>(executor, cardinality).await,
    }
}

async fn load<T: Entity>(executor: ReplayExecutor, cardinality: Cardinality) -> Result<(), ReplayError> {
    let command = executor.command().to_string();
    let entities: Vec<T> = tokio::task::spawn_blocking(move || match cardinality {
        Cardinality::Any => load_list::<T>(&executor),
        Cardinality::Single => load_single::<T>(&executor).map(|e| vec![e]),
        Cardinality::SingleOrDefault => load_single_or_default::<T>(&executor).map(|e| vec![e]),
    })
    .await??;

    for entity in &entities {
        print_entity(entity, &command)?;
    }
    tracing::info!(command = %command, count = entities.len(), mode = ?cardinality, "load finished");
    Ok(())
}
