pub mod load;
pub mod stream;
pub mod watch;

use tikmap_api::Entity;

use crate::error::ReplayError;

/// Print one entity as a JSON line: the dematerialized record, fields in
/// mapping order.
pub fn print_entity<T: Entity>(entity: &T, command: &str) -> Result<(), ReplayError> {
    let record = tikmap_engine::dematerialize(entity, command);
    println!("{}", serde_json::to_string(&record)?);
    Ok(())
}
