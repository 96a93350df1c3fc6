use tikmap_api::mapping::{Entity, EntityMetadata};
use tikmap_api::record::ResponseRecord;

use crate::error::LoadError;
use crate::metadata::metadata;

/// Build one `T` from one record, using the cached metadata of `T`.
pub fn materialize<T: Entity>(record: &ResponseRecord) -> Result<T, LoadError> {
    materialize_with(&metadata::<T>(), record)
}

/// Build every record into a `T`, keeping arrival order.
///
/// The first failing record aborts the whole batch.
pub fn materialize_all<T: Entity>(records: &[ResponseRecord]) -> Result<Vec<T>, LoadError> {
    let metadata = metadata::<T>();
    records
        .iter()
        .map(|record| materialize_with(&metadata, record))
        .collect()
}

/// Build one `T` from one record with explicit metadata.
///
/// Mandatory keys must be present. An absent optional key falls back to the
/// declared default literal, or leaves the field at `T::default()` when none
/// was declared. Present values and default literals go through the field's
/// parser, so a malformed value is an error rather than a silent default.
pub fn materialize_with<T: Default>(
    metadata: &EntityMetadata<T>,
    record: &ResponseRecord,
) -> Result<T, LoadError> {
    let mut entity = T::default();
    for accessor in metadata.accessors() {
        let raw = if accessor.mandatory {
            record.get(accessor.key)?
        } else {
            match record.lookup(accessor.key).or(accessor.default) {
                Some(raw) => raw,
                None => continue,
            }
        };
        (accessor.set)(&mut entity, raw).map_err(|reason| LoadError::InvalidValue {
            field: accessor.key.to_string(),
            command: record.command().to_string(),
            value: raw.to_string(),
            reason,
        })?;
    }
    Ok(entity)
}

/// Render an entity back into a record, one field per accessor.
pub fn dematerialize<T: Entity>(entity: &T, command: impl Into<String>) -> ResponseRecord {
    let metadata = metadata::<T>();
    let mut record = ResponseRecord::new(command);
    for accessor in metadata.accessors() {
        record.insert(accessor.key, (accessor.get)(entity));
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use tikmap_api::Entity;

    #[derive(Entity, Default, Debug, Clone, PartialEq)]
    struct Interface {
        #[field(key = "name", mandatory)]
        name: String,
        #[field(key = "disabled", default = "false")]
        disabled: bool,
        #[field(default = "1500")]
        mtu: u16,
        #[field]
        comment: Option<String>,
    }

    fn record() -> ResponseRecord {
        ResponseRecord::new("/interface/print")
    }

    #[test]
    fn test_optional_fields_take_declared_default() {
        let iface: Interface = materialize(&record().with("name", "ether1")).unwrap();

        assert_eq!(
            iface,
            Interface {
                name: "ether1".to_string(),
                disabled: false,
                mtu: 1500,
                comment: None,
            }
        );
    }

    #[derive(Entity, Default, Debug, PartialEq)]
    struct Flags {
        #[field(mandatory)]
        name: String,
        #[field]
        running: bool,
        #[field]
        tx_queue: u32,
    }

    #[test]
    fn test_absent_optional_without_default_keeps_field_default() {
        let flags: Flags = materialize(&ResponseRecord::new("/x").with("name", "a")).unwrap();
        assert_eq!(
            flags,
            Flags {
                name: "a".to_string(),
                running: false,
                tx_queue: 0,
            }
        );

        let flags: Flags = materialize(
            &ResponseRecord::new("/x")
                .with("name", "a")
                .with("running", "yes")
                .with("tx-queue", "4"),
        )
        .unwrap();
        assert!(flags.running);
        assert_eq!(flags.tx_queue, 4);
    }

    #[test]
    fn test_present_values_override_defaults() {
        let iface: Interface = materialize(
            &record()
                .with("mtu", "9000")
                .with("disabled", "true")
                .with("comment", "uplink")
                .with("name", "sfp1"),
        )
        .unwrap();

        assert_eq!(iface.name, "sfp1");
        assert!(iface.disabled);
        assert_eq!(iface.mtu, 9000);
        assert_eq!(iface.comment.as_deref(), Some("uplink"));
    }

    #[test]
    fn test_missing_mandatory_field_is_error() {
        let err = materialize::<Interface>(&record().with("disabled", "true")).unwrap_err();

        match err {
            LoadError::MissingField { field, command } => {
                assert_eq!(field, "name");
                assert_eq!(command, "/interface/print");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_value_is_error() {
        let err = materialize::<Interface>(&record().with("name", "ether1").with("mtu", "jumbo"))
            .unwrap_err();

        assert!(matches!(
            err,
            LoadError::InvalidValue { ref field, ref value, .. } if field == "mtu" && value == "jumbo"
        ));
    }

    #[test]
    fn test_unmapped_keys_are_ignored() {
        let iface: Interface = materialize(
            &record().with("name", "ether1").with("rx-byte", "123").with(".id", "*1"),
        )
        .unwrap();
        assert_eq!(iface.name, "ether1");
    }

    #[test]
    fn test_materialize_is_deterministic() {
        let r = record().with("name", "ether2").with("disabled", "yes");
        let a: Interface = materialize(&r).unwrap();
        let b: Interface = materialize(&r).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_dematerialize_inverts_materialize() {
        let iface = Interface {
            name: "bridge".to_string(),
            disabled: true,
            mtu: 1500,
            comment: Some("lan".to_string()),
        };

        let rendered = dematerialize(&iface, "/interface/print");
        assert_eq!(rendered.get("disabled").unwrap(), "true");
        assert_eq!(rendered.get("mtu").unwrap(), "1500");

        let back: Interface = materialize(&rendered).unwrap();
        assert_eq!(back, iface);
    }

    #[test]
    fn test_materialize_all_keeps_order() {
        let records = vec![
            record().with("name", "ether1"),
            record().with("name", "ether2").with("disabled", "true"),
        ];

        let all: Vec<Interface> = materialize_all(&records).unwrap();
        let names: Vec<_> = all.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["ether1", "ether2"]);
        assert!(all[1].disabled);
    }
}
