//! Static queue binding configuration.
//!
//! One binding per transformation kind plus the shared status queue.
//! The table is built once at startup and read-only for the process
//! lifetime.

use std::collections::HashMap;

use picflow_entity::transformation::TransformationType;

/// Declarative binding of a logical queue name to a broker queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueBinding {
    /// Logical client name (e.g. `ROTATE_QUEUE`).
    pub name: &'static str,
    /// Broker queue the payloads land on.
    pub queue_name: &'static str,
    /// Whether the queue survives broker restarts.
    pub durable: bool,
    /// Maximum unacknowledged deliveries held concurrently.
    pub prefetch_count: u16,
}

/// The shared queue workers report status on.
pub const STATUS_QUEUE: QueueBinding = QueueBinding {
    name: "STATUS_QUEUE",
    queue_name: "status_queue",
    durable: true,
    prefetch_count: 5,
};

/// Immutable lookup table from transformation kind to queue binding.
#[derive(Debug, Clone)]
pub struct BindingTable {
    bindings: HashMap<TransformationType, QueueBinding>,
}

impl BindingTable {
    /// The standard table covering every known transformation kind.
    pub fn standard() -> Self {
        let mut bindings = HashMap::new();
        bindings.insert(
            TransformationType::Rotate,
            QueueBinding {
                name: "ROTATE_QUEUE",
                queue_name: "rotate_queue",
                durable: true,
                prefetch_count: 5,
            },
        );
        bindings.insert(
            TransformationType::Resize,
            QueueBinding {
                name: "RESIZE_QUEUE",
                queue_name: "resize_queue",
                durable: true,
                prefetch_count: 5,
            },
        );
        bindings.insert(
            TransformationType::ForceResize,
            QueueBinding {
                name: "FORCE_RESIZE_QUEUE",
                queue_name: "force_resize_queue",
                durable: true,
                prefetch_count: 5,
            },
        );
        bindings.insert(
            TransformationType::Convert,
            QueueBinding {
                name: "CONVERT_QUEUE",
                queue_name: "convert_queue",
                durable: true,
                prefetch_count: 5,
            },
        );
        Self { bindings }
    }

    /// Look up the binding for a transformation kind.
    ///
    /// `None` means the table and the intake disagree about the known
    /// kinds — a configuration/version mismatch, fatal for the job.
    pub fn get(&self, kind: TransformationType) -> Option<&QueueBinding> {
        self.bindings.get(&kind)
    }
}

impl Default for BindingTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_is_exhaustive() {
        let table = BindingTable::standard();
        for kind in TransformationType::ALL {
            assert!(table.get(kind).is_some(), "missing binding for {kind}");
        }
    }

    #[test]
    fn test_convert_binds_to_convert_queue() {
        let table = BindingTable::standard();
        let binding = table.get(TransformationType::Convert).unwrap();
        assert_eq!(binding.queue_name, "convert_queue");
        assert_eq!(binding.name, "CONVERT_QUEUE");
    }

    #[test]
    fn test_all_bindings_durable_with_prefetch_five() {
        let table = BindingTable::standard();
        for kind in TransformationType::ALL {
            let binding = table.get(kind).unwrap();
            assert!(binding.durable);
            assert_eq!(binding.prefetch_count, 5);
        }
        assert!(STATUS_QUEUE.durable);
        assert_eq!(STATUS_QUEUE.prefetch_count, 5);
    }
}
