//! Watch marker macros
//!
//! Declarative macro that stamps out one marker type per event kind.

/// Define a [`Watch`](crate::Watch) marker type
///
/// Generates:
/// - A zero-sized marker struct
/// - The `Watch` implementation binding kind, payload type and `Payload` variant
/// - The payload used for a `null` body
///
/// # Usage
/// ```ignore
/// define_watch!(
///     /// Single key change
///     KeyWatch,              // Marker name
///     EventKind::Key,        // Event kind
///     Option<KvPair>,        // Payload type
///     Key,                   // `Payload` variant
///     None                   // Payload for a `null` body
/// );
/// ```
macro_rules! define_watch {
    (
        $(#[$meta:meta])*
        $watch_name:ident,
        $kind:expr,
        $payload:ty,
        $variant:ident,
        $on_null:expr
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $watch_name;

        impl $crate::watch::Watch for $watch_name {
            type Payload = $payload;

            const KIND: contracts::EventKind = $kind;

            fn on_null() -> Self::Payload {
                $on_null
            }

            fn into_payload(payload: Self::Payload) -> $crate::payload::Payload {
                $crate::payload::Payload::$variant(payload)
            }
        }
    };
}
