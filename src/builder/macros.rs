//! Macros for declaring state and event enums.

/// Declare a unit enum and implement [`State`](crate::core::State) for it.
///
/// The `root:` clause names the reserved top-level variant.
///
/// # Example
///
/// ```
/// use lineage::core::State;
/// use lineage::state_enum;
///
/// state_enum! {
///     pub enum Player {
///         Root,
///         Stopped,
///         Playing,
///     }
///     root: Root
/// }
///
/// assert!(Player::Root.is_root());
/// assert_eq!(Player::Playing.name(), "Playing");
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
        root: $root:ident
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            fn root() -> Self {
                Self::$root
            }
        }
    };
}

/// Declare a unit enum and implement [`Event`](crate::core::Event) for it.
///
/// # Example
///
/// ```
/// use lineage::core::Event;
/// use lineage::event_enum;
///
/// event_enum! {
///     pub enum Command { Play, Pause, Stop }
/// }
///
/// assert_eq!(Command::Pause.name(), "Pause");
/// ```
#[macro_export]
macro_rules! event_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::Event for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}
