//! Stable identifiers for program entities.
//!
//! Every entity lives in a `Vec` owned by the `Program` and is addressed by
//! its index. Ids stay valid across mutation, so the refactoring core can
//! hold them while it rewrites the program.

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Sentinel for "no entity".
            pub const NONE: Self = Self(u32::MAX);

            #[inline]
            pub const fn is_none(self) -> bool {
                self.0 == u32::MAX
            }

            #[inline]
            pub const fn is_some(self) -> bool {
                self.0 != u32::MAX
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub(crate) fn from_len(len: usize) -> Self {
                Self(len as u32)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

define_id!(
    /// A module (project / assembly) grouping types.
    ModuleId
);
define_id!(
    /// A class or interface.
    TypeId
);
define_id!(
    /// The identity of a declared method, independent of its syntax.
    SymbolId
);
define_id!(
    /// One syntactic declaration of a method symbol.
    DeclId
);
define_id!(
    /// A node in the body arena.
    NodeIndex
);
