//! Arena identifiers.
//!
//! Every cross-referenced entity (source files, models, issue boxes) lives in
//! an arena owned by the [`Megamodel`](crate::megamodel::Megamodel) context and
//! is referred to by a small copyable id. This keeps the import graph — which
//! may be cyclic — free of ownership cycles.

macro_rules! arena_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub fn new(index: u32) -> Self {
                Self(index)
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

arena_id!(
    /// Identifies one physical source file in the source registry.
    SourceId
);

arena_id!(
    /// Identifies one semantic model in the model arena.
    ModelId
);

arena_id!(
    /// Identifies one issue box in the issue store.
    BoxId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_distinct_types() {
        let s = SourceId::new(3);
        let m = ModelId::new(3);
        assert_eq!(s.index(), m.index());
        assert_eq!(s, SourceId::new(3));
        assert_ne!(s, SourceId::new(4));
    }

    #[test]
    fn test_display() {
        assert_eq!(BoxId::new(7).to_string(), "BoxId(7)");
    }
}
