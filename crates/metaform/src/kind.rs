//! block kinds
//!
//! Every [crate::block::Block] belongs to exactly one [Kind]. The kind decides how many identifiers a block takes
//! (its valence), which keyword starts its header and how it is addressed by references.

/// All known block kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Variable,
    Data,
    Module,
    Resource,
    Property,
    Map,
    Output,
    Provider,
}

impl Kind {
    pub const ALL: [Kind; 8] = [
        Kind::Variable,
        Kind::Data,
        Kind::Module,
        Kind::Resource,
        Kind::Property,
        Kind::Map,
        Kind::Output,
        Kind::Provider,
    ];

    /// Number of positional identifiers a block of this kind requires
    pub fn valence(self) -> usize {
        match self {
            Kind::Data | Kind::Resource => 2,
            Kind::Variable | Kind::Module | Kind::Property | Kind::Output | Kind::Provider => 1,
            Kind::Map => 0,
        }
    }

    /// Header keyword
    pub fn keyword(self) -> &'static str {
        match self {
            Kind::Variable => "variable",
            Kind::Data => "data",
            Kind::Module => "module",
            Kind::Resource => "resource",
            Kind::Property => "property",
            Kind::Map => "",
            Kind::Output => "output",
            Kind::Provider => "provider",
        }
    }

    /// Prefix used when the block is addressed
    ///
    /// `var.region` refers to `variable "region"`.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Kind::Variable => "var",
            kind => kind.keyword(),
        }
    }

    /// Whether references to blocks of this kind create an ordering constraint
    pub fn is_addressable(self) -> bool {
        matches!(
            self,
            Kind::Variable | Kind::Data | Kind::Module | Kind::Resource | Kind::Output
        )
    }

    /// Whether blocks of this kind are emitted as top-level blocks of a document
    ///
    /// Properties and maps only ever appear inside other blocks.
    pub fn is_scheduled(self) -> bool {
        !matches!(self, Kind::Property | Kind::Map)
    }

    /// Whether blocks of this kind are stored in the registry
    ///
    /// Maps are anonymous.
    pub fn is_registered(self) -> bool {
        self != Kind::Map
    }

    /// Emission order inside a single dependency layer
    pub fn priority(self) -> u8 {
        match self {
            Kind::Variable => 0,
            Kind::Data => 1,
            Kind::Resource => 2,
            Kind::Module => 3,
            Kind::Output => 4,
            Kind::Property | Kind::Map | Kind::Provider => 5,
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Map => f.write_str("map"),
            kind => f.write_str(kind.keyword()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn valence() {
        let valences: Vec<_> = Kind::ALL.iter().map(|kind| (*kind, kind.valence())).collect();
        assert_eq!(
            valences,
            vec![
                (Kind::Variable, 1),
                (Kind::Data, 2),
                (Kind::Module, 1),
                (Kind::Resource, 2),
                (Kind::Property, 1),
                (Kind::Map, 0),
                (Kind::Output, 1),
                (Kind::Provider, 1),
            ]
        );
    }

    #[test]
    fn variable_is_abbreviated() {
        assert_eq!(Kind::Variable.keyword(), "variable");
        assert_eq!(Kind::Variable.abbreviation(), "var");
        assert_eq!(Kind::Resource.abbreviation(), "resource");
        assert_eq!(Kind::Map.abbreviation(), "");
    }

    #[test]
    fn priority_order() {
        let mut kinds = Kind::ALL.to_vec();
        kinds.sort_by_key(|kind| kind.priority());
        assert_eq!(
            &kinds[..5],
            &[
                Kind::Variable,
                Kind::Data,
                Kind::Resource,
                Kind::Module,
                Kind::Output
            ]
        );
    }

    #[test]
    fn deserialize_lowercase() {
        let kind: Kind = serde_yaml::from_str("resource").unwrap();
        assert_eq!(kind, Kind::Resource);
    }
}
