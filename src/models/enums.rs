/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        $(#[$meta])*
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::db::DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err($crate::db::DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

pub(crate) use str_enum;

str_enum!(
    #[serde(rename_all = "lowercase")]
    TranscriptRole {
        User => "user",
        Assistant => "assistant",
    }
);

str_enum!(Severity {
    Mild => "Mild",
    Moderate => "Moderate",
    Severe => "Severe",
    Critical => "Critical",
});

impl Severity {
    /// All permitted severity levels, least to most severe.
    pub const ALL: [Severity; 4] = [
        Severity::Mild,
        Severity::Moderate,
        Severity::Severe,
        Severity::Critical,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DatabaseError;
    use std::str::FromStr;

    #[test]
    fn transcript_role_round_trip() {
        for (variant, s) in [
            (TranscriptRole::User, "user"),
            (TranscriptRole::Assistant, "assistant"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(TranscriptRole::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn transcript_role_serializes_lowercase() {
        let json = serde_json::to_string(&TranscriptRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        let role: TranscriptRole = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, TranscriptRole::User);
    }

    #[test]
    fn severity_labels_are_capitalized() {
        assert_eq!(Severity::Critical.as_str(), "Critical");
        assert_eq!(
            serde_json::to_string(&Severity::Moderate).unwrap(),
            "\"Moderate\""
        );
    }

    #[test]
    fn severity_ordering_is_least_to_most() {
        assert_eq!(Severity::ALL.first(), Some(&Severity::Mild));
        assert_eq!(Severity::ALL.last(), Some(&Severity::Critical));
    }

    #[test]
    fn unknown_value_is_invalid_enum() {
        let err = Severity::from_str("Unbearable").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidEnum { .. }));
    }
}
