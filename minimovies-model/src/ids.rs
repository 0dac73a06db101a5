use std::{fmt, str::FromStr};

use uuid::Uuid;

use crate::error::ModelError;

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize),
            serde(transparent)
        )]
        #[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            pub fn to_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = ModelError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(ModelError::InvalidId(format!(
                        "{} cannot be empty",
                        $label
                    )));
                }
                Uuid::parse_str(trimmed).map(Self).map_err(|err| {
                    ModelError::InvalidId(format!("{} {trimmed:?}: {err}", $label))
                })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

typed_id!(
    /// Identifier of an authenticated account, issued by the auth provider.
    UserId,
    "user id"
);

typed_id!(
    /// Identifier of a catalog movie.
    MovieId,
    "movie id"
);

typed_id!(
    /// Identifier of a single review row.
    ReviewId,
    "review id"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hyphenated_uuid() {
        let raw = "6f1c2a9e-4b7d-4c1e-9a51-0d2f8b3c7e10";
        let id: MovieId = raw.parse().unwrap();
        assert_eq!(id.to_string(), raw);
    }

    #[test]
    fn rejects_empty_and_garbage() {
        assert!(matches!(
            "".parse::<MovieId>(),
            Err(ModelError::InvalidId(_))
        ));
        assert!(matches!(
            "   ".parse::<UserId>(),
            Err(ModelError::InvalidId(_))
        ));
        assert!("not-a-uuid".parse::<ReviewId>().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_as_plain_string() {
        let id = UserId(Uuid::nil());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }
}
