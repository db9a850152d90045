use serde::{Deserialize, Serialize};

/// Error returned when a wire string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {field} value: {value}")]
pub struct ParseEnumError {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
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

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ParseEnumError {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(
    /// Author of a chat message, as understood by OpenAI-compatible endpoints.
    Role {
        System => "system",
        User => "user",
        Assistant => "assistant",
        Tool => "tool",
    }
);

str_enum!(
    /// Reader the answer is shaped for.
    Audience {
        Doctor => "doctor",
        Patient => "patient",
    }
);

str_enum!(
    /// Response language, detected from the script of the user's input.
    Language {
        Ja => "ja",
        Zh => "zh",
        Ko => "ko",
        En => "en",
    }
);

impl Default for Audience {
    fn default() -> Self {
        Self::Patient
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::Ja
    }
}

impl Language {
    /// Language whose checklists and templates apply.
    ///
    /// Only Japanese and Chinese tables exist; everything else is served
    /// with the Japanese ones.
    pub fn checklist_language(self) -> Language {
        match self {
            Language::Zh => Language::Zh,
            _ => Language::Ja,
        }
    }
}
