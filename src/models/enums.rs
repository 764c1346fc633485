use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid {field} value: {value}")]
    InvalidEnum { field: String, value: String },
}

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Variants are listed in their canonical order, exposed as `ALL`.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

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
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

// Declaration order is the output order of a change reason.
str_enum!(ChangeLabel {
    Dose => "Dose changed",
    Quantity => "Quantity changed",
    Frequency => "Frequency changed",
    TimeOfDay => "Time of day changed",
    Route => "Route changed",
    Form => "Form changed",
    Formulation => "Formulation changed",
    BrandGeneric => "Brand/Generic changed",
    Indication => "Indication changed",
    Administration => "Administration changed",
    Refills => "Refills changed",
    Prn => "PRN changed",
});

str_enum!(TimeSlot {
    Morning => "morning",
    Noon => "noon",
    Afternoon => "afternoon",
    Evening => "evening",
    Bedtime => "bedtime",
});
