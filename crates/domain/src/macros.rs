//! Macro for implementing Display and FromStr for wire enums
//!
//! Remote services are inconsistent about casing (`"cosine"`, `"Cosine"`,
//! `"COSINE"`), so parsing is case-insensitive while Display always emits the
//! canonical wire form given in the mapping.
//!
//! # Example
//!
//! ```rust
//! use pinesync_domain::impl_wire_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Tier {
//!     Starter,
//!     Standard,
//! }
//!
//! impl_wire_enum_conversions!(Tier {
//!     Starter => "starter",
//!     Standard => "Standard",
//! });
//!
//! assert_eq!("STANDARD".parse::<Tier>().unwrap(), Tier::Standard);
//! assert_eq!(Tier::Standard.to_string(), "Standard");
//! ```

/// Implements Display and FromStr for a fieldless enum.
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of variants to their canonical wire string
#[macro_export]
macro_rules! impl_wire_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical wire representation.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
