//! Macro for implementing string conversions on wire enums
//!
//! Issue status, category, priority and the deployment environment all travel
//! as lowercase strings: in JSON bodies (through serde) and in query strings
//! (through `Display`). This macro keeps the two spellings in one place.
//!
//! # Example
//!
//! ```rust
//! use civic_domain::impl_wire_str_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Shift {
//!     Day,
//!     Night,
//! }
//!
//! impl_wire_str_conversions!(Shift {
//!     Day => "day",
//!     Night => "night",
//! });
//!
//! assert_eq!(Shift::Night.as_str(), "night");
//! assert_eq!("DAY".parse::<Shift>(), Ok(Shift::Day));
//! ```

/// Implements `as_str`, `Display` and `FromStr` for a unit-only enum.
///
/// Parsing is case-insensitive; output is always the given spelling.
#[macro_export]
macro_rules! impl_wire_str_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Wire spelling of this value
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = ::std::string::String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => ::std::result::Result::Ok(Self::$variant),)+
                    _ => ::std::result::Result::Err(::std::format!(
                        "Invalid {}: {}",
                        stringify!($enum_name),
                        s
                    )),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Shift {
        Day,
        NightOwl,
    }

    impl_wire_str_conversions!(Shift {
        Day => "day",
        NightOwl => "night_owl",
    });

    #[test]
    fn display_uses_wire_spelling() {
        assert_eq!(Shift::Day.to_string(), "day");
        assert_eq!(Shift::NightOwl.to_string(), "night_owl");
        assert_eq!(Shift::NightOwl.as_str(), "night_owl");
    }

    #[test]
    fn fromstr_ignores_case() {
        assert_eq!(Shift::from_str("DAY").unwrap(), Shift::Day);
        assert_eq!(Shift::from_str("Night_Owl").unwrap(), Shift::NightOwl);
    }

    #[test]
    fn fromstr_invalid() {
        let result = Shift::from_str("dusk");
        assert!(result.unwrap_err().contains("Invalid Shift: dusk"));
        assert!(Shift::from_str("").is_err());
    }

    mod with_result_alias {
        use std::str::FromStr;

        #[allow(unused_imports)]
        use crate::Result;

        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        enum Tide {
            High,
            Low,
        }

        impl_wire_str_conversions!(Tide {
            High => "high",
            Low => "low",
        });

        #[test]
        fn expands_where_the_crate_result_alias_is_in_scope() {
            assert_eq!(Tide::from_str("LOW"), Ok(Tide::Low));
            assert!(Tide::from_str("ebb").is_err());
            assert_eq!(Tide::High.to_string(), "high");
        }
    }
}
