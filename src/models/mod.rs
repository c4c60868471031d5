//! Data models
//!
//! Entities stored in the database, their request inputs, and the closed
//! enums used at the API boundary. Every enum serializes as a lowercase
//! string and parses through `FromStr`, which rejects unknown values.

/// Declare a closed string enum with `as_str`, `Display` and `FromStr`.
///
/// The first listed variant is the `Default`.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $first:ident => $first_str:literal
            $(, $variant:ident => $str:literal)* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            #[default]
            $first,
            $($variant,)*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$name::$first $(, $name::$variant)*];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $name::$first => $first_str,
                    $($name::$variant => $str,)*
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = anyhow::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $first_str => Ok($name::$first),
                    $($str => Ok($name::$variant),)*
                    _ => Err(anyhow::anyhow!("Invalid {}: {}", $label, s)),
                }
            }
        }
    };
}

mod booking;
mod car;
mod content;
mod partner_request;
mod session;
mod user;

pub use booking::{Booking, BookingStatus, CreateBookingInput, Insurance, Location};
pub use car::{BodyType, Car, CarFilter, CarInput, Fuel, Tariff, Transmission, UpdateCarInput};
pub use content::{
    Banner, BannerInput, ContactInfo, Faq, FaqInput, LegalContent, LegalInput, LegalKind,
    UpdateBannerInput, UpdateContactInput, UpdateFaqInput,
};
pub use partner_request::{CreatePartnerRequestInput, PartnerRequest, PartnerRequestStatus};
pub use session::Session;
pub use user::{AuthType, Language, User, UserRole};

/// Generate a prefixed identifier such as `car_3f9a0c12be41`
pub fn new_id(prefix: &str) -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}", prefix, &hex[..12])
}
