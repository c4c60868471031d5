//! Services layer - Business logic
//!
//! Services sit between the HTTP handlers and the repositories:
//! - validating input and rejecting unknown enum values
//! - pricing rentals and assembling bookings
//! - keeping the catalog and content caches fresh

pub mod booking;
pub mod car;
pub mod content;
pub mod identity;
pub mod partner_request;
pub mod password;
pub mod pricing;
pub mod seed;
pub mod stats;
pub mod user;

pub use booking::{BookingService, BookingServiceError};
pub use car::{CarQuote, CarService, CarServiceError};
pub use content::{ContentRepositories, ContentService, ContentServiceError};
pub use identity::{ExternalIdentity, HttpIdentityProvider, IdentityError, IdentityProvider};
pub use partner_request::{PartnerRequestService, PartnerRequestServiceError};
pub use password::{hash_password, verify_password};
pub use pricing::{quote, PriceQuote, PricingError, QuoteRequest, RentalPeriod, RentalTerms};
pub use seed::{seed_catalog, SeedOutcome};
pub use stats::{dashboard, DashboardStats};
pub use user::{AuthSession, LoginInput, RegisterInput, UserService, UserServiceError};
