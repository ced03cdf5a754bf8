use folio_core_contact_impl::ContactFeatureServiceImpl;
use folio_core_health_impl::HealthFeatureServiceImpl;
use folio_email_impl::EmailServiceImpl;
use folio_shared_impl::{rate_limit::RateLimitServiceImpl, time::TimeServiceImpl};

// API
pub type RestServer = folio_api_rest::RestServer<Health, Contact, RateLimit>;

// Shared
pub type Time = TimeServiceImpl;
pub type RateLimit = RateLimitServiceImpl<Time>;

// Email
pub type Email = EmailServiceImpl;

// Core
pub type Contact = ContactFeatureServiceImpl<Email>;
pub type Health = HealthFeatureServiceImpl<Time>;
