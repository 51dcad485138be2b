use std::env;
use std::str::FromStr;

use chrono::{FixedOffset, NaiveDateTime, Offset, Utc};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
    pub supabase_jwt_secret: String,
    pub slot_duration_minutes: i64,
    pub booking_horizon_days: u32,
    pub clinic_utc_offset_minutes: i32,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            supabase_service_role_key: String::new(),
            supabase_jwt_secret: String::new(),
            slot_duration_minutes: 30,
            booking_horizon_days: 30,
            clinic_utc_offset_minutes: 0,
            port: 3000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_service_role_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_ROLE_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            slot_duration_minutes: parse_or("SLOT_DURATION_MINUTES", defaults.slot_duration_minutes),
            booking_horizon_days: parse_or("BOOKING_HORIZON_DAYS", defaults.booking_horizon_days),
            clinic_utc_offset_minutes: parse_or("CLINIC_UTC_OFFSET_MINUTES", defaults.clinic_utc_offset_minutes),
            port: parse_or("PORT", defaults.port),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_service_role_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }

    /// Wall-clock time at the clinic. Slot generation and the "no booking the
    /// past" rule are evaluated against this value.
    pub fn clinic_now(&self) -> NaiveDateTime {
        let offset = FixedOffset::east_opt(self.clinic_utc_offset_minutes * 60)
            .unwrap_or_else(|| {
                warn!(
                    "CLINIC_UTC_OFFSET_MINUTES={} is out of range, falling back to UTC",
                    self.clinic_utc_offset_minutes
                );
                Utc.fix()
            });

        Utc::now().with_timezone(&offset).naive_local()
    }
}

fn parse_or<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
