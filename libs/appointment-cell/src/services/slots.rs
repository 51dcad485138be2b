use std::sync::Arc;

use chrono::{Datelike, Days, Duration, NaiveDateTime, NaiveTime};
use tracing::{debug, warn};
use uuid::Uuid;

use doctor_cell::models::{AvailabilityRule, TimeRange, Weekday};
use shared_config::AppConfig;

use crate::models::{Appointment, AppointmentError, DaySlots, TimeSlot};
use crate::services::store::SchedulingStore;

const DEFAULT_SLOT_MINUTES: i64 = 30;
const DEFAULT_HORIZON_DAYS: u32 = 30;
const MAX_SLOT_MINUTES: i64 = 24 * 60;
const MAX_HORIZON_DAYS: u32 = 366;

#[derive(Debug, Clone, Copy)]
pub struct SlotSettings {
    pub slot_duration: Duration,
    pub horizon_days: u32,
}

impl Default for SlotSettings {
    fn default() -> Self {
        Self {
            slot_duration: Duration::minutes(DEFAULT_SLOT_MINUTES),
            horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }
}

impl SlotSettings {
    /// Settings from configuration. Values outside 1..=1440 minutes or
    /// 1..=366 days fall back to the defaults.
    pub fn from_config(config: &AppConfig) -> Self {
        let slot_duration = Some(config.slot_duration_minutes)
            .filter(|minutes| (1..=MAX_SLOT_MINUTES).contains(minutes))
            .and_then(Duration::try_minutes)
            .unwrap_or_else(|| {
                warn!(
                    "Slot duration of {} minutes is not usable, falling back to {}",
                    config.slot_duration_minutes, DEFAULT_SLOT_MINUTES
                );
                Duration::minutes(DEFAULT_SLOT_MINUTES)
            });

        let horizon_days = if (1..=MAX_HORIZON_DAYS).contains(&config.booking_horizon_days) {
            config.booking_horizon_days
        } else {
            warn!(
                "Booking horizon of {} days is not usable, falling back to {}",
                config.booking_horizon_days, DEFAULT_HORIZON_DAYS
            );
            DEFAULT_HORIZON_DAYS
        };

        Self { slot_duration, horizon_days }
    }
}

/// Expand a doctor's weekly rules into per-date slot lists over the booking
/// horizon starting at `now.date()`.
///
/// Only rules of `doctor_id` that are marked available contribute. Every
/// matching rule yields its own entry, ordered by date then rule start. On the
/// first day, slots starting at or before `now` are left out. Entries without
/// any slot are omitted.
pub fn generate_slots(
    doctor_id: Uuid,
    rules: &[AvailabilityRule],
    now: NaiveDateTime,
    settings: &SlotSettings,
) -> Vec<DaySlots> {
    let today = now.date();
    let mut days = Vec::new();

    for offset in 0..settings.horizon_days {
        let Some(date) = today.checked_add_days(Days::new(u64::from(offset))) else {
            break;
        };
        let day = Weekday::from(date.weekday());

        let mut matching: Vec<&AvailabilityRule> = rules.iter()
            .filter(|rule| rule.doctor_id == doctor_id && rule.day_of_week == day && rule.is_available)
            .collect();
        matching.sort_by_key(|rule| rule.start_time);

        let not_after = (date == today).then(|| now.time());

        for rule in matching {
            let time_slot = slot_grid(rule.window(), settings.slot_duration, not_after);
            if time_slot.is_empty() {
                continue;
            }

            days.push(DaySlots {
                doctor_id,
                clinic_id: rule.clinic_id,
                date,
                day,
                time_slot,
            });
        }
    }

    debug!("Generated {} slot days for doctor {}", days.len(), doctor_id);
    days
}

/// Walk `window` in `step` increments while the increment starts before the
/// window ends. Increments ending past midnight stop the walk.
fn slot_grid(window: TimeRange, step: Duration, not_after: Option<NaiveTime>) -> Vec<TimeSlot> {
    let mut slots = Vec::new();
    let mut cursor = window.start;

    while cursor < window.end {
        let (end, wrapped) = cursor.overflowing_add_signed(step);
        if wrapped != 0 {
            break;
        }

        if not_after.map_or(true, |now| cursor > now) {
            slots.push(TimeSlot::new(cursor, end));
        }

        cursor = end;
    }

    slots
}

/// Drop every slot that overlaps a booked appointment on the same date.
pub fn remove_booked(days: Vec<DaySlots>, booked: &[Appointment]) -> Vec<DaySlots> {
    days.into_iter()
        .filter_map(|mut day| {
            day.time_slot.retain(|slot| {
                !booked.iter().any(|appointment| {
                    appointment.date == day.date && appointment.time_range().overlaps(&slot.range())
                })
            });

            (!day.time_slot.is_empty()).then_some(day)
        })
        .collect()
}

pub struct SlotService {
    store: Arc<dyn SchedulingStore>,
    settings: SlotSettings,
}

impl SlotService {
    pub fn new(store: Arc<dyn SchedulingStore>, settings: SlotSettings) -> Self {
        Self { store, settings }
    }

    /// Bookable slots of a doctor from `now` over the booking horizon.
    pub async fn available_slots(
        &self,
        doctor_id: Uuid,
        now: NaiveDateTime,
    ) -> Result<Vec<DaySlots>, AppointmentError> {
        debug!("Calculating available slots for doctor {} from {}", doctor_id, now);

        let rules = self.store.availability_rules(doctor_id).await?;
        if rules.is_empty() {
            return Err(AppointmentError::NoAvailability(doctor_id));
        }

        let generated = generate_slots(doctor_id, &rules, now, &self.settings);
        let (Some(first), Some(last)) = (generated.first(), generated.last()) else {
            return Ok(Vec::new());
        };

        let booked = self.store
            .doctor_appointments_between(doctor_id, first.date, last.date)
            .await?;

        let available = remove_booked(generated, &booked);
        debug!("Found {} slot days with openings for doctor {}", available.len(), doctor_id);

        Ok(available)
    }
}
