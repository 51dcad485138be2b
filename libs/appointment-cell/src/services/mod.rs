pub mod booking;
pub mod conflict;
pub mod locks;
pub mod slots;
pub mod store;

pub use booking::AppointmentBookingService;
pub use locks::SchedulingLocks;
pub use slots::{SlotService, SlotSettings};
pub use store::{SchedulingStore, SupabaseSchedulingStore};
