//! Repository implementations for database operations.

pub mod animal;
pub mod assignment;
pub mod contact;
pub mod device;
pub mod geofence_event;
pub mod ping;
pub mod reporting;
pub mod zone;

pub use animal::AnimalRepository;
pub use assignment::AssignmentRepository;
pub use contact::ContactRepository;
pub use device::DeviceRepository;
pub use geofence_event::GeofenceEventRepository;
pub use ping::{PingHistoryQuery, PingInput, PingRepository};
pub use reporting::{ReportingRepository, SummaryRowEntity};
pub use zone::ZoneRepository;
