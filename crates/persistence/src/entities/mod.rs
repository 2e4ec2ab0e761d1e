//! Entity definitions (database row mappings).

pub mod animal;
pub mod assignment;
pub mod contact;
pub mod device;
pub mod geofence_event;
pub mod ping;
pub mod zone;

pub use animal::AnimalEntity;
pub use assignment::ZoneAssignmentEntity;
pub use contact::ContactEntity;
pub use device::DeviceEntity;
pub use geofence_event::{GeofenceEventEntity, GeofenceEventWithContext};
pub use ping::{PingEntity, PingZoneRow};
pub use zone::ZoneEntity;
