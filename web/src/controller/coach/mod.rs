//! Routes nested under a single coach, `/coaches/{id}/...`, through which
//! users browse what that coach offers.

pub(crate) mod booking_type_controller;
pub(crate) mod custom_service_controller;
pub(crate) mod discount_controller;
pub(crate) mod time_slot_controller;
