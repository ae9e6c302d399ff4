//! Response DTOs for domain values that are not plain entity models.
//!
//! Entity models already derive `ToSchema` and are returned as-is. The types here mirror the
//! JSON shape of composite domain results so that the OpenAPI document describes them.

pub(crate) mod account;
pub(crate) mod discount;
pub(crate) mod message;
pub(crate) mod payment;
