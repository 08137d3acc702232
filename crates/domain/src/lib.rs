// dbcreds - Domain Layer
// Lease data, roles, statement templates, connection ports and TTL policy

pub mod credentials;
pub mod leasing;
