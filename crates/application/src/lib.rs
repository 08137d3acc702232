// dbcreds - Application Layer
// Renew/revoke orchestration over roles, connections and the TTL policy

pub mod credentials;

pub use credentials::*;
