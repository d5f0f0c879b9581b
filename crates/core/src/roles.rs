//! Platform roles.
//!
//! Ids must match the seed data in `20260301000002_create_lookup_tables.sql`.

define_lookup_enum! {
    /// Role carried by every user account and embedded in access tokens.
    UserRole {
        Admin = 1 => "ADMIN",
        Client = 2 => "CLIENT",
        Deliverer = 3 => "DELIVERER",
        Merchant = 4 => "MERCHANT",
        Provider = 5 => "PROVIDER",
    }
}

impl UserRole {
    pub fn is_admin(self) -> bool {
        self == UserRole::Admin
    }
}
