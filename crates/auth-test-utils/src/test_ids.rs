//! Fixed test values for deterministic tests

use uuid::Uuid;

// User IDs (100-199)
pub const TEST_USER_ALICE: Uuid = Uuid::from_u128(100);
pub const TEST_USER_BOB: Uuid = Uuid::from_u128(101);

// Secret seeds
pub const TEST_SECRET_SEED: u8 = 1;
pub const OTHER_SECRET_SEED: u8 = 2;

// Credentials
pub const TEST_USERNAME: &str = "alice";
pub const TEST_PASSWORD: &str = "CorrectPass1!";
pub const WRONG_PASSWORD: &str = "WrongPass";
pub const UNKNOWN_USERNAME: &str = "nouser";

// Roles
pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_ARCHIVE_ADMIN: &str = "archive_admin";
