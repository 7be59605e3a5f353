use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Cash balance credited to a newly created user
pub const STARTING_BALANCE: Decimal = dec!(100000);

/// Trading level assigned on creation
pub const DEFAULT_TRADING_LEVEL: &str = "Beginner";

/// Name used when neither auth metadata nor the email yields one
pub const DEFAULT_USER_NAME: &str = "User";

/// Table holding user records
pub const USERS_TABLE: &str = "users";
