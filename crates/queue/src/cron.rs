//! Common cron expressions, so call sites read as intent instead of
//! five-field strings. All are in the schedule's timezone.

pub const EVERY_MINUTE: &str = "* * * * *";
pub const EVERY_5_MINUTES: &str = "*/5 * * * *";
pub const EVERY_10_MINUTES: &str = "*/10 * * * *";
pub const EVERY_15_MINUTES: &str = "*/15 * * * *";
pub const EVERY_30_MINUTES: &str = "*/30 * * * *";
pub const EVERY_HOUR: &str = "0 * * * *";
pub const EVERY_2_HOURS: &str = "0 */2 * * *";
pub const EVERY_6_HOURS: &str = "0 */6 * * *";
pub const EVERY_12_HOURS: &str = "0 */12 * * *";
pub const DAILY_MIDNIGHT: &str = "0 0 * * *";
pub const DAILY_NOON: &str = "0 12 * * *";
pub const DAILY_6AM: &str = "0 6 * * *";
pub const DAILY_6PM: &str = "0 18 * * *";
pub const WEEKLY_MONDAY: &str = "0 0 * * 1";
pub const WEEKLY_FRIDAY: &str = "0 0 * * 5";
pub const WEEKLY_SUNDAY: &str = "0 0 * * 0";
pub const MONTHLY_FIRST: &str = "0 0 1 * *";
/// Uses the provider's `L` (last day of month) extension.
pub const MONTHLY_LAST: &str = "0 0 L * *";
