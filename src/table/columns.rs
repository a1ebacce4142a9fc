//! Column names produced and consumed by the pipeline

pub const ID: &str = "id";
pub const POSTED_DATE: &str = "posted_date";
pub const PLANNED_EXPIRATION_DATE: &str = "planned_expiration_date";
pub const DAYS_AVAILABLE: &str = "days_available";

pub const REPAYMENT_INTERVAL: &str = "repayment_interval";
pub const REPAYMENT_TERM: &str = "repayment_term";
pub const CURRENCY_LOSS: &str = "currency_loss";

pub const COUNTRY: &str = "country";
pub const GROUP_SIZE: &str = "group_size";
pub const GENDER: &str = "gender";

pub const NAME: &str = "name";
pub const PARTNER_ID: &str = "partner_id";
pub const IMAGE: &str = "image";
pub const DESCRIPTION: &str = "description";

pub const STATUS: &str = "status";
pub const USE: &str = "use";
pub const THEMES: &str = "themes";

pub const EXPIRED: &str = "expired";
pub const DESC_TEXT_LEN: &str = "desc_text_len";
pub const USE_TEXT_LEN: &str = "use_text_len";
pub const ANONYMOUS: &str = "anonymous";
pub const THEME_PREFIX: &str = "theme: ";
pub const THEME_NONE: &str = "theme: none";

/// Data generated after a loan was funded; unavailable at prediction time
pub const POST_FUNDING: &[&str] = &[
    "basket_amount",
    "currency_exchange_loss_amount",
    "delinquent",
    "paid_date",
    "paid_amount",
    "journal_totals",
    "payments",
    "lender_count",
    "funded_date",
    "funded_amount",
    "translator",
    "video",
    "tags",
];

/// Listing details only the description-aware model uses
pub const LISTING_DETAIL: &[&str] = &[IMAGE, NAME, PARTNER_ID, DESCRIPTION];

/// Columns removed when condensing cleaned dumps
pub const CONDENSE_DROPS: &[&str] = &[IMAGE, NAME, PARTNER_ID];

/// Column name for a one-hot theme flag
pub fn theme_column(theme: &str) -> String {
    format!("{THEME_PREFIX}{theme}")
}
