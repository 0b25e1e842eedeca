//! Column names of the marketing-campaign dataset.

use super::model::Table;

pub const YEAR_BIRTH: &str = "Year_Birth";
pub const INCOME: &str = "Income";
pub const DT_CUSTOMER: &str = "Dt_Customer";
pub const MARITAL_STATUS: &str = "Marital_Status";
pub const EDUCATION: &str = "Education";
pub const COUNTRY: &str = "Country";
pub const RESPONSE: &str = "Response";

pub const AGE: &str = "Age";
pub const TOTAL_SPEND: &str = "Total_Spend";
pub const TOTAL_ACCEPTED: &str = "Total_Accepted_Campaigns";
pub const TENURE_DAYS: &str = "Tenure_Days";

/// Spend per product category over the last two years.
pub const SPEND_COLUMNS: [&str; 6] = [
    "MntWines",
    "MntFruits",
    "MntMeatProducts",
    "MntFishProducts",
    "MntSweetProducts",
    "MntGoldProds",
];

/// 0/1 campaign acceptance flags; `Response` is the last campaign.
pub const CAMPAIGN_COLUMNS: [&str; 6] = [
    "AcceptedCmp1",
    "AcceptedCmp2",
    "AcceptedCmp3",
    "AcceptedCmp4",
    "AcceptedCmp5",
    RESPONSE,
];

/// Columns the sidebar filters on, in display order.
pub const FILTER_COLUMNS: [&str; 3] = [COUNTRY, EDUCATION, MARITAL_STATUS];

/// Every column the cleaning pipeline reads.
pub fn required_columns() -> Vec<&'static str> {
    let mut cols = vec![YEAR_BIRTH, INCOME, DT_CUSTOMER, MARITAL_STATUS, EDUCATION];
    cols.extend(SPEND_COLUMNS);
    cols.extend(CAMPAIGN_COLUMNS);
    cols
}

/// Required columns absent from `table`, in declaration order.
pub fn missing_columns(table: &Table) -> Vec<String> {
    required_columns()
        .into_iter()
        .filter(|c| !table.has_column(c))
        .map(str::to_string)
        .collect()
}
