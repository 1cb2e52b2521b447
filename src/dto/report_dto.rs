use serde::Deserialize;
use validator::Validate;

use crate::utils::validation::validate_date_format;

#[derive(Debug, Deserialize, Validate)]
pub struct ReportQuery {
    #[validate(custom = "validate_date_format")]
    pub from: String,
    #[validate(custom = "validate_date_format")]
    pub to: String,
}
