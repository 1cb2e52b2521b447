use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::vehicle::{Page, Vehicle, VehicleQuery};
use crate::utils::validation::validate_date_format;

// Query string for the vehicle listing
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListVehiclesQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub q: Option<String>,
}

impl From<ListVehiclesQuery> for VehicleQuery {
    fn from(query: ListVehiclesQuery) -> Self {
        VehicleQuery::new(query.page, query.page_size, query.q)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct StatusQuery {
    #[validate(custom = "validate_date_format")]
    pub date: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleListResponse {
    pub items: Vec<Vehicle>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl VehicleListResponse {
    pub fn new(page: Page<Vehicle>, query: &VehicleQuery) -> Self {
        Self {
            items: page.items,
            total: page.total,
            page: query.page,
            page_size: query.page_size,
        }
    }
}
