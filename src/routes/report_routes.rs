use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    routing::get,
    Router,
};

use crate::dto::report_dto::ReportQuery;
use crate::services::report_service::XLSX_CONTENT_TYPE;
use crate::state::AppState;
use crate::utils::errors::{field_validation_error, internal_error, AppResult};
use crate::utils::extract::ValidatedQuery;
use crate::utils::validation::validate_date;

pub fn create_report_router() -> Router<AppState> {
    Router::new().route("/trips.xlsx", get(trips_report))
}

async fn trips_report(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<ReportQuery>,
) -> AppResult<(HeaderMap, Vec<u8>)> {
    let from = validate_date(&params.from).map_err(|e| field_validation_error("from", e))?;
    let to = validate_date(&params.to).map_err(|e| field_validation_error("to", e))?;

    let (report, bytes) = state.reports.build_trips_workbook(from, to).await?;
    let headers = attachment_headers(&report.filename(), bytes.len())?;

    Ok((headers, bytes))
}

fn attachment_headers(filename: &str, length: usize) -> AppResult<HeaderMap> {
    let disposition = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        filename,
        urlencoding::encode(filename)
    );

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(XLSX_CONTENT_TYPE));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition)
            .map_err(|e| internal_error(format!("invalid Content-Disposition: {e}")))?,
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("Content-Disposition"),
    );
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_headers() {
        let headers = attachment_headers("trips_2025-08-01_2025-08-31.xlsx", 1234).unwrap();

        assert_eq!(headers[header::CONTENT_TYPE], XLSX_CONTENT_TYPE);
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"trips_2025-08-01_2025-08-31.xlsx\"; \
             filename*=UTF-8''trips_2025-08-01_2025-08-31.xlsx"
        );
        assert_eq!(headers[header::CONTENT_LENGTH], "1234");
        assert_eq!(headers[header::CACHE_CONTROL], "no-store");
    }
}
