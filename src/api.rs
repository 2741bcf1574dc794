//! HTTP adapter over [`QueryService`].

use actix_web::{HttpResponse, Responder, get, http::StatusCode, post, web};
use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    error::RateError,
    exchange_rate::RatePoint,
    query::{ConversionRequest, QueryService},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertBody {
    pub from_currency: String,
    pub to_currency: String,
    pub amount: Decimal,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeBody {
    pub currency_code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub success: bool,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::arbitrary_precision_option"
    )]
    pub result: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RangeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rates: Option<Vec<RatePoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn status_for(err: &RateError) -> StatusCode {
    match err {
        RateError::ProviderRejected(_)
        | RateError::UnknownCurrency(_)
        | RateError::InvalidRate(_)
        | RateError::InvalidAmount(_)
        | RateError::InvalidRange { .. } => StatusCode::BAD_REQUEST,
        RateError::NotFound { .. } => StatusCode::NOT_FOUND,
        RateError::ProviderUnavailable(_) => StatusCode::BAD_GATEWAY,
        RateError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn conversion_failed(status: StatusCode, error: String) -> HttpResponse {
    HttpResponse::build(status).json(ConvertResponse {
        success: false,
        result: None,
        error: Some(error),
    })
}

fn parse_date(date: &str) -> Result<NaiveDate, HttpResponse> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| {
        conversion_failed(
            StatusCode::BAD_REQUEST,
            "Invalid date format. Please use YYYY-MM-DD".to_string(),
        )
    })
}

async fn respond_with_conversion(
    service: &QueryService,
    body: ConvertBody,
    date: Option<NaiveDate>,
) -> HttpResponse {
    let request = ConversionRequest {
        from_currency: body.from_currency,
        to_currency: body.to_currency,
        amount: body.amount,
        date,
    };

    match service.convert(&request).await {
        Ok(result) => HttpResponse::Ok().json(ConvertResponse {
            success: true,
            result: Some(result),
            error: None,
        }),
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                warn!("Conversion failed: {}", e);
            }
            conversion_failed(status, e.to_string())
        }
    }
}

#[post("/convert")]
async fn convert(
    service: web::Data<QueryService>,
    body: web::Json<ConvertBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let date = match body.date.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(date) => match parse_date(date) {
            Ok(date) => Some(date),
            Err(response) => return response,
        },
        None => None,
    };
    respond_with_conversion(&service, body, date).await
}

#[post("/convert/historical")]
async fn convert_historical(
    service: web::Data<QueryService>,
    body: web::Json<ConvertBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let date = match body.date.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(date) => match parse_date(date) {
            Ok(date) => date,
            Err(response) => return response,
        },
        None => {
            return conversion_failed(
                StatusCode::BAD_REQUEST,
                "Date is required for historical conversion".to_string(),
            );
        }
    };
    respond_with_conversion(&service, body, Some(date)).await
}

#[post("/convert/database")]
async fn historical_range(
    service: web::Data<QueryService>,
    body: web::Json<RangeBody>,
) -> HttpResponse {
    match service
        .get_range(&body.currency_code, body.start_date, body.end_date)
        .await
    {
        Ok(rates) => HttpResponse::Ok().json(RangeResponse {
            success: true,
            rates: Some(rates),
            error: None,
        }),
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                warn!("Range lookup failed: {}", e);
            }
            HttpResponse::build(status).json(RangeResponse {
                success: false,
                rates: None,
                error: Some(e.to_string()),
            })
        }
    }
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().finish()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(
        web::scope("/api/currency")
            .service(convert)
            .service(convert_historical)
            .service(historical_range),
    );
}
