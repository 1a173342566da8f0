use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{bearer_token, blocking};
use crate::domain::inquiry::{Inquiry, InquiryConditions, InquiryInput, NewInquiry};
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

/// Contact details; send `id` to update an existing inquiry.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct InquiryRequest {
    pub id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub description: String,
    /// URLs of previously uploaded files.
    pub attachments: Vec<String>,
}

impl From<InquiryRequest> for InquiryInput {
    fn from(req: InquiryRequest) -> Self {
        InquiryInput {
            id: req.id,
            fields: NewInquiry {
                first_name: req.first_name,
                last_name: req.last_name,
                email: req.email,
                phone: req.phone,
                description: req.description,
                attachments: req.attachments,
            },
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InquiryResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub description: String,
    pub attachments: Vec<String>,
    pub order_id: Option<Uuid>,
    pub created_at: String,
}

impl From<Inquiry> for InquiryResponse {
    fn from(inquiry: Inquiry) -> Self {
        InquiryResponse {
            id: inquiry.id,
            first_name: inquiry.first_name,
            last_name: inquiry.last_name,
            email: inquiry.email,
            phone: inquiry.phone,
            description: inquiry.description,
            attachments: inquiry.attachments,
            order_id: inquiry.order_id,
            created_at: inquiry.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListInquiriesParams {
    #[serde(default)]
    pub without_order: bool,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /inquiries
#[utoipa::path(
    post,
    path = "/inquiries",
    request_body = InquiryRequest,
    responses(
        (status = 200, description = "Inquiry saved", body = InquiryResponse),
        (status = 404, description = "Inquiry to update not found"),
    ),
    tag = "inquiries"
)]
pub async fn save_inquiry(
    state: web::Data<AppState>,
    body: web::Json<InquiryRequest>,
) -> Result<HttpResponse, AppError> {
    let input = InquiryInput::from(body.into_inner());
    let inquiry = blocking(move || state.inquiries.save_inquiry(input)).await?;
    Ok(HttpResponse::Ok().json(InquiryResponse::from(inquiry)))
}

/// GET /inquiries/{id}
#[utoipa::path(
    get,
    path = "/inquiries/{id}",
    params(("id" = Uuid, Path, description = "Inquiry UUID")),
    responses(
        (status = 200, description = "Inquiry found", body = InquiryResponse),
        (status = 404, description = "Inquiry not found"),
    ),
    tag = "inquiries"
)]
pub async fn get_inquiry(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let inquiry = blocking(move || state.inquiries.get_inquiry(id)).await?;
    Ok(HttpResponse::Ok().json(InquiryResponse::from(inquiry)))
}

/// GET /inquiries
///
/// Admin only. Newest first.
#[utoipa::path(
    get,
    path = "/inquiries",
    params(
        ("without_order" = Option<bool>, Query, description = "Only inquiries no order has claimed"),
    ),
    responses(
        (status = 200, description = "Inquiries", body = [InquiryResponse]),
        (status = 401, description = "Missing or non-admin token"),
    ),
    security(("bearer_auth" = [])),
    tag = "inquiries"
)]
pub async fn list_inquiries(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<ListInquiriesParams>,
) -> Result<HttpResponse, AppError> {
    let token = bearer_token(&req);
    let conditions = InquiryConditions {
        without_order: query.without_order,
    };

    let inquiries = blocking(move || {
        state.auth.authenticate_admin(token.as_deref())?;
        state.inquiries.list_inquiries(&conditions)
    })
    .await?;

    let body: Vec<InquiryResponse> = inquiries.into_iter().map(InquiryResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}
