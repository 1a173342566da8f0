use log::info;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::inquiry::{Inquiry, InquiryConditions, InquiryInput};
use crate::domain::ports::SharedOrderRepository;

#[derive(Clone)]
pub struct InquiryService {
    repo: SharedOrderRepository,
}

impl InquiryService {
    pub fn new(repo: SharedOrderRepository) -> Self {
        Self { repo }
    }

    /// Creates the inquiry when it carries no id, otherwise overwrites the
    /// contact fields of the existing one. The order link is never touched
    /// here; only order creation sets it.
    pub fn save_inquiry(&self, input: InquiryInput) -> Result<Inquiry, DomainError> {
        let Some(id) = input.id else {
            let inquiry = self.repo.create_inquiry(input.fields)?;
            info!("Created inquiry {}", inquiry.id);
            return Ok(inquiry);
        };

        let existing = self.get_inquiry(id)?;
        let fields = input.fields;
        self.repo.update_inquiry(&Inquiry {
            first_name: fields.first_name,
            last_name: fields.last_name,
            email: fields.email,
            phone: fields.phone,
            description: fields.description,
            attachments: fields.attachments,
            ..existing
        })
    }

    pub fn get_inquiry(&self, id: Uuid) -> Result<Inquiry, DomainError> {
        self.repo
            .find_inquiry(id)?
            .ok_or_else(|| DomainError::not_found("Inquiry", id))
    }

    pub fn list_inquiries(
        &self,
        conditions: &InquiryConditions,
    ) -> Result<Vec<Inquiry>, DomainError> {
        self.repo.list_inquiries(conditions)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::inquiry::NewInquiry;
    use crate::infrastructure::memory::InMemoryStore;

    fn service() -> InquiryService {
        InquiryService::new(Arc::new(InMemoryStore::new()))
    }

    fn contact(email: &str) -> NewInquiry {
        NewInquiry {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
            phone: "1112223333".to_string(),
            description: "custom engraving".to_string(),
            attachments: vec!["https://cdn.example.com/sketch.png".to_string()],
        }
    }

    #[test]
    fn save_without_id_creates() {
        let svc = service();
        let inquiry = svc
            .save_inquiry(InquiryInput {
                id: None,
                fields: contact("a@b.com"),
            })
            .expect("save failed");

        assert_eq!(inquiry.email, "a@b.com");
        assert_eq!(inquiry.attachments.len(), 1);
        assert!(inquiry.order_id.is_none());
        assert_eq!(svc.get_inquiry(inquiry.id).expect("get failed"), inquiry);
    }

    #[test]
    fn save_with_id_updates_in_place() {
        let svc = service();
        let created = svc
            .save_inquiry(InquiryInput {
                id: None,
                fields: contact("a@b.com"),
            })
            .expect("create failed");

        let updated = svc
            .save_inquiry(InquiryInput {
                id: Some(created.id),
                fields: contact("new@b.com"),
            })
            .expect("update failed");

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.email, "new@b.com");
        assert_eq!(updated.created_at, created.created_at);
    }

    #[test]
    fn save_with_unknown_id_is_not_found() {
        let err = service()
            .save_inquiry(InquiryInput {
                id: Some(Uuid::new_v4()),
                fields: contact("a@b.com"),
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
