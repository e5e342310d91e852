use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DeckError;

/// Top-level tenant. Everything else is scoped under it by `slug`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub contact_email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganization {
    pub name: String,
    pub slug: String,
    pub contact_email: String,
}

impl CreateOrganization {
    /// Trims every field and rejects blanks. The slug must be usable as a
    /// scoping key: lowercase letters, digits and dashes only.
    pub fn normalized(&self) -> Result<Self, DeckError> {
        let name = self.name.trim();
        let slug = self.slug.trim();
        let contact_email = self.contact_email.trim();
        if name.is_empty() {
            return Err(DeckError::InvalidInput("name is required".into()));
        }
        if slug.is_empty() {
            return Err(DeckError::InvalidInput("slug is required".into()));
        }
        if !slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(DeckError::InvalidInput(format!(
                "slug '{slug}' may only contain lowercase letters, digits and '-'"
            )));
        }
        if contact_email.is_empty() {
            return Err(DeckError::InvalidInput("contact email is required".into()));
        }
        Ok(Self {
            name: name.to_string(),
            slug: slug.to_string(),
            contact_email: contact_email.to_string(),
        })
    }
}

/// Back-reference from a project to its owning organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationRef {
    pub id: String,
    pub slug: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, slug: &str, email: &str) -> CreateOrganization {
        CreateOrganization {
            name: name.into(),
            slug: slug.into(),
            contact_email: email.into(),
        }
    }

    #[test]
    fn normalized_trims_fields() {
        let org = input(" Acme ", " acme-co ", " ops@acme.io ").normalized().unwrap();
        assert_eq!(org.name, "Acme");
        assert_eq!(org.slug, "acme-co");
        assert_eq!(org.contact_email, "ops@acme.io");
    }

    #[test]
    fn rejects_blank_and_bad_slug() {
        assert!(input("", "acme", "a@b.c").normalized().is_err());
        assert!(input("Acme", "Acme Co", "a@b.c").normalized().is_err());
        assert!(input("Acme", "acme", " ").normalized().is_err());
    }
}
