use serde::{Deserialize, Serialize};

/// Contact details collected on the lead form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub first_name: String,
    pub zipcode: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Validation errors raised before a lead leaves the service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactViolation {
    #[error("first name is required")]
    MissingFirstName,
    #[error("zipcode must be a 5-digit ZIP code")]
    InvalidZipcode,
    #[error("email address is not valid")]
    InvalidEmail,
    #[error("phone number must contain 10 digits")]
    InvalidPhone,
}

impl ContactInfo {
    /// Trimmed copy with the phone reduced to digits, or the first violation found.
    pub fn validate(self) -> Result<Self, ContactViolation> {
        let first_name = self.first_name.trim().to_string();
        if first_name.is_empty() {
            return Err(ContactViolation::MissingFirstName);
        }

        let zipcode = self.zipcode.trim().to_string();
        if zipcode.len() != 5 || !zipcode.chars().all(|c| c.is_ascii_digit()) {
            return Err(ContactViolation::InvalidZipcode);
        }

        let email = self.email.trim().to_string();
        if !is_plausible_email(&email) {
            return Err(ContactViolation::InvalidEmail);
        }

        let phone = match self.phone.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
                if digits.len() != 10 {
                    return Err(ContactViolation::InvalidPhone);
                }
                Some(digits)
            }
        };

        Ok(Self {
            first_name,
            zipcode,
            email,
            phone,
        })
    }

    /// `+1 (AAA) BBB-CCCC` for a 10-digit phone; anything else is passed through untouched.
    pub fn formatted_phone(&self) -> Option<String> {
        let phone = self.phone.as_deref()?;
        let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
        if digits.len() != 10 {
            return Some(phone.to_string());
        }
        Some(format!(
            "+1 ({}) {}-{}",
            &digits[0..3],
            &digits[3..6],
            &digits[6..]
        ))
    }
}

fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .map(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
            .unwrap_or(false)
}
